//! Legal-pour test, pour application and win detection.
//!
//! Everything here is a pure function of its inputs. The only mutation is
//! [`apply_pour`], which works on a layout buffer owned by the caller.

use crate::model::{Container, Layout};

/// A pour request between two container indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// Consecutive same-color layers at the top, 0 for an empty container.
pub fn top_run_length(container: &Container) -> usize {
    let mut layers = container.get_layers().iter().rev();
    let Some(top) = layers.next() else {
        return 0;
    };
    1 + layers.take_while(|c| *c == top).count()
}

pub fn can_pour(from: &Container, to: &Container) -> bool {
    if from.is_empty() || to.is_full() {
        return false;
    }
    if to.is_empty() {
        return true;
    }
    from.get_top_color() == to.get_top_color()
}

/// Layers a pour from `from` into `to` would move.
pub fn pourable_amount(from: &Container, to: &Container) -> usize {
    if !can_pour(from, to) {
        return 0;
    }
    top_run_length(from).min(to.get_empty_space())
}

/// Index-level legality: distinct, in range, and [`can_pour`].
pub fn can_pour_at(layout: &Layout, from: usize, to: usize) -> bool {
    if from == to {
        return false;
    }
    match (layout.container(from), layout.container(to)) {
        (Some(source), Some(target)) => can_pour(source, target),
        _ => false,
    }
}

/// Moves the top run of `from` onto `to`, one layer at a time, bounded by the
/// free space of `to`. Returns the number of layers moved; an illegal request
/// moves nothing.
pub fn apply_pour(layout: &mut Layout, from: usize, to: usize) -> usize {
    let Some((source, target)) = layout.pair_mut(from, to) else {
        return 0;
    };
    let amount = pourable_amount(source, target);
    for _ in 0..amount {
        if let Some(color) = source.pop() {
            target.push(color);
        }
    }
    amount
}

/// Every container is empty or full of one color.
pub fn is_solved(layout: &Layout) -> bool {
    layout
        .get_containers()
        .iter()
        .all(|c| c.is_empty() || c.is_complete())
}

pub fn legal_moves(layout: &Layout) -> Vec<Move> {
    let count = layout.len();
    (0..count)
        .flat_map(|from| (0..count).map(move |to| Move::new(from, to)))
        .filter(|m| can_pour_at(layout, m.from, m.to))
        .collect()
}

pub fn has_legal_move(layout: &Layout) -> bool {
    let count = layout.len();
    (0..count).any(|from| (0..count).any(|to| can_pour_at(layout, from, to)))
}
