//! Best-effort post-processing of a raw layout.
//!
//! Both passes are bounded and leave an already valid layout untouched. When
//! a pass cannot reach its goal it gives up and says so in the
//! [`RepairReport`].

use macroquad::prelude::debug;

use crate::model::{Color, Layout};
use crate::rules;

/// Most distinct colors a container may hold after repair (further capped by
/// the container capacity).
pub const MAX_DISTINCT_COLORS: usize = 3;

/// Empty containers every emitted level should keep.
pub const MIN_EMPTY_CONTAINERS: usize = 2;

/// Layers relocated per offending color.
const LAYERS_PER_RELOCATION: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// Every container is within its distinct-color cap.
    pub diversity_capped: bool,
    /// At least one legal pour exists.
    pub opening_move: bool,
    /// Relocations left at least [`MIN_EMPTY_CONTAINERS`] empty containers.
    pub empties_kept: bool,
    pub layers_moved: usize,
}

impl RepairReport {
    pub fn is_satisfied(&self) -> bool {
        self.diversity_capped && self.opening_move && self.empties_kept
    }
}

pub fn diversity_cap(capacity: usize) -> usize {
    MAX_DISTINCT_COLORS.min(capacity)
}

pub fn repair_layout(layout: &mut Layout) -> RepairReport {
    let (diversity_capped, layers_moved) = cap_diversity(layout);
    let opening_move = ensure_opening_move(layout);
    RepairReport {
        diversity_capped,
        opening_move,
        empties_kept: layout.empty_container_count() >= MIN_EMPTY_CONTAINERS,
        layers_moved,
    }
}

/// Relocates the least frequent colors out of over-diverse containers.
/// Returns whether every container ends within its cap, and how many layers
/// moved.
pub fn cap_diversity(layout: &mut Layout) -> (bool, usize) {
    let mut moved = 0;
    for index in 0..layout.len() {
        moved += cap_container(layout, index);
    }
    let satisfied = layout
        .get_containers()
        .iter()
        .all(|c| c.distinct_colors() <= diversity_cap(c.get_capacity()));
    (satisfied, moved)
}

fn cap_container(layout: &mut Layout, index: usize) -> usize {
    let container = &layout.get_containers()[index];
    let cap = diversity_cap(container.get_capacity());
    let mut counts = container.color_counts();
    if counts.len() <= cap {
        return 0;
    }
    // least frequent first, ties by first appearance
    counts.sort_by_key(|(_, count)| *count);
    let excess = counts.len() - cap;

    let mut moved = 0;
    for (color, count) in counts.into_iter().take(excess) {
        let Some(target) = find_compatible(layout, color, index) else {
            debug!("no room to relocate {} out of container {}", color, index);
            continue;
        };
        let Some((source, destination)) = layout.pair_mut(index, target) else {
            continue;
        };
        let amount = count
            .min(LAYERS_PER_RELOCATION)
            .min(destination.get_empty_space());
        for _ in 0..amount {
            if source.remove_lowest(color) {
                destination.push(color);
                moved += 1;
            }
        }
    }
    moved
}

/// An empty container, else one topped with `color` that has free space.
fn find_compatible(layout: &Layout, color: Color, exclude: usize) -> Option<usize> {
    let containers = layout.get_containers();
    let candidates = || containers.iter().enumerate().filter(|(i, _)| *i != exclude);
    candidates()
        .find(|(_, c)| c.is_empty())
        .or_else(|| candidates().find(|(_, c)| c.get_top_color() == Some(color) && !c.is_full()))
        .map(|(i, _)| i)
}

/// Makes sure the player has at least one legal pour. Returns whether one
/// exists afterwards.
pub fn ensure_opening_move(layout: &mut Layout) -> bool {
    if rules::has_legal_move(layout) {
        return true;
    }
    let has_empty = layout.get_containers().iter().any(|c| c.is_empty());
    if has_empty {
        shift_top_layer(layout);
    } else {
        raise_matching_layer(layout);
    }
    rules::has_legal_move(layout)
}

/// Pops the top of the first container holding more than one layer onto the
/// first empty or matching container.
fn shift_top_layer(layout: &mut Layout) {
    let containers = layout.get_containers();
    let Some(source) = containers.iter().position(|c| c.len() > 1) else {
        return;
    };
    let Some(color) = containers[source].get_top_color() else {
        return;
    };
    let target = containers.iter().enumerate().position(|(i, c)| {
        i != source && (c.is_empty() || (c.get_top_color() == Some(color) && !c.is_full()))
    });
    if let Some((from, to)) = target.and_then(|t| layout.pair_mut(source, t)) {
        if let Some(color) = from.pop() {
            to.push(color);
        }
    }
}

/// Reorders one container so its top matches the top of a container with
/// free space. Layer counts and per-container diversity are unchanged.
fn raise_matching_layer(layout: &mut Layout) {
    let containers = layout.get_containers();
    let candidate = containers
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty() && !c.is_full())
        .find_map(|(target, c)| {
            let color = c.get_top_color()?;
            containers
                .iter()
                .enumerate()
                .position(|(i, other)| i != target && other.get_layers().contains(&color))
                .map(|source| (source, color))
        });
    if let Some((source, color)) = candidate {
        layout.containers_mut()[source].raise_to_top(color);
    }
}
