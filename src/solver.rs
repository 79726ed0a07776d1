use std::collections::HashSet;

use macroquad::prelude::debug;
use rayon::prelude::*;

use crate::model::{Container, Layout};
use crate::rules::{self, Move};

/// Distinct layouts a hint search may visit before giving up.
pub const DEFAULT_STATE_BUDGET: usize = 20_000;

#[derive(Clone)]
struct LayoutWithHistory {
    layout: Layout,
    history: Vec<Move>,
}

impl LayoutWithHistory {
    fn successors(&self) -> Vec<LayoutWithHistory> {
        useful_moves(&self.layout)
            .into_iter()
            .map(|m| {
                let mut layout = self.layout.clone();
                rules::apply_pour(&mut layout, m.from, m.to);
                let mut history = self.history.clone();
                history.push(m);
                LayoutWithHistory { layout, history }
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Shortest pour sequence found from the starting layout.
    Solved(Vec<Move>),
    /// Every reachable layout was visited without finding a solution.
    Unsolvable,
    /// The state budget ran out first.
    BudgetExhausted,
}

/// Breadth-first search over layouts. Each frontier is expanded in parallel
/// and deduplicated against every layout seen so far, up to container order.
pub struct Solver {
    starting_layout: Layout,
    budget: usize,
}

impl Solver {
    pub fn new(starting_layout: Layout) -> Solver {
        Solver {
            starting_layout,
            budget: DEFAULT_STATE_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: usize) -> Solver {
        self.budget = budget.max(1);
        self
    }

    pub fn solve(&self) -> SolveOutcome {
        if rules::is_solved(&self.starting_layout) {
            return SolveOutcome::Solved(Vec::new());
        }
        let mut visited: HashSet<Vec<Container>> = HashSet::new();
        visited.insert(canonical(&self.starting_layout));
        let mut frontier = vec![LayoutWithHistory {
            layout: self.starting_layout.clone(),
            history: Vec::new(),
        }];

        let mut depth = 0;
        while !frontier.is_empty() {
            depth += 1;
            let candidates: Vec<LayoutWithHistory> = frontier
                .par_iter()
                .flat_map_iter(|node| node.successors())
                .collect();

            let mut next = Vec::new();
            for candidate in candidates {
                let key = canonical(&candidate.layout);
                if visited.contains(&key) {
                    continue;
                }
                if rules::is_solved(&candidate.layout) {
                    debug!("solved at depth {} after {} layouts", depth, visited.len());
                    return SolveOutcome::Solved(candidate.history);
                }
                if visited.len() >= self.budget {
                    debug!("search budget of {} layouts spent at depth {}", self.budget, depth);
                    return SolveOutcome::BudgetExhausted;
                }
                visited.insert(key);
                next.push(candidate);
            }
            frontier = next;
        }
        SolveOutcome::Unsolvable
    }
}

/// Layouts that differ only in container order share a key.
fn canonical(layout: &Layout) -> Vec<Container> {
    let mut containers = layout.get_containers().to_vec();
    containers.sort_unstable();
    containers
}

/// Legal pours minus those that lead nowhere new: pouring out of a complete
/// container, moving a single-color container wholesale into an empty one,
/// and pouring into any empty container but the first of its capacity.
pub fn useful_moves(layout: &Layout) -> Vec<Move> {
    let containers = layout.get_containers();
    let first_empty = |capacity: usize| {
        containers
            .iter()
            .position(|c| c.is_empty() && c.get_capacity() == capacity)
    };
    rules::legal_moves(layout)
        .into_iter()
        .filter(|m| {
            let source = &containers[m.from];
            let target = &containers[m.to];
            if source.is_complete() {
                return false;
            }
            if target.is_empty() {
                return source.distinct_colors() > 1
                    && first_empty(target.get_capacity()) == Some(m.to);
            }
            true
        })
        .collect()
}

/// First move of a shortest solution. When the search gives up, the first
/// useful legal move, else any legal move.
pub fn hint(layout: &Layout) -> Option<Move> {
    match Solver::new(layout.clone()).solve() {
        SolveOutcome::Solved(moves) => moves.first().copied(),
        SolveOutcome::Unsolvable | SolveOutcome::BudgetExhausted => useful_moves(layout)
            .first()
            .copied()
            .or_else(|| rules::legal_moves(layout).first().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color::*;

    fn replay(layout: &Layout, moves: &[Move]) -> Layout {
        let mut layout = layout.clone();
        for m in moves {
            assert!(rules::apply_pour(&mut layout, m.from, m.to) > 0);
        }
        layout
    }

    #[test]
    fn finds_shortest_solution() {
        let layout = Layout::from_colors(2, &[&[Red, Blue], &[Blue, Red], &[], &[]]);
        let SolveOutcome::Solved(moves) = Solver::new(layout.clone()).solve() else {
            panic!("expected a solution");
        };
        assert_eq!(moves.len(), 3);
        assert!(rules::is_solved(&replay(&layout, &moves)));
    }

    #[test]
    fn solved_layout_needs_no_moves() {
        let layout = Layout::from_colors(2, &[&[Red, Red], &[]]);
        assert_eq!(Solver::new(layout).solve(), SolveOutcome::Solved(vec![]));
    }

    #[test]
    fn stuck_layout_is_unsolvable() {
        let layout = Layout::from_colors(2, &[&[Red, Blue], &[Blue, Red]]);
        assert_eq!(Solver::new(layout.clone()).solve(), SolveOutcome::Unsolvable);
        assert_eq!(hint(&layout), None);
    }

    #[test]
    fn budget_stops_the_search() {
        let layout = Layout::from_colors(
            4,
            &[&[Red, Blue, Green, Red], &[Blue, Green, Red, Blue], &[Green, Red, Blue, Green], &[], &[]],
        );
        assert_eq!(Solver::new(layout).with_budget(1).solve(), SolveOutcome::BudgetExhausted);
    }

    #[test]
    fn relabelling_moves_are_pruned() {
        let layout = Layout::from_colors(4, &[&[Red, Red], &[Blue, Red], &[]]);
        assert_eq!(useful_moves(&layout), vec![Move::new(0, 1), Move::new(1, 0), Move::new(1, 2)]);
    }

    #[test]
    fn duplicate_empties_and_complete_sources_are_pruned() {
        let layout = Layout::from_colors(
            4,
            &[&[Green; 4], &[Red, Blue], &[Blue, Red, Red], &[], &[]],
        );
        assert_eq!(useful_moves(&layout), vec![Move::new(1, 3), Move::new(2, 3)]);
        assert_eq!(rules::legal_moves(&layout).len(), 6);
    }

    #[test]
    fn reordered_layouts_share_a_key() {
        let a = Layout::from_colors(4, &[&[Red, Blue], &[], &[Blue, Blue, Red]]);
        let b = Layout::from_colors(4, &[&[Blue, Blue, Red], &[Red, Blue], &[]]);
        assert_ne!(a, b);
        assert_eq!(canonical(&a), canonical(&b));
    }

    #[test]
    fn three_colors_with_two_spares_are_solved_within_budget() {
        let layout = Layout::from_colors(
            4,
            &[&[Red, Blue, Green, Red], &[Blue, Green, Red, Blue], &[Green, Red, Blue, Green], &[], &[]],
        );
        let SolveOutcome::Solved(moves) = Solver::new(layout.clone()).solve() else {
            panic!("expected a solution");
        };
        assert!(rules::is_solved(&replay(&layout, &moves)));
    }

    #[test]
    fn hint_starts_a_solution() {
        let layout = Layout::from_colors(4, &[&[Red, Blue, Blue], &[Blue, Red, Red, Red], &[Blue], &[]]);
        let first = hint(&layout).expect("hint");
        let SolveOutcome::Solved(moves) = Solver::new(layout).solve() else {
            panic!("expected a solution");
        };
        assert_eq!(moves.first(), Some(&first));
    }
}
