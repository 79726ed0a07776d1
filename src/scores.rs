use std::collections::HashMap;

use macroquad::prelude::info;

use crate::mode::Mode;

/// Result of one solved run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BestScore {
    pub moves: u32,
    pub time_seconds: u32,
}

impl BestScore {
    /// Fewer moves wins; equal moves fall back to the faster time.
    pub fn is_better_than(&self, other: &BestScore) -> bool {
        (self.moves, self.time_seconds) < (other.moves, other.time_seconds)
    }
}

/// Best result per (mode, level), kept for the lifetime of the process.
#[derive(Clone, Debug, Default)]
pub struct BestScores {
    scores: HashMap<(Mode, u32), BestScore>,
}

impl BestScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `score` if it beats the current best. Returns whether it did.
    pub fn record(&mut self, mode: Mode, level: u32, score: BestScore) -> bool {
        let improved = self
            .scores
            .get(&(mode, level))
            .is_none_or(|best| score.is_better_than(best));
        if improved {
            info!(
                "new best for level {} ({}): {} moves in {}s",
                level, mode, score.moves, score.time_seconds
            );
            self.scores.insert((mode, level), score);
        }
        improved
    }

    pub fn get(&self, mode: Mode, level: u32) -> Option<BestScore> {
        self.scores.get(&(mode, level)).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SolveRating {
    pub label: &'static str,
    pub stars: u8,
}

/// Rates a solve by how close it came to the level's estimate.
pub fn rate_solve(estimated_min_moves: u32, moves: u32) -> SolveRating {
    let (label, stars) = match efficiency_per_mille(estimated_min_moves, moves) {
        1_500.. => ("Perfect!", 3),
        1_200.. => ("Excellent!", 3),
        1_000.. => ("Great!", 2),
        _ => ("Good!", 1),
    };
    SolveRating { label, stars }
}

fn efficiency_per_mille(estimated_min_moves: u32, moves: u32) -> u64 {
    if moves == 0 {
        return u64::MAX;
    }
    u64::from(estimated_min_moves) * 1_000 / u64::from(moves)
}
