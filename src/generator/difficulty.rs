use crate::mode::Mode;

pub const MIN_DIFFICULTY: u32 = 1;
pub const MAX_DIFFICULTY: u32 = 12;

/// Staircase shape of the base difficulty: one rank every `step` levels,
/// never above `ceiling`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DifficultyCurve {
    pub step: u32,
    pub ceiling: u32,
}

impl DifficultyCurve {
    pub const ENHANCED: DifficultyCurve = DifficultyCurve { step: 4, ceiling: 12 };
    pub const CLASSIC: DifficultyCurve = DifficultyCurve { step: 3, ceiling: 10 };
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self::ENHANCED
    }
}

/// Smooth oscillation in {-1, 0, 1} that breaks up the staircase.
pub fn perturbation(level_index: u32) -> i64 {
    (f64::from(level_index) * 0.1).sin().round() as i64
}

/// Difficulty rank in `[MIN_DIFFICULTY, MAX_DIFFICULTY]`. Level 0 is treated
/// as level 1.
pub fn calculate_difficulty(level_index: u32, mode: Mode, curve: DifficultyCurve) -> u32 {
    let level = level_index.max(1);
    let base = ((level - 1) / curve.step.max(1) + 1).min(curve.ceiling);
    let rank = (i64::from(base) + perturbation(level) + mode.difficulty_offset())
        .min(mode.difficulty_cap());
    rank.clamp(i64::from(MIN_DIFFICULTY), i64::from(MAX_DIFFICULTY)) as u32
}

/// Compressed 1-3 star rating shown to the player.
pub fn difficulty_stars(difficulty: u32) -> u8 {
    difficulty.div_ceil(3).clamp(1, 3) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_level_is_easiest() {
        let curve = DifficultyCurve::default();
        assert_eq!(calculate_difficulty(1, Mode::Normal, curve), 1);
        assert_eq!(calculate_difficulty(1, Mode::Quick, curve), 1);
        assert_eq!(calculate_difficulty(1, Mode::Endless, curve), 2);
        assert_eq!(calculate_difficulty(1, Mode::Strategic, curve), 4);
        assert_eq!(calculate_difficulty(0, Mode::Normal, curve), 1);
    }

    #[test]
    fn perturbation_bends_the_staircase() {
        let curve = DifficultyCurve::default();
        // base 2, sin(0.7) rounds up
        assert_eq!(calculate_difficulty(7, Mode::Normal, curve), 3);
        // base 12, sin(4.7) rounds down
        assert_eq!(calculate_difficulty(47, Mode::Normal, curve), 11);
        assert_eq!(calculate_difficulty(7, Mode::Normal, DifficultyCurve::CLASSIC), 4);
    }

    #[test]
    fn tournament_is_capped_lower() {
        let curve = DifficultyCurve::default();
        assert_eq!(calculate_difficulty(100, Mode::Tournament, curve), 10);
        assert_eq!(calculate_difficulty(100, Mode::Endless, curve), 12);
        assert_eq!(calculate_difficulty(100, Mode::Strategic, curve), 12);
    }

    #[test]
    fn always_within_bounds() {
        for curve in [DifficultyCurve::ENHANCED, DifficultyCurve::CLASSIC] {
            for mode in Mode::ALL {
                for level in 1..2_000 {
                    let d = calculate_difficulty(level, mode, curve);
                    assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d));
                    assert_eq!(d, calculate_difficulty(level, mode, curve));
                }
            }
        }
    }

    #[test]
    fn stars_compress_ranks() {
        assert_eq!(difficulty_stars(1), 1);
        assert_eq!(difficulty_stars(3), 1);
        assert_eq!(difficulty_stars(4), 2);
        assert_eq!(difficulty_stars(7), 3);
        assert_eq!(difficulty_stars(12), 3);
    }
}
