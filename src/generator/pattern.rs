use std::fmt;

use rand::Rng;

use super::level_rng;

/// Layout strategy used to place the colored layers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    Alternating,
    Gradient,
    Clustered,
    Rainbow,
    Mirror,
    Spiral,
    Symmetrical,
}

impl Pattern {
    pub const ALL: [Pattern; 7] = [
        Pattern::Alternating,
        Pattern::Gradient,
        Pattern::Clustered,
        Pattern::Rainbow,
        Pattern::Mirror,
        Pattern::Spiral,
        Pattern::Symmetrical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Alternating => "alternating",
            Pattern::Gradient => "gradient",
            Pattern::Clustered => "clustered",
            Pattern::Rainbow => "rainbow",
            Pattern::Mirror => "mirror",
            Pattern::Spiral => "spiral",
            Pattern::Symmetrical => "symmetrical",
        }
    }

    /// Descriptive tags shown alongside a level.
    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Pattern::Rainbow => &["Rainbow Pattern", "Multiple Colors"],
            Pattern::Spiral => &["Spiral Arrangement", "Complex Layout"],
            Pattern::Mirror => &["Mirror Symmetry", "Balanced Design"],
            Pattern::Clustered => &["Color Clusters", "Strategic Challenge"],
            Pattern::Alternating | Pattern::Gradient | Pattern::Symmetrical => &[],
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const PATTERN_SALT: u64 = 0x7061_7474;

/// Selection weights for every pattern, in `Pattern::ALL` order.
pub fn pattern_weights(level_index: u32, difficulty: u32) -> [(Pattern, u32); 7] {
    let mut weights = [
        (Pattern::Alternating, if difficulty < 4 { 30 } else { 15 }),
        (Pattern::Gradient, if difficulty < 6 { 20 } else { 25 }),
        (Pattern::Clustered, 20),
        (Pattern::Rainbow, if difficulty > 5 { 15 } else { 5 }),
        (Pattern::Mirror, if difficulty > 7 { 15 } else { 5 }),
        (Pattern::Spiral, if difficulty > 8 { 10 } else { 2 }),
        (Pattern::Symmetrical, if difficulty > 6 { 15 } else { 8 }),
    ];

    // milestone levels
    let boosts = [(10, Pattern::Rainbow, 20), (7, Pattern::Spiral, 15), (5, Pattern::Mirror, 10)];
    for (every, pattern, bonus) in boosts {
        if level_index % every == 0 {
            if let Some(entry) = weights.iter_mut().find(|(p, _)| *p == pattern) {
                entry.1 += bonus;
            }
        }
    }
    weights
}

/// Picks the pattern whose cumulative weight first reaches `draw * total`.
/// `draw` is a unit value in `[0, 1)`.
pub fn pick_weighted(weights: &[(Pattern, u32)], draw: f64) -> Pattern {
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let target = draw * f64::from(total);
    let mut cumulative = 0.0;
    for (pattern, weight) in weights {
        cumulative += f64::from(*weight);
        if target <= cumulative {
            return *pattern;
        }
    }
    Pattern::Alternating
}

/// Reproducible pattern choice: the draw comes from an RNG seeded only by the
/// level index.
pub fn select_pattern(level_index: u32, difficulty: u32) -> Pattern {
    let draw: f64 = level_rng(level_index, PATTERN_SALT).random();
    pick_weighted(&pattern_weights(level_index, difficulty), draw)
}
