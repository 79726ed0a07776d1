//! Level generation pipeline:
//! level index and mode -> difficulty -> pattern -> config -> raw layout ->
//! repaired layout -> rating -> [`Level`].
//!
//! Generation is a pure function of its inputs (with the default
//! [`ShuffleSeed::Derived`]), so unrelated levels can be produced in
//! parallel without coordination.

pub mod config;
pub mod difficulty;
pub mod estimate;
pub mod layouts;
pub mod pattern;
pub mod repair;

use std::ops::Range;

use macroquad::prelude::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::mode::Mode;
use crate::model::{Color, Layout};

use self::config::{LevelConfig, build_config};
use self::difficulty::{DifficultyCurve, calculate_difficulty, difficulty_stars};
use self::estimate::estimate_min_moves;
use self::layouts::build_layout;
use self::pattern::{Pattern, select_pattern};
use self::repair::{RepairReport, repair_layout};

/// Highest level index an endless reroll picks.
pub const REROLL_MAX_LEVEL: u32 = 1_000;

const COLOR_SALT: u64 = 0x636f_6c6f;
const SHUFFLE_SALT: u64 = 0x7368_7566;

/// RNG seeded from a level index and a per-use salt.
pub(crate) fn level_rng(level_index: u32, salt: u64) -> StdRng {
    StdRng::seed_from_u64(u64::from(level_index).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt)
}

/// Where the layout shuffle draws its randomness from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ShuffleSeed {
    /// Seeded from level index and mode: the whole level is reproducible.
    #[default]
    Derived,
    /// Fresh OS entropy on every call, for replay variety.
    Entropy,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct GeneratorOptions {
    pub curve: DifficultyCurve,
    pub shuffle_seed: ShuffleSeed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelMetadata {
    pub color_count: usize,
    pub container_count: usize,
    /// Empty containers in the emitted layout, after repair.
    pub empty_container_count: usize,
    /// Empty containers the config reserved before repair relocated layers.
    pub planned_empty_container_count: usize,
    pub layer_capacity: usize,
    pub difficulty: u32,
    pub estimated_min_moves: u32,
    pub special_tags: Vec<&'static str>,
}

/// A generated puzzle. Immutable once built; gameplay works on a copy of
/// `layout`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub index: u32,
    pub mode: Mode,
    pub difficulty_stars: u8,
    pub pattern: Pattern,
    pub layout: Layout,
    pub metadata: LevelMetadata,
    pub repair: RepairReport,
}

/// Tags describing the pattern and, at high ranks, the challenge level.
pub fn special_tags(pattern: Pattern, difficulty: u32) -> Vec<&'static str> {
    let mut tags = pattern.tags().to_vec();
    if difficulty > 8 {
        tags.push("Expert Level");
    }
    if difficulty > 10 {
        tags.push("Master Challenge");
    }
    tags
}

/// The first `count` colors of the catalog after a shuffle seeded by the
/// level index.
pub fn select_colors(count: usize, level_index: u32) -> Vec<Color> {
    let mut colors = Color::ALL.to_vec();
    colors.shuffle(&mut level_rng(level_index, COLOR_SALT));
    colors.truncate(count);
    colors
}

#[derive(Clone, Debug, Default)]
pub struct LevelGenerator {
    options: GeneratorOptions,
}

impl LevelGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn config_for(&self, level_index: u32, mode: Mode) -> LevelConfig {
        let level = level_index.max(1);
        let difficulty = calculate_difficulty(level, mode, self.options.curve);
        let pattern = select_pattern(level, difficulty);
        build_config(difficulty, mode, pattern)
    }

    pub fn generate(&self, level_index: u32, mode: Mode) -> Level {
        let index = level_index.max(1);
        let config = self.config_for(index, mode);
        debug!(
            "level {} ({}): difficulty {}, pattern {}, {} colors in {} containers ({} empty), capacity {}",
            index,
            mode,
            config.difficulty,
            config.pattern,
            config.color_count,
            config.container_count,
            config.empty_container_count,
            config.layer_capacity
        );

        let colors = select_colors(config.color_count, index);
        let mut rng = match self.options.shuffle_seed {
            ShuffleSeed::Derived => level_rng(index, SHUFFLE_SALT ^ ((mode as u64) << 32)),
            ShuffleSeed::Entropy => StdRng::from_os_rng(),
        };
        let mut layout = build_layout(&colors, &config, &mut rng);
        let repair = repair_layout(&mut layout);
        if !repair.is_satisfied() {
            warn!(
                "level {} ({}) left partially repaired, {} of {} empty containers left: {:?}",
                index,
                mode,
                layout.empty_container_count(),
                config.empty_container_count,
                repair
            );
        }

        let metadata = LevelMetadata {
            color_count: config.color_count,
            container_count: config.container_count,
            empty_container_count: layout.empty_container_count(),
            planned_empty_container_count: config.empty_container_count,
            layer_capacity: config.layer_capacity,
            difficulty: config.difficulty,
            estimated_min_moves: estimate_min_moves(&layout, config.difficulty),
            special_tags: special_tags(config.pattern, config.difficulty),
        };
        Level {
            index,
            mode,
            difficulty_stars: difficulty_stars(config.difficulty),
            pattern: config.pattern,
            layout,
            metadata,
            repair,
        }
    }

    /// Generates every level in `levels` in parallel, in index order.
    pub fn generate_batch(&self, levels: Range<u32>, mode: Mode) -> Vec<Level> {
        levels
            .into_par_iter()
            .map(|index| self.generate(index, mode))
            .collect()
    }

    /// Endless-style reroll: a random level index drawn from `rng`.
    pub fn random_level<R: Rng + ?Sized>(&self, mode: Mode, rng: &mut R) -> Level {
        self.generate(rng.random_range(1..=REROLL_MAX_LEVEL), mode)
    }
}

/// OS-seeded RNG for [`LevelGenerator::random_level`].
pub fn reroll_rng() -> StdRng {
    StdRng::from_os_rng()
}

/// Generates a level with the default options.
pub fn generate_level(level_index: u32, mode: Mode) -> Level {
    LevelGenerator::default().generate(level_index, mode)
}
