use crate::mode::Mode;
use crate::model::DEFAULT_CAPACITY;

use super::pattern::Pattern;

/// Shape of a level before any layer is placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LevelConfig {
    pub color_count: usize,
    pub container_count: usize,
    pub empty_container_count: usize,
    pub layer_capacity: usize,
    pub difficulty: u32,
    pub pattern: Pattern,
}

impl LevelConfig {
    pub fn filled_container_count(&self) -> usize {
        self.container_count - self.empty_container_count
    }
}

/// Derives the level shape from difficulty, then applies pattern and mode
/// adjustments in that order.
pub fn build_config(difficulty: u32, mode: Mode, pattern: Pattern) -> LevelConfig {
    let d = difficulty as usize;
    let mut colors = (4 + d / 2).min(10);
    let mut containers = colors + (3 + d / 3).min(6);
    let mut empties = (containers / 5).max(2);
    let mut capacity = DEFAULT_CAPACITY;

    match pattern {
        Pattern::Rainbow => {
            colors = (colors + 2).min(12);
            containers += 2;
            empties = empties.max(3);
        }
        Pattern::Spiral => {
            capacity = (capacity + 1).min(5);
            empties = empties.saturating_sub(1).max(2);
        }
        Pattern::Mirror => containers = containers.max(8),
        Pattern::Clustered => {
            colors = colors.saturating_sub(1).max(3);
            empties = (empties + 1).max(3);
        }
        Pattern::Alternating | Pattern::Gradient | Pattern::Symmetrical => {}
    }

    match mode {
        Mode::Quick => {
            empties = (empties + 1).max(3);
            colors = colors.saturating_sub(1).max(3);
        }
        Mode::Strategic => {
            empties = empties.saturating_sub(1).max(2);
            capacity = (capacity + d / 4).min(6);
        }
        Mode::Normal | Mode::Endless | Mode::Tournament => {}
    }

    // every color needs a filled container's worth of room
    containers = containers.max(colors + empties);

    // mirrored halves need an even filled count; mirror also keeps an even
    // container count, so its empties go even first
    if pattern == Pattern::Mirror {
        empties += empties % 2;
        containers = containers.max(colors + empties);
        containers += containers % 2;
    }
    if matches!(pattern, Pattern::Mirror | Pattern::Symmetrical) {
        containers += (containers - empties) % 2;
    }

    LevelConfig {
        color_count: colors,
        container_count: containers,
        empty_container_count: empties,
        layer_capacity: capacity,
        difficulty,
        pattern,
    }
}
