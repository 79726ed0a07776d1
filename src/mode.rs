use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Named ruleset that modulates how a level is derived.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Mode {
    #[default]
    Normal,
    Quick,
    Strategic,
    Endless,
    Tournament,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Normal,
        Mode::Quick,
        Mode::Strategic,
        Mode::Endless,
        Mode::Tournament,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Quick => "quick",
            Mode::Strategic => "strategic",
            Mode::Endless => "endless",
            Mode::Tournament => "tournament",
        }
    }

    /// Additive difficulty offset applied after the base curve.
    pub fn difficulty_offset(self) -> i64 {
        match self {
            Mode::Normal => 0,
            Mode::Quick => -2,
            Mode::Strategic => 3,
            Mode::Endless => 1,
            Mode::Tournament => 2,
        }
    }

    /// Upper bound on the difficulty rank after the offset.
    pub fn difficulty_cap(self) -> i64 {
        match self {
            Mode::Tournament => 10,
            _ => 12,
        }
    }

    /// Modes that offer a random level after a win.
    pub fn allows_reroll(self) -> bool {
        matches!(self, Mode::Quick | Mode::Endless)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game mode {0:?} (expected normal, quick, strategic, endless or tournament)")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}
