//! Liquid color-sort puzzles: a deterministic level generator, the pour
//! rules, and a single-player session on top of them.

pub mod gameplay;
pub mod generator;
pub mod mode;
pub mod model;
pub mod rules;
pub mod scores;
pub mod solver;
