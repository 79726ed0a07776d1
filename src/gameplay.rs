use macroquad::prelude::{debug, info};

use crate::generator::Level;
use crate::model::Layout;
use crate::rules::{self, Move};
use crate::solver;

/// Seconds between accepting a pour and committing it.
pub const POUR_DELAY_SECONDS: f32 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlAction {
    SelectContainer(usize),
    Deselect,
    PourInto(usize, usize),
    Undo,
    Redo,
    Restart,
    Pause,
    Resume,
    TogglePause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    None,
    Container(usize),
}

/// A pour that has been accepted and is waiting out its animation delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPour {
    pub from: usize,
    pub to: usize,
    pub remaining: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    layout: Layout,
    moves: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub moves: u32,
    pub time_seconds: u32,
}

/// Single-player state machine over a working copy of a level's layout.
pub struct GameSession {
    level: Level,
    layout: Layout,
    selected: Selection,
    pending: Option<PendingPour>,
    pour_delay: f32,
    moves: u32,
    elapsed: f32,
    paused: bool,
    won: bool,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl GameSession {
    pub fn new(level: Level) -> Self {
        let layout = level.layout.clone();
        Self {
            level,
            layout,
            selected: Selection::None,
            pending: None,
            pour_delay: POUR_DELAY_SECONDS,
            moves: 0,
            elapsed: 0.0,
            paused: false,
            won: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Overrides the pour delay; zero commits pours immediately.
    pub fn with_pour_delay(mut self, seconds: f32) -> Self {
        self.pour_delay = seconds.max(0.0);
        self
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn selected(&self) -> Option<usize> {
        match self.selected {
            Selection::Container(index) => Some(index),
            Selection::None => None,
        }
    }

    pub fn pending_pour(&self) -> Option<PendingPour> {
        self.pending
    }

    pub fn can_undo(&self) -> bool {
        self.pending.is_none() && !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.pending.is_none() && !self.redo_stack.is_empty()
    }

    pub fn completion(&self) -> Option<Completion> {
        self.won.then(|| Completion {
            moves: self.moves,
            time_seconds: self.elapsed.floor() as u32,
        })
    }

    pub fn handle_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::SelectContainer(index) => self.select_container(index),
            ControlAction::Deselect => self.selected = Selection::None,
            ControlAction::PourInto(from, to) => {
                self.request_pour(from, to);
            }
            ControlAction::Undo => {
                self.undo();
            }
            ControlAction::Redo => {
                self.redo();
            }
            ControlAction::Restart => self.restart(),
            ControlAction::Pause => self.paused = true,
            ControlAction::Resume => self.paused = false,
            ControlAction::TogglePause => self.paused = !self.paused,
        }
    }

    /// Click semantics: the first click picks a non-empty source, a second
    /// click on the same container drops the selection, a click elsewhere
    /// requests a pour.
    pub fn select_container(&mut self, index: usize) {
        if self.paused || self.won || self.pending.is_some() {
            return;
        }
        match self.selected {
            Selection::None => {
                if self.layout.container(index).is_some_and(|c| !c.is_empty()) {
                    self.selected = Selection::Container(index);
                }
            }
            Selection::Container(from) if from == index => self.selected = Selection::None,
            Selection::Container(from) => {
                self.request_pour(from, index);
            }
        }
    }

    /// Accepts a legal pour and starts its delay. Illegal requests, and any
    /// request while paused, won or mid-pour, are dropped. The selection is
    /// cleared either way.
    pub fn request_pour(&mut self, from: usize, to: usize) -> bool {
        if self.paused || self.won || self.pending.is_some() {
            return false;
        }
        self.selected = Selection::None;
        if !rules::can_pour_at(&self.layout, from, to) {
            debug!("rejected pour {} -> {}", from, to);
            return false;
        }
        self.push_undo_state();
        self.pending = Some(PendingPour {
            from,
            to,
            remaining: self.pour_delay,
        });
        if self.pour_delay <= 0.0 {
            self.commit_pending();
        }
        true
    }

    /// Advances the clock. Time only accrues while unpaused and unsolved; a
    /// pending pour still lands while paused.
    pub fn update(&mut self, dt: f32) {
        if !self.paused && !self.won {
            self.elapsed += dt;
        }
        if let Some(pending) = &mut self.pending {
            pending.remaining -= dt;
            if pending.remaining <= 0.0 {
                self.commit_pending();
            }
        }
    }

    fn commit_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let moved = rules::apply_pour(&mut self.layout, pending.from, pending.to);
        self.moves += 1;
        debug!("poured {} layers {} -> {}", moved, pending.from, pending.to);
        if rules::is_solved(&self.layout) {
            self.won = true;
            info!(
                "level {} ({}) solved in {} moves, {:.1}s",
                self.level.index, self.level.mode, self.moves, self.elapsed
            );
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            layout: self.layout.clone(),
            moves: self.moves,
        }
    }

    fn push_undo_state(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.layout = snapshot.layout;
        self.moves = snapshot.moves;
        self.selected = Selection::None;
        self.won = rules::is_solved(&self.layout);
    }

    pub fn undo(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        match self.undo_stack.pop() {
            Some(previous) => {
                self.redo_stack.push(self.snapshot());
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(self.snapshot());
                self.restore(next);
                true
            }
            None => false,
        }
    }

    /// Discards the working layout and history and starts over from a fresh
    /// copy of the generated level.
    pub fn restart(&mut self) {
        self.layout = self.level.layout.clone();
        self.selected = Selection::None;
        self.pending = None;
        self.moves = 0;
        self.elapsed = 0.0;
        self.paused = false;
        self.won = false;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn hint(&self) -> Option<Move> {
        if self.won {
            return None;
        }
        solver::hint(&self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{LevelMetadata, generate_level, pattern::Pattern, repair::RepairReport};
    use crate::mode::Mode;
    use crate::model::Color::*;

    fn session_for(layout: Layout) -> GameSession {
        let level = Level {
            index: 1,
            mode: Mode::Normal,
            difficulty_stars: 1,
            pattern: Pattern::Alternating,
            metadata: LevelMetadata {
                color_count: layout.colors().len(),
                container_count: layout.len(),
                empty_container_count: layout.empty_container_count(),
                planned_empty_container_count: layout.empty_container_count(),
                layer_capacity: 4,
                difficulty: 1,
                estimated_min_moves: 8,
                special_tags: Vec::new(),
            },
            layout,
            repair: RepairReport::default(),
        };
        GameSession::new(level)
    }

    fn two_color_session() -> GameSession {
        session_for(Layout::from_colors(
            4,
            &[&[Red, Red, Blue, Blue], &[Blue, Blue, Red, Red], &[], &[]],
        ))
    }

    #[test]
    fn pour_commits_after_delay() {
        let mut session = two_color_session();
        assert!(session.request_pour(0, 2));
        assert_eq!(session.layout().get_containers()[0].len(), 4);
        session.update(POUR_DELAY_SECONDS / 2.0);
        assert!(session.pending_pour().is_some());
        assert!(!session.request_pour(1, 3), "no second pour while pouring");
        session.update(POUR_DELAY_SECONDS);
        assert!(session.pending_pour().is_none());
        assert_eq!(session.layout().get_containers()[2].get_layers(), &[Blue, Blue]);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn undo_restores_layout_and_counter() {
        let mut session = two_color_session().with_pour_delay(0.0);
        let before = session.layout().clone();
        assert!(session.request_pour(0, 2));
        assert_eq!(session.moves(), 1);
        assert!(session.undo());
        assert_eq!(session.layout(), &before);
        assert_eq!(session.moves(), 0);
        assert!(session.redo());
        assert_eq!(session.moves(), 1);
        assert!(!session.redo());
    }

    #[test]
    fn illegal_pour_clears_selection_silently() {
        let mut session = two_color_session().with_pour_delay(0.0);
        session.select_container(0);
        assert_eq!(session.selected(), Some(0));
        session.select_container(1);
        assert_eq!(session.selected(), None);
        assert_eq!(session.moves(), 0);
        assert!(!session.can_undo());
    }

    #[test]
    fn empty_container_cannot_be_selected() {
        let mut session = two_color_session();
        session.select_container(2);
        assert_eq!(session.selected(), None);
        session.select_container(0);
        session.select_container(0);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn pause_stops_clock_and_rejects_pours() {
        let mut session = two_color_session();
        session.update(1.0);
        session.handle_action(ControlAction::Pause);
        session.update(5.0);
        assert_eq!(session.elapsed_seconds(), 1.0);
        assert!(!session.request_pour(0, 2));
        session.handle_action(ControlAction::Resume);
        assert!(session.request_pour(0, 2));
    }

    #[test]
    fn pending_pour_lands_while_paused() {
        let mut session = two_color_session();
        assert!(session.request_pour(0, 2));
        session.handle_action(ControlAction::Pause);
        session.update(POUR_DELAY_SECONDS);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn solving_reports_completion() {
        let mut session = two_color_session().with_pour_delay(0.0);
        for (from, to) in [(0, 2), (1, 3), (3, 0), (2, 1)] {
            assert!(session.request_pour(from, to), "pour {from} -> {to}");
        }
        session.update(3.0);
        assert!(session.is_won());
        assert_eq!(session.completion(), Some(Completion { moves: 4, time_seconds: 0 }));
        assert!(!session.request_pour(0, 2));
    }

    #[test]
    fn restart_rederives_a_fresh_copy() {
        let level = generate_level(4, Mode::Normal);
        let mut session = GameSession::new(level.clone()).with_pour_delay(0.0);
        if let Some(first) = rules::legal_moves(session.layout()).first() {
            assert!(session.request_pour(first.from, first.to));
        }
        session.update(2.0);
        session.restart();
        assert_eq!(session.layout(), &level.layout);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.elapsed_seconds(), 0.0);
        assert!(!session.can_undo());
        assert_eq!(session.level(), &level);
    }
}
