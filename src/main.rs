mod renderer;

use clap::Parser;
use clipboard_rs::{Clipboard, ClipboardContext};
use macroquad::prelude::*;
use ::rand::rngs::StdRng;

use liquid_sort::gameplay::{ControlAction, GameSession};
use liquid_sort::generator::difficulty::DifficultyCurve;
use liquid_sort::generator::{GeneratorOptions, Level, LevelGenerator, ShuffleSeed, reroll_rng};
use liquid_sort::mode::Mode;
use liquid_sort::rules::Move;
use liquid_sort::scores::{BestScore, BestScores, SolveRating, rate_solve};

use crate::renderer::{Button, HitItem, Overlay, Renderer, UiCommand};

/// Liquid color-sort puzzles, generated per level and mode.
#[derive(Parser, Debug)]
#[command(name = "liquid_sort", version)]
struct Cli {
    /// Level to start on.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// normal, quick, strategic, endless or tournament.
    #[arg(long, default_value_t = Mode::Normal)]
    mode: Mode,
    /// Use the slower classic difficulty ramp.
    #[arg(long)]
    classic: bool,
    /// Shuffle layouts from OS entropy instead of the level index.
    #[arg(long)]
    entropy: bool,
    /// Print this many levels as text, starting at --level, and exit.
    #[arg(long, value_name = "COUNT")]
    dump: Option<u32>,
}

impl Cli {
    fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            curve: if self.classic {
                DifficultyCurve::CLASSIC
            } else {
                DifficultyCurve::ENHANCED
            },
            shuffle_seed: if self.entropy {
                ShuffleSeed::Entropy
            } else {
                ShuffleSeed::Derived
            },
        }
    }
}

fn dump_levels(generator: &LevelGenerator, start: u32, count: u32, mode: Mode) {
    let start = start.max(1);
    for level in generator.generate_batch(start..start.saturating_add(count), mode) {
        println!(
            "# level {} {} difficulty {} pattern {} estimate {} {:?}",
            level.index,
            level.mode,
            level.metadata.difficulty,
            level.pattern,
            level.metadata.estimated_min_moves,
            level.metadata.special_tags
        );
        println!("{}\n", level.layout);
    }
}

fn copy_to_clipboard(text: &str) -> bool {
    match ClipboardContext::new() {
        Ok(ctx) => match ctx.set_text(text.to_string()) {
            Ok(()) => true,
            Err(e) => {
                warn!("clipboard write failed: {}", e);
                false
            }
        },
        Err(e) => {
            warn!("clipboard unavailable: {}", e);
            false
        }
    }
}

struct App {
    generator: LevelGenerator,
    session: GameSession,
    scores: BestScores,
    rng: StdRng,
    buttons: Vec<Button>,
    hint: Option<Move>,
    result: Option<(SolveRating, Option<BestScore>)>,
    status: Option<&'static str>,
}

impl App {
    fn new(generator: LevelGenerator, level: u32, mode: Mode) -> Self {
        let first = generator.generate(level, mode);
        let mut buttons = vec![
            Button::new("Undo", UiCommand::Session(ControlAction::Undo), MAGENTA),
            Button::new("Redo", UiCommand::Session(ControlAction::Redo), LIME),
            Button::new("Restart", UiCommand::Session(ControlAction::Restart), PINK),
            Button::new("Pause", UiCommand::Session(ControlAction::TogglePause), DARKGRAY),
            Button::new("Hint", UiCommand::Hint, GOLD),
            Button::new("Copy", UiCommand::CopyLayout, ORANGE),
            Button::new("Next", UiCommand::NextLevel, DARKGREEN),
        ];
        if mode.allows_reroll() {
            buttons.push(Button::new("Reroll", UiCommand::Reroll, PURPLE));
        }
        Self {
            generator,
            session: GameSession::new(first),
            scores: BestScores::new(),
            rng: reroll_rng(),
            buttons,
            hint: None,
            result: None,
            status: None,
        }
    }

    fn load(&mut self, level: Level) {
        info!("loading level {} ({}), pattern {}", level.index, level.mode, level.pattern);
        self.session = GameSession::new(level);
        self.hint = None;
        self.result = None;
        self.status = None;
    }

    fn handle_click(&mut self, x: f32, y: f32, renderer: &Renderer) {
        match renderer.get_hit_test_registry().hit_test(x, y) {
            Some(HitItem::Container { index }) => {
                self.hint = None;
                self.session.select_container(index);
            }
            Some(HitItem::Button { command }) => self.run(command),
            None => self.session.handle_action(ControlAction::Deselect),
        }
    }

    fn handle_keys(&mut self) {
        let bindings = [
            (KeyCode::U, UiCommand::Session(ControlAction::Undo)),
            (KeyCode::Y, UiCommand::Session(ControlAction::Redo)),
            (KeyCode::R, UiCommand::Session(ControlAction::Restart)),
            (KeyCode::P, UiCommand::Session(ControlAction::TogglePause)),
            (KeyCode::Escape, UiCommand::Session(ControlAction::Deselect)),
            (KeyCode::H, UiCommand::Hint),
            (KeyCode::C, UiCommand::CopyLayout),
            (KeyCode::N, UiCommand::NextLevel),
            (KeyCode::E, UiCommand::Reroll),
        ];
        for (key, command) in bindings {
            if is_key_pressed(key) {
                self.run(command);
            }
        }
    }

    fn run(&mut self, command: UiCommand) {
        let mode = self.session.level().mode;
        match command {
            UiCommand::Session(action) => {
                self.hint = None;
                self.session.handle_action(action);
            }
            UiCommand::Hint => {
                self.hint = self.session.hint();
                self.status = if self.hint.is_none() { Some("No moves left") } else { None };
            }
            UiCommand::CopyLayout => {
                let copied = copy_to_clipboard(&self.session.layout().get_text_representation());
                self.status = Some(if copied { "Copied" } else { "Copy failed" });
            }
            UiCommand::NextLevel => {
                let next = self.session.level().index.saturating_add(1);
                let level = self.generator.generate(next, mode);
                self.load(level);
            }
            UiCommand::Reroll if mode.allows_reroll() => {
                let level = self.generator.random_level(mode, &mut self.rng);
                self.load(level);
            }
            UiCommand::Reroll => debug!("reroll is not available in {} mode", mode),
        }
    }

    fn update(&mut self, dt: f32) {
        self.session.update(dt);
        if !self.session.is_won() {
            self.result = None;
        } else if self.result.is_none()
            && let Some(done) = self.session.completion()
        {
            let level = self.session.level();
            let rating = rate_solve(level.metadata.estimated_min_moves, done.moves);
            let score = BestScore {
                moves: done.moves,
                time_seconds: done.time_seconds,
            };
            let (mode, index) = (level.mode, level.index);
            self.scores.record(mode, index, score);
            info!("{} {} stars", rating.label, rating.stars);
            self.result = Some((rating, self.scores.get(mode, index)));
        }
    }
}

async fn run(cli: Cli) {
    let generator = LevelGenerator::new(cli.generator_options());
    let mut app = App::new(generator, cli.level, cli.mode);
    let mut renderer = Renderer::new();
    loop {
        renderer.autoset_viewport();
        let overlay = Overlay {
            hint: app.hint,
            rating: app.result.map(|(rating, _)| rating),
            best: app.result.and_then(|(_, best)| best),
            status: app.status,
        };
        renderer.render_game(&app.session, &app.buttons, &overlay);
        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            app.handle_click(x, y, &renderer);
        }
        app.handle_keys();
        app.update(get_frame_time());
        next_frame().await;
    }
}

fn main() {
    let cli = Cli::parse();
    if let Some(count) = cli.dump {
        let generator = LevelGenerator::new(cli.generator_options());
        dump_levels(&generator, cli.level, count, cli.mode);
        return;
    }
    macroquad::Window::new("Liquid Sort", run(cli));
}
