use std::{collections::HashMap, sync::Mutex};

use macroquad::prelude::*;

use liquid_sort::gameplay::{ControlAction, GameSession};
use liquid_sort::model::{Color as Liquid, Container};
use liquid_sort::rules::Move;
use liquid_sort::scores::{BestScore, SolveRating};

const MAX_COLUMNS: usize = 7;
const SPACING: f32 = 10.0;

pub fn liquid_color(liquid: Liquid) -> Color {
    match liquid {
        Liquid::Red => Color::new(1.0, 0.0, 0.0, 1.0),
        Liquid::Blue => Color::new(0.0, 0.0, 1.0, 1.0),
        Liquid::Green => Color::new(0.0, 0.5, 0.0, 1.0),
        Liquid::Yellow => Color::new(1.0, 1.0, 0.0, 1.0),
        Liquid::Purple => Color::new(0.627, 0.125, 0.941, 1.0),
        Liquid::Orange => Color::new(1.0, 0.647, 0.0, 1.0),
        Liquid::Cyan => Color::new(0.0, 1.0, 1.0, 1.0),
        Liquid::Pink => Color::new(1.0, 0.752, 0.796, 1.0),
        Liquid::Brown => Color::new(0.647, 0.164, 0.164, 1.0),
        Liquid::Lime => Color::new(0.0, 1.0, 0.0, 1.0),
        Liquid::Magenta => Color::new(1.0, 0.0, 1.0, 1.0),
        Liquid::Indigo => Color::new(0.294, 0.0, 0.509, 1.0),
        Liquid::Maroon => Color::new(0.5, 0.0, 0.0, 1.0),
        Liquid::Navy => Color::new(0.0, 0.0, 0.5, 1.0),
        Liquid::Olive => Color::new(0.5, 0.5, 0.0, 1.0),
        Liquid::Teal => Color::new(0.0, 0.5, 0.5, 1.0),
        Liquid::Silver => Color::new(0.75, 0.75, 0.75, 1.0),
        Liquid::Coral => Color::new(1.0, 0.498, 0.313, 1.0),
        Liquid::Crimson => Color::new(0.862, 0.078, 0.235, 1.0),
        Liquid::Gold => Color::new(1.0, 0.843, 0.0, 1.0),
        Liquid::Plum => Color::new(0.866, 0.627, 0.866, 1.0),
        Liquid::Turquoise => Color::new(0.250, 0.878, 0.815, 1.0),
    }
}

/// What a button press or key asks the shell to do.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Session(ControlAction),
    Hint,
    CopyLayout,
    NextLevel,
    Reroll,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Button {
    label: &'static str,
    command: UiCommand,
    color: Color,
}

impl Button {
    pub fn new(label: &'static str, command: UiCommand, color: Color) -> Self {
        Self { label, command, color }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HitItem {
    Button { command: UiCommand },
    Container { index: usize },
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct HitRecord {
    rect: Rect,
    item: HitItem,
}

/// Clickable regions of the last frame, in draw order.
#[derive(Default)]
pub struct HitTestRegistry {
    items: Vec<HitRecord>,
}

impl HitTestRegistry {
    fn clear(&mut self) {
        self.items.clear();
    }

    fn push(&mut self, rect: Rect, item: HitItem) {
        self.items.push(HitRecord { rect, item });
    }

    /// Topmost item under the point; the last drawn wins.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<HitItem> {
        self.items
            .iter()
            .rev()
            .find(|r| r.rect.contains(vec2(x, y)))
            .map(|r| r.item)
    }
}

/// Font size and centering offsets that fit a label into a rect. Glyph
/// measurements at the reference size are cached per label.
struct TextFitter {
    measured: Mutex<HashMap<String, (f32, f32)>>,
}

impl TextFitter {
    const REFERENCE_SIZE: u16 = 100;

    fn new() -> Self {
        Self {
            measured: Mutex::new(HashMap::new()),
        }
    }

    fn fit(&self, text: &str, rect: Rect) -> (f32, f32, f32) {
        let cached = self.measured.lock().ok().and_then(|cache| cache.get(text).copied());
        let (w, h) = cached.unwrap_or_else(|| {
            let dims = measure_text(text, None, Self::REFERENCE_SIZE, 1.0);
            if let Ok(mut cache) = self.measured.lock() {
                cache.insert(text.to_string(), (dims.width, dims.height));
            }
            (dims.width, dims.height)
        });
        if w <= 0.0 || h <= 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let scale = (rect.w / w).min(rect.h / h);
        let size = Self::REFERENCE_SIZE as f32 * scale;
        // draw_text anchors at the baseline
        (size, (rect.w - w * scale) / 2.0, (rect.h + h * scale) / 2.0)
    }
}

/// Everything the HUD shows besides the board.
pub struct Overlay<'a> {
    pub hint: Option<Move>,
    pub rating: Option<SolveRating>,
    pub best: Option<BestScore>,
    pub status: Option<&'a str>,
}

pub struct Renderer {
    text: TextFitter,
    hit_test: HitTestRegistry,
    viewport: Rect,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            text: TextFitter::new(),
            hit_test: HitTestRegistry::default(),
            viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
        }
    }

    pub fn get_hit_test_registry(&self) -> &HitTestRegistry {
        &self.hit_test
    }

    pub fn autoset_viewport(&mut self) {
        self.viewport = Rect::new(0.0, 0.0, screen_width(), screen_height());
    }

    pub fn render_game(&mut self, session: &GameSession, buttons: &[Button], overlay: &Overlay) {
        self.hit_test.clear();
        clear_background(Color::new(0.08, 0.08, 0.12, 1.0));

        let Rect { x, y, w, h } = self.viewport;
        let hud_height = h * 0.08;
        let button_height = h * 0.1;
        let board_height = h - hud_height - button_height - 2.0 * SPACING;

        self.render_hud(session, overlay, Rect::new(x, y, w, hud_height));
        self.render_button_lineup(buttons, Rect::new(x, y + hud_height + SPACING, w, button_height));
        let board = Rect::new(x, y + hud_height + button_height + 2.0 * SPACING, w, board_height);
        self.render_container_grid(session, overlay.hint, board);

        if session.is_won() {
            self.render_victory(session, overlay, board);
        } else if session.is_paused() {
            self.render_banner("Paused", board);
        }
    }

    fn render_text(&self, text: &str, rect: Rect, color: Color) {
        let (size, dx, dy) = self.text.fit(text, rect);
        draw_text(text, rect.x + dx, rect.y + dy, size, color);
    }

    fn render_hud(&self, session: &GameSession, overlay: &Overlay, rect: Rect) {
        let level = session.level();
        let stars = "*".repeat(level.difficulty_stars as usize);
        let mut line = format!(
            "Level {} [{}] {} {}  Moves {}  Time {:.0}s",
            level.index,
            level.mode,
            level.pattern,
            stars,
            session.moves(),
            session.elapsed_seconds()
        );
        if let Some(status) = overlay.status {
            line.push_str("  ");
            line.push_str(status);
        }
        self.render_text(&line, rect, WHITE);
    }

    fn render_button_lineup(&mut self, buttons: &[Button], rect: Rect) {
        if buttons.is_empty() {
            return;
        }
        let count = buttons.len() as f32;
        let width = (rect.w - SPACING * (count - 1.0)) / count;
        for (i, button) in buttons.iter().enumerate() {
            let button_rect = Rect::new(rect.x + i as f32 * (width + SPACING), rect.y, width, rect.h);
            self.hit_test.push(button_rect, HitItem::Button { command: button.command });
            draw_rectangle(button_rect.x, button_rect.y, button_rect.w, button_rect.h, button.color);
            draw_rectangle_lines(button_rect.x, button_rect.y, button_rect.w, button_rect.h, 2.0, BLACK);
            self.render_text(button.label, button_rect, WHITE);
        }
    }

    fn render_container_grid(&mut self, session: &GameSession, hint: Option<Move>, rect: Rect) {
        let containers = session.layout().get_containers();
        if containers.is_empty() {
            return;
        }
        let columns = containers.len().min(MAX_COLUMNS);
        let rows = containers.len().div_ceil(columns);
        let width = (rect.w - SPACING * (columns as f32 - 1.0)) / columns as f32;
        let height = (rect.h - SPACING * (rows as f32 - 1.0)) / rows as f32;
        let pending = session.pending_pour();

        for (index, container) in containers.iter().enumerate() {
            let (row, column) = (index / columns, index % columns);
            let cell = Rect::new(
                rect.x + column as f32 * (width + SPACING),
                rect.y + row as f32 * (height + SPACING),
                width,
                height,
            );
            self.render_container(container, index, cell);
            let outline = if session.selected() == Some(index) {
                Some(WHITE)
            } else if pending.is_some_and(|p| p.from == index || p.to == index) {
                Some(SKYBLUE)
            } else if hint.is_some_and(|m| m.from == index || m.to == index) {
                Some(GOLD)
            } else {
                None
            };
            if let Some(color) = outline {
                draw_rectangle_lines(cell.x, cell.y, cell.w, cell.h, 4.0, color);
            }
        }
    }

    fn render_container(&mut self, container: &Container, index: usize, rect: Rect) {
        self.hit_test.push(rect, HitItem::Container { index });
        let layer_height = rect.h / container.get_capacity().max(1) as f32;
        for (i, liquid) in container.get_layers().iter().enumerate() {
            let layer_y = rect.y + rect.h - (i as f32 + 1.0) * layer_height;
            draw_rectangle(rect.x, layer_y, rect.w, layer_height, liquid_color(*liquid));
            draw_rectangle_lines(rect.x, layer_y, rect.w, layer_height, 1.0, BLACK);
        }
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 3.0, GRAY);
    }

    fn render_banner(&self, text: &str, board: Rect) {
        let banner = Rect::new(board.x + board.w * 0.2, board.y + board.h * 0.35, board.w * 0.6, board.h * 0.3);
        draw_rectangle(banner.x, banner.y, banner.w, banner.h, Color::new(0.0, 0.0, 0.0, 0.8));
        self.render_text(text, banner, WHITE);
    }

    fn render_victory(&self, session: &GameSession, overlay: &Overlay, board: Rect) {
        let Some(rating) = overlay.rating else {
            self.render_banner("Solved!", board);
            return;
        };
        let mut text = format!(
            "{} {} in {} moves",
            rating.label,
            "*".repeat(rating.stars as usize),
            session.moves()
        );
        if let Some(best) = overlay.best {
            text.push_str(&format!(" (best {} moves, {}s)", best.moves, best.time_seconds));
        }
        self.render_banner(&text, board);
    }
}
