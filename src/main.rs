// SPDX-License-Identifier: MIT
//
// marlin-light: a single-screen soft light for the terminal.
//
// This is the main binary that wires together all the crates:
//
//   marlin-term     -> terminal control, frame surface, input, event loop
//   marlin-palette  -> HSB color model, preset palette generation
//   marlin-settings -> persisted {hue, saturation, brightness}
//
// The Lamp struct implements marlin-term's App trait, connecting the
// event loop to the application state. Each keypress flows through:
//
//   stdin -> parser -> on_key -> popover events -> settings mutation
//   paint -> background fill + caption + popover -> surface -> terminal
//
// Layout:
//
//   +--------------------------------------+
//   |                                      |
//   |            Marlin Light              |  <- dim caption
//   |                                      |
//   |                   +---------------+  |
//   |                   | COLOR         |  |
//   |                   | [][][][]  x4  |  |  <- settings popover
//   |                   | BRIGHTNESS    |  |     (toggled with `s`)
//   |                   | =========---- |  |
//   |                   +---------------+  |
//   |                    s: settings  q: quit
//   +--------------------------------------+
//
// Settings lifecycle is explicit: loaded once in main, saved when the
// user confirms a change (a preset is chosen, or a brightness
// adjustment run ends). Nothing global, nothing implicit.

use std::env;
use std::path::PathBuf;
use std::process;

use marlin_palette::{Hsb, Palette};
use marlin_settings::Settings;
use marlin_term::color::{CellColor, Rgb};
use marlin_term::event_loop::{Action, App, EventLoop};
use marlin_term::input::{KeyCode, KeyEvent, Modifiers};
use marlin_term::surface::{Attr, Surface};

// ─── Palette configuration ──────────────────────────────────────────────────

/// Number of presets in the color grid.
const PALETTE_SIZE: usize = 16;

/// Swatch grid columns (and rows: the grid is square).
const GRID_COLS: usize = 4;

/// Lowest brightness the popover offers. The screen is a light; letting
/// it go fully dark would just look broken.
const MIN_BRIGHTNESS: u8 = 50;

/// Brightness change per adjustment keypress.
const BRIGHTNESS_STEP: u8 = 5;

// ─── Popover geometry (cells) ───────────────────────────────────────────────

const SWATCH_W: u16 = 4;
const SWATCH_H: u16 = 2;
/// Gap between swatches, horizontally and vertically.
const SWATCH_GAP: u16 = 1;
/// Inner content width: 4 swatches and 3 gaps.
const CONTENT_W: u16 = GRID_COLS as u16 * SWATCH_W + (GRID_COLS as u16 - 1) * SWATCH_GAP;
/// Horizontal padding inside the popover, each side.
const PAD_X: u16 = 2;
const POPOVER_W: u16 = CONTENT_W + 2 * PAD_X;
/// Rows: pad, label, gap, 4 swatch rows with gaps, gap, label, gap, gauge, pad.
const POPOVER_H: u16 = 1
    + 1
    + 1
    + (GRID_COLS as u16 * (SWATCH_H + SWATCH_GAP) - SWATCH_GAP)
    + 1
    + 1
    + 1
    + 1
    + 1;

// ─── Settings popover ───────────────────────────────────────────────────────

/// What the popover tells the application it did.
///
/// The popover knows nothing about settings, persistence, or the
/// terminal; it owns selection state and reports user intent. The
/// application interprets these events and mutates its own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopoverEvent {
    /// The user committed the preset at this palette index.
    PresetChosen(usize),
    /// The brightness control moved. `adjusting` is true while the user
    /// is still mid-run; the run's final value arrives with false.
    BrightnessChanged { value: u8, adjusting: bool },
    /// The popover asked to be closed.
    Dismissed,
}

/// Which control inside the popover has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Grid,
    Gauge,
}

/// The settings popover: a swatch grid and a brightness gauge.
#[derive(Debug)]
struct SettingsPopover {
    /// Selected swatch, `0..PALETTE_SIZE`.
    selected: usize,
    /// Current brightness shown on the gauge.
    brightness: u8,
    /// Focused control.
    focus: Focus,
    /// A brightness adjustment run is open (not yet committed).
    adjusting: bool,
}

impl SettingsPopover {
    fn new(brightness: u8) -> Self {
        Self {
            selected: 0,
            brightness: brightness.max(MIN_BRIGHTNESS),
            focus: Focus::Grid,
            adjusting: false,
        }
    }

    /// The committed value closing an open adjustment run, if any.
    fn take_pending_brightness(&mut self) -> Option<u8> {
        self.adjusting.then(|| {
            self.adjusting = false;
            self.brightness
        })
    }

    /// Interpret a key press into popover events.
    fn handle_key(&mut self, key: &KeyEvent) -> Vec<PopoverEvent> {
        match key.code {
            KeyCode::Escape => self.dismiss(),
            KeyCode::Char('+' | '=') => self.adjust(i16::from(BRIGHTNESS_STEP)),
            KeyCode::Char('-' | '_') => self.adjust(-i16::from(BRIGHTNESS_STEP)),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Grid => Focus::Gauge,
                    Focus::Gauge => Focus::Grid,
                };
                Vec::new()
            }
            KeyCode::Up => self.move_up(),
            KeyCode::Down => self.move_down(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Enter => self.activate(),
            _ => Vec::new(),
        }
    }

    fn dismiss(&mut self) -> Vec<PopoverEvent> {
        let mut events = self.commit_adjustment();
        events.push(PopoverEvent::Dismissed);
        events
    }

    /// Close an open adjustment run, emitting its final value.
    fn commit_adjustment(&mut self) -> Vec<PopoverEvent> {
        self.take_pending_brightness()
            .map(|value| PopoverEvent::BrightnessChanged {
                value,
                adjusting: false,
            })
            .into_iter()
            .collect()
    }

    fn adjust(&mut self, delta: i16) -> Vec<PopoverEvent> {
        let value = (i16::from(self.brightness) + delta)
            .clamp(i16::from(MIN_BRIGHTNESS), i16::from(Hsb::MAX_BRIGHTNESS));
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)] // clamped to 50..=100
        let value = value as u8;
        self.brightness = value;
        self.adjusting = true;
        vec![PopoverEvent::BrightnessChanged {
            value,
            adjusting: true,
        }]
    }

    fn move_up(&mut self) -> Vec<PopoverEvent> {
        match self.focus {
            Focus::Gauge => self.focus = Focus::Grid,
            Focus::Grid => {
                if self.selected >= GRID_COLS {
                    self.selected -= GRID_COLS;
                }
            }
        }
        Vec::new()
    }

    fn move_down(&mut self) -> Vec<PopoverEvent> {
        if self.focus == Focus::Grid {
            if self.selected + GRID_COLS < PALETTE_SIZE {
                self.selected += GRID_COLS;
            } else {
                self.focus = Focus::Gauge;
            }
        }
        Vec::new()
    }

    fn move_left(&mut self) -> Vec<PopoverEvent> {
        match self.focus {
            Focus::Gauge => self.adjust(-i16::from(BRIGHTNESS_STEP)),
            Focus::Grid => {
                if self.selected % GRID_COLS > 0 {
                    self.selected -= 1;
                }
                Vec::new()
            }
        }
    }

    fn move_right(&mut self) -> Vec<PopoverEvent> {
        match self.focus {
            Focus::Gauge => self.adjust(i16::from(BRIGHTNESS_STEP)),
            Focus::Grid => {
                if self.selected % GRID_COLS < GRID_COLS - 1 {
                    self.selected += 1;
                }
                Vec::new()
            }
        }
    }

    fn activate(&mut self) -> Vec<PopoverEvent> {
        match self.focus {
            Focus::Grid => {
                // Choosing a preset also closes any open brightness run.
                let mut events = self.commit_adjustment();
                events.push(PopoverEvent::PresetChosen(self.selected));
                events
            }
            Focus::Gauge => self.commit_adjustment(),
        }
    }

    // ── Painting ────────────────────────────────────────────────────

    /// Paint the popover into its bottom-right anchor position.
    fn paint(&self, surface: &mut Surface, palette: &Palette) {
        let px = surface.width().saturating_sub(POPOVER_W + 2);
        let py = surface.height().saturating_sub(POPOVER_H + 1);

        let scrim: CellColor = Rgb::new(28, 28, 32).into();
        let label_fg: CellColor = Rgb::new(204, 204, 204).into();
        let ring: CellColor = Rgb::WHITE.into();

        surface.fill_rect(px, py, POPOVER_W, POPOVER_H, scrim);

        let left = px + PAD_X;
        let mut y = py + 1;

        surface.paint_text(left, y, "COLOR", label_fg, scrim, Attr::BOLD);
        y += 2;

        // Swatch grid.
        for (index, row, col) in grid_cells() {
            let sx = left + col * (SWATCH_W + SWATCH_GAP);
            let sy = y + row * (SWATCH_H + SWATCH_GAP);
            let color: CellColor = palette.color_at(index, self.brightness).to_rgb().into();

            if self.focus == Focus::Grid && index == self.selected {
                // Selection ring: one cell of white around the swatch.
                surface.fill_rect(
                    sx.saturating_sub(1),
                    sy.saturating_sub(1),
                    SWATCH_W + 2,
                    SWATCH_H + 2,
                    ring,
                );
            }
            surface.fill_rect(sx, sy, SWATCH_W, SWATCH_H, color);
        }
        y += GRID_COLS as u16 * (SWATCH_H + SWATCH_GAP) - SWATCH_GAP + 1;

        surface.paint_text(left, y, "BRIGHTNESS", label_fg, scrim, Attr::BOLD);
        y += 2;

        // Gauge: the filled portion is tinted with the default color,
        // the original slider's accent.
        let accent: CellColor = Palette::default_color().to_rgb().into();
        let track: CellColor = Rgb::new(64, 64, 70).into();
        let span = f32::from(Hsb::MAX_BRIGHTNESS - MIN_BRIGHTNESS);
        let ratio = f32::from(self.brightness.saturating_sub(MIN_BRIGHTNESS)) / span;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let filled = (ratio * f32::from(CONTENT_W)).round() as u16;

        surface.fill_rect(left, y, CONTENT_W, 1, track);
        surface.fill_rect(left, y, filled.min(CONTENT_W), 1, accent);
        if self.focus == Focus::Gauge {
            surface.paint_text(left.saturating_sub(1), y, ">", ring, scrim, Attr::BOLD);
        }
    }
}

/// Iterate the swatch grid as `(palette index, row, col)`.
fn grid_cells() -> impl Iterator<Item = (usize, u16, u16)> {
    (0..PALETTE_SIZE).map(|index| {
        #[allow(clippy::cast_possible_truncation)] // 16 cells
        let (row, col) = ((index / GRID_COLS) as u16, (index % GRID_COLS) as u16);
        (index, row, col)
    })
}

// ─── Lamp ───────────────────────────────────────────────────────────────────

/// The application: one lit screen and its settings.
struct Lamp {
    palette: Palette,
    settings: Settings,
    settings_path: PathBuf,
    popover: Option<SettingsPopover>,
}

impl Lamp {
    fn new(settings: Settings, settings_path: PathBuf) -> Self {
        Self {
            palette: Palette::generate(PALETTE_SIZE, Hsb::DEFAULT.saturation),
            settings,
            settings_path,
            popover: None,
        }
    }

    /// Persist the current settings; failures are logged, not fatal.
    fn persist(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            tracing::error!(error = %e, "failed to save settings");
        }
    }

    /// Close an open brightness run (if any) and save its value.
    fn commit_pending(&mut self) {
        if let Some(popover) = &mut self.popover {
            if let Some(value) = popover.take_pending_brightness() {
                self.settings.brightness = value;
                self.persist();
            }
        }
    }

    fn toggle_popover(&mut self) {
        if self.popover.is_some() {
            self.commit_pending();
            self.popover = None;
        } else {
            self.popover = Some(SettingsPopover::new(self.settings.brightness));
        }
    }

    fn apply(&mut self, event: PopoverEvent) {
        match event {
            PopoverEvent::PresetChosen(index) => {
                self.settings.hue = self.palette.hue_at(index);
                self.settings.saturation = self.palette.saturation_at(index);
                self.persist();
            }
            PopoverEvent::BrightnessChanged { value, adjusting } => {
                self.settings.brightness = value;
                if !adjusting {
                    self.persist();
                }
            }
            PopoverEvent::Dismissed => {
                self.popover = None;
            }
        }
    }

    fn background(&self) -> Rgb {
        self.settings.color().to_rgb()
    }
}

impl App for Lamp {
    fn on_key(&mut self, key: &KeyEvent) -> Action {
        // Global keys first; they work with or without the popover.
        let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(Modifiers::CTRL);
        if ctrl_c || key.code == KeyCode::Char('q') {
            self.commit_pending();
            return Action::Quit;
        }
        if key.code == KeyCode::Char('s') {
            self.toggle_popover();
            return Action::Continue;
        }

        if let Some(mut popover) = self.popover.take() {
            let events = popover.handle_key(key);
            self.popover = Some(popover);
            for event in events {
                self.apply(event);
            }
        }
        Action::Continue
    }

    fn paint(&mut self, surface: &mut Surface) {
        let bg = self.background();
        let bg_cell: CellColor = bg.into();
        surface.fill_rect(0, 0, surface.width(), surface.height(), bg_cell);

        // Caption: a shade of the background, like the original's
        // low-alpha title over the colored view.
        let caption = "Marlin Light";
        let caption_fg: CellColor = bg.scaled(0.8).into();
        let x = (surface.width().saturating_sub(Surface::text_width(caption))) / 2;
        let y = surface.height() / 3;
        surface.paint_text(x, y, caption, caption_fg, bg_cell, Attr::ITALIC);

        // Key hints in the corner the original keeps its cog button.
        let hint = "s: settings  q: quit";
        let hint_fg: CellColor = if bg.is_light() {
            bg.scaled(0.55).into()
        } else {
            Rgb::new(200, 200, 200).into()
        };
        let hx = surface.width().saturating_sub(Surface::text_width(hint) + 2);
        let hy = surface.height().saturating_sub(1);
        surface.paint_text(hx, hy, hint, hint_fg, bg_cell, Attr::DIM);

        if let Some(popover) = &self.popover {
            popover.paint(surface, &self.palette);
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Install a file-backed tracing subscriber when `MARLIN_LIGHT_LOG` is
/// set. Stdout belongs to the frame presenter, so logs can only go to a
/// file; without the variable, logging stays off entirely.
fn init_logging() {
    use std::sync::Mutex;

    use tracing_subscriber::EnvFilter;

    let Ok(path) = env::var("MARLIN_LIGHT_LOG") else {
        return;
    };
    let file = match std::fs::File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("marlin-light: cannot open log file {path}: {e}");
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let settings_path = args
        .get(1)
        .map_or_else(Settings::default_path, PathBuf::from);

    let settings = Settings::load(&settings_path);
    tracing::info!(?settings, path = %settings_path.display(), "starting");

    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("marlin-light: failed to initialize terminal: {e}");
        process::exit(1);
    });

    let mut lamp = Lamp::new(settings, settings_path);
    if let Err(e) = event_loop.run(&mut lamp) {
        eprintln!("marlin-light: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
