// SPDX-License-Identifier: MIT
//
// marlin-term demo: a live key viewer that wires the whole pipeline.
//
// Terminal -> stdin reader -> Parser -> key events -> Surface -> present.
// Run it, press keys, resize the terminal. Ctrl-Q quits.
//
// Usage:
//   cargo run -p marlin-term --example demo

use std::collections::VecDeque;

use marlin_term::color::{CellColor, Rgb};
use marlin_term::event_loop::{Action, App, EventLoop};
use marlin_term::input::{KeyCode, KeyEvent, Modifiers};
use marlin_term::surface::{Attr, Surface};
use marlin_term::terminal::Size;

/// Maximum number of key descriptions kept in the scrolling log.
const MAX_LOG_ENTRIES: usize = 64;

struct Demo {
    size: Size,
    log: VecDeque<String>,
    key_count: u64,
}

impl Demo {
    fn new(size: Size) -> Self {
        Self {
            size,
            log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            key_count: 0,
        }
    }

    fn push_log(&mut self, msg: String) {
        if self.log.len() >= MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
        self.log.push_back(msg);
    }
}

impl App for Demo {
    fn on_key(&mut self, key: &KeyEvent) -> Action {
        if key.code == KeyCode::Char('q') && key.modifiers.contains(Modifiers::CTRL) {
            return Action::Quit;
        }
        self.key_count += 1;
        self.push_log(format!("{:?} {:?}", key.modifiers, key.code));
        Action::Continue
    }

    fn on_resize(&mut self, size: Size) {
        self.size = size;
    }

    fn paint(&mut self, surface: &mut Surface) {
        let bg = CellColor::from(Rgb::new(24, 26, 32));
        let fg = CellColor::from(Rgb::new(220, 220, 220));
        surface.fill_rect(0, 0, surface.width(), surface.height(), bg);

        let header = format!(
            " marlin-term demo | {} keys | {}x{} | Ctrl-Q quits ",
            self.key_count, self.size.cols, self.size.rows
        );
        surface.paint_text(0, 0, &header, fg, bg, Attr::INVERSE);

        let rows = surface.height().saturating_sub(1) as usize;
        for (i, entry) in self.log.iter().rev().take(rows).enumerate() {
            #[allow(clippy::cast_possible_truncation)] // bounded by rows above
            let y = surface.height() - 1 - i as u16;
            surface.paint_text(1, y, entry, fg, bg, Attr::empty());
        }
    }
}

fn main() {
    let mut event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("demo: failed to initialize terminal: {e}");
        std::process::exit(1);
    });

    let mut demo = Demo::new(event_loop.size());
    if let Err(e) = event_loop.run(&mut demo) {
        eprintln!("demo: {e}");
        std::process::exit(1);
    }
}
