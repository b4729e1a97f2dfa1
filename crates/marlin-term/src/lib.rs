// SPDX-License-Identifier: MIT
//
// marlin-term: the terminal layer for marlin-light.
//
// A small, direct terminal backend: raw termios, alternate screen,
// 24-bit color output, and a byte-level input parser. The screen this
// crate drives is a solid field of color with a single popover on top,
// so frames are painted whole; there is no diff renderer and no
// per-cell bookkeeping beyond the frame surface itself.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. Every byte sent to the terminal is
// accounted for.

pub mod ansi;
pub mod color;
pub mod event_loop;
pub mod input;
pub mod surface;
pub mod terminal;

pub use color::{CellColor, Rgb};
pub use event_loop::{Action, App, EventLoop};
pub use input::{KeyCode, KeyEvent, Modifiers};
pub use surface::Surface;
pub use terminal::Size;
