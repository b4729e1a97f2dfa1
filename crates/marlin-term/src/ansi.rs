// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; the frame presenter in `surface` decides
// that. This module just knows the byte-level encoding of every terminal
// command we need.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed for
// the terminal (the ANSI standard is 1-based).
//
// All functions return `io::Result` propagated from the underlying writer.

use std::io::{self, Write};

use crate::color::CellColor;
use crate::surface::Attr;

// ─── Cursor ─────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ─────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Switch to the alternate screen buffer (DEC 1049).
///
/// The terminal saves the main screen content and cursor; `exit_alt_screen`
/// restores both, so the user's shell history survives the session.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Return to the main screen buffer (DEC 1049 reset).
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Synchronized Output ────────────────────────────────────────────────────

/// Begin a synchronized update (DEC 2026).
///
/// Terminals that support it hold rendering until `end_sync`, so a frame
/// appears atomically instead of tearing mid-write. Terminals that don't
/// ignore the sequence.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End a synchronized update (DEC 2026 reset).
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Colors ─────────────────────────────────────────────────────────────────

/// Set the foreground (text) color.
///
/// `Default` emits SGR 39; concrete colors use 24-bit TrueColor (38;2).
pub fn fg(w: &mut impl Write, color: CellColor) -> io::Result<()> {
    match color {
        CellColor::Default => w.write_all(b"\x1b[39m"),
        CellColor::Rgb(c) => write!(w, "\x1b[38;2;{};{};{}m", c.r, c.g, c.b),
    }
}

/// Set the background color.
///
/// `Default` emits SGR 49; concrete colors use 24-bit TrueColor (48;2).
pub fn bg(w: &mut impl Write, color: CellColor) -> io::Result<()> {
    match color {
        CellColor::Default => w.write_all(b"\x1b[49m"),
        CellColor::Rgb(c) => write!(w, "\x1b[48;2;{};{};{}m", c.r, c.g, c.b),
    }
}

// ─── Attributes ─────────────────────────────────────────────────────────────

/// Set text attributes from a cleared state.
///
/// Emits one SGR code per set flag. The presenter always resets before
/// calling this, so there is nothing to un-set here.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.contains(Attr::BOLD) {
        w.write_all(b"\x1b[1m")?;
    }
    if attr.contains(Attr::DIM) {
        w.write_all(b"\x1b[2m")?;
    }
    if attr.contains(Attr::ITALIC) {
        w.write_all(b"\x1b[3m")?;
    }
    if attr.contains(Attr::UNDERLINE) {
        w.write_all(b"\x1b[4m")?;
    }
    if attr.contains(Attr::INVERSE) {
        w.write_all(b"\x1b[7m")?;
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::color::Rgb;

    fn capture(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cursor_to_is_one_indexed() {
        assert_eq!(capture(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(capture(|w| cursor_to(w, 10, 5)), "\x1b[6;11H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(capture(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(capture(|w| cursor_show(w)), "\x1b[?25h");
    }

    #[test]
    fn screen_sequences() {
        assert_eq!(capture(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(capture(|w| reset(w)), "\x1b[0m");
        assert_eq!(capture(|w| enter_alt_screen(w)), "\x1b[?1049h");
        assert_eq!(capture(|w| exit_alt_screen(w)), "\x1b[?1049l");
    }

    #[test]
    fn sync_sequences() {
        assert_eq!(capture(|w| begin_sync(w)), "\x1b[?2026h");
        assert_eq!(capture(|w| end_sync(w)), "\x1b[?2026l");
    }

    #[test]
    fn fg_default() {
        assert_eq!(capture(|w| fg(w, CellColor::Default)), "\x1b[39m");
    }

    #[test]
    fn fg_truecolor() {
        assert_eq!(
            capture(|w| fg(w, Rgb::new(1, 2, 3).into())),
            "\x1b[38;2;1;2;3m"
        );
    }

    #[test]
    fn bg_default() {
        assert_eq!(capture(|w| bg(w, CellColor::Default)), "\x1b[49m");
    }

    #[test]
    fn bg_truecolor() {
        assert_eq!(
            capture(|w| bg(w, Rgb::new(255, 128, 0).into())),
            "\x1b[48;2;255;128;0m"
        );
    }

    #[test]
    fn attrs_empty_emits_nothing() {
        assert_eq!(capture(|w| attrs(w, Attr::empty())), "");
    }

    #[test]
    fn attrs_single() {
        assert_eq!(capture(|w| attrs(w, Attr::BOLD)), "\x1b[1m");
        assert_eq!(capture(|w| attrs(w, Attr::DIM)), "\x1b[2m");
        assert_eq!(capture(|w| attrs(w, Attr::INVERSE)), "\x1b[7m");
    }

    #[test]
    fn attrs_combined_in_order() {
        assert_eq!(
            capture(|w| attrs(w, Attr::BOLD | Attr::UNDERLINE)),
            "\x1b[1m\x1b[4m"
        );
    }
}
