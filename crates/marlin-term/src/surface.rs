// SPDX-License-Identifier: MIT
//
// Frame surface: the cell grid a frame is painted into.
//
// Every character position on screen is a `Cell` holding a codepoint,
// foreground and background colors, and a small attribute bitfield. The
// application paints a whole frame into a `Surface`, then `present`
// writes it out in one buffered pass inside a synchronized update.
//
// There is no diff against the previous frame. The screen this crate
// exists for is a solid color field with one popover; a full 80x24 frame
// is about 4 KB of escape bytes with run-length style minimization, which
// is nothing. Wide characters (CJK, some emoji) occupy two columns: the
// first cell holds the codepoint, the second is a continuation cell the
// presenter skips because the terminal cursor has already moved past it.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi;
use crate::color::CellColor;

// ─── Attributes ─────────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// These map directly to SGR (Select Graphic Rendition) parameters.
    /// Combine with bitwise OR: `Attr::BOLD | Attr::DIM`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1, increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2, decreased intensity (faint).
        const DIM       = 1 << 1;
        /// SGR 3, italic or oblique.
        const ITALIC    = 1 << 2;
        /// SGR 4, single underline.
        const UNDERLINE = 1 << 3;
        /// SGR 7, swap foreground and background.
        const INVERSE   = 1 << 4;
    }
}

// ─── Cell ───────────────────────────────────────────────────────────────────

/// Marker codepoint for the second column of a wide character.
const CONTINUATION: char = '\0';

/// One character position on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The codepoint, `'\0'` for wide-character continuation cells.
    pub ch: char,
    /// Foreground (text) color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Text attributes.
    pub attrs: Attr,
}

impl Cell {
    /// A blank cell in the terminal's default colors.
    pub const EMPTY: Self = Self {
        ch: ' ',
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// A styled cell.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self { ch, fg, bg, attrs }
    }

    /// Whether this is the trailing half of a wide character.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this cell shares fg, bg, and attrs with `other`.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Surface ────────────────────────────────────────────────────────────────

/// A width x height grid of cells, row-major.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Surface {
    /// Create a surface of blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width as usize * height as usize],
        }
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// The cell at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Write a cell at `(x, y)`. Out-of-bounds writes are ignored.
    ///
    /// Returns `true` if the cell landed on the surface.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Reset every cell to blank default colors.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the grid, clearing its content.
    ///
    /// Frames are repainted whole, so nothing is worth preserving.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(width as usize * height as usize, Cell::EMPTY);
    }

    /// Fill a rectangle with blank cells of the given background.
    ///
    /// The rectangle is clipped to the surface.
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, bg: CellColor) {
        let cell = Cell::styled(' ', CellColor::Default, bg, Attr::empty());
        for row in y..y.saturating_add(h).min(self.height) {
            for col in x..x.saturating_add(w).min(self.width) {
                self.set(col, row, cell);
            }
        }
    }

    /// Paint a string starting at `(x, y)`, clipped at the right edge.
    ///
    /// Zero-width characters are dropped. A wide character that would
    /// cross the right edge is replaced by a blank cell. Returns the
    /// column after the last painted cell.
    pub fn paint_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: CellColor,
        bg: CellColor,
        attrs: Attr,
    ) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let w = ch.width().unwrap_or(0);
            match w {
                0 => {}
                1 => {
                    self.set(col, y, Cell::styled(ch, fg, bg, attrs));
                    col += 1;
                }
                _ => {
                    if col + 1 >= self.width {
                        // Wide char would straddle the edge: blank the last column.
                        self.set(col, y, Cell::styled(' ', fg, bg, attrs));
                        col += 1;
                        break;
                    }
                    self.set(col, y, Cell::styled(ch, fg, bg, attrs));
                    self.set(col + 1, y, Cell::styled(CONTINUATION, fg, bg, attrs));
                    col += 2;
                }
            }
        }
        col
    }

    /// Display width of `s` in columns.
    #[must_use]
    pub fn text_width(s: &str) -> u16 {
        s.chars()
            .map(|c| c.width().unwrap_or(0) as u16)
            .sum()
    }

    // ── Presentation ────────────────────────────────────────────────

    /// Write the whole frame to `w` inside a synchronized update.
    ///
    /// Style sequences are emitted only when the style changes between
    /// consecutive cells, which collapses a solid-color screen to one
    /// SGR run per row. The caller flushes.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `w`.
    pub fn present(&self, w: &mut impl Write) -> io::Result<()> {
        ansi::begin_sync(w)?;
        ansi::reset(w)?;

        let mut style: Option<Cell> = None;
        for y in 0..self.height {
            ansi::cursor_to(w, 0, y)?;
            for x in 0..self.width {
                let Some(cell) = self.get(x, y) else { break };
                if cell.is_continuation() {
                    // The wide char in the previous cell already moved
                    // the terminal cursor past this column.
                    continue;
                }
                if style.is_none_or(|s| !s.same_style(cell)) {
                    ansi::reset(w)?;
                    ansi::attrs(w, cell.attrs)?;
                    ansi::fg(w, cell.fg)?;
                    ansi::bg(w, cell.bg)?;
                    style = Some(*cell);
                }
                let mut buf = [0u8; 4];
                w.write_all(cell.ch.encode_utf8(&mut buf).as_bytes())?;
            }
        }

        ansi::reset(w)?;
        ansi::end_sync(w)?;
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
