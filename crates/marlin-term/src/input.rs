// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into structured key events. The terminal layer
// enables no mouse, paste, or keyboard-protocol extensions, so the
// protocols to handle are:
//
// - Legacy CSI sequences (arrows, Home/End, editing keys, modifiers)
// - SS3 sequences (arrow/Home/End alternate encoding from some terminals)
// - Alt+key (ESC followed by a printable character)
// - Control bytes (Ctrl+letter, Enter, Tab, Backspace)
// - UTF-8 multi-byte characters
//
// The parser keeps a small internal byte buffer because escape sequences
// can span multiple `read()` calls. Feed bytes with [`Parser::advance`];
// after a timeout with no new bytes, call [`Parser::flush`] to emit a
// pending lone ESC as a real Escape keypress.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A key press with its identity and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// A key press with Ctrl held.
    #[inline]
    #[must_use]
    pub const fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::CTRL,
        }
    }

    /// A key press with Alt held.
    #[inline]
    #[must_use]
    pub const fn alt(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::ALT,
        }
    }
}

/// Identity of a key.
///
/// Printable characters use [`Char`](KeyCode::Char); named keys have
/// dedicated variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character (printable).
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Keyboard modifier flags, encoded as in the CSI modifier parameter
    /// (parameter value minus one).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const ALT   = 2;
        const CTRL  = 4;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// One parsing step over the front of the buffer.
enum Step {
    /// A complete event, consuming this many bytes.
    Key(KeyEvent, usize),
    /// Recognized but uninteresting bytes, consume and move on.
    Skip(usize),
    /// The front of the buffer is an unfinished sequence; wait for more.
    Incomplete,
}

/// Incremental byte-to-event parser.
///
/// Stateless between complete sequences; the only state is the byte
/// buffer holding an unfinished sequence across `read()` boundaries.
#[derive(Debug, Default)]
pub struct Parser {
    pending: Vec<u8>,
}

impl Parser {
    /// Create an empty parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether bytes are held waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed bytes, returning all events they complete.
    pub fn advance(&mut self, bytes: &[u8]) -> Vec<KeyEvent> {
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        loop {
            if self.pending.is_empty() {
                break;
            }
            match parse_front(&self.pending) {
                Step::Key(event, n) => {
                    self.pending.drain(..n);
                    events.push(event);
                }
                Step::Skip(n) => {
                    self.pending.drain(..n);
                }
                Step::Incomplete => break,
            }
        }
        events
    }

    /// Resolve pending bytes after an input lull.
    ///
    /// A lone ESC that never grew into a sequence becomes a real Escape
    /// keypress; the bytes after it are reparsed as ordinary input.
    /// Anything else still incomplete (a truncated UTF-8 character) is
    /// dropped; it can never complete now.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        let held = std::mem::take(&mut self.pending);
        let mut events = Vec::new();
        if held[0] == 0x1b {
            events.push(KeyEvent::plain(KeyCode::Escape));
            events.extend(self.advance(&held[1..]));
        }
        self.pending.clear();
        events
    }
}

// ─── Byte-Level Parsing ─────────────────────────────────────────────────────

/// Parse one event from the front of `buf`.
fn parse_front(buf: &[u8]) -> Step {
    match buf[0] {
        0x1b => parse_escape(buf),
        b'\r' | b'\n' => Step::Key(KeyEvent::plain(KeyCode::Enter), 1),
        b'\t' => Step::Key(KeyEvent::plain(KeyCode::Tab), 1),
        0x7f => Step::Key(KeyEvent::plain(KeyCode::Backspace), 1),
        0x08 => Step::Key(KeyEvent::ctrl(KeyCode::Backspace), 1),
        // Ctrl+letter arrives as 0x01..=0x1a (Ctrl-A = 1 and so on).
        b @ 0x01..=0x1a => {
            let letter = (b - 1 + b'a') as char;
            Step::Key(KeyEvent::ctrl(KeyCode::Char(letter)), 1)
        }
        // Remaining C0 controls carry nothing we act on.
        0x00 | 0x1c..=0x1f => Step::Skip(1),
        _ => parse_utf8(buf),
    }
}

/// Parse an escape-introduced sequence: CSI, SS3, or Alt+key.
fn parse_escape(buf: &[u8]) -> Step {
    let Some(&b1) = buf.get(1) else {
        // Lone ESC: Escape key or the start of a sequence. Hold it;
        // the event loop flushes after a timeout.
        return Step::Incomplete;
    };

    match b1 {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1b => Step::Key(KeyEvent::plain(KeyCode::Escape), 1),
        _ => {
            // ESC + printable: Alt-modified key.
            match parse_utf8(&buf[1..]) {
                Step::Key(mut event, n) => {
                    event.modifiers |= Modifiers::ALT;
                    Step::Key(event, n + 1)
                }
                Step::Skip(n) => Step::Skip(n + 1),
                Step::Incomplete => Step::Incomplete,
            }
        }
    }
}

/// Parse a CSI sequence (`ESC [ params final`).
///
/// Parameter bytes are decoded directly from the slice; there is no
/// intermediate string allocation.
fn parse_csi(buf: &[u8]) -> Step {
    // Find the final byte (0x40..=0x7e terminates a CSI sequence).
    let Some(rel) = buf[2..].iter().position(|b| (0x40..=0x7e).contains(b)) else {
        return Step::Incomplete;
    };
    let final_idx = 2 + rel;
    let consumed = final_idx + 1;
    let params = csi_params(&buf[2..final_idx]);
    let modifiers = params
        .get(1)
        .copied()
        .map_or_else(Modifiers::empty, decode_modifiers);

    let code = match buf[final_idx] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            _ => return Step::Skip(consumed),
        },
        _ => return Step::Skip(consumed),
    };

    Step::Key(KeyEvent { code, modifiers }, consumed)
}

/// Parse an SS3 sequence (`ESC O final`), the application-mode encoding
/// some terminals use for arrows and Home/End.
fn parse_ss3(buf: &[u8]) -> Step {
    let Some(&b2) = buf.get(2) else {
        return Step::Incomplete;
    };

    let code = match b2 {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        _ => return Step::Skip(3),
    };

    Step::Key(KeyEvent::plain(code), 3)
}

/// Parse a UTF-8 character from the front of `buf`.
fn parse_utf8(buf: &[u8]) -> Step {
    let len = match buf[0] {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        // Continuation or invalid leading byte out of context.
        _ => return Step::Skip(1),
    };

    if buf.len() < len {
        return Step::Incomplete;
    }

    match std::str::from_utf8(&buf[..len]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Step::Key(KeyEvent::plain(KeyCode::Char(ch)), len),
            None => Step::Skip(len),
        },
        Err(_) => Step::Skip(1),
    }
}

/// Split CSI parameter bytes on `;` into numbers. Empty fields are 0.
fn csi_params(bytes: &[u8]) -> Vec<u16> {
    bytes
        .split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// Decode the CSI modifier parameter (value minus one is the bitmask).
fn decode_modifiers(param: u16) -> Modifiers {
    let mask = param.saturating_sub(1) as u8;
    Modifiers::from_bits_truncate(mask)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
