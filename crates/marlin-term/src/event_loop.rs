// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: the heartbeat of the application.
//
// Stdin bytes flow in from a background reader thread, get parsed into
// key events, the application handles them and paints a frame surface,
// and the surface is presented to the terminal. One loop.
//
// The loop blocks on the stdin channel with a 25ms timeout. When the
// user types, bytes arrive on the channel immediately, so there is no
// polling latency; when nothing happens, `recv_timeout` blocks and the
// process sits at 0% CPU. The timeout doubles as the escape-sequence
// timeout: a lone ESC held by the parser is flushed as a real Escape
// keypress on the first quiet tick.
//
// Terminal resize is detected via a SIGWINCH handler that sets an
// `AtomicBool`; the loop checks the flag each iteration, re-queries the
// size, and repaints.
//
// Why a dedicated reader thread? Because `read()` on stdin blocks, and
// the loop must keep ticking for escape timeouts and resize handling.
// The thread polls stdin with a short timeout and checks a stop flag
// between polls, so shutdown never leaves it stuck in a blocking read.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::input::{KeyEvent, Parser};
use crate::surface::Surface;
use crate::terminal::{Size, Terminal};

/// Channel receive timeout: tick rate and escape-sequence timeout.
const TICK: Duration = Duration::from_millis(25);

/// Reader thread poll timeout (milliseconds); bounds shutdown latency.
#[cfg(unix)]
const READER_POLL_MS: i32 = 50;

/// Reader thread buffer. A keypress is 1..=6 bytes; 1 KB is generous.
const READ_BUF_SIZE: usize = 1024;

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler, checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler only sets the flag: writing an atomic is one of the few
/// operations permitted inside a signal handler.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── Stdin Reader ───────────────────────────────────────────────────────────

/// Background stdin reader: raw byte chunks over a channel.
struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the reader thread and return its channel.
    fn spawn() -> (Self, Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || Self::run(&tx, &stop_flag))
            .expect("failed to spawn stdin reader thread");

        (
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        )
    }

    /// Signal the thread to stop and join it. Idempotent.
    fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Poll stdin, forward byte chunks, exit on stop flag / EOF / hangup.
    #[cfg(unix)]
    fn run(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, READER_POLL_MS)
            };
            if ready <= 0 {
                // Timeout or EINTR: loop back and recheck the stop flag.
                continue;
            }

            let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n <= 0 {
                break;
            }

            #[allow(clippy::cast_sign_loss)] // n > 0 checked above.
            if tx.send(buf[..n as usize].to_vec()).is_err() {
                break;
            }
        }
    }

    #[cfg(not(unix))]
    fn run(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
        use std::io::Read;

        let stdin = io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            match stdin.lock().read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── App Trait ──────────────────────────────────────────────────────────────

/// What the application tells the event loop after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// The loop calls [`on_key`](App::on_key) for each parsed key event,
/// [`on_resize`](App::on_resize) when the terminal size changes, and
/// [`paint`](App::paint) whenever the frame is dirty. Only `paint` is
/// required.
pub trait App {
    /// Handle a key press. Return [`Action::Quit`] to exit the loop.
    fn on_key(&mut self, _key: &KeyEvent) -> Action {
        Action::Continue
    }

    /// Handle terminal resize. The surface has already been resized.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the current application state to the frame surface.
    ///
    /// Called only when something changed. The surface has been cleared
    /// before this call; paint everything that should be visible.
    fn paint(&mut self, surface: &mut Surface);
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal and input parser. Call [`run`](Self::run) to enter
/// the loop; it returns when the application signals [`Action::Quit`].
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
}

impl EventLoop {
    /// Create a new event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// Enters full-screen mode, installs the SIGWINCH handler, spawns
    /// the stdin reader, runs the loop, and restores the terminal on
    /// exit (even on error).
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave or frame output fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let (mut reader, rx) = StdinReader::spawn();
        let result = self.run_inner(app, &rx);

        // Always clean up, even if the loop errored.
        reader.stop();
        self.terminal.leave()?;

        result
    }

    /// The inner loop, separated so cleanup runs regardless of outcome.
    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut surface = Surface::new(size.cols, size.rows);
        let mut dirty = true; // First frame always renders.

        loop {
            match rx.recv_timeout(TICK) {
                Ok(bytes) => {
                    for key in self.parser.advance(&bytes) {
                        if app.on_key(&key) == Action::Quit {
                            return Ok(());
                        }
                        dirty = true;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    // Quiet tick: a held lone ESC becomes a real Escape.
                    if self.parser.has_pending() {
                        for key in self.parser.flush() {
                            if app.on_key(&key) == Action::Quit {
                                return Ok(());
                            }
                            dirty = true;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    // Reader thread died (stdin EOF): exit gracefully.
                    return Ok(());
                }
            }

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                surface.resize(new_size.cols, new_size.rows);
                app.on_resize(new_size);
                dirty = true;
            }

            if dirty {
                surface.clear();
                app.paint(&mut surface);

                let stdout = io::stdout();
                let mut lock = stdout.lock();
                surface.present(&mut lock)?;
                lock.flush()?;

                dirty = false;
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Action ──────────────────────────────────────────────────

    #[test]
    fn action_equality() {
        assert_eq!(Action::Continue, Action::Continue);
        assert_ne!(Action::Continue, Action::Quit);
    }

    // ── EventLoop construction ─────────────────────────────────

    #[test]
    fn event_loop_new_succeeds() {
        let event_loop = EventLoop::new().unwrap();
        let size = event_loop.size();
        assert!(size.cols > 0);
        assert!(size.rows > 0);
    }

    // ── SIGWINCH flag ──────────────────────────────────────────

    #[test]
    fn sigwinch_flag_swap() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        let was = SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed);
        assert!(was);
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
    }

    // ── Stdin reader ───────────────────────────────────────────

    #[test]
    fn reader_spawn_and_stop() {
        let (mut reader, _rx) = StdinReader::spawn();
        reader.stop();
    }

    #[test]
    fn reader_stop_is_idempotent() {
        let (mut reader, _rx) = StdinReader::spawn();
        reader.stop();
        reader.stop();
    }

    #[test]
    fn reader_drop_does_not_hang() {
        let (reader, _rx) = StdinReader::spawn();
        drop(reader);
    }

    // ── App trait defaults ─────────────────────────────────────

    struct MinimalApp;
    impl App for MinimalApp {
        fn paint(&mut self, _surface: &mut Surface) {}
    }

    #[test]
    fn app_default_on_key_continues() {
        use crate::input::{KeyCode, KeyEvent};

        let mut app = MinimalApp;
        let key = KeyEvent::plain(KeyCode::Char('x'));
        assert_eq!(app.on_key(&key), Action::Continue);
    }

    #[test]
    fn app_default_on_resize_is_noop() {
        let mut app = MinimalApp;
        app.on_resize(Size { cols: 100, rows: 50 }); // Must not panic.
    }

    #[test]
    fn paint_receives_sized_surface() {
        struct CheckSize;
        impl App for CheckSize {
            fn paint(&mut self, surface: &mut Surface) {
                assert!(surface.width() > 0);
                assert!(surface.height() > 0);
            }
        }
        let mut app = CheckSize;
        let mut surface = Surface::new(80, 24);
        app.paint(&mut surface);
    }
}
