// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Screen: the backend session a host program talks to.
//
// Owns the terminal, the back buffer callers draw into, the diff renderer
// that pushes it to the tty, and a blocking event source. There is no event
// loop and no reader thread: `poll_event` waits on stdin itself, so the
// caller's thread is the only one touching the terminal.
//
// # Blocking poll
//
// `poll_event` waits on stdin with `poll(2)` in short slices. Between
// slices it checks the SIGWINCH flag, so a resize is reported even when no
// key is pressed. While the parser holds a partial sequence (typically a
// lone ESC) the slice is the escape timeout instead; if nothing follows,
// the pending bytes are flushed as plain keys.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::buffer::CellGrid;
use crate::cell::{Attribute, Cell};
use crate::diff::DiffRenderer;
use crate::error::{Error, Result};
use crate::input::{Event, Parser};
use crate::terminal::{self, Size, Terminal};

/// Upper bound on one `poll(2)` wait, so resize is noticed promptly.
const POLL_SLICE: Duration = Duration::from_millis(50);

const READ_BUF_SIZE: usize = 4096;

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_sigwinch as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_sigwinch(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

fn take_resize() -> bool {
    RESIZED.swap(false, Ordering::Relaxed)
}

// ─── Options ─────────────────────────────────────────────────────────────────

/// How [`Screen::init`] sets up the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenOptions {
    /// Enable SGR mouse reporting.
    pub mouse: bool,
    /// How long a lone ESC waits for the rest of a sequence.
    pub escape_timeout: Duration,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            mouse: false,
            escape_timeout: Duration::from_millis(25),
        }
    }
}

// ─── EventQueue ──────────────────────────────────────────────────────────────

/// Parser plus the events it produced that nobody has taken yet.
///
/// One read can yield several events; `poll_event` hands them out one at a
/// time.
struct EventQueue {
    parser: Parser,
    ready: VecDeque<Event>,
}

impl EventQueue {
    fn new() -> Self {
        Self {
            parser: Parser::new(),
            ready: VecDeque::new(),
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        self.ready.extend(self.parser.advance(bytes));
    }

    /// Nothing arrived within the wait: resolve whatever is pending.
    fn timed_out(&mut self) {
        if self.parser.has_pending() {
            self.ready.extend(self.parser.flush());
        }
    }

    fn pop(&mut self) -> Option<Event> {
        self.ready.pop_front()
    }

    fn wait_slice(&self, escape_timeout: Duration) -> Duration {
        if self.parser.has_pending() {
            escape_timeout
        } else {
            POLL_SLICE
        }
    }
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// An initialized terminal with a back buffer and a blocking event source.
///
/// ```no_run
/// use tb_term::cell::{Attribute, Cell};
/// use tb_term::screen::{Screen, ScreenOptions};
///
/// let mut screen = Screen::init(ScreenOptions::default())?;
/// screen.clear(Attribute::DEFAULT, Attribute::DEFAULT);
/// screen.cells_mut()[0] = Cell::new('x');
/// screen.flush()?;
/// let event = screen.poll_event()?;
/// screen.close()?;
/// # Ok::<(), tb_term::Error>(())
/// ```
pub struct Screen {
    terminal: Terminal,
    grid: CellGrid,
    renderer: DiffRenderer,
    events: EventQueue,
    options: ScreenOptions,
}

impl Screen {
    /// Enter raw mode and the alternate screen.
    ///
    /// Unix only. Elsewhere stdin never counts as a TTY, so this always
    /// fails with [`Error::NotATerminal`].
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`] if stdin is not a TTY, or an I/O error from
    /// switching terminal modes.
    pub fn init(options: ScreenOptions) -> Result<Self> {
        if !terminal::is_tty() {
            return Err(Error::NotATerminal);
        }

        let mut terminal = Terminal::new();
        terminal.enter(options.mouse)?;
        install_sigwinch_handler();
        take_resize();

        let size = terminal.refresh_size();
        tracing::debug!(cols = size.cols, rows = size.rows, mouse = options.mouse, "screen initialized");

        Ok(Self {
            terminal,
            grid: CellGrid::new(size.cols, size.rows),
            renderer: DiffRenderer::new(),
            events: EventQueue::new(),
            options,
        })
    }

    /// Restore the terminal. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns an error if restoring terminal modes fails.
    pub fn close(&mut self) -> Result<()> {
        self.terminal.leave()?;
        Ok(())
    }

    /// Size of the back buffer, which tracks the window.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size {
            cols: self.grid.width(),
            rows: self.grid.height(),
        }
    }

    /// Back buffer cells, row-major.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        self.grid.cells()
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        self.grid.cells_mut()
    }

    /// Blank the back buffer with the given attributes.
    pub fn clear(&mut self, fg: Attribute, bg: Attribute) {
        self.grid.clear(fg, bg);
    }

    /// Draw the back buffer, writing only what changed since the last flush.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> Result<()> {
        let stats = self.renderer.render(&self.grid);
        self.renderer.flush()?;
        tracing::trace!(
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            bytes = stats.bytes_written,
            "frame flushed"
        );
        Ok(())
    }

    /// Block until a key, mouse or resize event is available.
    ///
    /// # Errors
    ///
    /// [`Error::InputClosed`] when stdin reaches end of file, or an I/O
    /// error from `poll(2)` / `read(2)`.
    pub fn poll_event(&mut self) -> Result<Event> {
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            if let Some(event) = self.events.pop() {
                return Ok(event);
            }
            if take_resize() {
                return Ok(self.apply_resize());
            }

            let slice = self.events.wait_slice(self.options.escape_timeout);
            if wait_readable(slice)? {
                let n = read_stdin(&mut buf)?;
                if n == 0 {
                    return Err(Error::InputClosed);
                }
                self.events.feed(&buf[..n]);
            } else {
                self.events.timed_out();
            }
        }
    }

    fn apply_resize(&mut self) -> Event {
        let size = self.terminal.refresh_size();
        self.grid.resize(size.cols, size.rows);
        self.renderer.force_redraw();
        tracing::debug!(cols = size.cols, rows = size.rows, "terminal resized");
        Event::Resize {
            cols: size.cols,
            rows: size.rows,
        }
    }
}

// ─── stdin ───────────────────────────────────────────────────────────────────

/// Wait up to `timeout` for stdin to become readable.
///
/// A signal interrupting the wait counts as a timeout, so the caller gets
/// to look at the resize flag.
#[cfg(unix)]
fn wait_readable(timeout: Duration) -> Result<bool> {
    let mut pfd = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
    let rc = unsafe { libc::poll(&raw mut pfd, 1, millis) };
    if rc < 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err.into());
    }
    Ok(rc > 0)
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn wait_readable(_timeout: Duration) -> Result<bool> {
    Ok(true)
}

#[cfg(unix)]
fn read_stdin(buf: &mut [u8]) -> Result<usize> {
    loop {
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if let Ok(n) = usize::try_from(n) {
            return Ok(n);
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(err.into());
        }
    }
}

#[cfg(not(unix))]
fn read_stdin(buf: &mut [u8]) -> Result<usize> {
    use std::io::Read;
    Ok(std::io::stdin().lock().read(buf)?)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent, Modifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    #[test]
    fn default_options() {
        let opts = ScreenOptions::default();
        assert!(!opts.mouse);
        assert_eq!(opts.escape_timeout, Duration::from_millis(25));
    }

    #[test]
    fn init_without_tty_fails() {
        if terminal::is_tty() {
            return;
        }
        assert!(matches!(
            Screen::init(ScreenOptions::default()),
            Err(Error::NotATerminal)
        ));
    }

    #[cfg(not(unix))]
    #[test]
    fn init_is_refused_off_unix() {
        assert!(matches!(
            Screen::init(ScreenOptions::default()),
            Err(Error::NotATerminal)
        ));
    }

    #[test]
    fn queue_hands_out_events_in_order() {
        let mut queue = EventQueue::new();
        queue.feed(b"ab");
        assert_eq!(queue.pop(), Some(key(KeyCode::Char('a'))));
        assert_eq!(queue.pop(), Some(key(KeyCode::Char('b'))));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn queue_resolves_lone_escape_on_timeout() {
        let mut queue = EventQueue::new();
        queue.feed(b"\x1b");
        assert_eq!(queue.pop(), None);

        queue.timed_out();
        assert_eq!(queue.pop(), Some(key(KeyCode::Escape)));
    }

    #[test]
    fn queue_keeps_partial_sequence_across_feeds() {
        let mut queue = EventQueue::new();
        queue.feed(b"\x1b[1;");
        assert_eq!(queue.pop(), None);
        queue.feed(b"5B");
        assert_eq!(
            queue.pop(),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Down,
                modifiers: Modifiers::CTRL,
            }))
        );
    }

    #[test]
    fn timeout_without_pending_bytes_is_quiet() {
        let mut queue = EventQueue::new();
        queue.timed_out();
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn wait_slice_is_escape_timeout_while_sequence_pending() {
        let mut queue = EventQueue::new();
        let esc = Duration::from_millis(10);
        assert_eq!(queue.wait_slice(esc), POLL_SLICE);
        queue.feed(b"\x1b");
        assert_eq!(queue.wait_slice(esc), esc);
        assert_eq!(queue.wait_slice(Duration::from_secs(1)), Duration::from_secs(1));
    }

    #[test]
    fn resize_flag_is_taken_once() {
        RESIZED.store(true, Ordering::Relaxed);
        assert!(take_resize());
        assert!(!take_resize());
    }
}
