// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the `CellWriter`'s job. This module
// just knows the byte-level encoding of every terminal command we need.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
use std::io::{self, Write};

use crate::cell::{Attribute, Style};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
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

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
///
/// The stateful renderer must invalidate its tracked state after calling this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Colours ─────────────────────────────────────────────────────────────────

/// Emit the full SGR state for a foreground/background pair.
///
/// Always starts from SGR 0 so that style flags from a previous cell never
/// leak. Style flags are taken from the foreground attribute, with the
/// background's flags OR-ed in (termbox semantics: bold on either side
/// makes the cell bold).
///
/// Colour encoding: 1..=8 use the compact 30–37 / 40–47 codes,
/// 9..=256 use the 256-colour form with index `colour - 1`, and 0 or any
/// out-of-range value leaves the terminal default in place.
pub fn sgr(w: &mut impl Write, fg: Attribute, bg: Attribute) -> io::Result<()> {
    w.write_all(b"\x1b[0")?;

    let style = fg.style() | bg.style();
    if style.contains(Style::BOLD) {
        w.write_all(b";1")?;
    }
    if style.contains(Style::UNDERLINE) {
        w.write_all(b";4")?;
    }
    if style.contains(Style::REVERSE) {
        w.write_all(b";7")?;
    }

    color(w, fg.color(), 30, 38)?;
    color(w, bg.color(), 40, 48)?;

    w.write_all(b"m")
}

/// Write one `;<code>` colour parameter, or nothing for the default colour.
fn color(w: &mut impl Write, value: u16, base: u16, extended: u16) -> io::Result<()> {
    match value {
        1..=8 => write!(w, ";{}", base + value - 1),
        9..=256 => write!(w, ";{extended};5;{}", value - 1),
        _ => Ok(()),
    }
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// Tells the terminal to buffer all subsequent output until [`end_sync`].
/// Terminals without support ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output. The terminal renders the buffered frame.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Mouse Protocol ─────────────────────────────────────────────────────────

/// Enable SGR mouse tracking for button presses and releases
/// (DEC 1000 + 1006).
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h")?;
    w.write_all(b"\x1b[?1006h")
}

/// Disable all mouse tracking.
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l")?;
    w.write_all(b"\x1b[?1000l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
