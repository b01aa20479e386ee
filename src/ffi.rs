// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// The termbox C ABI.
//
// Record layouts and constants match `include/termbox.h` byte for byte.
// The exported functions are thin: each locks the process-wide session,
// forwards to `Session`, and collapses errors to the C status codes.
//
// One thread is expected to drive these calls in sequence. The mutex is
// there so the static is `Sync`, not to make concurrent use meaningful.
// `tb_poll_event` holds it for the whole blocking wait, so any other
// export called meanwhile (another thread, a signal handler) blocks until
// the poll returns; from the same thread that is a deadlock.

use std::ffi::c_int;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tb_term::screen::Screen;

use crate::config::Config;
use crate::logging;
use crate::session::Session;

// ─── Constants ───────────────────────────────────────────────────────────────

pub const TB_EVENT_KEY: u8 = 1;
pub const TB_EVENT_RESIZE: u8 = 2;
pub const TB_EVENT_OTHER: u8 = 3;

pub const TB_KEY_SPACE: u16 = 0x20;
pub const TB_KEY_ARROW_UP: u16 = 0xFFFF - 18;
pub const TB_KEY_ARROW_DOWN: u16 = 0xFFFF - 19;

pub const TB_DEFAULT: u16 = 0;
pub const TB_BLACK: u16 = 1;
pub const TB_WHITE: u16 = 8;

/// Reserved. Accepted in the header for source compatibility, never produced.
pub const TB_BOLD: u16 = 0x0100;
/// Reserved. Accepted in the header for source compatibility, never produced.
pub const TB_UNDERLINE: u16 = 0x0200;

// ─── Records ─────────────────────────────────────────────────────────────────

/// `struct tb_cell`: one screen position as C code sees it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TbCell {
    pub ch: u32,
    pub fg: u16,
    pub bg: u16,
}

/// `struct tb_event`: one input event as C code sees it.
///
/// `kind` and `modifier` are `type` and `mod` on the C side.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TbEvent {
    pub kind: u8,
    pub modifier: u8,
    pub key: u16,
    pub ch: u32,
    pub w: i32,
    pub h: i32,
    pub x: i32,
    pub y: i32,
}

impl TbEvent {
    /// An `OTHER` record with no payload.
    #[must_use]
    pub const fn other() -> Self {
        Self {
            kind: TB_EVENT_OTHER,
            modifier: 0,
            key: 0,
            ch: 0,
            w: 0,
            h: 0,
            x: 0,
            y: 0,
        }
    }
}

// ─── Session slot ────────────────────────────────────────────────────────────

static SESSION: Mutex<Option<Session<Screen>>> = Mutex::new(None);

/// A caller that panicked mid-call must not wedge every later call.
fn slot() -> MutexGuard<'static, Option<Session<Screen>>> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Exports ─────────────────────────────────────────────────────────────────

/// Start a session. Returns `0` on success and `-1` on failure.
///
/// Any session left over from an earlier `tb_init` is shut down first, so
/// the cell buffer starts fresh.
#[unsafe(no_mangle)]
pub extern "C" fn tb_init() -> c_int {
    let mut slot = slot();
    if let Some(previous) = slot.take() {
        drop(previous.shutdown());
    }

    let config = Config::from_env();
    logging::init(&config);
    config.log_rejected();

    match Screen::init(config.screen_options()) {
        Ok(screen) => {
            let session = Session::new(screen, config.attributes);
            tracing::info!(
                width = session.width(),
                height = session.height(),
                attributes = ?config.attributes,
                "termbox session started"
            );
            *slot = Some(session);
            0
        }
        Err(err) => {
            tracing::error!(%err, "tb_init failed");
            -1
        }
    }
}

/// End the session and release the cell buffer. Does nothing without one.
#[unsafe(no_mangle)]
pub extern "C" fn tb_shutdown() {
    if let Some(session) = slot().take() {
        drop(session.shutdown());
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn tb_width() -> c_int {
    slot().as_ref().map_or(0, |s| c_int::from(s.width()))
}

#[unsafe(no_mangle)]
pub extern "C" fn tb_height() -> c_int {
    slot().as_ref().map_or(0, |s| c_int::from(s.height()))
}

/// Zero the cell buffer and blank the screen's back buffer.
#[unsafe(no_mangle)]
pub extern "C" fn tb_clear() {
    if let Some(session) = slot().as_mut() {
        session.clear();
    }
}

/// Copy the cell buffer to the screen and draw it.
#[unsafe(no_mangle)]
pub extern "C" fn tb_present() {
    if let Some(session) = slot().as_mut() {
        session.present();
    }
}

/// The current screen contents as `tb_width() * tb_height()` cells.
///
/// The pointer stays valid until the next `tb_cell_buffer` after a resize,
/// `tb_init`, or `tb_shutdown`. Returns `NULL` without a session.
#[unsafe(no_mangle)]
pub extern "C" fn tb_cell_buffer() -> *mut TbCell {
    slot()
        .as_mut()
        .map_or(std::ptr::null_mut(), Session::cell_buffer)
}

/// Block for the next event and write it to `ev`. Always returns `1`.
///
/// The session lock is held until an event arrives. Calling any other
/// `tb_*` function before this returns blocks; from a signal handler on
/// the polling thread it never returns.
///
/// # Safety
///
/// `ev` must be null or valid for writing one `tb_event`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tb_poll_event(ev: *mut TbEvent) -> c_int {
    let event = slot().as_mut().map_or_else(
        || {
            tracing::warn!("tb_poll_event called without a session");
            TbEvent::other()
        },
        Session::poll_event,
    );
    if !ev.is_null() {
        // SAFETY: non-null, and the caller guarantees it points at a tb_event.
        unsafe { ev.write(event) };
    }
    1
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    // ── Layout ──────────────────────────────────────────────────────────

    #[test]
    fn cell_layout_matches_c() {
        assert_eq!(size_of::<TbCell>(), 8);
        assert_eq!(align_of::<TbCell>(), 4);
        assert_eq!(offset_of!(TbCell, ch), 0);
        assert_eq!(offset_of!(TbCell, fg), 4);
        assert_eq!(offset_of!(TbCell, bg), 6);
    }

    #[test]
    fn event_layout_matches_c() {
        assert_eq!(size_of::<TbEvent>(), 24);
        assert_eq!(offset_of!(TbEvent, kind), 0);
        assert_eq!(offset_of!(TbEvent, modifier), 1);
        assert_eq!(offset_of!(TbEvent, key), 2);
        assert_eq!(offset_of!(TbEvent, ch), 4);
        assert_eq!(offset_of!(TbEvent, w), 8);
        assert_eq!(offset_of!(TbEvent, h), 12);
        assert_eq!(offset_of!(TbEvent, x), 16);
        assert_eq!(offset_of!(TbEvent, y), 20);
    }

    // ── Constants ───────────────────────────────────────────────────────

    #[test]
    fn key_constants() {
        assert_eq!(TB_KEY_SPACE, 0x20);
        assert_eq!(TB_KEY_ARROW_UP, 0xFFED);
        assert_eq!(TB_KEY_ARROW_DOWN, 0xFFEC);
    }

    #[test]
    fn reserved_style_bits_do_not_collide_with_colours() {
        for colour in [TB_DEFAULT, TB_BLACK, TB_WHITE] {
            assert_eq!(colour & (TB_BOLD | TB_UNDERLINE), 0);
        }
    }

    #[test]
    fn other_record_has_no_payload() {
        let ev = TbEvent::other();
        assert_eq!(
            ev,
            TbEvent {
                kind: TB_EVENT_OTHER,
                ..TbEvent::default()
            }
        );
    }

    // ── Exports without a session ───────────────────────────────────────
    //
    // The session slot is process-wide; nothing in the test suite ever
    // fills it (that needs a TTY), so these all see the empty slot.

    #[test]
    fn exports_are_inert_without_session() {
        assert_eq!(tb_width(), 0);
        assert_eq!(tb_height(), 0);
        assert!(tb_cell_buffer().is_null());
        tb_clear();
        tb_present();
        tb_shutdown();
    }

    #[test]
    fn poll_without_session_reports_other() {
        let mut ev = TbEvent {
            kind: 0xAA,
            ch: 0xDEAD,
            ..TbEvent::default()
        };
        let rc = unsafe { tb_poll_event(&raw mut ev) };
        assert_eq!(rc, 1);
        assert_eq!(ev, TbEvent::other());
    }

    #[test]
    fn poll_with_null_pointer_still_returns_one() {
        let rc = unsafe { tb_poll_event(std::ptr::null_mut()) };
        assert_eq!(rc, 1);
    }

    #[test]
    fn session_lock_is_released_after_poll() {
        let mut ev = TbEvent::default();
        unsafe { tb_poll_event(&raw mut ev) };
        // Relocking on this thread would hang if the guard had outlived the call.
        assert!(slot().is_none());
        assert_eq!(tb_width(), 0);
    }
}
