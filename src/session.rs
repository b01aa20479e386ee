// SPDX-License-Identifier: MIT
//
// A session: one initialized backend plus the mirror of its grid.

use crate::backend::Backend;
use crate::ffi::{TbCell, TbEvent};
use crate::mirror::GridMirror;
use crate::palette::AttributeMode;
use crate::translate::translate;

/// Everything `tb_init` creates and `tb_shutdown` releases.
pub struct Session<B: Backend> {
    backend: B,
    mirror: GridMirror,
}

impl<B: Backend> Session<B> {
    pub const fn new(backend: B, mode: AttributeMode) -> Self {
        Self {
            backend,
            mirror: GridMirror::new(mode),
        }
    }

    pub fn width(&self) -> u16 {
        self.backend.size().cols
    }

    pub fn height(&self) -> u16 {
        self.backend.size().rows
    }

    pub fn clear(&mut self) {
        self.mirror.clear(&mut self.backend);
    }

    /// Copy the mirror back and draw. Failures are logged, not returned.
    pub fn present(&mut self) {
        if let Err(err) = self.mirror.present(&mut self.backend) {
            tracing::warn!(%err, "present failed");
        }
    }

    pub fn cell_buffer(&mut self) -> *mut TbCell {
        self.mirror.acquire(&self.backend)
    }

    /// Block for one event. A backend failure becomes an `OTHER` record.
    pub fn poll_event(&mut self) -> TbEvent {
        match self.backend.poll_event() {
            Ok(event) => {
                tracing::trace!(?event, "polled");
                translate(&event)
            }
            Err(err) => {
                tracing::warn!(%err, "poll failed");
                TbEvent::other()
            }
        }
    }

    /// Restore the terminal and release the cell buffer. The closed
    /// backend is handed back.
    pub fn shutdown(self) -> B {
        let Self {
            mut backend,
            mirror,
        } = self;
        if let Err(err) = backend.close() {
            tracing::warn!(%err, "closing terminal failed");
        }
        tracing::info!(reallocations = mirror.reallocations(), "termbox session closed");
        drop(mirror);
        backend
    }

    pub const fn mirror(&self) -> &GridMirror {
        &self.mirror
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::ffi::{TB_EVENT_KEY, TB_EVENT_OTHER, TB_EVENT_RESIZE, TB_KEY_ARROW_UP};
    use tb_term::cell::{Attribute, Cell};
    use tb_term::input::{Event, KeyCode, KeyEvent};

    fn session(cols: u16, rows: u16) -> Session<FakeBackend> {
        Session::new(FakeBackend::new(cols, rows), AttributeMode::Raw)
    }

    #[test]
    fn dimensions_come_from_backend() {
        let mut s = session(80, 24);
        assert_eq!((s.width(), s.height()), (80, 24));
        s.backend_mut().resize(100, 30);
        assert_eq!((s.width(), s.height()), (100, 30));
    }

    #[test]
    #[allow(unsafe_code)]
    fn draw_and_present_round() {
        let mut s = session(3, 2);
        let ptr = s.cell_buffer();
        assert!(!ptr.is_null());

        // What a C caller does through the pointer.
        let cells = unsafe { std::slice::from_raw_parts_mut(ptr, 6) };
        cells[5] = TbCell {
            ch: u32::from('!'),
            fg: 8,
            bg: 1,
        };
        s.present();

        assert_eq!(
            s.backend().grid().get(2, 1).copied(),
            Some(Cell::styled('!', Attribute::WHITE, Attribute::BLACK))
        );
        assert_eq!(s.backend().flushes, 1);
    }

    #[test]
    fn present_swallows_flush_errors() {
        let mut s = session(2, 2);
        s.backend_mut().fail_flush = true;
        s.present();
        assert_eq!(s.backend().flushes, 1);
    }

    #[test]
    fn clear_reaches_both_copies() {
        let mut s = session(2, 1);
        s.backend_mut().set(0, 0, Cell::new('x'));
        s.cell_buffer();
        s.clear();
        assert!(s.mirror().cells().iter().all(|c| c.ch == 0));
        assert_eq!(s.backend().clears.len(), 1);
    }

    #[test]
    fn resize_between_buffer_and_present_drops_edits() {
        let mut s = session(2, 2);
        s.cell_buffer();
        s.backend_mut().resize(3, 3);
        s.present();
        assert!(s.backend().grid().cells().iter().all(|c| c.is_empty()));

        s.cell_buffer();
        assert_eq!(s.mirror().len(), 9);
        assert_eq!(s.mirror().reallocations(), 2);
    }

    #[test]
    fn poll_translates_in_order() {
        let mut s = session(10, 10);
        s.backend_mut().push_event(Event::Key(KeyEvent::plain(KeyCode::Up)));
        s.backend_mut().push_event(Event::Resize { cols: 40, rows: 12 });

        let first = s.poll_event();
        assert_eq!((first.kind, first.key), (TB_EVENT_KEY, TB_KEY_ARROW_UP));

        let second = s.poll_event();
        assert_eq!((second.kind, second.w, second.h), (TB_EVENT_RESIZE, 40, 12));
    }

    #[test]
    fn poll_error_becomes_other() {
        let mut s = session(10, 10);
        s.backend_mut().push_error(tb_term::Error::InputClosed);
        assert_eq!(s.poll_event(), TbEvent::other());
        assert_eq!(s.poll_event().kind, TB_EVENT_OTHER);
    }

    #[test]
    fn shutdown_closes_backend() {
        let mut s = session(4, 4);
        s.cell_buffer();
        let backend = s.shutdown();
        assert!(backend.closed);
    }
}
