// SPDX-License-Identifier: MIT
//
// The seam between the C-facing layer and the terminal backend.

use tb_term::cell::{Attribute, Cell};
use tb_term::input::Event;
use tb_term::screen::Screen;
use tb_term::terminal::Size;

/// What the mirror and session need from a terminal.
///
/// `cells()` is row-major and its length is `size().area()` whenever the
/// backend is in a consistent state.
pub trait Backend {
    fn size(&self) -> Size;
    fn cells(&self) -> &[Cell];
    fn cells_mut(&mut self) -> &mut [Cell];
    fn clear(&mut self, fg: Attribute, bg: Attribute);

    /// Draw the native grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be written.
    fn flush(&mut self) -> tb_term::Result<()>;

    /// Block until the next input or resize event.
    ///
    /// # Errors
    ///
    /// Returns an error if input can't be read.
    fn poll_event(&mut self) -> tb_term::Result<Event>;

    /// Restore the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal modes can't be restored.
    fn close(&mut self) -> tb_term::Result<()>;
}

impl Backend for Screen {
    fn size(&self) -> Size {
        Self::size(self)
    }

    fn cells(&self) -> &[Cell] {
        Self::cells(self)
    }

    fn cells_mut(&mut self) -> &mut [Cell] {
        Self::cells_mut(self)
    }

    fn clear(&mut self, fg: Attribute, bg: Attribute) {
        Self::clear(self, fg, bg);
    }

    fn flush(&mut self) -> tb_term::Result<()> {
        Self::flush(self)
    }

    fn poll_event(&mut self) -> tb_term::Result<Event> {
        Self::poll_event(self)
    }

    fn close(&mut self) -> tb_term::Result<()> {
        Self::close(self)
    }
}

/// In-memory backend for exercising the shim without a TTY.
#[cfg(test)]
pub mod fake {
    use std::collections::VecDeque;

    use tb_term::buffer::CellGrid;

    use super::{Attribute, Backend, Cell, Event, Size};

    pub struct FakeBackend {
        grid: CellGrid,
        script: VecDeque<tb_term::Result<Event>>,
        pub flushes: usize,
        pub clears: Vec<(Attribute, Attribute)>,
        pub closed: bool,
        pub fail_flush: bool,
    }

    impl FakeBackend {
        pub fn new(cols: u16, rows: u16) -> Self {
            Self {
                grid: CellGrid::new(cols, rows),
                script: VecDeque::new(),
                flushes: 0,
                clears: Vec::new(),
                closed: false,
                fail_flush: false,
            }
        }

        /// Change size the way a SIGWINCH would: the grid is blanked.
        pub fn resize(&mut self, cols: u16, rows: u16) {
            self.grid.resize(cols, rows);
        }

        pub fn grid(&self) -> &CellGrid {
            &self.grid
        }

        pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
            self.grid.set(x, y, cell);
        }

        pub fn push_event(&mut self, event: Event) {
            self.script.push_back(Ok(event));
        }

        pub fn push_error(&mut self, err: tb_term::Error) {
            self.script.push_back(Err(err));
        }
    }

    impl Backend for FakeBackend {
        fn size(&self) -> Size {
            Size {
                cols: self.grid.width(),
                rows: self.grid.height(),
            }
        }

        fn cells(&self) -> &[Cell] {
            self.grid.cells()
        }

        fn cells_mut(&mut self) -> &mut [Cell] {
            self.grid.cells_mut()
        }

        fn clear(&mut self, fg: Attribute, bg: Attribute) {
            self.grid.clear(fg, bg);
            self.clears.push((fg, bg));
        }

        fn flush(&mut self) -> tb_term::Result<()> {
            self.flushes += 1;
            if self.fail_flush {
                return Err(std::io::Error::other("flush failed").into());
            }
            Ok(())
        }

        fn poll_event(&mut self) -> tb_term::Result<Event> {
            self.script
                .pop_front()
                .unwrap_or(Err(tb_term::Error::InputClosed))
        }

        fn close(&mut self) -> tb_term::Result<()> {
            self.closed = true;
            Ok(())
        }
    }
}
