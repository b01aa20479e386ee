// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// The backend keeps the last frame it put on screen and compares each new
// grid against it row by row. Unchanged rows are skipped with one slice
// comparison; inside a changed row only the differing cells go through
// the CellWriter. The whole frame lands in one OutputBuffer and is written
// with a single syscall, wrapped in DEC 2026 synchronized output.
//
// A size change, or an explicit force_redraw(), clears the screen and
// repaints every cell.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::CellGrid;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Counters from one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells written to the terminal.
    pub cells_rendered: usize,
    /// Cells identical to the previous frame.
    pub cells_skipped: usize,
    /// Bytes of ANSI output produced.
    pub bytes_written: usize,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits ANSI output only for cells that changed since the last frame.
///
/// ```
/// use tb_term::buffer::CellGrid;
/// use tb_term::cell::Cell;
/// use tb_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let mut grid = CellGrid::new(4, 2);
/// assert_eq!(renderer.render(&grid).cells_rendered, 8);
///
/// grid.set(1, 1, Cell::new('x'));
/// assert_eq!(renderer.render(&grid).cells_rendered, 1);
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<CellGrid>,
}

impl DiffRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame into the output buffer.
    ///
    /// Nothing reaches the terminal until [`flush`](Self::flush) or
    /// [`flush_to`](Self::flush_to).
    pub fn render(&mut self, current: &CellGrid) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let mut stats = RenderStats::default();

        if current.area() == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == current.height());

        if previous.is_none() {
            ansi::clear_screen(&mut self.output).ok();
        }

        let rows = current.cells().chunks_exact(usize::from(width));
        for (y, row) in (0u16..).zip(rows) {
            let prev_row = previous.and_then(|prev| prev.row(y));
            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }

            for (x, cell) in (0u16..).zip(row) {
                if prev_row.and_then(|p| p.get(usize::from(x))) == Some(cell) {
                    stats.cells_skipped += 1;
                } else {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                }
            }
        }

        // Leave the terminal's own SGR state clean for whatever runs after us.
        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// The bytes produced by the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write pending output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Write pending output to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &CellGrid) {
        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
