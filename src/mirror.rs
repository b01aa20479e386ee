// SPDX-License-Identifier: MIT
//
// Grid mirror: the flat `tb_cell` array C callers draw into.
//
// Two copies of the screen exist. The backend owns its `CellGrid`; the
// mirror owns a `Box<[TbCell]>` with the same row-major indexing. They
// only meet at two synchronization points:
//
//   acquire()  backend → mirror, reallocating first if the cell count moved
//   present()  mirror → backend, skipped if the sizes no longer agree
//
// Between those points the C side may write anything into the mirror.

use tb_term::cell::{Attribute, Cell};
use tb_term::terminal::Size;

use crate::backend::Backend;
use crate::ffi::TbCell;
use crate::palette::AttributeMode;

/// Owner of the C-visible cell buffer.
#[derive(Debug, Default)]
pub struct GridMirror {
    cells: Option<Box<[TbCell]>>,
    mode: AttributeMode,
    reallocations: u64,
}

const fn cell_count(size: Size) -> usize {
    size.cols as usize * size.rows as usize
}

impl GridMirror {
    #[must_use]
    pub const fn new(mode: AttributeMode) -> Self {
        Self {
            cells: None,
            mode,
            reallocations: 0,
        }
    }

    /// Sync backend → mirror and return the buffer's base address.
    ///
    /// If the backend's cell count differs from the buffer length (or no
    /// buffer exists yet), the old buffer is released and a new one
    /// allocated. The returned pointer is only stable until that happens.
    pub fn acquire(&mut self, backend: &impl Backend) -> *mut TbCell {
        let count = cell_count(backend.size());
        if self.cells.as_ref().is_none_or(|cells| cells.len() != count) {
            let old = self.cells.take().map_or(0, |cells| cells.len());
            self.cells = Some(vec![TbCell::default(); count].into_boxed_slice());
            self.reallocations += 1;
            tracing::debug!(old, new = count, "cell buffer reallocated");
        }

        let mode = self.mode;
        let cells = self.cells.get_or_insert_with(Box::default);
        for (dst, src) in cells.iter_mut().zip(backend.cells()) {
            *dst = export(*src, mode);
        }
        cells.as_mut_ptr()
    }

    /// Sync mirror → backend, then flush.
    ///
    /// The copy only happens if the buffer still matches the backend's cell
    /// count; after a resize the caller's edits are dropped. The flush
    /// happens either way.
    ///
    /// # Errors
    ///
    /// Propagates the backend's flush error.
    pub fn present(&self, backend: &mut impl Backend) -> tb_term::Result<()> {
        let count = cell_count(backend.size());
        match &self.cells {
            Some(cells) if cells.len() == count && backend.cells().len() == count => {
                for (dst, src) in backend.cells_mut().iter_mut().zip(cells.iter()) {
                    *dst = import(*src, self.mode);
                }
            }
            Some(cells) => {
                tracing::debug!(buffer = cells.len(), screen = count, "size changed, skipping copy");
            }
            None => tracing::debug!("no cell buffer yet, skipping copy"),
        }
        backend.flush()
    }

    /// Zero the buffer (if any) and blank the backend grid.
    pub fn clear(&mut self, backend: &mut impl Backend) {
        if let Some(cells) = self.cells.as_mut() {
            cells.fill(TbCell::default());
        }
        backend.clear(Attribute::DEFAULT, Attribute::DEFAULT);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.as_ref().map_or(0, |cells| cells.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.cells.is_some()
    }

    /// How many times the buffer has been (re)allocated.
    #[must_use]
    pub const fn reallocations(&self) -> u64 {
        self.reallocations
    }

    #[must_use]
    pub const fn mode(&self) -> AttributeMode {
        self.mode
    }

    #[must_use]
    pub fn cells(&self) -> &[TbCell] {
        self.cells.as_deref().unwrap_or_default()
    }

    pub fn cells_mut(&mut self) -> &mut [TbCell] {
        self.cells.as_deref_mut().unwrap_or_default()
    }
}

fn export(cell: Cell, mode: AttributeMode) -> TbCell {
    TbCell {
        ch: cell.ch,
        fg: mode.export(cell.fg),
        bg: mode.export(cell.bg),
    }
}

fn import(cell: TbCell, mode: AttributeMode) -> Cell {
    Cell {
        ch: cell.ch,
        fg: mode.import(cell.fg),
        bg: mode.import(cell.bg),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
