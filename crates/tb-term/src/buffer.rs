// SPDX-License-Identifier: MIT
//
// CellGrid: the backend's native 2D cell grid.
//
// Flat `Vec<Cell>` with row-major indexing: `index = y * width + x`.
// A row's cells are contiguous, so the renderer's left-to-right scan is
// a linear walk. The same linear index is what the C-facing mirror uses,
// which is why `cells()` / `cells_mut()` expose the raw slice.

use crate::cell::{Attribute, Cell};

/// A 2D grid of terminal cells.
///
/// # Examples
///
/// ```
/// use tb_term::buffer::CellGrid;
/// use tb_term::cell::Cell;
///
/// let mut grid = CellGrid::new(80, 24);
/// assert_eq!(grid.area(), 1920);
///
/// grid.set(5, 3, Cell::new('X'));
/// assert_eq!(grid.get(5, 3).unwrap().character(), Some('X'));
/// assert_eq!(grid.cells()[3 * 80 + 5].character(), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CellGrid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Create a grid filled with empty cells (space, default colours).
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

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

    /// Total number of cells (`width × height`).
    #[inline]
    #[must_use]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Whether `(x, y)` is within the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Write a cell. Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// The raw cell slice in row-major order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The raw mutable cell slice in row-major order.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// A single row. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    // ─── Clear, Resize, Copy ─────────────────────────────────────────────

    /// Fill every cell with a space in the given colours.
    pub fn clear(&mut self, fg: Attribute, bg: Attribute) {
        self.cells.fill(Cell::blank(fg, bg));
    }

    /// Resize the grid. All content is discarded.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy another grid's contents, reusing this allocation when the
    /// dimensions match.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            self.clone_from(other);
        }
    }
}

impl std::fmt::Debug for CellGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
