//! Mapping between continuous scene positions and discrete grid cells
//!
//! Cells are addressed by `(col, row)` and cover the half-open scene range
//! `[col * pitch, (col + 1) * pitch)` on each axis. Edit targeting uses
//! [`resolve`], which rejects positions outside the grid; cursor tracking uses
//! [`clamp`], which never leaves it.

use crate::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell pitch of the sprite-sheet surface (tile area plus a 1px border either side)
pub const SHEET_CELL_PITCH: f32 = 101.0;
/// Cell pitch of the map surface
pub const MAP_CELL_PITCH: f32 = 102.0;
/// Gap between a cell edge and the tile image drawn inside it
pub const BORDER_INSET: f32 = 1.0;

/// A grid cell address, serialized as `[col, row]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct CellCoord {
    pub col: u32,
    pub row: u32,
}

impl CellCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Top-left scene position of this cell
    pub fn origin(self, pitch: f32) -> (f32, f32) {
        (self.col as f32 * pitch, self.row as f32 * pitch)
    }

    /// Scene rectangle covered by this cell
    pub fn scene_rect(self, pitch: f32) -> Rect {
        let (x, y) = self.origin(pitch);
        Rect::new(x, y, pitch, pitch)
    }
}

impl From<[u32; 2]> for CellCoord {
    fn from([col, row]: [u32; 2]) -> Self {
        Self { col, row }
    }
}

impl From<CellCoord> for [u32; 2] {
    fn from(coord: CellCoord) -> Self {
        [coord.col, coord.row]
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Unbounded cell index of a scene position. May be negative or past the grid edge.
pub fn cell_of(x: f32, y: f32, pitch: f32) -> (i64, i64) {
    ((x / pitch).floor() as i64, (y / pitch).floor() as i64)
}

/// Clamp each axis independently into `[0, dim - 1]`
pub fn clamp(col: i64, row: i64, width: u32, height: u32) -> CellCoord {
    let max_col = i64::from(width.saturating_sub(1));
    let max_row = i64::from(height.saturating_sub(1));
    CellCoord::new(col.clamp(0, max_col) as u32, row.clamp(0, max_row) as u32)
}

/// Cell under a scene position, or `None` when it falls outside the grid
pub fn resolve(x: f32, y: f32, pitch: f32, width: u32, height: u32) -> Option<CellCoord> {
    let (col, row) = cell_of(x, y, pitch);
    if col < 0 || row < 0 || col >= i64::from(width) || row >= i64::from(height) {
        return None;
    }
    Some(CellCoord::new(col as u32, row as u32))
}

/// Inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub min: CellCoord,
    pub max: CellCoord,
}

impl CellRect {
    pub fn new(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min: CellCoord::new(a.col.min(b.col), a.row.min(b.row)),
            max: CellCoord::new(a.col.max(b.col), a.row.max(b.row)),
        }
    }

    /// Smallest rectangle enclosing every cell, `None` for an empty input
    pub fn enclosing<'a>(cells: impl IntoIterator<Item = &'a CellCoord>) -> Option<Self> {
        let mut cells = cells.into_iter();
        let first = *cells.next()?;
        Some(cells.fold(Self::new(first, first), |rect, cell| {
            Self::new(
                CellCoord::new(rect.min.col.min(cell.col), rect.min.row.min(cell.row)),
                CellCoord::new(rect.max.col.max(cell.col), rect.max.row.max(cell.row)),
            )
        }))
    }

    pub fn width(&self) -> u32 {
        self.max.col - self.min.col + 1
    }

    pub fn height(&self) -> u32 {
        self.max.row - self.min.row + 1
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.col >= self.min.col
            && cell.col <= self.max.col
            && cell.row >= self.min.row
            && cell.row <= self.max.row
    }

    /// Cells in column-major order (columns outer, rows inner)
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.min.col..=self.max.col)
            .flat_map(move |col| (self.min.row..=self.max.row).map(move |row| CellCoord::new(col, row)))
    }

    pub fn scene_rect(&self, pitch: f32) -> Rect {
        let (x, y) = self.min.origin(pitch);
        Rect::new(x, y, self.width() as f32 * pitch, self.height() as f32 * pitch)
    }
}
