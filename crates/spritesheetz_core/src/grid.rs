//! Generic cell grid shared by tile content and selection marks

use crate::{CellCoord, Scene, VisualHandle};

/// Content of an occupied cell and whatever was drawn for it
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<T> {
    pub value: T,
    pub visual: Option<VisualHandle>,
}

/// Fixed-size `width x height` grid of optional cell values.
///
/// Cells are stored row-major. Enumeration (`iter`, `occupied_cells`) is
/// column-major, columns outer and rows inner, which is the order grouped
/// objects record their tiles in.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<Option<Cell<T>>>,
}

impl<T> Grid<T> {
    /// Create a grid with every cell empty
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: (0..size).map(|_| None).collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.col < self.width && coord.row < self.height
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.row as usize * self.width as usize + coord.col as usize)
    }

    fn slot(&self, coord: CellCoord) -> Option<&Cell<T>> {
        self.index(coord).and_then(|index| self.cells[index].as_ref())
    }

    pub fn get(&self, coord: CellCoord) -> Option<&T> {
        self.slot(coord).map(|cell| &cell.value)
    }

    pub fn get_mut(&mut self, coord: CellCoord) -> Option<&mut T> {
        let index = self.index(coord)?;
        self.cells[index].as_mut().map(|cell| &mut cell.value)
    }

    /// Visual drawn for this cell, if any
    pub fn visual(&self, coord: CellCoord) -> Option<VisualHandle> {
        self.slot(coord).and_then(|cell| cell.visual)
    }

    pub fn is_occupied(&self, coord: CellCoord) -> bool {
        self.slot(coord).is_some()
    }

    /// Fill an empty cell. Occupied or out-of-range cells are left untouched
    /// and `false` is returned.
    pub fn set(&mut self, coord: CellCoord, value: T) -> bool {
        match self.index(coord) {
            Some(index) if self.cells[index].is_none() => {
                self.cells[index] = Some(Cell {
                    value,
                    visual: None,
                });
                true
            }
            _ => false,
        }
    }

    /// Store a value regardless of occupancy and return the previous cell.
    ///
    /// The caller owns the previous cell's visual. Out-of-range cells are ignored.
    pub fn put(&mut self, coord: CellCoord, value: T) -> Option<Cell<T>> {
        let index = self.index(coord)?;
        self.cells[index].replace(Cell {
            value,
            visual: None,
        })
    }

    /// Record the visual drawn for an occupied cell, returning the one it replaces
    pub fn attach_visual(&mut self, coord: CellCoord, handle: VisualHandle) -> Option<VisualHandle> {
        let index = self.index(coord)?;
        self.cells[index]
            .as_mut()
            .and_then(|cell| cell.visual.replace(handle))
    }

    /// Empty a cell and remove its visual from the scene. No-op when already empty.
    pub fn clear(&mut self, coord: CellCoord, scene: &mut dyn Scene) -> Option<T> {
        let index = self.index(coord)?;
        let cell = self.cells[index].take()?;
        if let Some(visual) = cell.visual {
            scene.remove_visual(visual);
        }
        Some(cell.value)
    }

    /// Empty every cell, removing all visuals
    pub fn clear_all(&mut self, scene: &mut dyn Scene) {
        for slot in &mut self.cells {
            if let Some(Cell {
                visual: Some(visual),
                ..
            }) = slot.take()
            {
                scene.remove_visual(visual);
            }
        }
    }

    /// Remove every visual from the scene but keep the values
    pub fn detach_visuals(&mut self, scene: &mut dyn Scene) {
        for cell in self.cells.iter_mut().flatten() {
            if let Some(visual) = cell.visual.take() {
                scene.remove_visual(visual);
            }
        }
    }

    /// Occupied cells in column-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &T)> + '_ {
        (0..self.width)
            .flat_map(move |col| (0..self.height).map(move |row| CellCoord::new(col, row)))
            .filter_map(move |coord| self.get(coord).map(|value| (coord, value)))
    }

    pub fn occupied_cells(&self) -> Vec<CellCoord> {
        self.iter().map(|(coord, _)| coord).collect()
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Clear every occupied cell for which `keep` returns false
    pub fn retain(&mut self, mut keep: impl FnMut(CellCoord, &T) -> bool, scene: &mut dyn Scene) {
        for coord in self.occupied_cells() {
            let discard = self.get(coord).is_some_and(|value| !keep(coord, value));
            if discard {
                self.clear(coord, scene);
            }
        }
    }
}
