//! Selection state paired with a tile grid
//!
//! A selection is either a set of individually highlighted cells or a single
//! object region. The two never coexist: establishing a region clears every
//! cell mark first, and marking a cell while a region is active clears the
//! region.

use crate::{Brush, CellCoord, CellRect, Grid, Scene, VisualHandle};
use tracing::debug;

/// An active object-region selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSelection {
    pub rect: CellRect,
    visual: VisualHandle,
}

/// Result of toggling a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The cell has no tile content (or is out of range)
    Ignored,
    Selected,
    Deselected,
    /// Already selected and deselection was not requested
    Unchanged,
}

/// Highlight marks kept in a grid parallel to the content grid
#[derive(Debug)]
pub struct SelectionGrid {
    marks: Grid<()>,
    region: Option<RegionSelection>,
    pitch: f32,
}

impl SelectionGrid {
    /// Create an empty selection for a `width x height` grid drawn at `pitch`
    pub fn new(width: u32, height: u32, pitch: f32) -> Self {
        Self {
            marks: Grid::new(width, height),
            region: None,
            pitch,
        }
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Whether an object region is the current selection
    pub fn is_object_mode(&self) -> bool {
        self.region.is_some()
    }

    pub fn region(&self) -> Option<CellRect> {
        self.region.map(|region| region.rect)
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.marks.is_empty()
    }

    pub fn is_selected(&self, coord: CellCoord) -> bool {
        self.marks.is_occupied(coord)
            || self
                .region
                .is_some_and(|region| region.rect.contains(coord))
    }

    /// Toggle a single cell.
    ///
    /// Cells without content in `tiles` are ignored. An active object region
    /// is dropped before the cell is marked. With `should_deselect` false an
    /// already marked cell stays marked, so drag-selecting across it does not
    /// flicker it off.
    pub fn toggle_cell<T>(
        &mut self,
        tiles: &Grid<T>,
        coord: CellCoord,
        should_deselect: bool,
        scene: &mut dyn Scene,
    ) -> ToggleOutcome {
        if !tiles.is_occupied(coord) {
            return ToggleOutcome::Ignored;
        }

        if self.region.is_some() {
            self.unselect_all(scene);
        }

        if self.marks.is_occupied(coord) {
            if !should_deselect {
                return ToggleOutcome::Unchanged;
            }
            self.marks.clear(coord, scene);
            debug!("Deselected cell {}", coord);
            return ToggleOutcome::Deselected;
        }

        let handle = scene.add_rect(coord.scene_rect(self.pitch), Brush::CellHighlight);
        self.marks.set(coord, ());
        self.marks.attach_visual(coord, handle);
        debug!("Selected cell {}", coord);
        ToggleOutcome::Selected
    }

    /// Replace the current selection with one highlight spanning `rect`
    pub fn select_region(&mut self, rect: CellRect, scene: &mut dyn Scene) {
        self.unselect_all(scene);
        let visual = scene.add_rect(rect.scene_rect(self.pitch), Brush::ObjectHighlight);
        self.region = Some(RegionSelection { rect, visual });
        debug!("Selected region {} - {}", rect.min, rect.max);
    }

    /// Drop every mark and the object region
    pub fn unselect_all(&mut self, scene: &mut dyn Scene) {
        self.marks.clear_all(scene);
        if let Some(region) = self.region.take() {
            scene.remove_visual(region.visual);
        }
    }

    /// Selected cells in column-major order. In object mode these are the
    /// cells of the region.
    pub fn selected_cells(&self) -> Vec<CellCoord> {
        match self.region {
            Some(region) => region
                .rect
                .cells()
                .filter(|coord| self.marks.contains(*coord))
                .collect(),
            None => self.marks.occupied_cells(),
        }
    }

    /// Remove all highlights and hand back the cells that were selected
    pub fn take_selection(&mut self, scene: &mut dyn Scene) -> Vec<CellCoord> {
        let cells = self.selected_cells();
        self.unselect_all(scene);
        cells
    }
}
