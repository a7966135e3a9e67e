//! Editing surfaces driven by pointer events
//!
//! Both surfaces share a [`GridOverlay`]: the dashed grid lines and the
//! turtle that tracks the pointer's cell.

mod map;
mod sheet;

pub use map::*;
pub use sheet::*;

use spritesheetz_core::coord::{self, clamp};
use spritesheetz_core::{Brush, CellCoord, Scene, VisualHandle};

/// Grid lines and pointer cursor of a `cols x rows` surface
#[derive(Debug)]
pub struct GridOverlay {
    cols: u32,
    rows: u32,
    pitch: f32,
    turtle: VisualHandle,
    turtle_cell: CellCoord,
    lines: Vec<VisualHandle>,
}

impl GridOverlay {
    /// Create the turtle at the origin cell and, when `show_grid` is set, the grid lines
    pub fn new(
        cols: u32,
        rows: u32,
        pitch: f32,
        turtle_brush: Brush,
        show_grid: bool,
        scene: &mut dyn Scene,
    ) -> Self {
        let origin = CellCoord::new(0, 0);
        let turtle = scene.add_rect(origin.scene_rect(pitch), turtle_brush);
        let mut overlay = Self {
            cols,
            rows,
            pitch,
            turtle,
            turtle_cell: origin,
            lines: Vec::new(),
        };
        overlay.set_grid_visible(show_grid, scene);
        overlay
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn turtle_cell(&self) -> CellCoord {
        self.turtle_cell
    }

    pub fn grid_visible(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Cell under a scene position, `None` outside the grid
    pub fn resolve(&self, x: f32, y: f32) -> Option<CellCoord> {
        coord::resolve(x, y, self.pitch, self.cols, self.rows)
    }

    /// Move the turtle to the cell under `(x, y)`, clamped into the grid
    pub fn move_turtle(&mut self, x: f32, y: f32, scene: &mut dyn Scene) -> CellCoord {
        let (col, row) = coord::cell_of(x, y, self.pitch);
        let cell = clamp(col, row, self.cols, self.rows);
        if cell != self.turtle_cell {
            let (left, top) = cell.origin(self.pitch);
            scene.move_visual(self.turtle, left, top);
            self.turtle_cell = cell;
        }
        cell
    }

    pub fn set_grid_visible(&mut self, visible: bool, scene: &mut dyn Scene) {
        if visible == self.grid_visible() {
            return;
        }
        if !visible {
            for line in self.lines.drain(..) {
                scene.remove_visual(line);
            }
            return;
        }

        let right = self.cols as f32 * self.pitch;
        let bottom = self.rows as f32 * self.pitch;
        for i in 0..=self.cols {
            let x = i as f32 * self.pitch;
            self.lines.push(scene.add_line((x, 0.0), (x, bottom)));
        }
        for i in 0..=self.rows {
            let y = i as f32 * self.pitch;
            self.lines.push(scene.add_line((0.0, y), (right, y)));
        }
    }

    /// Remove the turtle and grid lines
    pub fn remove(&mut self, scene: &mut dyn Scene) {
        self.set_grid_visible(false, scene);
        scene.remove_visual(self.turtle);
    }
}
