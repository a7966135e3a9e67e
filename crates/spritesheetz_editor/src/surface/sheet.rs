//! Sprite-sheet editing surface

use super::GridOverlay;
use crate::input::{PointerButton, PointerEvent};
use crate::shell::PropertyPanel;
use spritesheetz_core::coord::SHEET_CELL_PITCH;
use spritesheetz_core::{
    Brush, CellCoord, ObjectEdit, ObjectError, Scene, SelectionGrid, SheetDocument,
    SpriteObject, SpriteSheetModel, ToggleOutcome,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a selection click ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelection {
    /// The whole object owning the cell was selected
    Object(String),
    Cell(ToggleOutcome),
    /// Outside the sheet
    Ignored,
}

/// A sprite sheet being edited: tiles, selection, objects and overlay
#[derive(Debug)]
pub struct SpriteSheetSurface {
    sheet: SpriteSheetModel,
    selection: SelectionGrid,
    overlay: GridOverlay,
    file_path: Option<PathBuf>,
    dragging: bool,
    /// A tile of the object the region selection stands for
    selected_object: Option<CellCoord>,
}

impl SpriteSheetSurface {
    /// Draw a sheet onto `scene` and start editing it
    pub fn new(mut sheet: SpriteSheetModel, show_grid: bool, scene: &mut dyn Scene) -> Self {
        let (cols, rows) = (sheet.horizontal_tiles(), sheet.vertical_tiles());
        sheet.draw_tiles(scene);
        let overlay = GridOverlay::new(cols, rows, SHEET_CELL_PITCH, Brush::Turtle, show_grid, scene);
        Self {
            sheet,
            selection: SelectionGrid::new(cols, rows, SHEET_CELL_PITCH),
            overlay,
            file_path: None,
            dragging: false,
            selected_object: None,
        }
    }

    pub fn sheet(&self) -> &SpriteSheetModel {
        &self.sheet
    }

    pub fn selection(&self) -> &SelectionGrid {
        &self.selection
    }

    pub fn overlay(&self) -> &GridOverlay {
        &self.overlay
    }

    /// Project file this sheet was loaded from or last saved to
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_press(
        &mut self,
        event: &PointerEvent,
        scene: &mut dyn Scene,
        panel: &mut dyn PropertyPanel,
    ) -> SheetSelection {
        match event.button {
            Some(PointerButton::Left) => {
                self.dragging = true;
                self.select_at(event.x, event.y, true, scene, panel)
            }
            Some(PointerButton::Middle) => self.select_at(event.x, event.y, true, scene, panel),
            _ => SheetSelection::Ignored,
        }
    }

    /// Track the pointer; while dragging, extend the selection without
    /// toggling cells off
    pub fn pointer_move(
        &mut self,
        event: &PointerEvent,
        scene: &mut dyn Scene,
        panel: &mut dyn PropertyPanel,
    ) -> SheetSelection {
        self.overlay.move_turtle(event.x, event.y, scene);
        if !self.dragging {
            return SheetSelection::Ignored;
        }
        self.select_at(event.x, event.y, false, scene, panel)
    }

    pub fn pointer_release(&mut self, _event: &PointerEvent) {
        self.dragging = false;
    }

    /// Select what is under a scene position.
    ///
    /// A cell owned by an object selects the whole object region and shows
    /// the object in the property panel. Any other cell with tile content is
    /// toggled, after an active object selection is dropped.
    pub fn select_at(
        &mut self,
        x: f32,
        y: f32,
        should_deselect: bool,
        scene: &mut dyn Scene,
        panel: &mut dyn PropertyPanel,
    ) -> SheetSelection {
        let Some(coord) = self.overlay.resolve(x, y) else {
            return SheetSelection::Ignored;
        };
        self.select_cell(coord, should_deselect, scene, panel)
    }

    pub fn select_cell(
        &mut self,
        coord: CellCoord,
        should_deselect: bool,
        scene: &mut dyn Scene,
        panel: &mut dyn PropertyPanel,
    ) -> SheetSelection {
        if let Some(object) = self.sheet.objects().lookup(coord) {
            if let Some(bounds) = object.bounds() {
                if self.selection.region() != Some(bounds) {
                    self.selection.select_region(bounds, scene);
                }
                panel.show_object_properties(object);
                self.selected_object = Some(coord);
                return SheetSelection::Object(object.key.clone());
            }
        }

        let was_object_mode = self.selection.is_object_mode();
        let outcome = self
            .selection
            .toggle_cell(self.sheet.tiles(), coord, should_deselect, scene);
        if was_object_mode && !self.selection.is_object_mode() {
            self.selected_object = None;
            panel.clear_object_properties();
        }
        SheetSelection::Cell(outcome)
    }

    /// Whether the "Tile/s to object" context action applies at a position
    pub fn can_group_at(&self, x: f32, y: f32) -> bool {
        self.overlay
            .resolve(x, y)
            .is_some_and(|coord| self.sheet.tiles().is_occupied(coord))
    }

    /// Group the selected cells into a new object and select it.
    ///
    /// With nothing selected, the occupied cell under the turtle is grouped on
    /// its own.
    pub fn tiles_to_object(
        &mut self,
        scene: &mut dyn Scene,
        panel: &mut dyn PropertyPanel,
    ) -> Result<String, ObjectError> {
        let mut cells = self.selection.selected_cells();
        if cells.is_empty() {
            let turtle = self.overlay.turtle_cell();
            if self.sheet.tiles().is_occupied(turtle) {
                cells.push(turtle);
            }
        }

        let object = self.sheet.objects_mut().group(cells)?;
        let key = object.key.clone();
        let first = object.tiles[0];
        self.select_cell(first, true, scene, panel);
        Ok(key)
    }

    /// Clear every selected cell together with its highlight.
    ///
    /// With an object selected, only that object's own tiles are cleared and
    /// only that object is dropped, even where its bounding box covers other
    /// tiles. Otherwise objects owning a cleared cell are dropped. Returns the
    /// cleared cells.
    pub fn delete_press(&mut self, scene: &mut dyn Scene, panel: &mut dyn PropertyPanel) -> Vec<CellCoord> {
        let selected_key = self
            .selected_object
            .take()
            .and_then(|anchor| self.sheet.objects().lookup(anchor))
            .map(|object| object.key.clone());

        let Some(key) = selected_key else {
            let cells = self.selection.take_selection(scene);
            if cells.is_empty() {
                return cells;
            }
            let (tiles, objects) = self.sheet.parts_mut();
            for coord in &cells {
                tiles.clear(*coord, scene);
            }
            for removed in objects.remove_owning(&cells) {
                debug!("Dropped object '{}' with its deleted tiles", removed.key);
            }
            info!("Deleted {} tile(s) from '{}'", cells.len(), self.sheet.name);
            return cells;
        };

        self.selection.unselect_all(scene);
        panel.clear_object_properties();
        let (tiles, objects) = self.sheet.parts_mut();
        let mut cells = objects.remove(&key).map(|object| object.tiles).unwrap_or_default();
        cells.sort();
        for coord in &cells {
            tiles.clear(*coord, scene);
        }
        info!(
            "Deleted object '{}' and its {} tile(s) from '{}'",
            key,
            cells.len(),
            self.sheet.name
        );
        cells
    }

    /// Drop every highlight
    pub fn clear_selection(&mut self, scene: &mut dyn Scene, panel: &mut dyn PropertyPanel) {
        if self.selection.is_object_mode() {
            panel.clear_object_properties();
        }
        self.selected_object = None;
        self.selection.unselect_all(scene);
    }

    /// Apply a property-panel edit to an object and refresh the panel
    pub fn apply_object_edit(
        &mut self,
        key: &str,
        edit: ObjectEdit,
        panel: &mut dyn PropertyPanel,
    ) -> Result<(), ObjectError> {
        let object = self.sheet.objects_mut().apply_edit(key, edit)?;
        panel.show_object_properties(object);
        Ok(())
    }

    /// Ungroup an object, leaving its tiles in place
    pub fn remove_object(
        &mut self,
        key: &str,
        scene: &mut dyn Scene,
        panel: &mut dyn PropertyPanel,
    ) -> Option<SpriteObject> {
        let removed = self.sheet.objects_mut().remove(key)?;
        if removed.bounds().is_some() && self.selection.region() == removed.bounds() {
            self.selected_object = None;
            self.selection.unselect_all(scene);
            panel.clear_object_properties();
        }
        Some(removed)
    }

    pub fn set_sheet_name(&mut self, name: impl Into<String>, panel: &mut dyn PropertyPanel) {
        self.sheet.name = name.into();
        panel.show_sheet_properties(&self.sheet.properties());
    }

    pub fn set_grid_visible(&mut self, visible: bool, scene: &mut dyn Scene) {
        self.overlay.set_grid_visible(visible, scene);
    }

    pub fn to_document(&self) -> SheetDocument {
        self.sheet.to_document()
    }

    /// Remove everything this surface drew
    pub fn close(&mut self, scene: &mut dyn Scene) {
        self.selected_object = None;
        self.selection.unselect_all(scene);
        self.sheet.tiles_mut().detach_visuals(scene);
        self.overlay.remove(scene);
    }
}
