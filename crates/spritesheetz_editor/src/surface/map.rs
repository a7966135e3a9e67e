//! Map editing surface and its sprite-sheet palettes

use super::GridOverlay;
use crate::input::{PointerButton, PointerEvent};
use spritesheetz_core::coord::{BORDER_INSET, MAP_CELL_PITCH};
use spritesheetz_core::{
    AttachedSheet, Brush, CellCoord, MapBrush, MapDocument, MapError, MapLayer, MapModel,
    PlacedTile, Scene, SelectionGrid, SpriteSheetModel, ToggleOutcome, VisualHandle,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of a map pointer press or drag step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapAction {
    Filled(Vec<CellCoord>),
    Cleared(CellCoord),
    Selection(ToggleOutcome),
    Ignored,
}

/// Palette view of one attached sheet: its tiles drawn at sheet pitch plus a cursor
#[derive(Debug)]
struct Palette {
    overlay: GridOverlay,
    tiles: Vec<VisualHandle>,
}

impl Palette {
    /// Palette cells share the map's pitch
    fn draw(sheet: &SpriteSheetModel, show_grid: bool, scene: &mut dyn Scene) -> Self {
        let tiles = sheet
            .tiles()
            .iter()
            .map(|(coord, tile)| {
                let (x, y) = coord.origin(MAP_CELL_PITCH);
                scene.add_image(&tile.image, (x + BORDER_INSET, y + BORDER_INSET))
            })
            .collect();
        let overlay = GridOverlay::new(
            sheet.horizontal_tiles(),
            sheet.vertical_tiles(),
            MAP_CELL_PITCH,
            Brush::PaletteTurtle,
            show_grid,
            scene,
        );
        Self { overlay, tiles }
    }

    fn remove(mut self, scene: &mut dyn Scene) {
        for handle in self.tiles.drain(..) {
            scene.remove_visual(handle);
        }
        self.overlay.remove(scene);
    }
}

/// Draw one placed cell: the source tile image when there is one to render,
/// a plain fill otherwise
fn draw_cell(
    sheets: &[AttachedSheet],
    coord: CellCoord,
    placed: &PlacedTile,
    scene: &mut dyn Scene,
) -> VisualHandle {
    let sheet = placed
        .sheet()
        .and_then(|index| sheets.get(index))
        .map(|attached| &attached.sheet);
    let rendered = match (placed, sheet) {
        (PlacedTile::ObjectTile { object, .. }, Some(sheet)) => sheet
            .objects()
            .get(object)
            .map_or(true, |object| object.render_tiles),
        _ => true,
    };
    let image = sheet
        .filter(|_| rendered)
        .zip(placed.source_tile())
        .and_then(|(sheet, tile)| sheet.tiles().get(tile));

    match image {
        Some(tile) => {
            let (x, y) = coord.origin(MAP_CELL_PITCH);
            scene.add_image(&tile.image, (x + BORDER_INSET, y + BORDER_INSET))
        }
        None => scene.add_rect(coord.scene_rect(MAP_CELL_PITCH), Brush::TileFill),
    }
}

/// Draw `cells` of a layer that have no visual yet
fn draw_cells(layer: &mut MapLayer, sheets: &[AttachedSheet], cells: &[CellCoord], scene: &mut dyn Scene) {
    if !layer.visible {
        return;
    }
    for coord in cells {
        if layer.tiles.visual(*coord).is_some() {
            continue;
        }
        if let Some(placed) = layer.tiles.get(*coord) {
            let handle = draw_cell(sheets, *coord, placed, scene);
            layer.tiles.attach_visual(*coord, handle);
        }
    }
}

/// A map being edited
#[derive(Debug)]
pub struct MapSurface {
    map: MapModel,
    selection: SelectionGrid,
    overlay: GridOverlay,
    palettes: Vec<Palette>,
    brush: MapBrush,
    file_path: Option<PathBuf>,
    dragging: bool,
}

impl MapSurface {
    /// Draw a map onto `scene` and start editing it. Palettes for sheets the
    /// map already has are drawn with [`Self::draw_palettes`].
    pub fn new(map: MapModel, show_grid: bool, scene: &mut dyn Scene) -> Self {
        let (cols, rows) = (map.cols(), map.rows());
        let overlay = GridOverlay::new(cols, rows, MAP_CELL_PITCH, Brush::Turtle, show_grid, scene);
        let mut surface = Self {
            map,
            selection: SelectionGrid::new(cols, rows, MAP_CELL_PITCH),
            overlay,
            palettes: Vec::new(),
            brush: MapBrush::Blank,
            file_path: None,
            dragging: false,
        };
        for index in 0..surface.map.layers().len() {
            surface.draw_layer(index, scene);
        }
        surface
    }

    pub fn map(&self) -> &MapModel {
        &self.map
    }

    pub fn selection(&self) -> &SelectionGrid {
        &self.selection
    }

    pub fn overlay(&self) -> &GridOverlay {
        &self.overlay
    }

    pub fn brush(&self) -> &MapBrush {
        &self.brush
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.map.name = name.into();
    }

    fn draw_layer(&mut self, index: usize, scene: &mut dyn Scene) {
        if let Some((layer, sheets)) = self.map.layer_with_sheets_mut(index) {
            let cells = layer.tiles.occupied_cells();
            draw_cells(layer, sheets, &cells, scene);
        }
    }

    /// Replace the brush used by fills
    pub fn set_brush(&mut self, brush: MapBrush) {
        debug!("Map brush set to {:?}", brush);
        self.brush = brush;
    }

    pub fn pointer_press(&mut self, event: &PointerEvent, scene: &mut dyn Scene) -> MapAction {
        match event.button {
            Some(PointerButton::Left) => {
                self.dragging = true;
                self.paint_at(event, scene)
            }
            Some(PointerButton::Middle) => self.select_at(event.x, event.y, scene),
            _ => MapAction::Ignored,
        }
    }

    /// Track the pointer; while the left button is held keep painting or erasing
    pub fn pointer_move(&mut self, event: &PointerEvent, scene: &mut dyn Scene) -> MapAction {
        self.overlay.move_turtle(event.x, event.y, scene);
        if !self.dragging {
            return MapAction::Ignored;
        }
        self.paint_at(event, scene)
    }

    pub fn pointer_release(&mut self, _event: &PointerEvent) {
        self.dragging = false;
    }

    /// Fill with the current brush, or erase while control is held
    fn paint_at(&mut self, event: &PointerEvent, scene: &mut dyn Scene) -> MapAction {
        let Some(coord) = self.overlay.resolve(event.x, event.y) else {
            return MapAction::Ignored;
        };
        if event.modifiers.control {
            return match self.clear_cell(coord, scene) {
                Some(_) => MapAction::Cleared(coord),
                None => MapAction::Ignored,
            };
        }

        let brush = self.brush.clone();
        let filled = self.fill_cell(coord, &brush, scene);
        if filled.is_empty() {
            MapAction::Ignored
        } else {
            MapAction::Filled(filled)
        }
    }

    /// Place `brush` with its anchor at `coord` on the current layer and draw it
    pub fn fill_cell(&mut self, coord: CellCoord, brush: &MapBrush, scene: &mut dyn Scene) -> Vec<CellCoord> {
        let filled = self.map.place(brush, coord);
        let current = self.map.current_layer_index();
        if let Some((layer, sheets)) = self.map.layer_with_sheets_mut(current) {
            draw_cells(layer, sheets, &filled, scene);
        }
        filled
    }

    /// Clear a cell of the current layer along with its selection mark
    pub fn clear_cell(&mut self, coord: CellCoord, scene: &mut dyn Scene) -> Option<PlacedTile> {
        if self.selection.is_selected(coord) {
            self.selection
                .toggle_cell(&self.map.current_layer().tiles, coord, true, scene);
        }
        self.map.clear(coord, scene)
    }

    /// Toggle the selection of an occupied cell of the current layer
    pub fn select_at(&mut self, x: f32, y: f32, scene: &mut dyn Scene) -> MapAction {
        let Some(coord) = self.overlay.resolve(x, y) else {
            return MapAction::Ignored;
        };
        let outcome = self
            .selection
            .toggle_cell(&self.map.current_layer().tiles, coord, true, scene);
        MapAction::Selection(outcome)
    }

    /// Clear every selected cell of the current layer
    pub fn delete_press(&mut self, scene: &mut dyn Scene) -> Vec<CellCoord> {
        let cells = self.selection.take_selection(scene);
        for coord in &cells {
            self.map.clear(*coord, scene);
        }
        if !cells.is_empty() {
            info!("Cleared {} cell(s) on layer '{}'", cells.len(), self.map.current_layer().name);
        }
        cells
    }

    pub fn clear_selection(&mut self, scene: &mut dyn Scene) {
        self.selection.unselect_all(scene);
    }

    /// Append a layer and return its index
    pub fn add_layer(&mut self, name: impl Into<String>) -> usize {
        self.map.add_layer(name);
        self.map.layers().len() - 1
    }

    /// Switch the edit target. The selection belongs to the previous layer and is dropped.
    pub fn select_layer(&mut self, index: usize, scene: &mut dyn Scene) -> Result<(), MapError> {
        self.map.select_layer(index)?;
        self.selection.unselect_all(scene);
        Ok(())
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> Result<(), MapError> {
        self.map.rename_layer(index, name)
    }

    pub fn remove_layer(&mut self, index: usize, scene: &mut dyn Scene) -> Result<MapLayer, MapError> {
        let was_current = index == self.map.current_layer_index();
        let removed = self.map.remove_layer(index, scene)?;
        if was_current {
            self.selection.unselect_all(scene);
        }
        Ok(removed)
    }

    /// Show or hide a layer's visuals
    pub fn set_layer_visible(
        &mut self,
        index: usize,
        visible: bool,
        scene: &mut dyn Scene,
    ) -> Result<(), MapError> {
        let layer = self
            .map
            .layer_mut(index)
            .ok_or(MapError::LayerOutOfRange(index))?;
        if layer.visible == visible {
            return Ok(());
        }
        layer.visible = visible;
        if visible {
            self.draw_layer(index, scene);
        } else {
            layer.tiles.detach_visuals(scene);
        }
        Ok(())
    }

    /// Attach a sheet and draw it as a palette onto `palette_scene`
    pub fn attach_sheet(
        &mut self,
        path: impl Into<PathBuf>,
        sheet: SpriteSheetModel,
        show_grid: bool,
        palette_scene: &mut dyn Scene,
    ) -> Result<usize, MapError> {
        let index = self.map.attach_sprite_sheet(path, sheet)?;
        if let Some(sheet) = self.map.sheet(index) {
            self.palettes.push(Palette::draw(sheet, show_grid, palette_scene));
        }
        Ok(index)
    }

    /// Draw palettes for the sheets the map was loaded with, one scene per sheet
    pub fn draw_palettes<S: Scene>(&mut self, show_grid: bool, scenes: &mut [S]) {
        self.palettes = self
            .map
            .sheets()
            .iter()
            .zip(scenes.iter_mut())
            .map(|(attached, scene)| Palette::draw(&attached.sheet, show_grid, scene))
            .collect();
    }

    /// Detach a sheet, clearing every cell placed from it. The brush follows
    /// the index shift and falls back to blank when it used the detached sheet.
    pub fn detach_sheet(
        &mut self,
        index: usize,
        scene: &mut dyn Scene,
        palette_scene: &mut dyn Scene,
    ) -> Result<PathBuf, MapError> {
        let detached = self.map.detach_sprite_sheet(index, scene)?;
        if index < self.palettes.len() {
            self.palettes.remove(index).remove(palette_scene);
        }

        self.brush = match std::mem::take(&mut self.brush) {
            MapBrush::Tile { sheet, .. } | MapBrush::Object { sheet, .. } if sheet == index => {
                MapBrush::Blank
            }
            MapBrush::Tile { sheet, tile } if sheet > index => MapBrush::Tile {
                sheet: sheet - 1,
                tile,
            },
            MapBrush::Object { sheet, key } if sheet > index => MapBrush::Object {
                sheet: sheet - 1,
                key,
            },
            brush => brush,
        };

        // Marks may sit on cells that were just cleared
        self.selection.unselect_all(scene);
        Ok(detached.path)
    }

    /// Move a palette's cursor
    pub fn palette_pointer_move(
        &mut self,
        index: usize,
        x: f32,
        y: f32,
        palette_scene: &mut dyn Scene,
    ) -> Option<CellCoord> {
        let palette = self.palettes.get_mut(index)?;
        Some(palette.overlay.move_turtle(x, y, palette_scene))
    }

    /// Pick the brush from a palette position.
    ///
    /// A cell owned by an object picks the whole object; any other occupied
    /// cell picks that single tile.
    pub fn palette_pick(&mut self, index: usize, x: f32, y: f32) -> Option<&MapBrush> {
        let coord = self.palettes.get(index)?.overlay.resolve(x, y)?;
        let sheet = self.map.sheet(index)?;

        let brush = match sheet.objects().lookup(coord) {
            Some(object) => MapBrush::Object {
                sheet: index,
                key: object.key.clone(),
            },
            None if sheet.tiles().is_occupied(coord) => MapBrush::Tile {
                sheet: index,
                tile: coord,
            },
            None => return None,
        };
        self.set_brush(brush);
        Some(&self.brush)
    }

    pub fn set_grid_visible(&mut self, visible: bool, scene: &mut dyn Scene) {
        self.overlay.set_grid_visible(visible, scene);
    }

    pub fn set_palette_grid_visible(&mut self, index: usize, visible: bool, palette_scene: &mut dyn Scene) {
        if let Some(palette) = self.palettes.get_mut(index) {
            palette.overlay.set_grid_visible(visible, palette_scene);
        }
    }

    pub fn to_document(&self) -> MapDocument {
        self.map.to_document()
    }

    /// Remove everything this surface drew on the map scene
    pub fn close(&mut self, scene: &mut dyn Scene) {
        self.selection.unselect_all(scene);
        for index in 0..self.map.layers().len() {
            if let Some(layer) = self.map.layer_mut(index) {
                layer.tiles.detach_visuals(scene);
            }
        }
        self.overlay.remove(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use image::{DynamicImage, RgbaImage};
    use spritesheetz_core::{ObjectEdit, RecordedScene, Visual};

    const PITCH: f32 = MAP_CELL_PITCH;

    /// 4x4 sheet with a 2x2 object in the top-left corner
    fn sheet() -> SpriteSheetModel {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(64, 64));
        let mut sheet = SpriteSheetModel::from_image("forest.png", &image, 16, 16).unwrap();
        sheet
            .objects_mut()
            .group(vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
            ])
            .unwrap();
        sheet
    }

    fn surface(scene: &mut RecordedScene) -> MapSurface {
        MapSurface::new(MapModel::with_size("World", 6, 6), false, scene)
    }

    fn press(col: u32, row: u32, button: PointerButton) -> PointerEvent {
        PointerEvent::button(col as f32 * PITCH + 5.0, row as f32 * PITCH + 5.0, button)
    }

    fn palette_point(col: u32, row: u32) -> (f32, f32) {
        (col as f32 * PITCH + 5.0, row as f32 * PITCH + 5.0)
    }

    #[test]
    fn test_new_map_surface() {
        let mut scene = RecordedScene::new();
        let surface = MapSurface::new(MapModel::new("World"), true, &mut scene);
        assert_eq!(scene.line_count(), 51 + 51);
        assert_eq!(surface.brush(), &MapBrush::Blank);
        assert_eq!(surface.map().current_layer().name, "ground");
    }

    #[test]
    fn test_fill_is_noop_on_occupied_cell() {
        let mut scene = RecordedScene::new();
        let mut surface = surface(&mut scene);

        let event = press(1, 1, PointerButton::Left);
        assert_eq!(
            surface.pointer_press(&event, &mut scene),
            MapAction::Filled(vec![CellCoord::new(1, 1)])
        );
        assert_eq!(surface.pointer_press(&event, &mut scene), MapAction::Ignored);
        assert_eq!(
            scene.rects(Brush::TileFill),
            vec![CellCoord::new(1, 1).scene_rect(PITCH)]
        );
    }

    #[test]
    fn test_control_click_erases() {
        let mut scene = RecordedScene::new();
        let mut surface = surface(&mut scene);

        surface.pointer_press(&press(2, 2, PointerButton::Left), &mut scene);
        let erase = press(2, 2, PointerButton::Left).with_modifiers(Modifiers::CONTROL);
        assert_eq!(
            surface.pointer_press(&erase, &mut scene),
            MapAction::Cleared(CellCoord::new(2, 2))
        );
        assert!(scene.rects(Brush::TileFill).is_empty());
        assert_eq!(surface.pointer_press(&erase, &mut scene), MapAction::Ignored);
    }

    #[test]
    fn test_drag_paints_until_release() {
        let mut scene = RecordedScene::new();
        let mut surface = surface(&mut scene);

        let start = press(0, 0, PointerButton::Left);
        surface.pointer_press(&start, &mut scene);
        for col in 1..3 {
            let step = PointerEvent::moved(col as f32 * PITCH + 5.0, 5.0);
            surface.pointer_move(&step, &mut scene);
        }
        surface.pointer_release(&start);
        surface.pointer_move(&PointerEvent::moved(3.0 * PITCH + 5.0, 5.0), &mut scene);

        assert_eq!(surface.map().current_layer().tiles.len(), 3);
        assert_eq!(surface.overlay().turtle_cell(), CellCoord::new(3, 0));

        // Outside the map nothing is painted and the turtle clamps
        surface.pointer_press(&PointerEvent::button(-20.0, 5.0, PointerButton::Left), &mut scene);
        assert_eq!(surface.map().current_layer().tiles.len(), 3);
    }

    #[test]
    fn test_palette_pick_and_place_object() {
        let mut scene = RecordedScene::new();
        let mut palette_scene = RecordedScene::new();
        let mut surface = surface(&mut scene);

        assert_eq!(surface.attach_sheet("forest.json", sheet(), false, &mut palette_scene), Ok(0));
        assert_eq!(palette_scene.image_count(), 16);

        let (x, y) = palette_point(3, 3);
        assert_eq!(
            surface.palette_pick(0, x, y),
            Some(&MapBrush::Tile {
                sheet: 0,
                tile: CellCoord::new(3, 3)
            })
        );
        let (x, y) = palette_point(1, 1);
        assert_eq!(
            surface.palette_pick(0, x, y).cloned(),
            Some(MapBrush::Object {
                sheet: 0,
                key: "object_1".to_string()
            })
        );
        assert!(surface.palette_pick(0, -5.0, 0.0).is_none());
        assert!(surface.palette_pick(3, 0.0, 0.0).is_none());

        // Bottom-left origin: the clicked cell is the object's bottom-left corner
        let action = surface.pointer_press(&press(2, 3, PointerButton::Left), &mut scene);
        assert_eq!(
            action,
            MapAction::Filled(vec![
                CellCoord::new(2, 2),
                CellCoord::new(2, 3),
                CellCoord::new(3, 2),
                CellCoord::new(3, 3),
            ])
        );
        assert_eq!(scene.image_count(), 4);
    }

    #[test]
    fn test_palette_uses_map_pitch() {
        let mut scene = RecordedScene::new();
        let mut palette_scene = RecordedScene::new();
        let mut surface = surface(&mut scene);
        surface.attach_sheet("forest.json", sheet(), true, &mut palette_scene).unwrap();

        let palette = &surface.palettes[0];
        assert_eq!(palette.overlay.pitch(), PITCH);
        let offsets: Vec<_> = palette
            .tiles
            .iter()
            .filter_map(|handle| match palette_scene.get(*handle) {
                Some(Visual::Image { offset, .. }) => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(offsets.len(), 16);
        assert!(offsets.contains(&(1.0, 1.0)));
        assert!(offsets.contains(&(1.0 + 3.0 * PITCH, 1.0 + 2.0 * PITCH)));

        // Just left of the fourth column at 102 is still inside the third
        assert_eq!(
            surface.palette_pick(0, 3.0 * PITCH - 0.5, 3.0 * PITCH + 5.0),
            Some(&MapBrush::Tile {
                sheet: 0,
                tile: CellCoord::new(2, 3)
            })
        );
    }

    #[test]
    fn test_unrendered_object_draws_fill() {
        let mut scene = RecordedScene::new();
        let mut palette_scene = RecordedScene::new();
        let mut surface = surface(&mut scene);
        let mut sheet = sheet();
        sheet
            .objects_mut()
            .apply_edit("object_1", ObjectEdit::RenderTiles(false))
            .unwrap();
        surface.attach_sheet("forest.json", sheet, false, &mut palette_scene).unwrap();

        let brush = MapBrush::Object {
            sheet: 0,
            key: "object_1".to_string(),
        };
        surface.fill_cell(CellCoord::new(0, 1), &brush, &mut scene);
        assert_eq!(scene.image_count(), 0);
        assert_eq!(scene.rects(Brush::TileFill).len(), 4);
    }

    #[test]
    fn test_middle_select_and_delete() {
        let mut scene = RecordedScene::new();
        let mut surface = surface(&mut scene);
        surface.pointer_press(&press(1, 1, PointerButton::Left), &mut scene);
        surface.pointer_press(&press(2, 2, PointerButton::Left), &mut scene);
        surface.pointer_release(&press(2, 2, PointerButton::Left));

        assert_eq!(
            surface.pointer_press(&press(1, 1, PointerButton::Middle), &mut scene),
            MapAction::Selection(ToggleOutcome::Selected)
        );
        assert_eq!(
            surface.pointer_press(&press(4, 4, PointerButton::Middle), &mut scene),
            MapAction::Selection(ToggleOutcome::Ignored)
        );

        assert_eq!(surface.delete_press(&mut scene), vec![CellCoord::new(1, 1)]);
        let tiles = &surface.map().current_layer().tiles;
        assert!(!tiles.is_occupied(CellCoord::new(1, 1)));
        assert!(tiles.is_occupied(CellCoord::new(2, 2)));
        assert!(scene.rects(Brush::CellHighlight).is_empty());
        assert_eq!(scene.rects(Brush::TileFill).len(), 1);
    }

    #[test]
    fn test_erasing_selected_cell_drops_mark() {
        let mut scene = RecordedScene::new();
        let mut surface = surface(&mut scene);
        surface.pointer_press(&press(1, 1, PointerButton::Left), &mut scene);
        surface.pointer_press(&press(1, 1, PointerButton::Middle), &mut scene);
        surface.clear_cell(CellCoord::new(1, 1), &mut scene);
        assert!(surface.selection().is_empty());
        assert!(scene.rects(Brush::CellHighlight).is_empty());
    }

    #[test]
    fn test_layers_and_visibility() {
        let mut scene = RecordedScene::new();
        let mut surface = surface(&mut scene);
        surface.pointer_press(&press(0, 0, PointerButton::Left), &mut scene);
        surface.pointer_press(&press(0, 0, PointerButton::Middle), &mut scene);

        let decor = surface.add_layer("decor");
        surface.select_layer(decor, &mut scene).unwrap();
        assert!(surface.selection().is_empty());

        // Same cell, different layer
        assert_eq!(
            surface.pointer_press(&press(0, 0, PointerButton::Left), &mut scene),
            MapAction::Filled(vec![CellCoord::new(0, 0)])
        );
        assert_eq!(scene.rects(Brush::TileFill).len(), 2);

        surface.set_layer_visible(0, false, &mut scene).unwrap();
        assert_eq!(scene.rects(Brush::TileFill).len(), 1);
        surface.set_layer_visible(0, true, &mut scene).unwrap();
        assert_eq!(scene.rects(Brush::TileFill).len(), 2);

        surface.rename_layer(decor, "props").unwrap();
        let removed = surface.remove_layer(decor, &mut scene).unwrap();
        assert_eq!(removed.name, "props");
        assert_eq!(scene.rects(Brush::TileFill).len(), 1);
        assert_eq!(surface.remove_layer(0, &mut scene).unwrap_err(), MapError::LastLayer);
    }

    #[test]
    fn test_detach_sheet() {
        let mut scene = RecordedScene::new();
        let mut first_palette = RecordedScene::new();
        let mut second_palette = RecordedScene::new();
        let mut surface = surface(&mut scene);

        surface.attach_sheet("a.json", sheet(), true, &mut first_palette).unwrap();
        surface.attach_sheet("b.json", sheet(), true, &mut second_palette).unwrap();
        assert_eq!(
            surface.attach_sheet("a.json", sheet(), true, &mut first_palette),
            Err(MapError::SheetAlreadyAttached(PathBuf::from("a.json")))
        );

        let from_first = MapBrush::Tile {
            sheet: 0,
            tile: CellCoord::new(3, 3),
        };
        surface.fill_cell(CellCoord::new(0, 0), &from_first, &mut scene);
        let (x, y) = palette_point(2, 2);
        surface.palette_pick(1, x, y);
        surface.pointer_press(&press(5, 5, PointerButton::Left), &mut scene);
        assert_eq!(scene.image_count(), 2);

        let path = surface.detach_sheet(0, &mut scene, &mut first_palette).unwrap();
        assert_eq!(path, PathBuf::from("a.json"));
        assert!(first_palette.is_empty());
        assert_eq!(scene.image_count(), 1);
        assert_eq!(
            surface.brush(),
            &MapBrush::Tile {
                sheet: 0,
                tile: CellCoord::new(2, 2)
            }
        );
        assert_eq!(
            surface.map().current_layer().tiles.get(CellCoord::new(5, 5)).and_then(PlacedTile::sheet),
            Some(0)
        );
    }

    #[test]
    fn test_restored_map_is_drawn() {
        let mut model = MapModel::with_size("World", 4, 4);
        model.attach_sprite_sheet("forest.json", sheet()).unwrap();
        model.place(
            &MapBrush::Tile {
                sheet: 0,
                tile: CellCoord::new(2, 2),
            },
            CellCoord::new(1, 1),
        );
        model.place(&MapBrush::Blank, CellCoord::new(3, 3));

        let mut scene = RecordedScene::new();
        let mut palettes = vec![RecordedScene::new()];
        let mut surface = MapSurface::new(model, false, &mut scene);
        surface.draw_palettes(false, &mut palettes);

        assert_eq!(scene.image_count(), 1);
        assert_eq!(scene.rects(Brush::TileFill).len(), 1);
        assert_eq!(palettes[0].image_count(), 16);
        let (x, y) = palette_point(1, 3);
        assert_eq!(surface.palette_pointer_move(0, x, y, &mut palettes[0]), Some(CellCoord::new(1, 3)));

        surface.close(&mut scene);
        assert!(scene.is_empty());
    }
}
