//! Tile map with layers and attached sprite sheets

use crate::{
    CellCoord, DocumentError, Grid, LayerDocument, MapDocument, PlacedCell, Scene,
    SpriteSheetModel, DEFAULT_TILE_SIZE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Rows and columns of a new map
pub const DEFAULT_MAP_SIZE: u32 = 50;
/// Layer every new map starts with
pub const DEFAULT_LAYER_NAME: &str = "ground";
pub const DEFAULT_MAP_NAME: &str = "Untitled map";
/// Largest row or column count a map file may declare
pub const MAX_MAP_SIZE: u32 = 1024;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("Sprite sheet {0:?} is already attached to this map")]
    SheetAlreadyAttached(PathBuf),
    #[error("No sprite sheet at index {0}")]
    SheetOutOfRange(usize),
    #[error("No layer at index {0}")]
    LayerOutOfRange(usize),
    #[error("A map needs at least one layer")]
    LastLayer,
    #[error("Map size {cols}x{rows} must be between 1 and {MAX_MAP_SIZE} cells per side")]
    InvalidSize { cols: u32, rows: u32 },
}

/// Content of one map cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlacedTile {
    /// Painted without a sheet tile picked
    Blank,
    /// A single tile of an attached sheet
    SheetTile { sheet: usize, tile: CellCoord },
    /// One tile of a sprite object placed as a whole
    ObjectTile {
        sheet: usize,
        object: String,
        tile: CellCoord,
    },
}

impl PlacedTile {
    /// Index of the attached sheet this cell draws from
    pub fn sheet(&self) -> Option<usize> {
        match self {
            PlacedTile::Blank => None,
            PlacedTile::SheetTile { sheet, .. } | PlacedTile::ObjectTile { sheet, .. } => Some(*sheet),
        }
    }

    /// Source tile on the sheet
    pub fn source_tile(&self) -> Option<CellCoord> {
        match self {
            PlacedTile::Blank => None,
            PlacedTile::SheetTile { tile, .. } | PlacedTile::ObjectTile { tile, .. } => Some(*tile),
        }
    }

    fn sheet_mut(&mut self) -> Option<&mut usize> {
        match self {
            PlacedTile::Blank => None,
            PlacedTile::SheetTile { sheet, .. } | PlacedTile::ObjectTile { sheet, .. } => Some(sheet),
        }
    }
}

/// What a fill places on the map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MapBrush {
    #[default]
    Blank,
    Tile { sheet: usize, tile: CellCoord },
    Object { sheet: usize, key: String },
}

/// A named tile layer
#[derive(Debug, Clone)]
pub struct MapLayer {
    pub name: String,
    pub visible: bool,
    pub tiles: Grid<PlacedTile>,
}

impl MapLayer {
    pub fn new(name: impl Into<String>, cols: u32, rows: u32) -> Self {
        Self {
            name: name.into(),
            visible: true,
            tiles: Grid::new(cols, rows),
        }
    }
}

/// A sprite sheet attached to a map together with the file it came from
#[derive(Debug, Clone)]
pub struct AttachedSheet {
    pub path: PathBuf,
    pub sheet: SpriteSheetModel,
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// A layered tile map
#[derive(Debug, Clone)]
pub struct MapModel {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    cols: u32,
    rows: u32,
    layers: Vec<MapLayer>,
    sheets: Vec<AttachedSheet>,
    current_layer: usize,
}

impl Default for MapModel {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_NAME)
    }
}

impl MapModel {
    /// Create a 50x50 map with a "ground" layer
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_size(name, DEFAULT_MAP_SIZE, DEFAULT_MAP_SIZE)
    }

    pub fn with_size(name: impl Into<String>, cols: u32, rows: u32) -> Self {
        Self {
            name: name.into(),
            tile_width: DEFAULT_TILE_SIZE,
            tile_height: DEFAULT_TILE_SIZE,
            cols,
            rows,
            layers: vec![MapLayer::new(DEFAULT_LAYER_NAME, cols, rows)],
            sheets: Vec::new(),
            current_layer: 0,
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&MapLayer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut MapLayer> {
        self.layers.get_mut(index)
    }

    /// A layer borrowed mutably together with the attached sheets it draws from
    pub fn layer_with_sheets_mut(&mut self, index: usize) -> Option<(&mut MapLayer, &[AttachedSheet])> {
        let layer = self.layers.get_mut(index)?;
        Some((layer, &self.sheets))
    }

    pub fn current_layer_index(&self) -> usize {
        self.current_layer
    }

    pub fn current_layer(&self) -> &MapLayer {
        &self.layers[self.current_layer]
    }

    pub fn current_layer_mut(&mut self) -> &mut MapLayer {
        &mut self.layers[self.current_layer]
    }

    /// Append a layer sized to the map
    pub fn add_layer(&mut self, name: impl Into<String>) -> &MapLayer {
        let layer = MapLayer::new(name, self.cols, self.rows);
        info!("Added layer '{}' to map '{}'", layer.name, self.name);
        self.layers.push(layer);
        &self.layers[self.layers.len() - 1]
    }

    /// Make a layer the edit target
    pub fn select_layer(&mut self, index: usize) -> Result<(), MapError> {
        if index >= self.layers.len() {
            return Err(MapError::LayerOutOfRange(index));
        }
        self.current_layer = index;
        Ok(())
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> Result<(), MapError> {
        let layer = self
            .layers
            .get_mut(index)
            .ok_or(MapError::LayerOutOfRange(index))?;
        layer.name = name.into();
        Ok(())
    }

    /// Remove a layer and its visuals. The last remaining layer cannot be removed.
    pub fn remove_layer(&mut self, index: usize, scene: &mut dyn Scene) -> Result<MapLayer, MapError> {
        if index >= self.layers.len() {
            return Err(MapError::LayerOutOfRange(index));
        }
        if self.layers.len() == 1 {
            return Err(MapError::LastLayer);
        }
        let mut layer = self.layers.remove(index);
        layer.tiles.detach_visuals(scene);
        if self.current_layer >= self.layers.len() || self.current_layer > index {
            self.current_layer = self.current_layer.saturating_sub(1);
        }
        Ok(layer)
    }

    pub fn sheets(&self) -> &[AttachedSheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> Option<&SpriteSheetModel> {
        self.sheets.get(index).map(|attached| &attached.sheet)
    }

    /// Attach a sprite sheet loaded from `path`, returning its index.
    /// The same file cannot be attached twice.
    pub fn attach_sprite_sheet(
        &mut self,
        path: impl Into<PathBuf>,
        sheet: SpriteSheetModel,
    ) -> Result<usize, MapError> {
        let path = path.into();
        if self.sheets.iter().any(|attached| same_file(&attached.path, &path)) {
            return Err(MapError::SheetAlreadyAttached(path));
        }
        info!("Attached sprite sheet {:?} to map '{}'", path, self.name);
        self.sheets.push(AttachedSheet { path, sheet });
        Ok(self.sheets.len() - 1)
    }

    /// Detach a sheet, clearing every cell that drew from it. Later sheets
    /// move down one index.
    pub fn detach_sprite_sheet(
        &mut self,
        index: usize,
        scene: &mut dyn Scene,
    ) -> Result<AttachedSheet, MapError> {
        if index >= self.sheets.len() {
            return Err(MapError::SheetOutOfRange(index));
        }
        let removed = self.sheets.remove(index);

        for layer in &mut self.layers {
            layer
                .tiles
                .retain(|_, placed| placed.sheet() != Some(index), scene);
            for coord in layer.tiles.occupied_cells() {
                if let Some(sheet) = layer.tiles.get_mut(coord).and_then(PlacedTile::sheet_mut) {
                    if *sheet > index {
                        *sheet -= 1;
                    }
                }
            }
        }

        info!("Detached sprite sheet {:?} from map '{}'", removed.path, self.name);
        Ok(removed)
    }

    /// Cells and contents a brush covers when anchored at `anchor`.
    ///
    /// Objects are laid out from their bounding box, positioned so that the
    /// corner named by the object's origin mode lands on the anchor. Cells
    /// outside the map are dropped.
    pub fn brush_footprint(&self, brush: &MapBrush, anchor: CellCoord) -> Vec<(CellCoord, PlacedTile)> {
        match brush {
            MapBrush::Blank => vec![(anchor, PlacedTile::Blank)],
            MapBrush::Tile { sheet, tile } => vec![(
                anchor,
                PlacedTile::SheetTile {
                    sheet: *sheet,
                    tile: *tile,
                },
            )],
            MapBrush::Object { sheet, key } => {
                let Some(object) = self.sheet(*sheet).and_then(|s| s.objects().get(key)) else {
                    return Vec::new();
                };
                let Some(bounds) = object.bounds() else {
                    return Vec::new();
                };
                let (left, top) = object.origin_mode.top_left_for_anchor(
                    (i64::from(anchor.col), i64::from(anchor.row)),
                    bounds.width(),
                    bounds.height(),
                );
                object
                    .tiles
                    .iter()
                    .filter_map(|tile| {
                        let col = left + i64::from(tile.col - bounds.min.col);
                        let row = top + i64::from(tile.row - bounds.min.row);
                        let in_map = col >= 0
                            && row >= 0
                            && col < i64::from(self.cols)
                            && row < i64::from(self.rows);
                        in_map.then(|| {
                            (
                                CellCoord::new(col as u32, row as u32),
                                PlacedTile::ObjectTile {
                                    sheet: *sheet,
                                    object: object.key.clone(),
                                    tile: *tile,
                                },
                            )
                        })
                    })
                    .collect()
            }
        }
    }

    /// Place a brush on the current layer. Occupied cells are skipped;
    /// returns the cells that were filled.
    pub fn place(&mut self, brush: &MapBrush, anchor: CellCoord) -> Vec<CellCoord> {
        let footprint = self.brush_footprint(brush, anchor);
        let layer = &mut self.layers[self.current_layer];
        footprint
            .into_iter()
            .filter_map(|(coord, placed)| layer.tiles.set(coord, placed).then_some(coord))
            .collect()
    }

    /// Clear a cell of the current layer
    pub fn clear(&mut self, coord: CellCoord, scene: &mut dyn Scene) -> Option<PlacedTile> {
        self.layers[self.current_layer].tiles.clear(coord, scene)
    }

    /// Save state as a project document, including every placed cell
    pub fn to_document(&self) -> MapDocument {
        MapDocument {
            name: self.name.clone(),
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            width: self.cols,
            height: self.rows,
            sprite_sheets: self.sheets.iter().map(|attached| attached.path.clone()).collect(),
            layers: self
                .layers
                .iter()
                .map(|layer| LayerDocument {
                    name: layer.name.clone(),
                    visible: layer.visible,
                    tiles: layer
                        .tiles
                        .iter()
                        .map(|(cell, tile)| PlacedCell {
                            cell,
                            tile: tile.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a map from a document. `load_sheet` resolves each attached
    /// sprite-sheet file path to a model.
    pub fn from_document<E>(
        document: &MapDocument,
        mut load_sheet: impl FnMut(&Path) -> Result<SpriteSheetModel, E>,
    ) -> Result<Self, E>
    where
        E: From<DocumentError>,
    {
        let (cols, rows) = (document.width, document.height);
        if !(1..=MAX_MAP_SIZE).contains(&cols) || !(1..=MAX_MAP_SIZE).contains(&rows) {
            return Err(E::from(DocumentError::Map(MapError::InvalidSize { cols, rows })));
        }
        let mut map = Self::with_size(document.name.clone(), cols, rows);
        map.tile_width = document.tile_width;
        map.tile_height = document.tile_height;

        for path in &document.sprite_sheets {
            let sheet = load_sheet(path)?;
            map.attach_sprite_sheet(path.clone(), sheet)
                .map_err(|e| E::from(DocumentError::Map(e)))?;
        }

        if !document.layers.is_empty() {
            map.layers.clear();
        }
        for layer_document in &document.layers {
            let mut layer = MapLayer::new(layer_document.name.clone(), map.cols, map.rows);
            layer.visible = layer_document.visible;
            for placed in &layer_document.tiles {
                if let Some(sheet) = placed.tile.sheet() {
                    if sheet >= map.sheets.len() {
                        return Err(E::from(DocumentError::UnknownSheet {
                            layer: layer_document.name.clone(),
                            sheet,
                        }));
                    }
                }
                if !layer.tiles.contains(placed.cell) {
                    return Err(E::from(DocumentError::CellOutOfBounds {
                        layer: layer_document.name.clone(),
                        cell: placed.cell,
                    }));
                }
                layer.tiles.put(placed.cell, placed.tile.clone());
            }
            map.layers.push(layer);
        }

        Ok(map)
    }
}
