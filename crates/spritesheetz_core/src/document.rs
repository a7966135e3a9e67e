//! JSON project file format
//!
//! A project file holds either a sprite sheet or a map, discriminated by a
//! top-level `"type"` field of `"sheet"` or `"map"`. The same objects are
//! used for the per-tab session state.

use crate::{CellCoord, MapError, ObjectError, PlacedTile, SheetError, SpriteObject};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding or restoring a document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sheet(#[from] SheetError),
    #[error(transparent)]
    Object(#[from] ObjectError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error("Object '{key}' references tile {cell} outside the sheet")]
    TileOutOfBounds { key: String, cell: CellCoord },
    #[error("Layer '{layer}' has a tile at {cell} outside the map")]
    CellOutOfBounds { layer: String, cell: CellCoord },
    #[error("Layer '{layer}' references sprite sheet {sheet}, which is not attached")]
    UnknownSheet { layer: String, sheet: usize },
}

/// Which kind of document a file or tab holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Sheet,
    Map,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Sheet => write!(f, "sprite sheet"),
            DocumentKind::Map => write!(f, "map"),
        }
    }
}

/// Saved state of a sprite sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDocument {
    pub name: String,
    pub sprite_file: PathBuf,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Image size in pixels
    pub width: u32,
    pub height: u32,
    /// Objects keyed by object key, in insertion order
    #[serde(default)]
    pub items: IndexMap<String, SpriteObject>,
}

/// One occupied map cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub cell: CellCoord,
    pub tile: PlacedTile,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDocument {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Occupied cells only
    #[serde(default)]
    pub tiles: Vec<PlacedCell>,
}

/// Saved state of a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Map size in cells
    pub width: u32,
    pub height: u32,
    /// Attached sprite-sheet project files, by index
    #[serde(default)]
    pub sprite_sheets: Vec<PathBuf>,
    #[serde(default)]
    pub layers: Vec<LayerDocument>,
}

/// A project file or tab state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Document {
    Sheet(SheetDocument),
    Map(MapDocument),
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> &str {
        match self {
            Document::Sheet(sheet) => &sheet.name,
            Document::Map(map) => &map.name,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Sheet(_) => DocumentKind::Sheet,
            Document::Map(_) => DocumentKind::Map,
        }
    }
}

impl From<SheetDocument> for Document {
    fn from(document: SheetDocument) -> Self {
        Document::Sheet(document)
    }
}

impl From<MapDocument> for Document {
    fn from(document: MapDocument) -> Self {
        Document::Map(document)
    }
}
