//! Core data structures for the SpriteSheetz editor
//!
//! This crate provides the grid/object model shared by the sprite-sheet and
//! map editing surfaces:
//! - `coord` - Scene position to grid cell mapping (with clamping)
//! - `Grid` - Generic cell grid used for tile content and selection marks
//! - `SelectionGrid` - Per-cell and object-region selection
//! - `SpriteObject` / `SpriteObjectRegistry` - Named groups of tiles
//! - `SpriteSheetModel` - A sliced sprite-sheet image plus its objects
//! - `MapModel` - Layered tile map with attached sprite sheets
//! - `Document` - JSON project file format for sheets and maps
//! - `Scene` - The rendering collaborator the grids keep in sync

pub mod coord;
mod document;
mod grid;
mod map;
mod object;
mod scene;
mod selection;
mod sheet;

pub use coord::{CellCoord, CellRect};
pub use document::{Document, DocumentError, DocumentKind, LayerDocument, MapDocument, PlacedCell, SheetDocument};
pub use grid::{Cell, Grid};
pub use map::{
    AttachedSheet, MapBrush, MapError, MapLayer, MapModel, PlacedTile, DEFAULT_LAYER_NAME,
    DEFAULT_MAP_NAME, DEFAULT_MAP_SIZE, MAX_MAP_SIZE,
};
pub use object::{
    derive_key, HitBox, HitBoxType, InvalidEnumValue, ObjectEdit, ObjectError, ObjectField,
    OriginMode, SpriteObject, SpriteObjectRegistry,
};
pub use scene::{Brush, RecordedScene, Rect, Scene, Visual, VisualHandle};
pub use selection::{RegionSelection, SelectionGrid, ToggleOutcome};
pub use sheet::{
    SheetError, SheetProperties, SheetTile, SpriteSheetModel, DEFAULT_SHEET_NAME,
    DEFAULT_TILE_SIZE,
};
