//! Sprite objects - named, keyed groups of sheet tiles with placement metadata

use crate::{CellCoord, CellRect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

/// Errors raised by the object registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjectError {
    #[error("No tiles selected")]
    EmptySelection,
    #[error("An object with key '{0}' already exists")]
    DuplicateKey(String),
    #[error("Object keys cannot be empty")]
    EmptyKey,
    #[error("No object with key '{0}'")]
    UnknownObject(String),
    #[error("Tile {cell} already belongs to object '{owner}'")]
    CellAlreadyGrouped { cell: CellCoord, owner: String },
}

/// A numeric enum tag outside its known range
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} value {value}")]
pub struct InvalidEnumValue {
    pub kind: &'static str,
    pub value: u8,
}

/// Anchor corner used when placing an object's bounding box onto a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OriginMode {
    #[default]
    BottomLeft = 0,
    TopLeft = 1,
    BottomRight = 2,
    TopRight = 3,
}

impl OriginMode {
    pub const ALL: [OriginMode; 4] = [
        OriginMode::BottomLeft,
        OriginMode::TopLeft,
        OriginMode::BottomRight,
        OriginMode::TopRight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OriginMode::BottomLeft => "Bottom Left",
            OriginMode::TopLeft => "Top Left",
            OriginMode::BottomRight => "Bottom Right",
            OriginMode::TopRight => "Top Right",
        }
    }

    /// Top-left cell of a `width x height` box whose anchor corner lands on `anchor`
    pub fn top_left_for_anchor(self, anchor: (i64, i64), width: u32, height: u32) -> (i64, i64) {
        let (col, row) = anchor;
        let right = i64::from(width) - 1;
        let bottom = i64::from(height) - 1;
        match self {
            OriginMode::BottomLeft => (col, row - bottom),
            OriginMode::TopLeft => (col, row),
            OriginMode::BottomRight => (col - right, row - bottom),
            OriginMode::TopRight => (col - right, row),
        }
    }
}

impl TryFrom<u8> for OriginMode {
    type Error = InvalidEnumValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(InvalidEnumValue {
                kind: "origin mode",
                value,
            })
    }
}

impl From<OriginMode> for u8 {
    fn from(mode: OriginMode) -> Self {
        mode as u8
    }
}

/// Collision shape kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HitBoxType {
    #[default]
    Rect = 0,
    Ellipse = 1,
    Polygon = 2,
}

impl TryFrom<u8> for HitBoxType {
    type Error = InvalidEnumValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HitBoxType::Rect),
            1 => Ok(HitBoxType::Ellipse),
            2 => Ok(HitBoxType::Polygon),
            _ => Err(InvalidEnumValue {
                kind: "hit box type",
                value,
            }),
        }
    }
}

impl From<HitBoxType> for u8 {
    fn from(kind: HitBoxType) -> Self {
        kind as u8
    }
}

/// Collision box of a sprite object, in pixels relative to the object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HitBox {
    #[serde(rename = "type", default)]
    pub kind: HitBoxType,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Polygon points, only meaningful for `HitBoxType::Polygon`
    #[serde(default)]
    pub shape: Option<Vec<[f32; 2]>>,
}

/// Derive a machine-safe key from a display name
pub fn derive_key(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

fn default_true() -> bool {
    true
}

/// A named group of sheet tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteObject {
    pub name: String,
    pub key: String,
    /// Free-text type tag
    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
    /// Occupied tiles in insertion order
    pub tiles: Vec<CellCoord>,
    #[serde(default)]
    pub origin_mode: OriginMode,
    #[serde(default = "default_true")]
    pub render_tiles: bool,
    #[serde(default)]
    pub has_collision: bool,
    /// Kept while collision is toggled off so it survives toggling back on
    #[serde(rename = "hitbox", default, skip_serializing_if = "Option::is_none")]
    pub hit_box: Option<HitBox>,
}

impl SpriteObject {
    /// Create an object; the key is derived from the name when not given
    pub fn new(name: impl Into<String>, key: Option<String>, tiles: Vec<CellCoord>) -> Self {
        let name = name.into();
        let key = key.unwrap_or_else(|| derive_key(&name));
        Self {
            name,
            key,
            object_type: None,
            tiles,
            origin_mode: OriginMode::default(),
            render_tiles: true,
            has_collision: false,
            hit_box: None,
        }
    }

    /// Bounding rectangle of the occupied tiles
    pub fn bounds(&self) -> Option<CellRect> {
        CellRect::enclosing(&self.tiles)
    }

    pub fn occupies(&self, coord: CellCoord) -> bool {
        self.tiles.contains(&coord)
    }

    /// Toggle collision, creating a default hit box the first time it is enabled
    pub fn set_has_collision(&mut self, has_collision: bool) {
        self.has_collision = has_collision;
        if has_collision && self.hit_box.is_none() {
            self.hit_box = Some(HitBox::default());
        }
    }

    /// Copy of this object as it is written to a project file: the hit box is
    /// only present while collision is enabled.
    pub fn to_saved(&self) -> SpriteObject {
        let mut saved = self.clone();
        saved.hit_box = if self.has_collision {
            Some(self.hit_box.clone().unwrap_or_default())
        } else {
            None
        };
        saved
    }
}

/// Property rows of the object panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectField {
    Name,
    Key,
    Type,
    Origin,
    ShouldRender,
    HasCollision,
}

impl ObjectField {
    pub const ROWS: [ObjectField; 6] = [
        ObjectField::Name,
        ObjectField::Key,
        ObjectField::Type,
        ObjectField::Origin,
        ObjectField::ShouldRender,
        ObjectField::HasCollision,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ObjectField::Name => "Name",
            ObjectField::Key => "Key",
            ObjectField::Type => "Type",
            ObjectField::Origin => "Origin",
            ObjectField::ShouldRender => "Should Render",
            ObjectField::HasCollision => "Has Collision",
        }
    }
}

/// A single property edit coming from the property panel
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEdit {
    Name(String),
    Key(String),
    Type(String),
    OriginMode(OriginMode),
    RenderTiles(bool),
    HasCollision(bool),
    HitBox(HitBox),
}

impl ObjectEdit {
    /// Edit for a text cell of the panel; `None` for non-text rows
    pub fn from_text(field: ObjectField, text: &str) -> Option<Self> {
        match field {
            ObjectField::Name => Some(ObjectEdit::Name(text.to_string())),
            ObjectField::Key => Some(ObjectEdit::Key(text.to_string())),
            ObjectField::Type => Some(ObjectEdit::Type(text.to_string())),
            ObjectField::Origin | ObjectField::ShouldRender | ObjectField::HasCollision => None,
        }
    }

    pub fn field(&self) -> Option<ObjectField> {
        match self {
            ObjectEdit::Name(_) => Some(ObjectField::Name),
            ObjectEdit::Key(_) => Some(ObjectField::Key),
            ObjectEdit::Type(_) => Some(ObjectField::Type),
            ObjectEdit::OriginMode(_) => Some(ObjectField::Origin),
            ObjectEdit::RenderTiles(_) => Some(ObjectField::ShouldRender),
            ObjectEdit::HasCollision(_) => Some(ObjectField::HasCollision),
            ObjectEdit::HitBox(_) => None,
        }
    }
}

/// Ordered collection of sprite objects with a cell-to-owner index
#[derive(Debug, Clone, Default)]
pub struct SpriteObjectRegistry {
    objects: Vec<SpriteObject>,
    // cell -> position in `objects`
    cell_index: HashMap<CellCoord, usize>,
}

impl SpriteObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SpriteObject> {
        self.objects.iter()
    }

    fn position(&self, key: &str) -> Option<usize> {
        let key = key.to_lowercase();
        self.objects
            .iter()
            .position(|object| object.key.to_lowercase() == key)
    }

    pub fn get(&self, key: &str) -> Option<&SpriteObject> {
        self.position(key).map(|index| &self.objects[index])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Object owning a cell, if any
    pub fn lookup(&self, coord: CellCoord) -> Option<&SpriteObject> {
        self.cell_index.get(&coord).map(|&index| &self.objects[index])
    }

    fn rebuild_index(&mut self) {
        self.cell_index.clear();
        for (index, object) in self.objects.iter().enumerate() {
            for tile in &object.tiles {
                self.cell_index.insert(*tile, index);
            }
        }
    }

    fn check_cells_free(&self, tiles: &[CellCoord]) -> Result<(), ObjectError> {
        match tiles.iter().find_map(|tile| self.lookup(*tile).map(|owner| (*tile, owner))) {
            Some((cell, owner)) => Err(ObjectError::CellAlreadyGrouped {
                cell,
                owner: owner.key.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Append an object. Keys are unique case-insensitively and a cell can
    /// belong to at most one object.
    pub fn insert(&mut self, object: SpriteObject) -> Result<&SpriteObject, ObjectError> {
        if object.key.is_empty() {
            return Err(ObjectError::EmptyKey);
        }
        if self.contains_key(&object.key) {
            return Err(ObjectError::DuplicateKey(object.key));
        }
        self.check_cells_free(&object.tiles)?;

        let index = self.objects.len();
        for tile in &object.tiles {
            self.cell_index.insert(*tile, index);
        }
        self.objects.push(object);
        Ok(&self.objects[index])
    }

    /// Default "Object N" / "object_N" pair for the next grouped object
    pub fn next_default_name(&self) -> (String, String) {
        let mut n = self.objects.len() + 1;
        while self.contains_key(&format!("object_{}", n)) {
            n += 1;
        }
        (format!("Object {}", n), format!("object_{}", n))
    }

    /// Group cells into a new object with the next default name
    pub fn group(&mut self, tiles: Vec<CellCoord>) -> Result<&SpriteObject, ObjectError> {
        if tiles.is_empty() {
            return Err(ObjectError::EmptySelection);
        }
        let (name, key) = self.next_default_name();
        info!("Grouping {} tile(s) into '{}'", tiles.len(), name);
        self.insert(SpriteObject::new(name, Some(key), tiles))
    }

    /// Apply a property edit to the object with `key`
    pub fn apply_edit(&mut self, key: &str, edit: ObjectEdit) -> Result<&SpriteObject, ObjectError> {
        let index = self
            .position(key)
            .ok_or_else(|| ObjectError::UnknownObject(key.to_string()))?;

        if let ObjectEdit::Key(new_key) = &edit {
            if new_key.is_empty() {
                return Err(ObjectError::EmptyKey);
            }
            if let Some(other) = self.position(new_key) {
                if other != index {
                    return Err(ObjectError::DuplicateKey(new_key.clone()));
                }
            }
        }

        let object = &mut self.objects[index];
        match edit {
            ObjectEdit::Name(name) => object.name = name,
            ObjectEdit::Key(key) => object.key = key,
            ObjectEdit::Type(object_type) => object.object_type = Some(object_type),
            ObjectEdit::OriginMode(mode) => object.origin_mode = mode,
            ObjectEdit::RenderTiles(render) => object.render_tiles = render,
            ObjectEdit::HasCollision(has_collision) => object.set_has_collision(has_collision),
            ObjectEdit::HitBox(hit_box) => object.hit_box = Some(hit_box),
        }
        Ok(&self.objects[index])
    }

    /// Remove an object. Its tiles are left in place.
    pub fn remove(&mut self, key: &str) -> Option<SpriteObject> {
        let index = self.position(key)?;
        let removed = self.objects.remove(index);
        self.rebuild_index();
        info!("Removed object '{}'", removed.key);
        Some(removed)
    }

    /// Remove every object owning any of `cells`
    pub fn remove_owning(&mut self, cells: &[CellCoord]) -> Vec<SpriteObject> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.objects)
            .into_iter()
            .partition(|object| cells.iter().any(|cell| object.occupies(*cell)));
        self.objects = kept;
        self.rebuild_index();
        removed
    }
}
