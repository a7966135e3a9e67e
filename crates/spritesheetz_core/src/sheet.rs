//! Sprite sheet model - one source image sliced into a tile lattice

use crate::coord::{BORDER_INSET, SHEET_CELL_PITCH};
use crate::{CellCoord, DocumentError, Grid, Scene, SheetDocument, SpriteObjectRegistry};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Tile size used when none is given
pub const DEFAULT_TILE_SIZE: u32 = 16;
/// Name of a freshly created sheet
pub const DEFAULT_SHEET_NAME: &str = "Untitled sprite sheet";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Could not load image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Tile size must be non-zero, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
    #[error("Image {0:?} has no pixels")]
    EmptyImage(PathBuf),
}

/// One sliced tile, scaled to the on-screen cell size
#[derive(Debug, Clone)]
pub struct SheetTile {
    pub image: RgbaImage,
    /// Top-left scene position the image is drawn at
    pub offset: (f32, f32),
}

/// Read-only summary shown in the sheet property panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetProperties {
    pub name: String,
    pub sprite_filename: String,
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub horizontal_tiles: u32,
    pub vertical_tiles: u32,
}

/// A sliced sprite sheet and the objects grouped on it
#[derive(Debug, Clone)]
pub struct SpriteSheetModel {
    pub name: String,
    sprite_file: PathBuf,
    tile_width: u32,
    tile_height: u32,
    width: u32,
    height: u32,
    tiles: Grid<SheetTile>,
    objects: SpriteObjectRegistry,
}

impl SpriteSheetModel {
    /// Load an image file and slice it into `tile_width x tile_height` tiles
    pub fn load_from_image(
        path: impl AsRef<Path>,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| SheetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(path, &image, tile_width, tile_height)
    }

    /// Slice an already decoded image. `path` is recorded as the sprite file.
    ///
    /// Every lattice cell is populated; tiles running past the image edge are
    /// padded with transparency before scaling.
    pub fn from_image(
        path: impl Into<PathBuf>,
        image: &DynamicImage,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, SheetError> {
        let path = path.into();
        if tile_width == 0 || tile_height == 0 {
            return Err(SheetError::ZeroTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(SheetError::EmptyImage(path));
        }

        let horizontal_tiles = width.div_ceil(tile_width);
        let vertical_tiles = height.div_ceil(tile_height);
        let source = image.to_rgba8();
        let cell_size = (SHEET_CELL_PITCH - 2.0 * BORDER_INSET) as u32;

        let mut tiles = Grid::new(horizontal_tiles, vertical_tiles);
        for col in 0..horizontal_tiles {
            for row in 0..vertical_tiles {
                let x = col * tile_width;
                let y = row * tile_height;
                let cropped = imageops::crop_imm(
                    &source,
                    x,
                    y,
                    tile_width.min(width - x),
                    tile_height.min(height - y),
                )
                .to_image();

                let mut padded = RgbaImage::new(tile_width, tile_height);
                imageops::replace(&mut padded, &cropped, 0, 0);

                let offset = (
                    BORDER_INSET + col as f32 * SHEET_CELL_PITCH,
                    BORDER_INSET + row as f32 * SHEET_CELL_PITCH,
                );
                tiles.put(
                    CellCoord::new(col, row),
                    SheetTile {
                        image: imageops::resize(&padded, cell_size, cell_size, FilterType::Nearest),
                        offset,
                    },
                );
            }
        }

        info!(
            "Sliced {:?} ({}x{}) into {}x{} tiles of {}x{}",
            path, width, height, horizontal_tiles, vertical_tiles, tile_width, tile_height
        );

        Ok(Self {
            name: DEFAULT_SHEET_NAME.to_string(),
            sprite_file: path,
            tile_width,
            tile_height,
            width,
            height,
            tiles,
            objects: SpriteObjectRegistry::new(),
        })
    }

    pub fn sprite_file(&self) -> &Path {
        &self.sprite_file
    }

    /// File name component of the sprite file
    pub fn sprite_filename(&self) -> String {
        self.sprite_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// Source image size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn horizontal_tiles(&self) -> u32 {
        self.tiles.width()
    }

    pub fn vertical_tiles(&self) -> u32 {
        self.tiles.height()
    }

    pub fn tiles(&self) -> &Grid<SheetTile> {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut Grid<SheetTile> {
        &mut self.tiles
    }

    pub fn objects(&self) -> &SpriteObjectRegistry {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut SpriteObjectRegistry {
        &mut self.objects
    }

    /// Tiles grid and object registry borrowed together
    pub fn parts_mut(&mut self) -> (&mut Grid<SheetTile>, &mut SpriteObjectRegistry) {
        (&mut self.tiles, &mut self.objects)
    }

    pub fn properties(&self) -> SheetProperties {
        SheetProperties {
            name: self.name.clone(),
            sprite_filename: self.sprite_filename(),
            width: self.width,
            height: self.height,
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            horizontal_tiles: self.horizontal_tiles(),
            vertical_tiles: self.vertical_tiles(),
        }
    }

    /// Draw every tile that is not on the scene yet
    pub fn draw_tiles(&mut self, scene: &mut dyn Scene) {
        for coord in self.tiles.occupied_cells() {
            if self.tiles.visual(coord).is_some() {
                continue;
            }
            if let Some(tile) = self.tiles.get(coord) {
                let handle = scene.add_image(&tile.image, tile.offset);
                self.tiles.attach_visual(coord, handle);
            }
        }
    }

    /// Save state as a project document
    pub fn to_document(&self) -> SheetDocument {
        SheetDocument {
            name: self.name.clone(),
            sprite_file: self.sprite_file.clone(),
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            width: self.width,
            height: self.height,
            items: self
                .objects
                .iter()
                .map(|object| (object.key.clone(), object.to_saved()))
                .collect(),
        }
    }

    /// Reload the sheet image named by a document and restore its objects
    pub fn from_document(document: &SheetDocument) -> Result<Self, DocumentError> {
        Self::from_document_at(document, &document.sprite_file)
    }

    /// Like [`Self::from_document`], reading the image from `image_path`
    /// instead of the stored sprite file path
    pub fn from_document_at(document: &SheetDocument, image_path: &Path) -> Result<Self, DocumentError> {
        let image = image::open(image_path).map_err(|source| SheetError::Image {
            path: image_path.to_path_buf(),
            source,
        })?;
        Self::from_document_with_image(document, &image)
    }

    /// Restore a document against an already decoded image
    pub fn from_document_with_image(
        document: &SheetDocument,
        image: &DynamicImage,
    ) -> Result<Self, DocumentError> {
        let mut sheet = Self::from_image(
            document.sprite_file.clone(),
            image,
            document.tile_width,
            document.tile_height,
        )?;
        sheet.name = document.name.clone();

        if (sheet.width, sheet.height) != (document.width, document.height) {
            warn!(
                "Sheet '{}' image is {}x{} but the document recorded {}x{}",
                document.name, sheet.width, sheet.height, document.width, document.height
            );
        }

        for object in document.items.values() {
            if let Some(cell) = object.tiles.iter().find(|cell| !sheet.tiles.contains(**cell)) {
                return Err(DocumentError::TileOutOfBounds {
                    key: object.key.clone(),
                    cell: *cell,
                });
            }
            let mut object = object.clone();
            if object.has_collision && object.hit_box.is_none() {
                object.set_has_collision(true);
            }
            sheet.objects.insert(object)?;
        }

        Ok(sheet)
    }
}
