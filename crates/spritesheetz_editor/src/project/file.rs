//! Project file save/load operations

use super::resolve_stored_path;
use spritesheetz_core::{
    Document, DocumentError, DocumentKind, MapDocument, MapModel, SheetDocument, SpriteSheetModel,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("{path:?} holds a {found}, expected a {expected}")]
    WrongKind {
        path: PathBuf,
        expected: DocumentKind,
        found: DocumentKind,
    },
}

/// Read and parse a project file
pub fn load_document(path: &Path) -> Result<Document, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document::from_json(&content)?)
}

/// Write a project file as pretty-printed JSON
pub fn save_document(path: &Path, document: &Document) -> Result<(), ProjectError> {
    let content = document.to_json()?;
    std::fs::write(path, content).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved {} '{}' to {:?}", document.kind(), document.name(), path);
    Ok(())
}

/// Rebuild a sprite sheet from its document, reading the image it names.
/// `project_file` anchors a relative image path.
pub fn restore_sheet(
    document: &SheetDocument,
    project_file: Option<&Path>,
) -> Result<SpriteSheetModel, ProjectError> {
    let image_path = resolve_stored_path(project_file, &document.sprite_file);
    Ok(SpriteSheetModel::from_document_at(document, &image_path)?)
}

/// Rebuild a map from its document, loading every attached sheet file
pub fn restore_map(document: &MapDocument, project_file: Option<&Path>) -> Result<MapModel, ProjectError> {
    MapModel::from_document(document, |stored| {
        load_sheet(&resolve_stored_path(project_file, stored))
    })
}

/// Load a sprite-sheet project file
pub fn load_sheet(path: &Path) -> Result<SpriteSheetModel, ProjectError> {
    match load_document(path)? {
        Document::Sheet(document) => restore_sheet(&document, Some(path)),
        other => Err(ProjectError::WrongKind {
            path: path.to_path_buf(),
            expected: DocumentKind::Sheet,
            found: other.kind(),
        }),
    }
}

/// Load a map project file
pub fn load_map(path: &Path) -> Result<MapModel, ProjectError> {
    match load_document(path)? {
        Document::Map(document) => restore_map(&document, Some(path)),
        other => Err(ProjectError::WrongKind {
            path: path.to_path_buf(),
            expected: DocumentKind::Map,
            found: other.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use spritesheetz_core::{CellCoord, MapBrush, MapError, PlacedTile};
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("spritesheetz_project_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Sheet file next to its image, both in `dir`, using a relative image path
    fn write_sheet(dir: &Path) -> PathBuf {
        RgbaImage::new(32, 48).save(dir.join("forest.png")).unwrap();
        let mut sheet = SpriteSheetModel::load_from_image(dir.join("forest.png"), 16, 16).unwrap();
        sheet.name = "Forest".to_string();
        sheet
            .objects_mut()
            .group(vec![CellCoord::new(1, 1), CellCoord::new(1, 2)])
            .unwrap();

        let mut document = sheet.to_document();
        document.sprite_file = PathBuf::from("forest.png");
        let path = dir.join("forest.json");
        save_document(&path, &Document::Sheet(document)).unwrap();
        path
    }

    #[test]
    fn test_sheet_round_trip_with_relative_image() {
        let dir = temp_dir();
        let path = write_sheet(&dir);

        let sheet = load_sheet(&path).unwrap();
        assert_eq!(sheet.name, "Forest");
        assert_eq!((sheet.horizontal_tiles(), sheet.vertical_tiles()), (2, 3));
        assert!(sheet.objects().lookup(CellCoord::new(1, 2)).is_some());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_map_round_trip_resolves_sheets() {
        let dir = temp_dir();
        let sheet_path = write_sheet(&dir);

        let mut map = MapModel::with_size("World", 10, 10);
        map.attach_sprite_sheet("forest.json", load_sheet(&sheet_path).unwrap())
            .unwrap();
        map.place(
            &MapBrush::Object {
                sheet: 0,
                key: "object_1".to_string(),
            },
            CellCoord::new(4, 4),
        );
        let map_path = dir.join("world.json");
        save_document(&map_path, &Document::Map(map.to_document())).unwrap();

        let loaded = load_map(&map_path).unwrap();
        assert_eq!(loaded.sheets().len(), 1);
        assert_eq!(loaded.sheets()[0].path, PathBuf::from("forest.json"));
        assert!(matches!(
            loaded.current_layer().tiles.get(CellCoord::new(4, 3)),
            Some(PlacedTile::ObjectTile { .. })
        ));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_wrong_kind() {
        let dir = temp_dir();
        let path = dir.join("world.json");
        save_document(&path, &Document::Map(MapModel::new("World").to_document())).unwrap();

        let err = load_sheet(&path).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::WrongKind {
                expected: DocumentKind::Sheet,
                found: DocumentKind::Map,
                ..
            }
        ));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = temp_dir();
        assert!(matches!(
            load_document(&dir.join("missing.json")),
            Err(ProjectError::Io { .. })
        ));

        let corrupt = dir.join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(matches!(
            load_document(&corrupt),
            Err(ProjectError::Document(DocumentError::Json(_)))
        ));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_oversized_map_file_rejected() {
        let dir = temp_dir();
        let mut document = MapModel::with_size("World", 4, 4).to_document();
        document.width = 65536;
        let path = dir.join("huge.json");
        save_document(&path, &Document::Map(document)).unwrap();

        let err = load_map(&path).unwrap_err();
        assert!(matches!(
            err,
            ProjectError::Document(DocumentError::Map(MapError::InvalidSize { cols: 65536, .. }))
        ));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_sheet_image() {
        let dir = temp_dir();
        let path = write_sheet(&dir);
        std::fs::remove_file(dir.join("forest.png")).unwrap();

        let err = load_sheet(&path).unwrap_err();
        assert!(matches!(err, ProjectError::Document(DocumentError::Sheet(_))));

        std::fs::remove_dir_all(dir).ok();
    }
}
