//! Collaborators provided by the windowing shell
//!
//! The editing surfaces never open windows themselves. File choosers,
//! confirmation boxes, error reporting and the property panel are reached
//! through these traits. With the `native` feature, [`native::NativeShell`]
//! implements the dialogs with `rfd`.

use spritesheetz_core::{SheetProperties, SpriteObject};
use std::path::PathBuf;

/// Window title used for prompts
pub const APP_TITLE: &str = "SpriteSheetz";

/// Named file-type filter for file choosers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

/// Project files (sprite sheets and maps)
pub const PROJECT_FILTER: FileFilter = FileFilter {
    name: "SpriteSheetz Project",
    extensions: &["json"],
};

/// Source images for new sprite sheets
pub const IMAGE_FILTER: FileFilter = FileFilter {
    name: "Images",
    extensions: &["png", "gif"],
};

pub trait FileDialogs {
    fn choose_save_target(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf>;

    fn choose_open_target(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf>;
}

pub trait Prompt {
    /// Ask a yes/no question. Defaults to "no" when dismissed.
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    fn notify_error(&mut self, title: &str, message: &str);
}

pub trait PropertyPanel {
    fn show_object_properties(&mut self, object: &SpriteObject);

    fn show_sheet_properties(&mut self, properties: &SheetProperties);

    /// Called when no object is selected any more
    fn clear_object_properties(&mut self) {}
}

/// Everything the workspace needs from the shell
pub trait Shell: FileDialogs + Prompt + PropertyPanel {}

impl<T: FileDialogs + Prompt + PropertyPanel> Shell for T {}

/// Property panel that ignores every update, for headless use
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPanel;

impl PropertyPanel for NoPanel {
    fn show_object_properties(&mut self, _object: &SpriteObject) {}

    fn show_sheet_properties(&mut self, _properties: &SheetProperties) {}
}

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod native {
    use super::{FileDialogs, FileFilter, Prompt, PropertyPanel};
    use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
    use spritesheetz_core::{SheetProperties, SpriteObject};
    use std::path::PathBuf;
    use tracing::info;

    /// Native dialogs; the property panel only logs
    #[derive(Debug, Default)]
    pub struct NativeShell;

    impl FileDialogs for NativeShell {
        fn choose_save_target(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf> {
            FileDialog::new()
                .set_title(title)
                .add_filter(filter.name, filter.extensions)
                .save_file()
        }

        fn choose_open_target(&mut self, title: &str, filter: &FileFilter) -> Option<PathBuf> {
            FileDialog::new()
                .set_title(title)
                .add_filter(filter.name, filter.extensions)
                .pick_file()
        }
    }

    impl Prompt for NativeShell {
        fn confirm(&mut self, title: &str, message: &str) -> bool {
            let result = MessageDialog::new()
                .set_title(title)
                .set_description(message)
                .set_buttons(MessageButtons::YesNo)
                .set_level(MessageLevel::Warning)
                .show();
            matches!(result, MessageDialogResult::Yes)
        }

        fn notify_error(&mut self, title: &str, message: &str) {
            MessageDialog::new()
                .set_title(title)
                .set_description(message)
                .set_buttons(MessageButtons::Ok)
                .set_level(MessageLevel::Error)
                .show();
        }
    }

    impl PropertyPanel for NativeShell {
        fn show_object_properties(&mut self, object: &SpriteObject) {
            info!("Selected object '{}' ({})", object.name, object.key);
        }

        fn show_sheet_properties(&mut self, properties: &SheetProperties) {
            info!(
                "Sheet '{}' from {} ({}x{} tiles)",
                properties.name,
                properties.sprite_filename,
                properties.horizontal_tiles,
                properties.vertical_tiles
            );
        }
    }
}
