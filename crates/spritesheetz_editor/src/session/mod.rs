//! Editor session state persisted between runs
//!
//! The shell hands over opaque window geometry and layout blobs; the
//! workspace contributes the grid toggle and the state of every open tab.

mod file;

pub use file::*;

use serde::{Deserialize, Serialize};
use spritesheetz_core::Document;

fn default_show_grid() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Main window geometry as saved by the shell
    #[serde(default)]
    pub window_geometry: Option<Vec<u8>>,
    /// Main window dock/toolbar layout as saved by the shell
    #[serde(default)]
    pub window_layout: Option<Vec<u8>>,
    #[serde(default = "default_show_grid")]
    pub show_grid: bool,
    /// Saved state of each open tab, in tab order
    #[serde(default)]
    pub tabs: Vec<Document>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            window_geometry: None,
            window_layout: None,
            show_grid: true,
            tabs: Vec::new(),
        }
    }
}
