//! spritesheetz_editor - Sprite sheet and tile map editor
//!
//! This crate provides the editing side of SpriteSheetz:
//! - Sprite-sheet editing (cell selection, grouping tiles into objects)
//! - Map editing with layers and attached sprite-sheet palettes
//! - Project management (save/load of sheet and map files)
//! - Keyboard shortcuts
//! - Session persistence (open tabs, grid toggle, window state)
//!
//! Windowing is left to the host. It supplies a [`spritesheetz_core::Scene`]
//! to draw on and a [`shell::Shell`] for dialogs and the property panel.
//!
//! # Usage
//!
//! ```rust,ignore
//! use spritesheetz_editor::shell::native::NativeShell;
//! use spritesheetz_editor::{RecordedScene, SessionState, Workspace};
//!
//! let mut shell = NativeShell;
//! let mut workspace = Workspace::<RecordedScene>::new();
//! workspace.restore_session(&SessionState::load());
//! workspace.new_map();
//! ```

pub mod input;
pub mod project;
pub mod session;
pub mod shell;
pub mod surface;
pub mod workspace;

// Re-export the model crate
pub use spritesheetz_core;
pub use spritesheetz_core::{Document, RecordedScene, Scene};

pub use input::{command_for_key, EditorCommand, Key, Modifiers, PointerButton, PointerEvent};
pub use project::ProjectError;
pub use session::{SessionError, SessionState};
pub use shell::{FileDialogs, Prompt, PropertyPanel, Shell};
pub use surface::{MapSurface, SpriteSheetSurface};
pub use workspace::{CommandOutcome, Tab, TabContent, TriggerOutcome, Workspace, WorkspaceError};
