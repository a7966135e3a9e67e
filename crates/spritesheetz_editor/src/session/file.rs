//! Session file save/load operations

use super::SessionState;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl SessionState {
    /// Get the config directory path for the editor
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "Bamboo", "SpriteSheetz").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the session file path
    pub fn session_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(SESSION_FILE))
    }

    /// Load the session, returning defaults if it is missing or unreadable
    pub fn load() -> Self {
        match Self::load_from_file() {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not load session: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Load the session from the config directory
    pub fn load_from_file() -> Result<Self, SessionError> {
        let path = Self::session_path().ok_or(SessionError::NoConfigDir)?;
        Self::load_from(&path)
    }

    /// Load a session file; a missing file gives the defaults
    pub fn load_from(path: &Path) -> Result<Self, SessionError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(SessionError::Parse)
    }

    /// Save the session to the config directory
    pub fn save(&self) -> Result<(), SessionError> {
        let path = Self::session_path().ok_or(SessionError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(SessionError::Serialize)?;
        std::fs::write(path, content)?;

        info!("Saved session to {:?}", path);
        Ok(())
    }
}
