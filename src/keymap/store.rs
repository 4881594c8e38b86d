//! Keymap persistence contract

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Keymap, KeymapError};

/// External owner of the bindings record
pub trait KeymapStore {
    /// Loads the current bindings
    fn load_bindings(&self) -> Result<Keymap, KeymapError>;

    /// Replaces the stored bindings
    fn save(&self, keymap: &Keymap) -> Result<(), KeymapError>;
}

/// Stores one keymap as a TOML file
#[derive(Debug, Clone)]
pub struct FileKeymapStore {
    path: PathBuf,
}

impl FileKeymapStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> KeymapError {
        KeymapError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeymapStore for FileKeymapStore {
    fn load_bindings(&self) -> Result<Keymap, KeymapError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let keymap = Keymap::from_toml_str(&text)?;
        debug!(path = %self.path.display(), version = %keymap.version, "keymap loaded");
        Ok(keymap)
    }

    fn save(&self, keymap: &Keymap) -> Result<(), KeymapError> {
        let text = keymap.to_toml_string()?;
        std::fs::write(&self.path, text).map_err(|e| self.io_error(e))
    }
}
