//! JSON file storage adapter for the application state
//!
//! Handles persistence of state snapshots. Every save first copies the
//! previous file to a `.bak` sibling, then writes through a temp file and
//! renames it into place.

use std::fs;
use std::path::PathBuf;

use todoquest_core::{AppState, Persistence};

use crate::error::{CliError, Result};

/// JSON storage adapter
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    /// Create a new storage adapter for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Create a backup of the state file
    pub fn backup(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        fs::copy(&self.path, self.backup_path())
            .map_err(|e| CliError::io(format!("backing up {}", self.path.display()), e))?;
        Ok(())
    }

    /// Check if backup exists
    pub fn backup_exists(&self) -> bool {
        self.backup_path().exists()
    }

    /// Load the state stored in the backup file
    pub fn recover(&self) -> Result<AppState> {
        let backup_path = self.backup_path();
        if !backup_path.exists() {
            return Err(CliError::storage("Backup file not found"));
        }

        let raw = fs::read_to_string(&backup_path)
            .map_err(|e| CliError::io(format!("reading {}", backup_path.display()), e))?;
        // Validate before restoring, a corrupt backup must not replace good data
        serde_json::from_str::<serde_json::Value>(&raw)?;
        Ok(AppState::from_persisted(Some(&raw), chrono::Local::now()))
    }
}

impl Persistence for JsonStorage {
    type Error = CliError;

    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| CliError::io(format!("reading {}", self.path.display()), e))?;
        Ok(Some(raw))
    }

    fn save(&self, snapshot: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| CliError::io(format!("creating {}", parent.display()), e))?;
        }

        self.backup()?;

        let tmp_path = self.temp_path();
        fs::write(&tmp_path, snapshot)
            .map_err(|e| CliError::io(format!("writing {}", tmp_path.display()), e))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| CliError::io(format!("replacing {}", self.path.display()), e))?;
        Ok(())
    }
}
