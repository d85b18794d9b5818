//! User configuration loaded through confy
//!
//! Stored in the platform config directory under the `todoquest` app name.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use todoquest_core::{FilterMode, SortMode};

use crate::error::Result;

pub const APP_NAME: &str = "todoquest";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the state file and its backup
    pub data_directory: String,
    pub state_filename: String,
    /// Sort used by `list` when --sort is not given
    pub default_sort: String,
    /// Filter used by `list` when --filter is not given
    pub default_filter: String,
    /// Raise a desktop notification when XP is awarded
    pub desktop_notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_directory = ProjectDirs::from("", "", APP_NAME)
            .map(|dirs| dirs.data_dir().to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_directory,
            state_filename: "todoquest.json".to_string(),
            default_sort: SortMode::default().to_string(),
            default_filter: FilterMode::default().to_string(),
            desktop_notifications: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(confy::load(APP_NAME, None)?)
    }

    /// Full path of the state file
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.data_directory).join(&self.state_filename)
    }

    pub fn sort(&self) -> Result<SortMode> {
        Ok(self.default_sort.parse()?)
    }

    pub fn filter(&self) -> Result<FilterMode> {
        Ok(self.default_filter.parse()?)
    }
}
