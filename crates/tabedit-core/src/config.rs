//! Session configuration loaded from JSON

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name suggested for exported files
pub const DEFAULT_EXPORT_FILE_NAME: &str = "edited_data.csv";

/// Settings for an editing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dialect used for both reading and writing
    pub dialect: Dialect,
    /// Suggested file name for exports, independent of the source name
    pub export_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Load a config file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.dialect.validate()?;
        Ok(config)
    }

    /// Save the config file as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
