use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::loader::error::{LoaderError, Result};
use crate::loader::model::{STAGE_PLACEHOLDER, Stage};

/// Default location of the stage input files, relative to the working
/// directory.
pub const DEFAULT_DATA_DIR: &str = "data";
/// Default SQLite database file.
pub const DEFAULT_DATABASE: &str = "shipment_database.db";
/// Default input file name template.
pub const DEFAULT_FILE_TEMPLATE: &str = "shipping_data_{stage}.csv";

/// Settings for a load run. Every field has a default so a configuration file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory holding the stage input files.
    pub data_dir: PathBuf,
    /// SQLite database file the run writes into.
    pub database: PathBuf,
    /// Input file name template; `{stage}` is replaced with the stage number.
    pub file_template: String,
    /// CSV field delimiter. Must be a single ASCII character.
    pub delimiter: char,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            database: PathBuf::from(DEFAULT_DATABASE),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
            delimiter: ',',
        }
    }
}

impl LoaderConfig {
    /// Loads and validates a TOML configuration file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LoaderError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the template can tell the stages apart and the delimiter
    /// fits in a byte.
    pub fn validate(&self) -> Result<()> {
        if !self.file_template.contains(STAGE_PLACEHOLDER) {
            return Err(LoaderError::InvalidConfig(format!(
                "file template '{}' must contain {STAGE_PLACEHOLDER}",
                self.file_template
            )));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                LoaderError::InvalidConfig(format!(
                    "delimiter {:?} is not a single ASCII character",
                    self.delimiter
                ))
            })
    }

    /// Full path of the input file for `stage`.
    pub fn stage_path(&self, stage: Stage) -> PathBuf {
        self.data_dir.join(stage.file_name(&self.file_template))
    }
}
