use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sweep_types::{StoreError, SweepResult};

/// Environment variable overriding the save folder
pub const SAVE_DIR_ENV: &str = "TRUSTSWEEP_SAVE_DIR";

/// Environment variable selecting the record format (`yaml` or `json`)
pub const FORMAT_ENV: &str = "TRUSTSWEEP_FORMAT";

/// On-disk encoding used for every record in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    Yaml,
    Json,
}

impl RecordFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

impl FromStr for RecordFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(StoreError::UnknownFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Where and how a [`crate::RecordStore`] keeps its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub format: RecordFormat,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: RecordFormat::default(),
        }
    }

    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Default save folder under the platform data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("trustsweep")
            .join("saved")
    }

    /// Build a config from `TRUSTSWEEP_SAVE_DIR` and `TRUSTSWEEP_FORMAT`,
    /// falling back to the default root and YAML.
    pub fn from_env() -> SweepResult<Self> {
        let root = std::env::var_os(SAVE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_root);
        let format = match std::env::var(FORMAT_ENV) {
            Ok(value) => value.parse::<RecordFormat>()?,
            Err(_) => RecordFormat::default(),
        };
        Ok(Self { root, format })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}
