use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sweep_types::{StoreError, SweepResult};

use crate::config::{RecordFormat, StoreConfig};
use crate::slot::{backup_file_name, parse_trial_number, sweep_key, Slot};

/// File-backed store of structured records addressed by [`Slot`]
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
    format: RecordFormat,
}

impl RecordStore {
    /// Open a YAML store rooted at `root`, creating the folder if needed.
    pub fn new<P: AsRef<Path>>(root: P) -> SweepResult<Self> {
        Self::open(StoreConfig::new(root.as_ref()))
    }

    pub fn open(config: StoreConfig) -> SweepResult<Self> {
        create_dir(&config.root)?;
        Ok(Self {
            root: config.root,
            format: config.format,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Absolute path of the record behind `slot`.
    pub fn path_of(&self, slot: &Slot) -> PathBuf {
        self.root.join(slot.relative_path(self.format.extension()))
    }

    /// Directory holding the trial records of one sweep.
    pub fn trial_dir(&self, run_id: &str, name: &str) -> PathBuf {
        self.root.join(sweep_key(run_id, name))
    }

    pub fn exists(&self, slot: &Slot) -> bool {
        self.path_of(slot).is_file()
    }

    /// Write `record` to `slot`, replacing whatever is there.
    pub fn store<T: Serialize>(&self, record: &T, slot: &Slot) -> SweepResult<()> {
        let path = self.path_of(slot);
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        let text = self.encode(record, &path)?;
        fs::write(&path, text).map_err(|e| StoreError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!("Stored record {} at {}", slot, path.display());
        Ok(())
    }

    pub fn retrieve<T: DeserializeOwned>(&self, slot: &Slot) -> SweepResult<T> {
        let path = self.path_of(slot);
        let text = fs::read_to_string(&path).map_err(|e| StoreError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.decode(&text, &path)
    }

    /// Move the record at `slot` aside under a timestamped backup name and
    /// return the backup path. Only trial slots have a backup name; other
    /// slots get `.backup` and the stamp appended to their file name.
    pub fn back_up(&self, slot: &Slot) -> SweepResult<PathBuf> {
        let path = self.path_of(slot);
        let stamp = Utc::now().timestamp_micros();
        let extension = self.format.extension();
        let backup = match slot {
            Slot::Trial { number, .. } => {
                path.with_file_name(backup_file_name(*number, stamp, extension))
            }
            _ => {
                let mut name = path.file_name().unwrap_or_default().to_os_string();
                name.push(format!(".{stamp}.backup"));
                path.with_file_name(name)
            }
        };
        fs::rename(&path, &backup).map_err(|e| StoreError::Rename {
            from: path.display().to_string(),
            to: backup.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::warn!(
            "Would have overwritten {}; backed it up to {}",
            path.display(),
            backup.display()
        );
        Ok(backup)
    }

    /// Sequence numbers of every trial record present for a sweep, ascending.
    /// Backups and unrelated files are skipped.
    pub fn trial_numbers(&self, run_id: &str, name: &str) -> SweepResult<Vec<u32>> {
        let dir = self.trial_dir(run_id, name);
        let mut numbers = Vec::new();
        if !dir.is_dir() {
            return Ok(numbers);
        }
        let read_err = |e: std::io::Error| StoreError::Read {
            path: dir.display().to_string(),
            message: e.to_string(),
        };
        for entry in fs::read_dir(&dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(number) = parse_trial_number(file_name, self.format.extension()) {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    fn encode<T: Serialize>(&self, record: &T, path: &Path) -> SweepResult<String> {
        let encoded = match self.format {
            RecordFormat::Yaml => serde_yaml::to_string(record).map_err(|e| e.to_string()),
            RecordFormat::Json => serde_json::to_string_pretty(record).map_err(|e| e.to_string()),
        };
        encoded.map_err(|message| {
            StoreError::Encode {
                path: path.display().to_string(),
                message,
            }
            .into()
        })
    }

    fn decode<T: DeserializeOwned>(&self, text: &str, path: &Path) -> SweepResult<T> {
        let decoded = match self.format {
            RecordFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            RecordFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        decoded.map_err(|message| {
            StoreError::Decode {
                path: path.display().to_string(),
                message,
            }
            .into()
        })
    }
}

fn create_dir(path: &Path) -> SweepResult<()> {
    fs::create_dir_all(path).map_err(|e| {
        StoreError::CreateDir {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}
