use std::fmt;
use std::path::PathBuf;

/// Prefix of every trial record file name
pub const TRIAL_FILE_PREFIX: &str = "experiment";

/// Named location of one record inside a store.
///
/// Names are part of the on-disk format and must stay stable across runs:
/// `{run_id}_{name}`, `{run_id}_{name}_results`, and
/// `{run_id}_{name}/experiment.NNN` for trials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Descriptor { run_id: String, name: String },
    Results { run_id: String, name: String },
    Trial { run_id: String, name: String, number: u32 },
}

impl Slot {
    pub fn descriptor(run_id: &str, name: &str) -> Self {
        Self::Descriptor {
            run_id: run_id.to_string(),
            name: name.to_string(),
        }
    }

    pub fn results(run_id: &str, name: &str) -> Self {
        Self::Results {
            run_id: run_id.to_string(),
            name: name.to_string(),
        }
    }

    pub fn trial(run_id: &str, name: &str, number: u32) -> Self {
        Self::Trial {
            run_id: run_id.to_string(),
            name: name.to_string(),
            number,
        }
    }

    /// Path of the record relative to the store root, including extension.
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        match self {
            Self::Descriptor { run_id, name } => {
                PathBuf::from(format!("{}.{extension}", sweep_key(run_id, name)))
            }
            Self::Results { run_id, name } => {
                PathBuf::from(format!("{}_results.{extension}", sweep_key(run_id, name)))
            }
            Self::Trial {
                run_id,
                name,
                number,
            } => PathBuf::from(sweep_key(run_id, name))
                .join(trial_file_name(*number, extension)),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descriptor { run_id, name } => write!(f, "{}", sweep_key(run_id, name)),
            Self::Results { run_id, name } => write!(f, "{}_results", sweep_key(run_id, name)),
            Self::Trial {
                run_id,
                name,
                number,
            } => write!(
                f,
                "{}/{TRIAL_FILE_PREFIX}.{number:03}",
                sweep_key(run_id, name)
            ),
        }
    }
}

/// `{run_id}_{name}`: the descriptor stem and the trial directory name.
pub fn sweep_key(run_id: &str, name: &str) -> String {
    format!("{run_id}_{name}")
}

pub fn trial_file_name(number: u32, extension: &str) -> String {
    format!("{TRIAL_FILE_PREFIX}.{number:03}.{extension}")
}

pub fn backup_file_name(number: u32, stamp: i64, extension: &str) -> String {
    format!("{TRIAL_FILE_PREFIX}.{number:03}.{stamp}.backup.{extension}")
}

/// Sequence number of a trial record file name, `None` for anything else
/// (including backups).
///
/// Only the exact name [`trial_file_name`] produces is accepted, so each
/// number maps to one file: `experiment.0007` is not a second record 7.
pub fn parse_trial_number(file_name: &str, extension: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(TRIAL_FILE_PREFIX)?.strip_prefix('.')?;
    let digits = rest.strip_suffix(extension)?.strip_suffix('.')?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let number: u32 = digits.parse().ok()?;
    (digits == format!("{number:03}")).then_some(number)
}
