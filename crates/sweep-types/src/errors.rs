use thiserror::Error;

use crate::params::SweepValue;

/// Main error type for the trustsweep system
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Experiment set error: {0}")]
    Set(#[from] SetError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Trial error: {0}")]
    Trial(#[from] TrialError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Experiment set lifecycle errors
#[derive(Error, Debug)]
pub enum SetError {
    #[error("Invalid experiment set configuration: {message}")]
    Configuration { message: String },

    #[error("Experiment set already exists: {run_id}_{name}")]
    DuplicateSweep { run_id: String, name: String },

    #[error("Ledger already holds {loaded} trials; clear it before loading from disk")]
    NonEmptyLedger { loaded: usize },

    #[error("Save file does not exist: {run_id}_{name}")]
    MissingSave { run_id: String, name: String },

    #[error("Insufficient data: no trials recorded for value {value}")]
    InsufficientData { value: SweepValue },

    #[error("Trial for value {value} has no score for metric {metric}, method {method}")]
    MissingScore {
        metric: String,
        method: String,
        value: SweepValue,
    },

    #[error("Trial for value {value} has no runtime for method {method}")]
    MissingRuntime { method: String, value: SweepValue },

    #[error("Trial record {missing} is missing but later records exist: {stranded:?}")]
    SequenceGap { missing: u32, stranded: Vec<u32> },
}

/// Record store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Failed to rename {from} to {to}: {message}")]
    Rename {
        from: String,
        to: String,
        message: String,
    },

    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Failed to encode record for {path}: {message}")]
    Encode { path: String, message: String },

    #[error("Failed to create directory {path}: {message}")]
    CreateDir { path: String, message: String },

    #[error("Unknown record format: {format}")]
    UnknownFormat { format: String },
}

/// Trial runner errors
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("Trial failed: {message}")]
    Failed { message: String },

    #[error("Invalid trial parameters: {message}")]
    InvalidParams { message: String },
}

/// Chart preparation errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No line style registered for method: {method}")]
    UnknownMethod { method: String },

    #[error("Results have not been aggregated for {name}")]
    MissingResults { name: String },
}

/// Result type alias for trustsweep operations
pub type SweepResult<T> = Result<T, SweepError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::SweepError::Validation(format!($($arg)*))
    };
}

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::SweepError::Internal(format!($($arg)*))
    };
}
