//! # sweep-engine
//!
//! Experiment set orchestration for trustsweep.
//!
//! Runs one-parameter sweeps over the trust simulation model with repeated
//! trials per value, saves every trial as it completes, resumes partially run
//! sweeps from disk, and reduces trials to per-value means for charting.

pub mod config;
pub mod experiment_set;
pub mod ledger;
pub mod report;
pub mod runner;
pub mod sweeps;
pub mod synthetic;

pub use config::{SetIdentity, SweepConfig};
pub use experiment_set::{ExperimentSet, GapPolicy, TrialProgress};
pub use ledger::TrialLedger;
pub use report::{line_style, render_table, runtime_chart, score_charts, Chart, LineStyle, Series};
pub use runner::{FnRunner, TrialRunner};
pub use sweeps::{EdgeCountParams, EdgeCountSweep, SampleCountParams, SampleCountSweep, SweepKind};
pub use synthetic::SyntheticRunner;
