//! Trial inputs and outputs exchanged with the simulation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::params::{IndependentParam, SweepValue, TrialParams};

/// metric name → method name → score
pub type ScoreTable = BTreeMap<String, BTreeMap<String, f64>>;

/// method name → runtime in seconds
pub type RuntimeTable = BTreeMap<String, f64>;

/// Metric and method names a trial runner reports scores for.
///
/// Aggregation walks exactly these names, so they must stay stable for the
/// lifetime of a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub metric_names: Vec<String>,
    pub method_names: Vec<String>,
}

impl Vocabulary {
    pub fn new<M, N>(metric_names: M, method_names: N) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            metric_names: metric_names.into_iter().map(Into::into).collect(),
            method_names: method_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Raw output of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub scores: ScoreTable,
    pub runtimes: RuntimeTable,
}

impl TrialOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, metric: &str, method: &str, score: f64) -> Self {
        self.scores
            .entry(metric.to_string())
            .or_default()
            .insert(method.to_string(), score);
        self
    }

    pub fn with_runtime(mut self, method: &str, seconds: f64) -> Self {
        self.runtimes.insert(method.to_string(), seconds);
        self
    }
}

/// One completed trial as recorded in the ledger and on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: Uuid,
    pub params: TrialParams,
    pub scores: ScoreTable,
    pub runtimes: RuntimeTable,
    pub elapsed_seconds: f64,
    pub completed_at: DateTime<Utc>,
}

impl TrialResult {
    pub fn new(params: TrialParams, outcome: TrialOutcome, elapsed_seconds: f64) -> Self {
        Self {
            trial_id: Uuid::new_v4(),
            params,
            scores: outcome.scores,
            runtimes: outcome.runtimes,
            elapsed_seconds,
            completed_at: Utc::now(),
        }
    }

    pub fn score(&self, metric: &str, method: &str) -> Option<f64> {
        self.scores.get(metric)?.get(method).copied()
    }

    pub fn runtime(&self, method: &str) -> Option<f64> {
        self.runtimes.get(method).copied()
    }

    /// Value the trial actually ran with for `param`.
    pub fn value_of(&self, param: IndependentParam) -> SweepValue {
        self.params.value_of(param)
    }
}
