//! Per-value summaries derived from a sweep's trials.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::params::SweepValue;

/// independent value → mean
pub type ValueSeries = BTreeMap<SweepValue, f64>;

/// Mean score for every metric, method and independent value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedResults(pub BTreeMap<String, BTreeMap<String, ValueSeries>>);

impl AggregatedResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metric: &str, method: &str, value: SweepValue, mean: f64) {
        self.0
            .entry(metric.to_string())
            .or_default()
            .entry(method.to_string())
            .or_default()
            .insert(value, mean);
    }

    pub fn mean(&self, metric: &str, method: &str, value: SweepValue) -> Option<f64> {
        self.0.get(metric)?.get(method)?.get(&value).copied()
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// method → series for one metric
    pub fn metric(&self, metric: &str) -> Option<&BTreeMap<String, ValueSeries>> {
        self.0.get(metric)
    }
}

/// Mean runtime for every method and independent value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedRuntimes(pub BTreeMap<String, ValueSeries>);

impl AggregatedRuntimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: &str, value: SweepValue, mean: f64) {
        self.0
            .entry(method.to_string())
            .or_default()
            .insert(value, mean);
    }

    pub fn mean(&self, method: &str, value: SweepValue) -> Option<f64> {
        self.0.get(method)?.get(&value).copied()
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &ValueSeries)> {
        self.0.iter().map(|(name, series)| (name.as_str(), series))
    }
}

/// Arithmetic mean, `None` for an empty sample.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}
