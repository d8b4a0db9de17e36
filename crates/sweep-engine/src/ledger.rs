use std::collections::BTreeMap;

use sweep_types::{SweepValue, TrialResult};

/// Completed trials of a sweep, bucketed by independent value in run order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialLedger {
    entries: BTreeMap<SweepValue, Vec<TrialResult>>,
}

impl TrialLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: SweepValue, trial: TrialResult) {
        self.entries.entry(value).or_default().push(trial);
    }

    /// Trials recorded for `value`, empty if none.
    pub fn trials(&self, value: SweepValue) -> &[TrialResult] {
        self.entries.get(&value).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, value: SweepValue) -> usize {
        self.trials(value).len()
    }

    /// Total trials across every value.
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
