//! Boundary to the simulation model that produces one trial's scores.

use sweep_types::{TrialError, TrialOutcome, TrialParams, Vocabulary};

/// Runs one trial of the simulation model for a resolved parameter set.
///
/// Implementations must report a score for every metric × method pair in
/// [`TrialRunner::vocabulary`] and a runtime for every method; aggregation
/// fails on a trial that leaves one out.
pub trait TrialRunner {
    /// Metric and method names this runner scores.
    fn vocabulary(&self) -> &Vocabulary;

    /// Run the model once.
    fn run_trial(&mut self, params: &TrialParams) -> Result<TrialOutcome, TrialError>;
}

/// Adapts a closure into a [`TrialRunner`] with a fixed vocabulary.
pub struct FnRunner<F> {
    vocabulary: Vocabulary,
    run: F,
}

impl<F> FnRunner<F>
where
    F: FnMut(&TrialParams) -> Result<TrialOutcome, TrialError>,
{
    pub fn new(vocabulary: Vocabulary, run: F) -> Self {
        Self { vocabulary, run }
    }
}

impl<F> TrialRunner for FnRunner<F>
where
    F: FnMut(&TrialParams) -> Result<TrialOutcome, TrialError>,
{
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn run_trial(&mut self, params: &TrialParams) -> Result<TrialOutcome, TrialError> {
        (self.run)(params)
    }
}
