//! Experiment set engine: runs a one-parameter sweep to its repetition target,
//! keeps the on-disk records in step with the in-memory ledger, and reduces
//! the trials to per-value means.

use std::time::Instant;

use sweep_store::{RecordStore, Slot};
use sweep_types::{
    internal_error, mean, AggregatedResults, AggregatedRuntimes, SetError, SweepResult,
    SweepValue, TrialResult, Vocabulary,
};
use tracing::{debug, info, warn};

use crate::config::SweepConfig;
use crate::ledger::TrialLedger;
use crate::runner::TrialRunner;

/// What bulk trial loading does when the record sequence has a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapPolicy {
    /// Fail if any record exists past the first missing sequence number.
    #[default]
    Strict,
    /// Load up to the first missing number and warn about the rest.
    StopAtFirstGap,
}

/// Emitted once per trial, after the trial has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialProgress {
    /// Sequence number the trial was saved under.
    pub number: u32,
    pub value: SweepValue,
    pub elapsed_seconds: f64,
    /// Trials in the ledger after this one, across every value.
    pub total: usize,
}

/// A sweep over one independent parameter with repeated trials per value.
#[derive(Debug)]
pub struct ExperimentSet {
    config: SweepConfig,
    store: RecordStore,
    ledger: TrialLedger,
    results: Option<AggregatedResults>,
    runtimes: Option<AggregatedRuntimes>,
}

impl ExperimentSet {
    /// Start a new sweep and save its descriptor.
    ///
    /// Fails if the configuration is incomplete or a sweep with the same
    /// prefix and set name was already saved in `store`.
    pub fn create(store: RecordStore, config: SweepConfig) -> SweepResult<Self> {
        config.validate()?;

        let slot = Slot::descriptor(&config.prefix, config.name());
        if store.exists(&slot) {
            return Err(SetError::DuplicateSweep {
                run_id: config.prefix.clone(),
                name: config.name().to_string(),
            }
            .into());
        }
        store.store(&config, &slot)?;
        info!(
            "Created experiment set {} over {} ({} values x {} experiments)",
            slot,
            config.independent,
            config.values.len(),
            config.num_experiments
        );

        Ok(Self {
            config,
            store,
            ledger: TrialLedger::new(),
            results: None,
            runtimes: None,
        })
    }

    /// Rebuild a saved sweep from its descriptor.
    ///
    /// The ledger starts empty; call [`ExperimentSet::load_experiments`] to
    /// read the trials back. Saved aggregated results are loaded if present.
    pub fn load_from_file(store: RecordStore, prefix: &str, name: &str) -> SweepResult<Self> {
        let slot = Slot::descriptor(prefix, name);
        if !store.exists(&slot) {
            return Err(SetError::MissingSave {
                run_id: prefix.to_string(),
                name: name.to_string(),
            }
            .into());
        }
        let config: SweepConfig = store.retrieve(&slot)?;

        let results_slot = Slot::results(prefix, name);
        let results = if store.exists(&results_slot) {
            Some(store.retrieve::<AggregatedResults>(&results_slot)?)
        } else {
            None
        };
        info!(
            "Loaded experiment set {} (results {})",
            slot,
            if results.is_some() { "loaded" } else { "absent" }
        );

        Ok(Self {
            config,
            store,
            ledger: TrialLedger::new(),
            results,
            runtimes: None,
        })
    }

    /// [`ExperimentSet::load_from_file`] followed by a bulk trial load.
    pub fn load_from_file_with_trials(
        store: RecordStore,
        prefix: &str,
        name: &str,
        gap_policy: GapPolicy,
    ) -> SweepResult<Self> {
        let mut set = Self::load_from_file(store, prefix, name)?;
        set.load_experiments(gap_policy)?;
        Ok(set)
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn ledger(&self) -> &TrialLedger {
        &self.ledger
    }

    pub fn results(&self) -> Option<&AggregatedResults> {
        self.results.as_ref()
    }

    pub fn runtimes(&self) -> Option<&AggregatedRuntimes> {
        self.runtimes.as_ref()
    }

    pub fn completed_trials(&self) -> usize {
        self.ledger.total()
    }

    /// Every declared value has reached the repetition target.
    pub fn is_complete(&self) -> bool {
        self.config
            .values
            .iter()
            .all(|value| self.ledger.count(*value) >= self.config.num_experiments)
    }

    /// Run every missing trial, then aggregate.
    ///
    /// With `clear` the in-memory ledger is emptied first; saved trial records
    /// are left on disk.
    pub fn run_experiments<R>(&mut self, runner: &mut R, clear: bool) -> SweepResult<()>
    where
        R: TrialRunner + ?Sized,
    {
        self.run_experiments_with(runner, clear, |_| {})
    }

    /// [`ExperimentSet::run_experiments`] with a callback invoked after each
    /// trial has been saved.
    pub fn run_experiments_with<R, F>(
        &mut self,
        runner: &mut R,
        clear: bool,
        mut on_progress: F,
    ) -> SweepResult<()>
    where
        R: TrialRunner + ?Sized,
        F: FnMut(&TrialProgress),
    {
        if clear {
            self.ledger.clear();
        }

        let independent = self.config.independent;
        let values = self.config.values.clone();
        for value in values {
            let missing = self
                .config
                .num_experiments
                .saturating_sub(self.ledger.count(value));
            if missing > 0 {
                debug!("Running {} experiments for {} = {}", missing, independent, value);
            }

            for _ in 0..missing {
                let params = self
                    .config
                    .fixed
                    .resolve(independent, value)
                    .map_err(|message| SetError::Configuration { message })?;

                let started = Instant::now();
                let outcome = runner.run_trial(&params)?;
                let elapsed_seconds = started.elapsed().as_secs_f64();
                let trial = TrialResult::new(params, outcome, elapsed_seconds);

                let number = self.next_sequence_number()?;
                self.save_experiment(&trial, number)?;
                self.ledger.record(value, trial);

                info!("Experiment {} added in {:.2} seconds", number, elapsed_seconds);
                on_progress(&TrialProgress {
                    number,
                    value,
                    elapsed_seconds,
                    total: self.ledger.total(),
                });
            }
        }

        let vocabulary = runner.vocabulary().clone();
        self.aggregate_results(&vocabulary)?;
        self.aggregate_runtimes(&vocabulary)?;
        Ok(())
    }

    /// Sequence number for the next trial record: one past every trial
    /// currently in the ledger, across all values.
    fn next_sequence_number(&self) -> SweepResult<u32> {
        u32::try_from(self.ledger.total() + 1)
            .map_err(|_| internal_error!("trial sequence number overflow"))
    }

    /// Save one trial under `number`, moving any record already there aside.
    pub fn save_experiment(&self, trial: &TrialResult, number: u32) -> SweepResult<()> {
        let slot = Slot::trial(&self.config.prefix, self.config.name(), number);
        if self.store.exists(&slot) {
            self.store.back_up(&slot)?;
        }
        self.store.store(trial, &slot)
    }

    /// Mean score per metric, method and declared value. The result is saved
    /// alongside the descriptor.
    pub fn aggregate_results(
        &mut self,
        vocabulary: &Vocabulary,
    ) -> SweepResult<&AggregatedResults> {
        let mut results = AggregatedResults::new();
        for metric in &vocabulary.metric_names {
            for method in &vocabulary.method_names {
                for value in &self.config.values {
                    let trials = self.trials_for(*value)?;
                    let scores = trials
                        .iter()
                        .map(|trial| {
                            trial.score(metric, method).ok_or_else(|| SetError::MissingScore {
                                metric: metric.clone(),
                                method: method.clone(),
                                value: *value,
                            })
                        })
                        .collect::<Result<Vec<f64>, SetError>>()?;
                    let avg = mean(&scores).ok_or(SetError::InsufficientData { value: *value })?;
                    results.insert(metric, method, *value, avg);
                }
            }
        }

        self.store.store(
            &results,
            &Slot::results(&self.config.prefix, self.config.name()),
        )?;
        debug!("Aggregated results for {}", self.config.name());
        Ok(self.results.insert(results))
    }

    /// Mean runtime per method and declared value. Not saved.
    pub fn aggregate_runtimes(
        &mut self,
        vocabulary: &Vocabulary,
    ) -> SweepResult<&AggregatedRuntimes> {
        let mut runtimes = AggregatedRuntimes::new();
        for method in &vocabulary.method_names {
            for value in &self.config.values {
                let trials = self.trials_for(*value)?;
                let samples = trials
                    .iter()
                    .map(|trial| {
                        trial.runtime(method).ok_or_else(|| SetError::MissingRuntime {
                            method: method.clone(),
                            value: *value,
                        })
                    })
                    .collect::<Result<Vec<f64>, SetError>>()?;
                let avg = mean(&samples).ok_or(SetError::InsufficientData { value: *value })?;
                runtimes.insert(method, *value, avg);
            }
        }
        Ok(self.runtimes.insert(runtimes))
    }

    fn trials_for(&self, value: SweepValue) -> Result<&[TrialResult], SetError> {
        let trials = self.ledger.trials(value);
        if trials.is_empty() {
            return Err(SetError::InsufficientData { value });
        }
        Ok(trials)
    }

    /// Read saved trial records back into the ledger, in sequence order from 1.
    ///
    /// Each trial is filed under the independent value recorded on the trial
    /// itself. Returns the number of trials loaded.
    pub fn load_experiments(&mut self, gap_policy: GapPolicy) -> SweepResult<usize> {
        if !self.ledger.is_empty() {
            return Err(SetError::NonEmptyLedger {
                loaded: self.ledger.total(),
            }
            .into());
        }
        info!("Loading experiments for {}; this reads every trial record", self.config.name());

        let prefix = self.config.prefix.clone();
        let name = self.config.name().to_string();
        let present = self.store.trial_numbers(&prefix, &name)?;
        let contiguous = present
            .iter()
            .zip(1u32..)
            .take_while(|(number, expected)| **number == *expected)
            .count();
        let stranded = present[contiguous..].to_vec();
        if !stranded.is_empty() {
            let missing = contiguous as u32 + 1;
            match gap_policy {
                GapPolicy::Strict => {
                    return Err(SetError::SequenceGap { missing, stranded }.into());
                }
                GapPolicy::StopAtFirstGap => {
                    warn!(
                        "Trial record {} is missing; ignoring {} later records {:?}",
                        missing,
                        stranded.len(),
                        stranded
                    );
                }
            }
        }

        let mut ledger = TrialLedger::new();
        for number in 1..=contiguous as u32 {
            let trial: TrialResult = self.store.retrieve(&Slot::trial(&prefix, &name, number))?;
            let value = trial.value_of(self.config.independent);
            if !self.config.values.contains(&value) {
                warn!(
                    "Trial {} ran with {} = {}, which is not a declared value",
                    number, self.config.independent, value
                );
            }
            debug!("Loaded trial {} for {} = {}", number, self.config.independent, value);
            ledger.record(value, trial);
        }
        self.ledger = ledger;

        info!("{} experiments loaded", contiguous);
        Ok(contiguous)
    }

    /// One `key = value` line per parameter, plus prefix and repetition count.
    pub fn description(&self) -> String {
        let fixed = &self.config.fixed;
        let swept = format!(
            "[{}]",
            self.config
                .values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        let optional = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();
        let (edges_per_node, num_weight_samples) = match self.config.independent {
            sweep_types::IndependentParam::EdgesPerNode => {
                (swept, optional(fixed.num_weight_samples))
            }
            sweep_types::IndependentParam::NumWeightSamples => {
                (optional(fixed.edges_per_node), swept)
            }
        };

        [
            ("num_nodes", fixed.num_nodes.to_string()),
            ("agent_type_prior", fixed.agent_type_prior.clone()),
            ("edge_strategy", fixed.edge_strategy.clone()),
            ("edges_per_node", edges_per_node),
            ("edge_weight_strategy", fixed.edge_weight_strategy.clone()),
            ("num_weight_samples", num_weight_samples),
            ("prefix", self.config.prefix.clone()),
            ("num_experiments", self.config.num_experiments.to_string()),
        ]
        .iter()
        .map(|(key, value)| format!("{key:<20} = {value}"))
        .collect::<Vec<_>>()
        .join("\n")
    }
}
