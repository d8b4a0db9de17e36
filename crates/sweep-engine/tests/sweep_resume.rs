use std::fs;

use sweep_engine::{
    EdgeCountParams, EdgeCountSweep, ExperimentSet, FnRunner, GapPolicy, SweepConfig, SweepKind,
    SyntheticRunner,
};
use sweep_store::{RecordFormat, RecordStore, Slot, StoreConfig};
use sweep_types::{
    AggregatedResults, SetError, SweepError, TrialError, TrialOutcome, TrialResult, Vocabulary,
};
use tempfile::tempdir;

fn params() -> EdgeCountParams {
    EdgeCountParams {
        num_nodes: 10,
        agent_type_prior: "uniform".to_string(),
        edge_strategy: "random".to_string(),
        edge_weight_strategy: "noisy".to_string(),
        num_weight_samples: 2,
    }
}

fn vocabulary() -> Vocabulary {
    Vocabulary::new(["m"], ["x"])
}

fn outcome_for(edges: u32) -> TrialOutcome {
    TrialOutcome::new()
        .with_score("m", "x", f64::from(edges) * 10.0)
        .with_runtime("x", 0.01)
}

/// Runner that fails once it has produced `limit` trials.
fn interrupting_runner(
    limit: usize,
) -> FnRunner<impl FnMut(&sweep_types::TrialParams) -> Result<TrialOutcome, TrialError>> {
    let mut calls = 0;
    FnRunner::new(vocabulary(), move |params| {
        if calls == limit {
            return Err(TrialError::Failed {
                message: "interrupted".to_string(),
            });
        }
        calls += 1;
        Ok(outcome_for(params.edges_per_node))
    })
}

#[test]
fn completed_sweep_resumes_without_new_trials() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    let mut set =
        EdgeCountSweep::create(store.clone(), params(), "run1", 3, Some(vec![2, 4])).unwrap();
    let mut runner = SyntheticRunner::new(3);
    set.run_experiments(&mut runner, false).unwrap();
    let first_results = set.results().cloned().unwrap();

    let mut resumed = ExperimentSet::load_from_file_with_trials(
        store.clone(),
        "run1",
        EdgeCountSweep::NAME,
        GapPolicy::Strict,
    )
    .unwrap();
    assert_eq!(resumed.results(), Some(&first_results));

    let mut new_trials = 0;
    resumed
        .run_experiments_with(&mut runner, false, |_| new_trials += 1)
        .unwrap();

    assert_eq!(new_trials, 0);
    assert_eq!(resumed.results(), Some(&first_results));
    assert_eq!(
        store.trial_numbers("run1", EdgeCountSweep::NAME).unwrap(),
        (1..=6).collect::<Vec<u32>>()
    );
}

#[test]
fn interrupted_sweep_numbers_densely_across_batches() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    let mut set =
        EdgeCountSweep::create(store.clone(), params(), "run1", 2, Some(vec![1, 2, 3])).unwrap();

    let err = set.run_experiments(&mut interrupting_runner(3), false).unwrap_err();
    assert!(matches!(err, SweepError::Trial(_)));
    assert_eq!(store.trial_numbers("run1", "edge_count").unwrap(), vec![1, 2, 3]);
    drop(set);

    let mut resumed = SweepKind::EdgeCount.load(store.clone(), "run1").unwrap();
    assert_eq!(resumed.load_experiments(GapPolicy::Strict).unwrap(), 3);
    assert_eq!(resumed.ledger().count(1), 2);
    assert_eq!(resumed.ledger().count(2), 1);

    let mut numbers = Vec::new();
    resumed
        .run_experiments_with(&mut interrupting_runner(usize::MAX), false, |progress| {
            numbers.push(progress.number)
        })
        .unwrap();

    assert_eq!(numbers, vec![4, 5, 6]);
    assert_eq!(
        store.trial_numbers("run1", "edge_count").unwrap(),
        vec![1, 2, 3, 4, 5, 6]
    );
    let backups = fs::read_dir(store.trial_dir("run1", "edge_count"))
        .unwrap()
        .filter(|entry| {
            entry
                .as_ref()
                .map(|e| e.file_name().to_string_lossy().contains("backup"))
                .unwrap_or(false)
        })
        .count();
    assert_eq!(backups, 0);

    let mut expected = AggregatedResults::new();
    expected.insert("m", "x", 1, 10.0);
    expected.insert("m", "x", 2, 20.0);
    expected.insert("m", "x", 3, 30.0);
    assert_eq!(resumed.results(), Some(&expected));
}

#[test]
fn loaded_trials_are_bucketed_by_recorded_value() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    let mut set =
        EdgeCountSweep::create(store.clone(), params(), "run1", 1, Some(vec![2, 3])).unwrap();
    set.run_experiments(&mut interrupting_runner(usize::MAX), false).unwrap();

    // A trial from an earlier configuration that also swept 7.
    let stray_params = set.config().fixed.resolve(set.config().independent, 7).unwrap();
    let stray = TrialResult::new(stray_params, outcome_for(7), 0.0);
    store.store(&stray, &Slot::trial("run1", "edge_count", 3)).unwrap();

    let mut reloaded = EdgeCountSweep::load(store, "run1").unwrap();
    assert_eq!(reloaded.load_experiments(GapPolicy::Strict).unwrap(), 3);
    assert_eq!(reloaded.ledger().count(2), 1);
    assert_eq!(reloaded.ledger().count(3), 1);
    assert_eq!(reloaded.ledger().count(7), 1);
    assert_eq!(reloaded.ledger().trials(7)[0], stray);
}

#[test]
fn aggregation_averages_exactly_the_trials_per_value() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    let mut set = EdgeCountSweep::create(store, params(), "run1", 3, Some(vec![2, 5])).unwrap();

    // Scores per call: 1, 2, 6 for value 2 and 10, 20, 60 for value 5.
    let scores = [1.0, 2.0, 6.0, 10.0, 20.0, 60.0];
    let mut call = 0;
    let mut runner = FnRunner::new(Vocabulary::new(["m", "n"], ["x"]), move |_| {
        let score = scores[call];
        call += 1;
        Ok(TrialOutcome::new()
            .with_score("m", "x", score)
            .with_score("n", "x", -score)
            .with_runtime("x", score * 2.0))
    });
    set.run_experiments(&mut runner, false).unwrap();

    let results = set.results().unwrap();
    assert_eq!(results.mean("m", "x", 2), Some(3.0));
    assert_eq!(results.mean("m", "x", 5), Some(30.0));
    assert_eq!(results.mean("n", "x", 5), Some(-30.0));
    let runtimes = set.runtimes().unwrap();
    assert_eq!(runtimes.mean("x", 2), Some(6.0));
}

#[test]
fn records_round_trip_through_the_store() {
    for format in [RecordFormat::Yaml, RecordFormat::Json] {
        let temp_dir = tempdir().unwrap();
        let store =
            RecordStore::open(StoreConfig::new(temp_dir.path()).with_format(format)).unwrap();
        let mut set =
            EdgeCountSweep::create(store.clone(), params(), "run1", 4, Some(vec![3, 7])).unwrap();
        let mut call = 0u32;
        let mut runner = FnRunner::new(Vocabulary::new(["m", "n"], ["x"]), move |params| {
            call += 1;
            let edges = f64::from(params.edges_per_node);
            Ok(TrialOutcome::new()
                .with_score("m", "x", (edges + f64::from(call)).sqrt() / 3.0)
                .with_score("n", "x", (f64::from(call) * 0.1).sin())
                .with_runtime("x", 1.0 / (7.0 + f64::from(call))))
        });
        set.run_experiments(&mut runner, false).unwrap();

        let config: SweepConfig = store.retrieve(&Slot::descriptor("run1", "edge_count")).unwrap();
        assert_eq!(&config, set.config());

        let results: AggregatedResults =
            store.retrieve(&Slot::results("run1", "edge_count")).unwrap();
        assert_eq!(Some(&results), set.results());

        let kept: Vec<&TrialResult> = [3, 7]
            .iter()
            .flat_map(|value| set.ledger().trials(*value))
            .collect();
        for (number, kept) in (1..).zip(kept) {
            let trial: TrialResult =
                store.retrieve(&Slot::trial("run1", "edge_count", number)).unwrap();
            assert_eq!(&trial, kept, "{format:?} trial {number}");
        }
    }
}

#[test]
fn loading_a_sweep_that_never_ran_has_no_results() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    EdgeCountSweep::create(store.clone(), params(), "run1", 2, Some(vec![2])).unwrap();

    let loaded = EdgeCountSweep::load(store, "run1").unwrap();
    assert!(loaded.results().is_none());
    assert!(loaded.runtimes().is_none());
    assert_eq!(loaded.completed_trials(), 0);
}

#[test]
fn running_without_loading_trials_reruns_and_backs_up() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    let mut set =
        EdgeCountSweep::create(store.clone(), params(), "run1", 2, Some(vec![1, 2])).unwrap();
    set.run_experiments(&mut interrupting_runner(usize::MAX), false).unwrap();
    let first_ids: Vec<_> = [1, 2]
        .iter()
        .flat_map(|value| set.ledger().trials(*value))
        .map(|trial| trial.trial_id)
        .collect();

    // Descriptor only: the ledger starts empty, so every trial runs again.
    let mut reopened = EdgeCountSweep::load(store.clone(), "run1").unwrap();
    assert!(reopened.results().is_some());
    let mut numbers = Vec::new();
    reopened
        .run_experiments_with(&mut interrupting_runner(usize::MAX), false, |progress| {
            numbers.push(progress.number)
        })
        .unwrap();
    assert_eq!(numbers, vec![1, 2, 3, 4]);

    let dir = store.trial_dir("run1", "edge_count");
    let mut backed_up = Vec::new();
    for entry in fs::read_dir(&dir).unwrap() {
        let path = entry.unwrap().path();
        if path.to_string_lossy().contains(".backup.") {
            let trial: TrialResult =
                serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
            backed_up.push(trial.trial_id);
        }
    }
    backed_up.sort();
    let mut expected = first_ids;
    expected.sort();
    assert_eq!(backed_up, expected);
    assert_eq!(store.trial_numbers("run1", "edge_count").unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn clobbered_trial_is_recoverable_from_backup() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    let set = EdgeCountSweep::create(store.clone(), params(), "run1", 1, Some(vec![2])).unwrap();
    let resolve = |edges| set.config().fixed.resolve(set.config().independent, edges).unwrap();

    let original = TrialResult::new(resolve(2), outcome_for(2), 0.0);
    let replacement = TrialResult::new(resolve(2), outcome_for(4), 0.0);
    set.save_experiment(&original, 1).unwrap();
    set.save_experiment(&replacement, 1).unwrap();

    let current: TrialResult = store.retrieve(&Slot::trial("run1", "edge_count", 1)).unwrap();
    assert_eq!(current, replacement);

    let backup = fs::read_dir(store.trial_dir("run1", "edge_count"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .find(|path| {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            name.starts_with("experiment.001.") && name.contains(".backup.")
        })
        .expect("backup of trial 1");
    let recovered: TrialResult =
        serde_yaml::from_str(&fs::read_to_string(backup).unwrap()).unwrap();
    assert_eq!(recovered, original);
}

#[test]
fn gap_in_trial_records_is_detected() {
    let temp_dir = tempdir().unwrap();
    let store = RecordStore::new(temp_dir.path()).unwrap();
    let mut set =
        EdgeCountSweep::create(store.clone(), params(), "run1", 2, Some(vec![1, 2])).unwrap();
    set.run_experiments(&mut interrupting_runner(usize::MAX), false).unwrap();
    fs::remove_file(store.path_of(&Slot::trial("run1", "edge_count", 2))).unwrap();

    let mut strict = EdgeCountSweep::load(store.clone(), "run1").unwrap();
    let err = strict.load_experiments(GapPolicy::Strict).unwrap_err();
    match err {
        SweepError::Set(SetError::SequenceGap { missing, stranded }) => {
            assert_eq!(missing, 2);
            assert_eq!(stranded, vec![3, 4]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(strict.ledger().is_empty());

    let mut lenient = EdgeCountSweep::load(store, "run1").unwrap();
    assert_eq!(lenient.load_experiments(GapPolicy::StopAtFirstGap).unwrap(), 1);
    assert_eq!(lenient.completed_trials(), 1);
}
