//! Concrete sweeps: which parameter varies, its default values, and how the
//! resulting charts are labelled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sweep_store::RecordStore;
use sweep_types::{FixedParams, IndependentParam, SweepError, SweepResult, SweepValue};

use crate::config::{SetIdentity, SweepConfig};
use crate::experiment_set::ExperimentSet;

/// The sweeps this crate knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    EdgeCount,
    SampleCount,
}

impl SweepKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EdgeCount => EdgeCountSweep::NAME,
            Self::SampleCount => SampleCountSweep::NAME,
        }
    }

    pub fn independent(&self) -> IndependentParam {
        match self {
            Self::EdgeCount => IndependentParam::EdgesPerNode,
            Self::SampleCount => IndependentParam::NumWeightSamples,
        }
    }

    pub fn default_values(&self) -> &'static [SweepValue] {
        match self {
            Self::EdgeCount => EdgeCountSweep::DEFAULT_EDGE_COUNTS,
            Self::SampleCount => SampleCountSweep::DEFAULT_SAMPLE_COUNTS,
        }
    }

    /// Reopen a saved sweep of this kind.
    pub fn load(&self, store: RecordStore, prefix: &str) -> SweepResult<ExperimentSet> {
        ExperimentSet::load_from_file(store, prefix, self.name())
    }
}

impl fmt::Display for SweepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SweepKind {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            EdgeCountSweep::NAME => Ok(Self::EdgeCount),
            SampleCountSweep::NAME => Ok(Self::SampleCount),
            other => Err(sweep_types::validation_error!(
                "unknown sweep kind {other}; expected {} or {}",
                EdgeCountSweep::NAME,
                SampleCountSweep::NAME
            )),
        }
    }
}

/// Use `values` unless it is missing or empty.
fn values_or_default(values: Option<Vec<SweepValue>>, defaults: &[SweepValue]) -> Vec<SweepValue> {
    match values {
        Some(values) if !values.is_empty() => values,
        _ => defaults.to_vec(),
    }
}

/// Fixed parameters of an edge count sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCountParams {
    pub num_nodes: u32,
    pub agent_type_prior: String,
    pub edge_strategy: String,
    pub edge_weight_strategy: String,
    pub num_weight_samples: u32,
}

/// Varies the number of edges per node at a fixed node count.
pub struct EdgeCountSweep;

impl EdgeCountSweep {
    pub const NAME: &'static str = "edge_count";
    pub const PLOT_XLABEL: &'static str = "Edges per node";
    /// Sized for graphs of 50 nodes.
    pub const DEFAULT_EDGE_COUNTS: &'static [SweepValue] = &[2, 3, 4, 5, 10, 15, 20, 35, 49];

    pub fn plot_title(num_nodes: u32) -> String {
        format!("Varying edge count with graph of {num_nodes} nodes")
    }

    pub fn config(
        params: EdgeCountParams,
        prefix: &str,
        num_experiments: usize,
        edge_counts: Option<Vec<SweepValue>>,
    ) -> SweepConfig {
        let identity = SetIdentity::new(
            Self::NAME,
            Self::plot_title(params.num_nodes),
            Self::PLOT_XLABEL,
        );
        let fixed = FixedParams::new(
            params.num_nodes,
            params.agent_type_prior,
            params.edge_strategy,
            params.edge_weight_strategy,
        )
        .with_num_weight_samples(params.num_weight_samples);

        SweepConfig::new(
            identity,
            fixed,
            IndependentParam::EdgesPerNode,
            values_or_default(edge_counts, Self::DEFAULT_EDGE_COUNTS),
            prefix,
            num_experiments,
        )
    }

    pub fn create(
        store: RecordStore,
        params: EdgeCountParams,
        prefix: &str,
        num_experiments: usize,
        edge_counts: Option<Vec<SweepValue>>,
    ) -> SweepResult<ExperimentSet> {
        ExperimentSet::create(store, Self::config(params, prefix, num_experiments, edge_counts))
    }

    pub fn load(store: RecordStore, prefix: &str) -> SweepResult<ExperimentSet> {
        ExperimentSet::load_from_file(store, prefix, Self::NAME)
    }
}

/// Fixed parameters of a sample count sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleCountParams {
    pub num_nodes: u32,
    pub agent_type_prior: String,
    pub edge_strategy: String,
    pub edges_per_node: u32,
    pub edge_weight_strategy: String,
}

/// Varies how many weight samples are drawn per edge.
pub struct SampleCountSweep;

impl SampleCountSweep {
    pub const NAME: &'static str = "sample_count";
    pub const PLOT_XLABEL: &'static str = "Number of samples per edge";
    // TODO: add an unbounded sample count once charts can place it on the x axis.
    pub const DEFAULT_SAMPLE_COUNTS: &'static [SweepValue] = &[1, 2, 3, 4, 5, 10, 20, 100];

    pub fn plot_title(num_nodes: u32) -> String {
        format!("Varying edge samples with graph of {num_nodes} nodes")
    }

    pub fn config(
        params: SampleCountParams,
        prefix: &str,
        num_experiments: usize,
        sample_counts: Option<Vec<SweepValue>>,
    ) -> SweepConfig {
        let identity = SetIdentity::new(
            Self::NAME,
            Self::plot_title(params.num_nodes),
            Self::PLOT_XLABEL,
        );
        let fixed = FixedParams::new(
            params.num_nodes,
            params.agent_type_prior,
            params.edge_strategy,
            params.edge_weight_strategy,
        )
        .with_edges_per_node(params.edges_per_node);

        SweepConfig::new(
            identity,
            fixed,
            IndependentParam::NumWeightSamples,
            values_or_default(sample_counts, Self::DEFAULT_SAMPLE_COUNTS),
            prefix,
            num_experiments,
        )
    }

    pub fn create(
        store: RecordStore,
        params: SampleCountParams,
        prefix: &str,
        num_experiments: usize,
        sample_counts: Option<Vec<SweepValue>>,
    ) -> SweepResult<ExperimentSet> {
        ExperimentSet::create(
            store,
            Self::config(params, prefix, num_experiments, sample_counts),
        )
    }

    pub fn load(store: RecordStore, prefix: &str) -> SweepResult<ExperimentSet> {
        ExperimentSet::load_from_file(store, prefix, Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn edge_params() -> EdgeCountParams {
        EdgeCountParams {
            num_nodes: 50,
            agent_type_prior: "uniform".to_string(),
            edge_strategy: "random".to_string(),
            edge_weight_strategy: "noisy".to_string(),
            num_weight_samples: 3,
        }
    }

    fn sample_params() -> SampleCountParams {
        SampleCountParams {
            num_nodes: 20,
            agent_type_prior: "uniform".to_string(),
            edge_strategy: "random".to_string(),
            edges_per_node: 4,
            edge_weight_strategy: "noisy".to_string(),
        }
    }

    #[test]
    fn edge_count_defaults_and_identity() {
        let config = EdgeCountSweep::config(edge_params(), "run1", 5, None);
        assert_eq!(config.values, EdgeCountSweep::DEFAULT_EDGE_COUNTS.to_vec());
        assert_eq!(config.identity.name, "edge_count");
        assert_eq!(
            config.identity.plot_title,
            "Varying edge count with graph of 50 nodes"
        );
        assert_eq!(config.independent, IndependentParam::EdgesPerNode);
        assert_eq!(config.fixed.num_weight_samples, Some(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_override_falls_back_to_defaults() {
        let config = SampleCountSweep::config(sample_params(), "run1", 1, Some(Vec::new()));
        assert_eq!(config.values, SampleCountSweep::DEFAULT_SAMPLE_COUNTS.to_vec());

        let config = SampleCountSweep::config(sample_params(), "run1", 1, Some(vec![7, 9]));
        assert_eq!(config.values, vec![7, 9]);
    }

    #[test]
    fn sample_count_identity() {
        let config = SampleCountSweep::config(sample_params(), "run1", 1, None);
        assert_eq!(config.identity.plot_xlabel, "Number of samples per edge");
        assert_eq!(config.independent, IndependentParam::NumWeightSamples);
        assert_eq!(config.fixed.edges_per_node, Some(4));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn create_then_load_by_kind() {
        let temp_dir = tempdir().unwrap();
        let store = RecordStore::new(temp_dir.path()).unwrap();
        let created =
            SampleCountSweep::create(store.clone(), sample_params(), "run1", 2, Some(vec![1, 2]))
                .unwrap();

        let loaded = SweepKind::SampleCount.load(store, "run1").unwrap();
        assert_eq!(loaded.config(), created.config());
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("edge_count".parse::<SweepKind>().unwrap(), SweepKind::EdgeCount);
        assert_eq!(
            "sample_count".parse::<SweepKind>().unwrap(),
            SweepKind::SampleCount
        );
        assert!("node_count".parse::<SweepKind>().is_err());
        assert_eq!(SweepKind::EdgeCount.independent(), IndependentParam::EdgesPerNode);
        assert_eq!(SweepKind::SampleCount.default_values().len(), 8);
    }
}
