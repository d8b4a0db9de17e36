//! Simulation parameters: the fixed set a sweep holds constant, the one
//! parameter it varies, and the fully resolved set handed to a trial.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value taken by the independent parameter of a sweep.
pub type SweepValue = i64;

/// The simulation parameters a sweep is allowed to vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndependentParam {
    EdgesPerNode,
    NumWeightSamples,
}

impl IndependentParam {
    /// Parameter name as it appears in descriptors and trial records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::EdgesPerNode => "edges_per_node",
            Self::NumWeightSamples => "num_weight_samples",
        }
    }
}

impl fmt::Display for IndependentParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters held constant across a sweep.
///
/// The two sweepable parameters are optional: exactly the one a sweep varies
/// must be left unset, see [`FixedParams::check_independent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedParams {
    pub num_nodes: u32,
    pub agent_type_prior: String,
    pub edge_strategy: String,
    pub edge_weight_strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges_per_node: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_weight_samples: Option<u32>,
}

impl FixedParams {
    pub fn new(
        num_nodes: u32,
        agent_type_prior: impl Into<String>,
        edge_strategy: impl Into<String>,
        edge_weight_strategy: impl Into<String>,
    ) -> Self {
        Self {
            num_nodes,
            agent_type_prior: agent_type_prior.into(),
            edge_strategy: edge_strategy.into(),
            edge_weight_strategy: edge_weight_strategy.into(),
            edges_per_node: None,
            num_weight_samples: None,
        }
    }

    pub fn with_edges_per_node(mut self, edges_per_node: u32) -> Self {
        self.edges_per_node = Some(edges_per_node);
        self
    }

    pub fn with_num_weight_samples(mut self, num_weight_samples: u32) -> Self {
        self.num_weight_samples = Some(num_weight_samples);
        self
    }

    /// Verify that `independent` is unset and every other parameter is set.
    pub fn check_independent(&self, independent: IndependentParam) -> Result<(), String> {
        let (swept, other, other_name) = match independent {
            IndependentParam::EdgesPerNode => (
                self.edges_per_node,
                self.num_weight_samples,
                IndependentParam::NumWeightSamples,
            ),
            IndependentParam::NumWeightSamples => (
                self.num_weight_samples,
                self.edges_per_node,
                IndependentParam::EdgesPerNode,
            ),
        };
        if swept.is_some() {
            return Err(format!(
                "{independent} is the independent parameter and cannot also be fixed"
            ));
        }
        if other.is_none() {
            return Err(format!("fixed parameter {other_name} is not set"));
        }
        Ok(())
    }

    /// Combine the fixed parameters with one value of the independent parameter.
    pub fn resolve(
        &self,
        independent: IndependentParam,
        value: SweepValue,
    ) -> Result<TrialParams, String> {
        self.check_independent(independent)?;
        let value = u32::try_from(value)
            .map_err(|_| format!("{independent} value {value} is out of range"))?;
        let (edges_per_node, num_weight_samples) = match independent {
            IndependentParam::EdgesPerNode => (Some(value), self.num_weight_samples),
            IndependentParam::NumWeightSamples => (self.edges_per_node, Some(value)),
        };
        Ok(TrialParams {
            num_nodes: self.num_nodes,
            agent_type_prior: self.agent_type_prior.clone(),
            edge_strategy: self.edge_strategy.clone(),
            edge_weight_strategy: self.edge_weight_strategy.clone(),
            edges_per_node: edges_per_node.unwrap_or_default(),
            num_weight_samples: num_weight_samples.unwrap_or_default(),
        })
    }
}

/// A fully resolved parameter set for one trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialParams {
    pub num_nodes: u32,
    pub agent_type_prior: String,
    pub edge_strategy: String,
    pub edge_weight_strategy: String,
    pub edges_per_node: u32,
    pub num_weight_samples: u32,
}

impl TrialParams {
    /// Value this trial used for the given parameter.
    pub fn value_of(&self, param: IndependentParam) -> SweepValue {
        match param {
            IndependentParam::EdgesPerNode => SweepValue::from(self.edges_per_node),
            IndependentParam::NumWeightSamples => SweepValue::from(self.num_weight_samples),
        }
    }

}
