//! Seeded stand-in for the trust-network simulation model.
//!
//! Scores rise with edge density and sample count and carry uniform noise, so
//! sweeps produce plausible curves without running the real model.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sweep_types::{TrialError, TrialOutcome, TrialParams, Vocabulary};

use crate::runner::TrialRunner;

pub const CORRELATION_NAMES: &[&str] = &["pearson", "spearman", "kendall"];

pub const MODEL_NAMES: &[&str] = &[
    "pagerank",
    "hitting_pagerank_all",
    "hitting_time_all",
    "hitting_time_top",
    "max_flow",
    "shortest_path",
];

#[derive(Debug, Clone)]
pub struct SyntheticRunner {
    vocabulary: Vocabulary,
    rng: ChaCha8Rng,
    noise: f64,
}

impl SyntheticRunner {
    pub fn new(seed: u64) -> Self {
        Self {
            vocabulary: Vocabulary::new(
                CORRELATION_NAMES.iter().copied(),
                MODEL_NAMES.iter().copied(),
            ),
            rng: ChaCha8Rng::seed_from_u64(seed),
            noise: 0.05,
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise.abs();
        self
    }

    fn informativeness(params: &TrialParams, model_index: usize, metric_index: usize) -> f64 {
        let density = f64::from(params.edges_per_node) / f64::from(params.num_nodes.max(1));
        let sampling = (1.0 + f64::from(params.num_weight_samples)).ln();
        let skill = 0.5 + 0.08 * model_index as f64;
        let raw = skill * (1.0 - (-4.0 * density * sampling.max(0.1)).exp());
        raw * (1.0 - 0.05 * metric_index as f64)
    }
}

impl TrialRunner for SyntheticRunner {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn run_trial(&mut self, params: &TrialParams) -> Result<TrialOutcome, TrialError> {
        if params.num_nodes == 0 {
            return Err(TrialError::InvalidParams {
                message: "num_nodes must be positive".to_string(),
            });
        }
        if params.edges_per_node >= params.num_nodes {
            return Err(TrialError::InvalidParams {
                message: format!(
                    "edges_per_node {} must be below num_nodes {}",
                    params.edges_per_node, params.num_nodes
                ),
            });
        }

        let mut outcome = TrialOutcome::new();
        for (model_index, model) in MODEL_NAMES.iter().enumerate() {
            for (metric_index, metric) in CORRELATION_NAMES.iter().enumerate() {
                let jitter = if self.noise > 0.0 {
                    self.rng.gen_range(-self.noise..self.noise)
                } else {
                    0.0
                };
                let score = (Self::informativeness(params, model_index, metric_index) + jitter)
                    .clamp(-1.0, 1.0);
                outcome = outcome.with_score(metric, model, score);
            }
            let work = f64::from(params.num_nodes) * f64::from(params.edges_per_node);
            let runtime = work * 1e-5 * (1.0 + model_index as f64) * self.rng.gen_range(0.9..1.1);
            outcome = outcome.with_runtime(model, runtime);
        }
        Ok(outcome)
    }
}
