//! Sweep descriptors: what a sweep is, independent of how far it has run.

use serde::{Deserialize, Serialize};
use sweep_types::{FixedParams, IndependentParam, SetError, SweepValue};

/// Identity every concrete sweep must supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetIdentity {
    /// Set-type name, e.g. `edge_count`. Part of every record name, so it must
    /// not change once sweeps have been saved under it.
    pub name: String,
    pub plot_title: String,
    pub plot_xlabel: String,
}

impl SetIdentity {
    pub fn new(
        name: impl Into<String>,
        plot_title: impl Into<String>,
        plot_xlabel: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            plot_title: plot_title.into(),
            plot_xlabel: plot_xlabel.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SetError> {
        for (field, value) in [
            ("name", &self.name),
            ("plot_title", &self.plot_title),
            ("plot_xlabel", &self.plot_xlabel),
        ] {
            if value.trim().is_empty() {
                return Err(SetError::Configuration {
                    message: format!("{field} must be defined"),
                });
            }
        }
        Ok(())
    }
}

/// Persisted descriptor of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub identity: SetIdentity,
    pub fixed: FixedParams,
    pub independent: IndependentParam,
    pub values: Vec<SweepValue>,
    /// Run identifier chosen by the caller.
    pub prefix: String,
    /// Target number of trials per independent value.
    pub num_experiments: usize,
}

impl SweepConfig {
    pub fn new(
        identity: SetIdentity,
        fixed: FixedParams,
        independent: IndependentParam,
        values: Vec<SweepValue>,
        prefix: impl Into<String>,
        num_experiments: usize,
    ) -> Self {
        Self {
            identity,
            fixed,
            independent,
            values,
            prefix: prefix.into(),
            num_experiments,
        }
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn validate(&self) -> Result<(), SetError> {
        self.identity.validate()?;
        let invalid = |message: String| SetError::Configuration { message };
        if self.prefix.trim().is_empty() {
            return Err(invalid("prefix must not be empty".to_string()));
        }
        if self.num_experiments == 0 {
            return Err(invalid("num_experiments must be positive".to_string()));
        }
        if self.values.is_empty() {
            return Err(invalid(format!("no values given for {}", self.independent)));
        }
        let mut seen = std::collections::BTreeSet::new();
        for value in &self.values {
            if !seen.insert(*value) {
                return Err(invalid(format!(
                    "value {value} is listed twice for {}",
                    self.independent
                )));
            }
        }
        self.fixed.check_independent(self.independent).map_err(invalid)?;
        for value in &self.values {
            self.fixed
                .resolve(self.independent, *value)
                .map_err(invalid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SweepConfig {
        SweepConfig::new(
            SetIdentity::new("edge_count", "Title", "Edges per node"),
            FixedParams::new(50, "uniform", "random", "noisy").with_num_weight_samples(1),
            IndependentParam::EdgesPerNode,
            vec![2, 3],
            "run1",
            2,
        )
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn missing_identity_field_is_a_configuration_error() {
        let mut config = config();
        config.identity.plot_xlabel = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("plot_xlabel must be defined"));
    }

    #[test]
    fn zero_repetitions_rejected() {
        let mut config = config();
        config.num_experiments = 0;
        assert!(matches!(config.validate(), Err(SetError::Configuration { .. })));
    }

    #[test]
    fn duplicate_and_negative_values_rejected() {
        let mut config = config();
        config.values = vec![2, 2];
        assert!(config.validate().is_err());
        config.values = vec![-4];
        assert!(config.validate().is_err());
    }

    #[test]
    fn fixed_independent_parameter_rejected() {
        let mut config = config();
        config.fixed.edges_per_node = Some(4);
        assert!(config.validate().is_err());
    }
}
