use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{
    genome::HIDDEN_DIM_RANGE,
    population::{ElitePolicy, ReproductionMode, ReproductionParams},
};

pub const GENERATIONS_RANGE: RangeInclusive<usize> = 1..=100;
pub const POPULATION_SIZE_RANGE: RangeInclusive<usize> = 1..=50;
pub const MUTATION_RATE_RANGE: RangeInclusive<f32> = 0.0..=0.99;

/// Parameters of a training run.
///
/// Missing fields in a JSON file fall back to [`TrainConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Number of generations to run.
    pub generations: usize,
    /// Number of agents per generation.
    pub population_size: usize,
    /// Hidden layer size of every genome.
    pub hidden_dim: usize,
    /// Per-parameter mutation probability.
    pub mutation_rate: f32,
    pub mode: ReproductionMode,
    pub elite_policy: ElitePolicy,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            generations: 10,
            population_size: 10,
            hidden_dim: 6,
            mutation_rate: 0.1,
            mode: ReproductionMode::Generational,
            elite_policy: ElitePolicy::Cloned,
        }
    }
}

/// Out-of-range run configuration.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("generations must be in {GENERATIONS_RANGE:?}, got {_0}")]
    Generations(#[error(not(source))] usize),
    #[display("population size must be in {POPULATION_SIZE_RANGE:?}, got {_0}")]
    PopulationSize(#[error(not(source))] usize),
    #[display("hidden layer size must be in {HIDDEN_DIM_RANGE:?}, got {_0}")]
    HiddenDim(#[error(not(source))] usize),
    #[display("mutation rate must be in {MUTATION_RATE_RANGE:?}, got {_0}")]
    MutationRate(#[error(not(source))] f32),
}

impl TrainConfig {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !GENERATIONS_RANGE.contains(&self.generations) {
            return Err(ConfigError::Generations(self.generations));
        }
        if !POPULATION_SIZE_RANGE.contains(&self.population_size) {
            return Err(ConfigError::PopulationSize(self.population_size));
        }
        if !HIDDEN_DIM_RANGE.contains(&self.hidden_dim) {
            return Err(ConfigError::HiddenDim(self.hidden_dim));
        }
        // NaN fails `contains`
        if !MUTATION_RATE_RANGE.contains(&self.mutation_rate) {
            return Err(ConfigError::MutationRate(self.mutation_rate));
        }
        Ok(())
    }

    #[must_use]
    pub fn reproduction_params(&self) -> ReproductionParams {
        ReproductionParams {
            mutation_rate: self.mutation_rate,
            hidden_dim: self.hidden_dim,
            mode: self.mode,
            elite_policy: self.elite_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(TrainConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_out_of_range_fields() {
        let base = TrainConfig::default();
        let cases = [
            (
                TrainConfig {
                    generations: 0,
                    ..base.clone()
                },
                ConfigError::Generations(0),
            ),
            (
                TrainConfig {
                    population_size: 51,
                    ..base.clone()
                },
                ConfigError::PopulationSize(51),
            ),
            (
                TrainConfig {
                    hidden_dim: 3,
                    ..base.clone()
                },
                ConfigError::HiddenDim(3),
            ),
            (
                TrainConfig {
                    mutation_rate: 1.0,
                    ..base.clone()
                },
                ConfigError::MutationRate(1.0),
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn test_rejects_nan_mutation_rate() {
        let config = TrainConfig {
            mutation_rate: f32::NAN,
            ..TrainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MutationRate(_))
        ));
    }

    #[test]
    fn test_accepts_range_bounds() {
        let config = TrainConfig {
            generations: 100,
            population_size: 1,
            hidden_dim: 10,
            mutation_rate: 0.99,
            ..TrainConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            ConfigError::HiddenDim(11).to_string(),
            "hidden layer size must be in 4..=10, got 11"
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainConfig =
            serde_json::from_str(r#"{"generations": 3, "mode": "elitist-crossover"}"#).unwrap();
        assert_eq!(config.generations, 3);
        assert_eq!(config.mode, ReproductionMode::ElitistCrossover);
        assert_eq!(config.population_size, 10);

        assert!(serde_json::from_str::<TrainConfig>(r#"{"speed": 3}"#).is_err());
    }
}
