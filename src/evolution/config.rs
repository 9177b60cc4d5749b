//! Run configuration.
//!
//! Every setting has a default, so a JSON document only needs to name what
//! it overrides.

use crate::dodge;
use crate::error::ConfigurationError;
use crate::evolution::crossover::CrossoverConfig;
use crate::evolution::fitness::Evaluation;
use crate::evolution::mutation::MutationConfig;
use crate::evolution::selection::SelectionConfig;
use crate::network::NetworkShape;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hidden layer width used when none is configured.
pub const DEFAULT_HIDDEN_DIM: usize = 25;

/// Configuration for one evolution run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Layer sizes shared by every individual.
    pub shape: NetworkShape,
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations bred after the initial population.
    pub max_generations: usize,
    /// Seeds the run's random stream and every oracle call.
    pub seed: u64,
    /// Selection configuration.
    pub selection: SelectionConfig,
    /// Crossover configuration.
    pub crossover: CrossoverConfig,
    /// Mutation configuration.
    pub mutation: MutationConfig,
    /// Sequential or thread-pool evaluation.
    pub evaluation: Evaluation,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            shape: NetworkShape {
                input_dim: dodge::STATE_SIZE,
                hidden_dim: DEFAULT_HIDDEN_DIM,
                output_dim: dodge::NUM_ACTIONS,
            },
            population_size: 100,
            max_generations: 100,
            seed: 42,
            selection: SelectionConfig::default(),
            crossover: CrossoverConfig::default(),
            mutation: MutationConfig::default(),
            evaluation: Evaluation::default(),
        }
    }
}

impl EvolutionConfig {
    /// Check every setting.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.shape.validate()?;
        if self.population_size == 0 {
            return Err(ConfigurationError::EmptyPopulation);
        }
        self.selection.validate()?;
        self.crossover.validate()?;
        self.mutation.validate()
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] for malformed JSON, or the
    /// validation error for out-of-range settings.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_evolution_config_default() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population_size, 100);
        assert_eq!(config.max_generations, 100);
        assert_eq!(config.shape.hidden_dim, 25);
        assert_eq!(config.evaluation, Evaluation::Sequential);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EvolutionConfig::from_json(
            r#"{"population_size": 10, "seed": 5, "mutation": {"mutation_rate": 0.0}}"#,
        )
        .unwrap();
        assert_eq!(config.population_size, 10);
        assert_eq!(config.seed, 5);
        assert!(config.mutation.mutation_rate.abs() < f64::EPSILON);
        assert!((config.mutation.mutation_scale - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.selection.tournament_size, 2);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = EvolutionConfig::from_json(r#"{"population_size": 0}"#).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyPopulation);

        let err = EvolutionConfig::from_json(r#"{"crossover": {"crossover_rate": 1.2}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidRate { name: "crossover_rate", .. }));

        let err = EvolutionConfig::from_json(
            r#"{"shape": {"input_dim": 4, "hidden_dim": 0, "output_dim": 2}}"#,
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::ZeroDimension { name: "hidden_dim" });

        assert!(matches!(
            EvolutionConfig::from_json("{not json"),
            Err(ConfigurationError::Parse(_))
        ));
    }

    #[test]
    fn test_parallel_evaluation_parses() {
        let config = EvolutionConfig::from_json(r#"{"evaluation": "parallel"}"#).unwrap();
        assert_eq!(config.evaluation, Evaluation::Parallel);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_generations": 7, "selection": {{"tournament_size": 4}}}}"#).unwrap();

        let config = EvolutionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_generations, 7);
        assert_eq!(config.selection.tournament_size, 4);

        let missing = EvolutionConfig::from_json_file(Path::new("/nonexistent/config.json"));
        assert!(matches!(missing, Err(ConfigurationError::Parse(_))));
    }
}
