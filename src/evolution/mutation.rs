//! Gaussian point mutation.
//!
//! Each weight and bias is perturbed independently with probability
//! `mutation_rate` by adding `N(0, 1) * mutation_scale`. Values are not
//! clamped; any weight the noise produces is a valid search state.

use crate::error::ConfigurationError;
use crate::evolution::crossover::check_rate;
use crate::network::NetworkController;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Configuration for mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability of perturbing each gene.
    pub mutation_rate: f64,
    /// Standard deviation of the Gaussian noise.
    pub mutation_scale: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            mutation_scale: 0.1,
        }
    }
}

impl MutationConfig {
    /// Check the rate and the noise scale.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a rate outside `[0, 1]` or a negative
    /// or non-finite scale.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_rate("mutation_rate", self.mutation_rate)?;
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err(ConfigurationError::InvalidMutationScale(self.mutation_scale));
        }
        Ok(())
    }
}

/// Mutate a controller in place. Returns the number of genes perturbed.
///
/// Any recorded fitness is cleared when at least one gene changes.
///
/// # Errors
///
/// Returns a configuration error if `config` fails [`MutationConfig::validate`];
/// the controller is left untouched in that case.
pub fn mutate<R: Rng + ?Sized>(
    individual: &mut NetworkController,
    config: &MutationConfig,
    rng: &mut R,
) -> Result<usize, ConfigurationError> {
    config.validate()?;

    let mut mutated = 0;
    for gene in individual.genes_mut() {
        if rng.gen_bool(config.mutation_rate) {
            let noise: f64 = rng.sample(StandardNormal);
            *gene += noise * config.mutation_scale;
            mutated += 1;
        }
    }
    if mutated > 0 {
        individual.clear_fitness();
    }
    Ok(mutated)
}
