//! Uniform gene-wise crossover.
//!
//! Every weight and bias of the child is inherited independently: from the
//! first parent with probability `crossover_rate`, otherwise from the second.
//! There is no cut point; input weights, hidden biases, output weights and
//! output biases are each walked gene by gene in chromosome order.

use crate::error::ConfigurationError;
use crate::network::NetworkController;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for crossover operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverConfig {
    /// Probability that a gene is copied from the first parent.
    pub crossover_rate: f64,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            crossover_rate: 0.8,
        }
    }
}

impl CrossoverConfig {
    /// Check that the rate is a probability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidRate`] if the rate is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_rate("crossover_rate", self.crossover_rate)
    }
}

/// Breed a child from two parents of identical shape.
///
/// The child starts unevaluated.
///
/// # Errors
///
/// Returns [`ConfigurationError::ChromosomeLength`] if the parents' shapes
/// differ, or [`ConfigurationError::InvalidRate`] for a bad rate.
pub fn crossover<R: Rng + ?Sized>(
    parent1: &NetworkController,
    parent2: &NetworkController,
    config: &CrossoverConfig,
    rng: &mut R,
) -> Result<NetworkController, ConfigurationError> {
    config.validate()?;
    if parent1.shape() != parent2.shape() {
        return Err(ConfigurationError::ChromosomeLength {
            expected: parent1.shape().chromosome_len(),
            actual: parent2.shape().chromosome_len(),
        });
    }

    let mut child = NetworkController::new(parent1.shape())?;
    for ((child_seg, p1_seg), p2_seg) in child
        .segments_mut()
        .into_iter()
        .zip(parent1.segments())
        .zip(parent2.segments())
    {
        for ((gene, &a), &b) in child_seg.iter_mut().zip(p1_seg).zip(p2_seg) {
            *gene = if rng.gen_bool(config.crossover_rate) { a } else { b };
        }
    }
    Ok(child)
}

/// Validate a probability setting.
pub(crate) fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidRate { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkShape;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn parents(rng: &mut SmallRng) -> (NetworkController, NetworkController) {
        let shape = NetworkShape::new(4, 3, 2).unwrap();
        let mut p1 = NetworkController::random(shape, rng).unwrap();
        let mut p2 = NetworkController::random(shape, rng).unwrap();
        p1.set_fitness(5.0);
        p2.set_fitness(1.0);
        (p1, p2)
    }

    #[test]
    fn test_rate_one_copies_first_parent() {
        let mut rng = SmallRng::seed_from_u64(11);
        let (p1, p2) = parents(&mut rng);
        let config = CrossoverConfig { crossover_rate: 1.0 };

        let child = crossover(&p1, &p2, &config, &mut rng).unwrap();
        assert_eq!(child.encode(), p1.encode());
        assert!(child.fitness().is_none());
    }

    #[test]
    fn test_rate_zero_copies_second_parent() {
        let mut rng = SmallRng::seed_from_u64(12);
        let (p1, p2) = parents(&mut rng);
        let config = CrossoverConfig { crossover_rate: 0.0 };

        let child = crossover(&p1, &p2, &config, &mut rng).unwrap();
        assert_eq!(child.encode(), p2.encode());
    }

    #[test]
    fn test_mixed_child_takes_each_gene_from_a_parent() {
        let mut rng = SmallRng::seed_from_u64(13);
        let (p1, p2) = parents(&mut rng);
        let config = CrossoverConfig { crossover_rate: 0.5 };

        let child = crossover(&p1, &p2, &config, &mut rng).unwrap();
        let (c, a, b) = (child.encode(), p1.encode(), p2.encode());
        let mut from_first = 0;
        for i in 0..c.len() {
            assert!(c[i].to_bits() == a[i].to_bits() || c[i].to_bits() == b[i].to_bits());
            if c[i].to_bits() == a[i].to_bits() {
                from_first += 1;
            }
        }
        assert!(from_first > 0 && from_first < c.len());
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut rng = SmallRng::seed_from_u64(14);
        let a = NetworkController::new(NetworkShape::new(2, 2, 2).unwrap()).unwrap();
        let b = NetworkController::new(NetworkShape::new(3, 2, 2).unwrap()).unwrap();
        assert!(crossover(&a, &b, &CrossoverConfig::default(), &mut rng).is_err());
    }

    #[test]
    fn test_check_rate() {
        assert!(check_rate("r", 0.0).is_ok());
        assert!(check_rate("r", 1.0).is_ok());
        assert!(check_rate("r", 1.5).is_err());
        assert!(check_rate("r", f64::NAN).is_err());
        assert!(CrossoverConfig { crossover_rate: -0.1 }.validate().is_err());
    }
}
