//! Selection operators for neuroevolution.
//!
//! Parents are chosen by tournament: sample k individuals uniformly with
//! replacement and keep the fittest. Tournaments run independently for each
//! parent, so both parents of a child may be the same individual.

// Selection uses intentional casts for statistics
#![allow(clippy::cast_precision_loss)]

use crate::error::ConfigurationError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for selection operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of individuals competing in each tournament.
    pub tournament_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { tournament_size: 2 }
    }
}

impl SelectionConfig {
    /// Reject empty tournaments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroTournamentSize`] if `tournament_size` is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.tournament_size == 0 {
            return Err(ConfigurationError::ZeroTournamentSize);
        }
        Ok(())
    }
}

/// Tournament selection: sample `k` indices with replacement and return the fittest.
///
/// The earliest sampled individual wins a tie. Returns `None` for an empty
/// population. `k` of zero is treated as one.
///
/// Sampling with replacement only applies while `k` is smaller than the
/// population. Once `k` covers the whole population this is a full
/// tournament instead: every individual enters exactly once, no random
/// draws are made, and the fittest is returned with the lowest index
/// winning ties. A unique maximum is therefore always selected, which
/// replacement sampling could miss.
pub fn tournament_select<R: Rng + ?Sized>(fitness: &[f64], k: usize, rng: &mut R) -> Option<usize> {
    let pop_size = fitness.len();
    if pop_size == 0 {
        return None;
    }
    if k >= pop_size {
        return fittest(fitness);
    }

    let mut best_idx = rng.gen_range(0..pop_size);
    let mut best_fitness = fitness[best_idx];

    for _ in 1..k.max(1) {
        let idx = rng.gen_range(0..pop_size);
        if fitness[idx] > best_fitness {
            best_idx = idx;
            best_fitness = fitness[idx];
        }
    }

    Some(best_idx)
}

/// Index of the highest fitness; the lowest index wins ties.
fn fittest(fitness: &[f64]) -> Option<usize> {
    let mut best = 0;
    for (idx, &f) in fitness.iter().enumerate().skip(1) {
        if f > fitness[best] {
            best = idx;
        }
    }
    (!fitness.is_empty()).then_some(best)
}

/// Select the two parents of one child with independent tournaments.
pub fn select_parents<R: Rng + ?Sized>(
    fitness: &[f64],
    config: &SelectionConfig,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let p1 = tournament_select(fitness, config.tournament_size, rng)?;
    let p2 = tournament_select(fitness, config.tournament_size, rng)?;
    Some((p1, p2))
}

/// Summary statistics over one generation's fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionStats {
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Worst fitness in the population.
    pub worst_fitness: f64,
    /// Standard deviation of fitness.
    pub fitness_std: f64,
}

impl SelectionStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                mean_fitness: 0.0,
                best_fitness: 0.0,
                worst_fitness: 0.0,
                fitness_std: 0.0,
            };
        }

        let mean = fitness.iter().sum::<f64>() / fitness.len() as f64;
        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / fitness.len() as f64;

        Self {
            mean_fitness: mean,
            best_fitness: best,
            worst_fitness: worst,
            fitness_std: variance.sqrt(),
        }
    }
}
