//! Fitness evaluation.
//!
//! Fitness comes from an external oracle that plays one complete episode with
//! a controller and reports a single score. The engine passes the same run
//! seed to every call, so scores compare controllers on one fixed episode.

// Fitness evaluation uses intentional naming conventions
#![allow(clippy::module_name_repetitions)]

use crate::error::NetworkError;
use crate::network::NetworkController;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plays one seeded episode with a controller and scores it. Higher is better.
///
/// Oracles only get a shared reference: they may run inference but can never
/// change weights. Implementations must be deterministic for a given
/// controller and seed.
pub trait FitnessOracle: Sync {
    /// Run one episode from `seed` and return its fitness.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the episode cannot be played.
    fn evaluate(&self, controller: &NetworkController, seed: u64) -> Result<f64, FitnessError>;
}

impl<F> FitnessOracle for F
where
    F: Fn(&NetworkController, u64) -> Result<f64, FitnessError> + Sync,
{
    fn evaluate(&self, controller: &NetworkController, seed: u64) -> Result<f64, FitnessError> {
        self(controller, seed)
    }
}

/// Error during fitness evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum FitnessError {
    /// The controller failed during inference.
    Network(NetworkError),
    /// The episode itself could not be played.
    Episode(String),
}

impl fmt::Display for FitnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "inference failed: {e}"),
            Self::Episode(msg) => write!(f, "episode failed: {msg}"),
        }
    }
}

impl std::error::Error for FitnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            Self::Episode(_) => None,
        }
    }
}

impl From<NetworkError> for FitnessError {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

/// How a batch of individuals is evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    /// One individual at a time on the calling thread.
    #[default]
    Sequential,
    /// Spread over the rayon thread pool.
    Parallel,
}

/// Evaluate every individual and record its fitness.
///
/// Returns once every individual has a fitness, which is the generation
/// barrier: nothing downstream may select from the batch before that. On
/// failure the error of the lowest-indexed failing individual is returned and
/// no fitness is recorded.
///
/// # Errors
///
/// Returns the first oracle error in index order.
pub fn evaluate_population<O: FitnessOracle + ?Sized>(
    individuals: &mut [NetworkController],
    oracle: &O,
    seed: u64,
    mode: Evaluation,
) -> Result<(), FitnessError> {
    let scores: Vec<Result<f64, FitnessError>> = match mode {
        Evaluation::Sequential => individuals
            .iter()
            .map(|individual| oracle.evaluate(individual, seed))
            .collect(),
        Evaluation::Parallel => individuals
            .par_iter()
            .map(|individual| oracle.evaluate(individual, seed))
            .collect(),
    };

    let scores = scores.into_iter().collect::<Result<Vec<f64>, FitnessError>>()?;
    for (individual, score) in individuals.iter_mut().zip(scores) {
        individual.set_fitness(score);
    }
    Ok(())
}
