//! Genetic algorithm over network weights.
//!
//! This module evolves [`NetworkController`](crate::NetworkController)
//! weights with a generational genetic algorithm instead of gradient descent.
//! Fitness comes from an external [`FitnessOracle`] that plays one seeded
//! episode per call.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Evolution Engine + Elite Archive  │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │   Fitness Evaluation (oracle)       │
//! ├─────────────────────────────────────┤
//! │   Network Controller (chromosome)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use neuroevo::evolution::{evolve, EvolutionConfig, FitnessError};
//! use neuroevo::{NetworkController, NetworkShape};
//!
//! let config = EvolutionConfig {
//!     shape: NetworkShape::new(4, 3, 2)?,
//!     population_size: 10,
//!     max_generations: 5,
//!     seed: 5,
//!     ..EvolutionConfig::default()
//! };
//! let oracle = |c: &NetworkController, _seed: u64| -> Result<f64, FitnessError> {
//!     Ok(c.output_biases().iter().sum())
//! };
//! let outcome = evolve(&config, &oracle)?;
//! assert_eq!(outcome.stats.generations.len(), 6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod crossover;
mod engine;
mod fitness;
mod mutation;
mod population;
mod selection;

pub use config::{DEFAULT_HIDDEN_DIM, EvolutionConfig};
pub use crossover::{CrossoverConfig, crossover};
pub use engine::{
    EngineState, EvolutionEngine, EvolutionError, EvolutionOutcome, EvolutionStats,
    GenerationStats, evolve,
};
pub use fitness::{Evaluation, FitnessError, FitnessOracle, evaluate_population};
pub use mutation::{MutationConfig, mutate};
pub use population::Population;
pub use selection::{SelectionConfig, SelectionStats, select_parents, tournament_select};
