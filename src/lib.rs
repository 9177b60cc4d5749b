// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Neuroevo: neuroevolution of fixed-topology game controllers.
//!
//! A single-hidden-layer feedforward network maps a game state to a
//! probability distribution over actions. Instead of gradient descent, a
//! generational genetic algorithm searches the weight space:
//! - Uniform random initialization, ReLU hidden layer, softmax output
//! - Tournament selection, uniform crossover, Gaussian mutation
//! - An elitist archive holding the best controller ever evaluated
//! - Reproducible runs from a single seed, optionally evaluated in parallel
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Playback / Simulation (external)  │
//! ├─────────────────────────────────────┤
//! │   Evolution Engine (evolution)      │
//! ├─────────────────────────────────────┤
//! │   Controller capability             │
//! ├─────────────────────────────────────┤
//! │   Network Controller (network)      │
//! └─────────────────────────────────────┘
//! ```

pub mod controller;
pub mod dodge;
pub mod error;
pub mod evolution;
pub mod network;

pub use controller::{Controller, ScriptedController, argmax_action, sample_action};
pub use error::{ConfigurationError, NetResult, NetworkError};
pub use network::{INIT_HALF_RANGE, NetworkController, NetworkShape};
