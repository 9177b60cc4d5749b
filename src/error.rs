//! Error types for controllers and their configuration.

use std::fmt;

/// A setup defect: bad dimensions, bad rates, or mismatched vector lengths.
///
/// These are never recovered from; any occurrence aborts the enclosing run.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A network dimension was zero.
    ZeroDimension {
        /// Which dimension (`input_dim`, `hidden_dim` or `output_dim`).
        name: &'static str,
    },
    /// A chromosome passed to `decode` had the wrong length.
    ChromosomeLength {
        /// Length required by the network shape.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A state vector passed to `forward` had the wrong length.
    InputLength {
        /// The network's input dimension.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A controller produced a distribution over the wrong number of actions.
    ActionCount {
        /// Actions the environment understands.
        expected: usize,
        /// Length of the distribution produced.
        actual: usize,
    },
    /// The population must hold at least one individual.
    EmptyPopulation,
    /// Tournaments must sample at least one individual.
    ZeroTournamentSize,
    /// A probability was outside `[0, 1]` or not finite.
    InvalidRate {
        /// Name of the offending setting.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Mutation noise scale was negative or not finite.
    InvalidMutationScale(f64),
    /// A configuration document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { name } => write!(f, "{name} must be positive"),
            Self::ChromosomeLength { expected, actual } => {
                write!(f, "chromosome length mismatch: expected {expected}, got {actual}")
            }
            Self::InputLength { expected, actual } => {
                write!(f, "state vector length mismatch: expected {expected}, got {actual}")
            }
            Self::ActionCount { expected, actual } => {
                write!(f, "action count mismatch: expected {expected}, got {actual}")
            }
            Self::EmptyPopulation => write!(f, "population size must be positive"),
            Self::ZeroTournamentSize => write!(f, "tournament size must be at least 1"),
            Self::InvalidRate { name, value } => {
                write!(f, "{name} must be within [0, 1], got {value}")
            }
            Self::InvalidMutationScale(scale) => {
                write!(f, "mutation scale must be finite and non-negative, got {scale}")
            }
            Self::Parse(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Failure during controller construction or inference.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Dimensions or vector lengths are inconsistent.
    Configuration(ConfigurationError),
    /// The softmax normalization denominator was exactly zero.
    NumericDegeneracy,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
            Self::NumericDegeneracy => {
                write!(f, "numeric degeneracy: softmax denominator is zero")
            }
        }
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            Self::NumericDegeneracy => None,
        }
    }
}

impl From<ConfigurationError> for NetworkError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

/// Result type for controller operations.
pub type NetResult<T> = Result<T, NetworkError>;
