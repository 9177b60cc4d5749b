//! Fixed-topology feedforward controller.
//!
//! One hidden layer with rectified linear units feeds a softmax over the
//! available actions. All weights live in four flat, row-major buffers so the
//! chromosome view is a straight concatenation:
//!
//! ```text
//! [ input weights (in x hid) | hidden biases (hid) | output weights (hid x out) | output biases (out) ]
//! ```

use crate::error::{ConfigurationError, NetResult, NetworkError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Half-width of the uniform interval used for fresh weights.
pub const INIT_HALF_RANGE: f64 = 0.5;

/// Layer sizes of a controller. Fixed for the controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkShape {
    /// Length of the state vector.
    pub input_dim: usize,
    /// Width of the hidden layer.
    pub hidden_dim: usize,
    /// Number of actions.
    pub output_dim: usize,
}

impl NetworkShape {
    /// Create a shape, rejecting zero dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroDimension`] if any dimension is zero.
    pub fn new(
        input_dim: usize,
        hidden_dim: usize,
        output_dim: usize,
    ) -> Result<Self, ConfigurationError> {
        let shape = Self {
            input_dim,
            hidden_dim,
            output_dim,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Check that every dimension is positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroDimension`] naming the first zero dimension.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, dim) in [
            ("input_dim", self.input_dim),
            ("hidden_dim", self.hidden_dim),
            ("output_dim", self.output_dim),
        ] {
            if dim == 0 {
                return Err(ConfigurationError::ZeroDimension { name });
            }
        }
        Ok(())
    }

    /// Number of genes in a chromosome for this shape.
    #[must_use]
    pub fn chromosome_len(&self) -> usize {
        self.input_dim * self.hidden_dim
            + self.hidden_dim
            + self.hidden_dim * self.output_dim
            + self.output_dim
    }
}

impl fmt::Display for NetworkShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.input_dim, self.hidden_dim, self.output_dim)
    }
}

/// One individual: the weights of a single network plus its last recorded fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SerializedController", try_from = "SerializedController")]
pub struct NetworkController {
    shape: NetworkShape,
    /// Row-major `input_dim x hidden_dim`.
    input_weights: Vec<f64>,
    hidden_biases: Vec<f64>,
    /// Row-major `hidden_dim x output_dim`.
    output_weights: Vec<f64>,
    output_biases: Vec<f64>,
    fitness: Option<f64>,
}

impl NetworkController {
    /// Create a controller with every weight and bias set to zero.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any dimension is zero.
    pub fn new(shape: NetworkShape) -> Result<Self, ConfigurationError> {
        shape.validate()?;
        Ok(Self {
            shape,
            input_weights: vec![0.0; shape.input_dim * shape.hidden_dim],
            hidden_biases: vec![0.0; shape.hidden_dim],
            output_weights: vec![0.0; shape.hidden_dim * shape.output_dim],
            output_biases: vec![0.0; shape.output_dim],
            fitness: None,
        })
    }

    /// Create a controller with freshly randomized weights.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any dimension is zero.
    pub fn random<R: Rng + ?Sized>(
        shape: NetworkShape,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        let mut controller = Self::new(shape)?;
        controller.initialize_weights(rng);
        Ok(controller)
    }

    /// Build a controller directly from a chromosome.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on a zero dimension or a length mismatch.
    pub fn from_chromosome(
        shape: NetworkShape,
        values: &[f64],
    ) -> Result<Self, ConfigurationError> {
        let mut controller = Self::new(shape)?;
        controller.decode(values)?;
        Ok(controller)
    }

    /// Draw every weight and bias independently from `[-0.5, 0.5)`.
    pub fn initialize_weights<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for gene in self.genes_mut() {
            *gene = rng.r#gen::<f64>() - INIT_HALF_RANGE;
        }
        self.fitness = None;
    }

    /// Layer sizes.
    #[must_use]
    pub fn shape(&self) -> NetworkShape {
        self.shape
    }

    /// Last recorded fitness, `None` if not evaluated since the weights last changed.
    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Record the result of an evaluation.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Forget the recorded fitness.
    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    /// Weight from input `i` to hidden unit `j`.
    #[must_use]
    pub fn input_weight(&self, i: usize, j: usize) -> f64 {
        self.input_weights[i * self.shape.hidden_dim + j]
    }

    /// Weight from hidden unit `i` to output `j`.
    #[must_use]
    pub fn output_weight(&self, i: usize, j: usize) -> f64 {
        self.output_weights[i * self.shape.output_dim + j]
    }

    /// Row-major input weights.
    #[must_use]
    pub fn input_weights(&self) -> &[f64] {
        &self.input_weights
    }

    /// Hidden layer biases.
    #[must_use]
    pub fn hidden_biases(&self) -> &[f64] {
        &self.hidden_biases
    }

    /// Row-major output weights.
    #[must_use]
    pub fn output_weights(&self) -> &[f64] {
        &self.output_weights
    }

    /// Output layer biases.
    #[must_use]
    pub fn output_biases(&self) -> &[f64] {
        &self.output_biases
    }

    /// The four gene segments in chromosome order.
    #[must_use]
    pub fn segments(&self) -> [&[f64]; 4] {
        [
            self.input_weights.as_slice(),
            self.hidden_biases.as_slice(),
            self.output_weights.as_slice(),
            self.output_biases.as_slice(),
        ]
    }

    /// Mutable gene segments in chromosome order.
    ///
    /// Callers that change genes through this view must re-evaluate; the
    /// recorded fitness is left untouched here.
    pub fn segments_mut(&mut self) -> [&mut [f64]; 4] {
        [
            self.input_weights.as_mut_slice(),
            self.hidden_biases.as_mut_slice(),
            self.output_weights.as_mut_slice(),
            self.output_biases.as_mut_slice(),
        ]
    }

    /// Iterate over all genes in chromosome order.
    pub fn genes(&self) -> impl Iterator<Item = &f64> {
        self.input_weights
            .iter()
            .chain(&self.hidden_biases)
            .chain(&self.output_weights)
            .chain(&self.output_biases)
    }

    /// Iterate mutably over all genes in chromosome order.
    pub fn genes_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.input_weights
            .iter_mut()
            .chain(&mut self.hidden_biases)
            .chain(&mut self.output_weights)
            .chain(&mut self.output_biases)
    }

    /// Flatten all weights into a chromosome.
    #[must_use]
    pub fn encode(&self) -> Vec<f64> {
        let mut chromosome = Vec::with_capacity(self.shape.chromosome_len());
        for segment in self.segments() {
            chromosome.extend_from_slice(segment);
        }
        chromosome
    }

    /// Overwrite all weights from a chromosome of exactly the expected length.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ChromosomeLength`] on a length mismatch,
    /// in which case the controller is left unchanged.
    pub fn decode(&mut self, values: &[f64]) -> Result<(), ConfigurationError> {
        let expected = self.shape.chromosome_len();
        if values.len() != expected {
            return Err(ConfigurationError::ChromosomeLength {
                expected,
                actual: values.len(),
            });
        }

        let mut rest = values;
        for segment in self.segments_mut() {
            let (head, tail) = rest.split_at(segment.len());
            segment.copy_from_slice(head);
            rest = tail;
        }
        self.fitness = None;
        Ok(())
    }

    /// Map a state vector to a probability distribution over actions.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `input` has the wrong length, and
    /// [`NetworkError::NumericDegeneracy`] if every exponential underflows to zero.
    pub fn forward(&self, input: &[f64]) -> NetResult<Vec<f64>> {
        let NetworkShape {
            input_dim,
            hidden_dim,
            output_dim,
        } = self.shape;
        if input.len() != input_dim {
            return Err(ConfigurationError::InputLength {
                expected: input_dim,
                actual: input.len(),
            }
            .into());
        }

        let hidden: Vec<f64> = (0..hidden_dim)
            .map(|j| {
                let sum: f64 = input
                    .iter()
                    .enumerate()
                    .map(|(i, x)| x * self.input_weights[i * hidden_dim + j])
                    .sum();
                (sum + self.hidden_biases[j]).max(0.0)
            })
            .collect();

        let logits: Vec<f64> = (0..output_dim)
            .map(|j| {
                let sum: f64 = hidden
                    .iter()
                    .enumerate()
                    .map(|(i, h)| h * self.output_weights[i * output_dim + j])
                    .sum();
                sum + self.output_biases[j]
            })
            .collect();

        // degeneracy is judged on the unshifted exponentials
        let raw_total: f64 = logits.iter().map(|l| l.exp()).sum();
        if raw_total == 0.0 {
            return Err(NetworkError::NumericDegeneracy);
        }

        // shifting by the largest logit keeps every exponential in (0, 1]
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut output: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f64 = output.iter().sum();
        for p in &mut output {
            *p /= total;
        }
        Ok(output)
    }

    /// Order by descending fitness; unevaluated controllers sort last.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        match (self.fitness, other.fitness) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl fmt::Display for NetworkController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fitness {
            Some(fitness) => write!(f, "network {} (fitness {fitness:.4})", self.shape),
            None => write!(f, "network {} (unevaluated)", self.shape),
        }
    }
}

/// Wire form of a controller: shape, flat chromosome and fitness.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedController {
    shape: NetworkShape,
    chromosome: Vec<f64>,
    fitness: Option<f64>,
}

impl From<NetworkController> for SerializedController {
    fn from(controller: NetworkController) -> Self {
        Self {
            shape: controller.shape,
            chromosome: controller.encode(),
            fitness: controller.fitness,
        }
    }
}

impl TryFrom<SerializedController> for NetworkController {
    type Error = ConfigurationError;

    fn try_from(value: SerializedController) -> Result<Self, Self::Error> {
        let mut controller = Self::from_chromosome(value.shape, &value.chromosome)?;
        controller.fitness = value.fitness;
        Ok(controller)
    }
}
