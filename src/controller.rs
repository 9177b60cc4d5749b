//! The controller capability: map a game state to action probabilities.
//!
//! Playback loops and fitness oracles only ever talk to this trait. The
//! evolved network is the canonical implementation; hand-written policies
//! plug in through [`ScriptedController`].

use crate::error::{ConfigurationError, NetResult, NetworkError};
use crate::network::NetworkController;
use rand::Rng;
use std::fmt;

/// Anything that turns a state vector into a distribution over actions.
pub trait Controller {
    /// Compute action probabilities for `state`.
    ///
    /// # Errors
    ///
    /// Implementations report malformed input or degenerate output as [`NetworkError`].
    fn forward(&self, state: &[f64]) -> NetResult<Vec<f64>>;

    /// Pick the most probable action.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Controller::forward`].
    fn best_action(&self, state: &[f64]) -> NetResult<usize> {
        let dist = self.forward(state)?;
        argmax_action(&dist).ok_or(NetworkError::NumericDegeneracy)
    }
}

impl Controller for NetworkController {
    fn forward(&self, state: &[f64]) -> NetResult<Vec<f64>> {
        NetworkController::forward(self, state)
    }
}

impl<C: Controller + ?Sized> Controller for &C {
    fn forward(&self, state: &[f64]) -> NetResult<Vec<f64>> {
        (**self).forward(state)
    }
}

/// A hand-written policy wrapped as a controller.
pub struct ScriptedController<F> {
    input_dim: usize,
    policy: F,
}

impl<F> ScriptedController<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    /// Wrap `policy`, which receives states of length `input_dim`.
    #[must_use]
    pub fn new(input_dim: usize, policy: F) -> Self {
        Self { input_dim, policy }
    }
}

impl<F> Controller for ScriptedController<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    fn forward(&self, state: &[f64]) -> NetResult<Vec<f64>> {
        if state.len() != self.input_dim {
            return Err(ConfigurationError::InputLength {
                expected: self.input_dim,
                actual: state.len(),
            }
            .into());
        }
        let dist = (self.policy)(state);
        if dist.iter().sum::<f64>() == 0.0 {
            return Err(NetworkError::NumericDegeneracy);
        }
        Ok(dist)
    }
}

impl<F> fmt::Debug for ScriptedController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedController")
            .field("input_dim", &self.input_dim)
            .finish_non_exhaustive()
    }
}

/// Index of the largest probability; the first one wins ties.
///
/// Returns `None` for an empty distribution.
#[must_use]
pub fn argmax_action(dist: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &p) in dist.iter().enumerate() {
        match best {
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((idx, p)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Draw an action index with probability proportional to `dist`.
///
/// Returns `None` for an empty distribution.
pub fn sample_action<R: Rng + ?Sized>(dist: &[f64], rng: &mut R) -> Option<usize> {
    let last = dist.len().checked_sub(1)?;
    let total: f64 = dist.iter().sum();
    let target = rng.r#gen::<f64>() * total;

    let mut cumulative = 0.0;
    for (idx, &p) in dist.iter().enumerate() {
        cumulative += p;
        if target < cumulative {
            return Some(idx);
        }
    }
    // rounding can leave target just above the final cumulative sum
    Some(last)
}
