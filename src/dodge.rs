//! A small falling-hazard episode used as a demo fitness oracle.
//!
//! The player occupies one of eight lanes at the bottom of the arena. A
//! single hazard falls from the top in a lane drawn from the episode's own
//! random stream; when it lands in the player's lane the episode ends,
//! otherwise it counts as dodged and a new hazard spawns. Actions are chosen
//! by arg-max over the controller's distribution, so an episode is fully
//! determined by the controller and the seed.

use crate::controller::{Controller, ScriptedController, argmax_action};
use crate::error::{ConfigurationError, NetResult, NetworkError};
use crate::evolution::{FitnessError, FitnessOracle};
use crate::network::NetworkController;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Length of the state vector handed to controllers.
pub const STATE_SIZE: usize = 4;
/// Number of actions: left, stay, right.
pub const NUM_ACTIONS: usize = 3;
/// Number of lanes in the arena.
pub const LANES: i32 = 8;
/// Rows a hazard falls before it lands.
pub const DROP_HEIGHT: i32 = 6;
/// Episode length cap.
pub const MAX_TICKS: u32 = 500;
/// Fitness awarded per dodged hazard on top of one point per tick.
pub const DODGE_BONUS: f64 = 10.0;

/// Player moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move one lane left.
    Left,
    /// Stay put.
    Stay,
    /// Move one lane right.
    Right,
}

impl Action {
    /// Map an action index (position in the distribution) to a move.
    #[must_use]
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Left),
            1 => Some(Self::Stay),
            2 => Some(Self::Right),
            _ => None,
        }
    }

    fn delta(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Stay => 0,
            Self::Right => 1,
        }
    }
}

/// Outcome of one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EpisodeResult {
    /// Ticks survived.
    pub ticks: u32,
    /// Hazards that landed outside the player's lane.
    pub dodged: u32,
    /// Whether the episode ended in a collision.
    pub collided: bool,
}

impl EpisodeResult {
    /// Scalar fitness: one point per tick plus a bonus per dodge.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        f64::from(self.ticks) + DODGE_BONUS * f64::from(self.dodged)
    }
}

enum Tick {
    Falling,
    Dodged,
    Collision,
}

struct Arena {
    rng: SmallRng,
    player: i32,
    hazard_lane: i32,
    hazard_height: i32,
}

impl Arena {
    fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let hazard_lane = rng.gen_range(0..LANES);
        Self {
            rng,
            player: LANES / 2,
            hazard_lane,
            hazard_height: DROP_HEIGHT,
        }
    }

    fn state(&self) -> [f64; STATE_SIZE] {
        let span = f64::from(LANES - 1);
        [
            f64::from(self.player) / span,
            f64::from(self.hazard_lane) / span,
            f64::from(self.hazard_height) / f64::from(DROP_HEIGHT),
            f64::from(self.hazard_lane - self.player) / span,
        ]
    }

    fn advance(&mut self, action: Action) -> Tick {
        self.player = (self.player + action.delta()).clamp(0, LANES - 1);
        self.hazard_height -= 1;
        if self.hazard_height > 0 {
            return Tick::Falling;
        }
        if self.hazard_lane == self.player {
            return Tick::Collision;
        }
        self.hazard_lane = self.rng.gen_range(0..LANES);
        self.hazard_height = DROP_HEIGHT;
        Tick::Dodged
    }
}

/// Play one episode from `seed`.
///
/// # Errors
///
/// Propagates inference errors, and rejects controllers whose distribution
/// does not cover exactly [`NUM_ACTIONS`] actions.
pub fn run_episode<C: Controller + ?Sized>(controller: &C, seed: u64) -> NetResult<EpisodeResult> {
    let mut arena = Arena::new(seed);
    let mut result = EpisodeResult {
        ticks: 0,
        dodged: 0,
        collided: false,
    };

    while result.ticks < MAX_TICKS {
        let dist = controller.forward(&arena.state())?;
        if dist.len() != NUM_ACTIONS {
            return Err(ConfigurationError::ActionCount {
                expected: NUM_ACTIONS,
                actual: dist.len(),
            }
            .into());
        }
        let action = argmax_action(&dist)
            .and_then(Action::from_index)
            .ok_or(NetworkError::NumericDegeneracy)?;

        result.ticks += 1;
        match arena.advance(action) {
            Tick::Falling => {}
            Tick::Dodged => result.dodged += 1,
            Tick::Collision => {
                result.collided = true;
                break;
            }
        }
    }
    Ok(result)
}

/// Fitness oracle backed by [`run_episode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DodgeOracle;

impl FitnessOracle for DodgeOracle {
    fn evaluate(&self, controller: &NetworkController, seed: u64) -> Result<f64, FitnessError> {
        Ok(run_episode(controller, seed)?.fitness())
    }
}

fn dodge_policy(state: &[f64]) -> Vec<f64> {
    let (player, offset) = (state[0], state[3]);
    if offset.abs() > f64::EPSILON {
        return vec![0.0, 1.0, 0.0];
    }
    if player > 0.5 {
        vec![1.0, 0.0, 0.0]
    } else {
        vec![0.0, 0.0, 1.0]
    }
}

/// Hand-written baseline: step out of the hazard's lane, otherwise stay.
#[must_use]
pub fn dodger() -> ScriptedController<fn(&[f64]) -> Vec<f64>> {
    ScriptedController::new(STATE_SIZE, dodge_policy as fn(&[f64]) -> Vec<f64>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkShape;

    fn stay_policy(_: &[f64]) -> Vec<f64> {
        vec![0.0, 1.0, 0.0]
    }

    fn stay_put() -> ScriptedController<fn(&[f64]) -> Vec<f64>> {
        ScriptedController::new(STATE_SIZE, stay_policy as fn(&[f64]) -> Vec<f64>)
    }

    #[test]
    fn test_episode_is_deterministic() {
        let a = run_episode(&stay_put(), 1234).unwrap();
        let b = run_episode(&stay_put(), 1234).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dodger_survives_full_episode() {
        for seed in 0..20 {
            let result = run_episode(&dodger(), seed).unwrap();
            assert!(!result.collided, "seed {seed}");
            assert_eq!(result.ticks, MAX_TICKS);
            assert!(result.dodged > 0);
        }
    }

    #[test]
    fn test_dodger_not_worse_than_standing_still() {
        for seed in 0..20 {
            let scripted = run_episode(&dodger(), seed).unwrap().fitness();
            let idle = run_episode(&stay_put(), seed).unwrap().fitness();
            assert!(scripted >= idle);
        }
    }

    #[test]
    fn test_wrong_action_count_rejected() {
        let shape = NetworkShape::new(STATE_SIZE, 3, 2).unwrap();
        let network = NetworkController::new(shape).unwrap();
        let err = run_episode(&network, 0).unwrap_err();
        assert_eq!(
            err,
            NetworkError::Configuration(ConfigurationError::ActionCount {
                expected: NUM_ACTIONS,
                actual: 2
            })
        );
    }

    #[test]
    fn test_oracle_scores_network() {
        let shape = NetworkShape::new(STATE_SIZE, 5, NUM_ACTIONS).unwrap();
        let network = NetworkController::new(shape).unwrap();
        let fitness = DodgeOracle.evaluate(&network, 9).unwrap();
        // zero weights: uniform distribution, arg-max picks "left" every tick
        let expected = run_episode(&network, 9).unwrap().fitness();
        assert!((fitness - expected).abs() < f64::EPSILON);
        assert!(fitness >= 1.0);
    }

    #[test]
    fn test_state_is_normalized() {
        let arena = Arena::new(5);
        let state = arena.state();
        assert!(state[..3].iter().all(|v| (0.0..=1.0).contains(v)));
        assert!((-1.0..=1.0).contains(&state[3]));
    }
}
