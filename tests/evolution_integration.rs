//! End-to-end tests for the evolution engine.
//!
//! These tests run complete evolutions against small stub oracles and check
//! the run-level guarantees: generation count, elitism, reproducibility and
//! failure handling.
//!
//! Run with: cargo test --release evolution_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::cast_precision_loss)]

use std::sync::Mutex;

use neuroevo::evolution::{
    EngineState, Evaluation, EvolutionConfig, EvolutionEngine, EvolutionError, FitnessError,
    evolve,
};
use neuroevo::{NetworkController, NetworkError, NetworkShape};

fn scenario_config() -> EvolutionConfig {
    EvolutionConfig {
        shape: NetworkShape::new(4, 3, 2).unwrap(),
        population_size: 10,
        max_generations: 5,
        seed: 5,
        ..EvolutionConfig::default()
    }
}

fn positive_input_weights(controller: &NetworkController) -> f64 {
    controller.input_weights().iter().filter(|&&w| w > 0.0).count() as f64
}

fn gene_sum(controller: &NetworkController, _seed: u64) -> Result<f64, FitnessError> {
    Ok(controller.genes().sum())
}

#[test]
fn test_end_to_end_scenario() {
    let recorded = Mutex::new(Vec::new());
    let oracle = |c: &NetworkController, _seed: u64| -> Result<f64, FitnessError> {
        let fitness = positive_input_weights(c);
        recorded.lock().unwrap().push(fitness);
        Ok(fitness)
    };

    let outcome = evolve(&scenario_config(), &oracle).unwrap();

    // generation 0 plus exactly 5 bred generations
    assert_eq!(outcome.stats.generations.len(), 6);
    let last = outcome.stats.generations.last().unwrap();
    assert_eq!(last.generation, 5);
    assert_eq!(outcome.stats.evaluations, 10 * 6);

    let recorded = recorded.into_inner().unwrap();
    assert_eq!(recorded.len(), 60);
    let max_recorded = recorded.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let best = outcome.best.fitness().unwrap();
    assert!((best - max_recorded).abs() < f64::EPSILON);
    assert!((positive_input_weights(&outcome.best) - best).abs() < f64::EPSILON);
}

#[test]
fn test_archive_fitness_never_decreases() {
    let config = EvolutionConfig {
        population_size: 12,
        max_generations: 15,
        seed: 99,
        ..scenario_config()
    };
    let outcome = evolve(&config, &gene_sum).unwrap();

    let archive: Vec<f64> = outcome.stats.generations.iter().map(|g| g.archive_fitness).collect();
    for pair in archive.windows(2) {
        assert!(pair[1] >= pair[0], "archive regressed: {pair:?}");
    }
    for g in &outcome.stats.generations {
        assert!(g.archive_fitness >= g.best_fitness);
    }
    assert!((outcome.stats.best_fitness - archive[archive.len() - 1]).abs() < f64::EPSILON);
}

#[test]
fn test_same_seed_same_outcome() {
    let a = evolve(&scenario_config(), &gene_sum).unwrap();
    let b = evolve(&scenario_config(), &gene_sum).unwrap();
    assert_eq!(a.best, b.best);
    assert_eq!(a.stats.generations, b.stats.generations);

    let other = EvolutionConfig {
        seed: 6,
        ..scenario_config()
    };
    let c = evolve(&other, &gene_sum).unwrap();
    assert_ne!(a.best.encode(), c.best.encode());
}

#[test]
fn test_parallel_matches_sequential() {
    let sequential = EvolutionConfig {
        population_size: 16,
        max_generations: 8,
        evaluation: Evaluation::Sequential,
        ..scenario_config()
    };
    let parallel = EvolutionConfig {
        evaluation: Evaluation::Parallel,
        ..sequential
    };

    let a = evolve(&sequential, &gene_sum).unwrap();
    let b = evolve(&parallel, &gene_sum).unwrap();
    assert_eq!(a.best, b.best);
    assert_eq!(a.stats.generations, b.stats.generations);
    assert_eq!(a.stats.best_generation, b.stats.best_generation);
    assert_eq!(a.stats.evaluations, b.stats.evaluations);
}

#[test]
fn test_every_evaluation_uses_run_seed() {
    let seeds = Mutex::new(Vec::new());
    let oracle = |_: &NetworkController, seed: u64| -> Result<f64, FitnessError> {
        seeds.lock().unwrap().push(seed);
        Ok(1.0)
    };

    let config = EvolutionConfig {
        seed: 1234,
        evaluation: Evaluation::Parallel,
        ..scenario_config()
    };
    evolve(&config, &oracle).unwrap();

    let seeds = seeds.into_inner().unwrap();
    assert_eq!(seeds.len(), 60);
    assert!(seeds.iter().all(|&s| s == 1234));
}

#[test]
fn test_flat_fitness_keeps_first_archive() {
    // with no strict improvement the archive stays at generation 0
    let oracle = |_: &NetworkController, _: u64| -> Result<f64, FitnessError> { Ok(3.0) };
    let outcome = evolve(&scenario_config(), &oracle).unwrap();
    assert_eq!(outcome.stats.best_generation, 0);
    assert_eq!(outcome.best.fitness(), Some(3.0));
}

#[test]
fn test_degenerate_forward_aborts_run() {
    // pushing every output bias far below zero underflows the softmax denominator
    let oracle = |c: &NetworkController, _: u64| -> Result<f64, FitnessError> {
        let mut probe = c.clone();
        let [_, _, _, output_biases] = probe.segments_mut();
        output_biases.fill(-1.0e4);
        let dist = probe.forward(&[0.0; 4])?;
        Ok(dist[0])
    };

    let err = evolve(&scenario_config(), &oracle).unwrap_err();
    assert_eq!(err, EvolutionError::NumericDegeneracy);
}

#[test]
fn test_oracle_failure_stops_engine() {
    let calls = Mutex::new(0usize);
    let oracle = |_: &NetworkController, _: u64| -> Result<f64, FitnessError> {
        let mut n = calls.lock().unwrap();
        *n += 1;
        if *n > 15 {
            return Err(FitnessError::Episode("simulation crashed".into()));
        }
        Ok(0.0)
    };

    let mut engine = EvolutionEngine::new(scenario_config(), &oracle).unwrap();
    assert!(engine.step().unwrap().is_some());
    let err = engine.step().unwrap_err();
    assert_eq!(err, EvolutionError::Oracle("simulation crashed".into()));
    assert_eq!(engine.state(), EngineState::Failed);
    assert_eq!(engine.step().unwrap_err(), EvolutionError::Aborted);
    assert_eq!(engine.run().unwrap_err(), EvolutionError::Aborted);
}

#[test]
fn test_input_length_mismatch_is_configuration_error() {
    let oracle = |c: &NetworkController, _: u64| -> Result<f64, FitnessError> {
        Ok(c.forward(&[1.0, 2.0])?[0])
    };
    let err = evolve(&scenario_config(), &oracle).unwrap_err();
    assert!(matches!(err, EvolutionError::Configuration(_)));

    let as_network: FitnessError = NetworkError::NumericDegeneracy.into();
    assert_eq!(EvolutionError::from(as_network), EvolutionError::NumericDegeneracy);
}

#[test]
fn test_dodge_evolution_beats_initial_population() {
    use neuroevo::dodge::DodgeOracle;

    let config = EvolutionConfig {
        shape: NetworkShape::new(4, 6, 3).unwrap(),
        population_size: 20,
        max_generations: 10,
        seed: 3,
        evaluation: Evaluation::Parallel,
        ..EvolutionConfig::default()
    };
    let outcome = evolve(&config, &DodgeOracle).unwrap();
    let initial = outcome.stats.generations[0].best_fitness;
    assert!(outcome.stats.best_fitness >= initial);
    assert!(outcome.stats.best_fitness >= 1.0);
}
