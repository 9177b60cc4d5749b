//! Output formatting utilities for CLI.

use neuroevo::NetworkController;
use neuroevo::dodge::EpisodeResult;
use neuroevo::evolution::{EvolutionConfig, EvolutionOutcome, EvolutionStats};
use serde::Serialize;
use std::fmt::Write;

/// JSON-serializable evolution result.
#[derive(Debug, Serialize)]
pub(super) struct JsonEvolutionResult<'a> {
    /// Configuration the run used.
    pub(super) config: &'a EvolutionConfig,
    /// Run statistics.
    pub(super) stats: &'a EvolutionStats,
    /// Best individual: shape, chromosome and fitness.
    pub(super) best: &'a NetworkController,
}

impl<'a> JsonEvolutionResult<'a> {
    pub(super) fn new(config: &'a EvolutionConfig, outcome: &'a EvolutionOutcome) -> Self {
        Self {
            config,
            stats: &outcome.stats,
            best: &outcome.best,
        }
    }
}

/// JSON-serializable baseline episode.
#[derive(Debug, Serialize)]
pub(super) struct JsonBaselineResult {
    /// Episode seed.
    pub(super) seed: u64,
    /// Raw episode outcome.
    pub(super) episode: EpisodeResult,
    /// Fitness the oracle would report.
    pub(super) fitness: f64,
}

/// Format an evolution run as human-readable text.
pub(super) fn format_evolution_text(config: &EvolutionConfig, outcome: &EvolutionOutcome) -> String {
    let stats = &outcome.stats;
    let mut output = String::new();

    let _ = writeln!(output, "Evolution complete (seed: {})", config.seed);
    let _ = writeln!(output, "  Network: {}", config.shape);
    let _ = writeln!(output, "  Population: {}", config.population_size);
    let _ = writeln!(output, "  Generations: {}", config.max_generations);
    let _ = writeln!(output, "  Evaluations: {}", stats.evaluations);
    let _ = writeln!(output);
    let _ = writeln!(output, "  Best fitness: {:.4}", stats.best_fitness);
    let _ = writeln!(output, "  Best generation: {}", stats.best_generation);
    let _ = writeln!(output, "  Elapsed time: {:.1}s", stats.elapsed_seconds);

    if let (Some(first), Some(last)) = (stats.generations.first(), stats.generations.last()) {
        let _ = writeln!(output);
        let _ = writeln!(output, "  {:>5}  {:>12}  {:>12}  {:>12}", "gen", "best", "mean", "archive");
        let rows = if first.generation == last.generation {
            vec![first]
        } else {
            vec![first, last]
        };
        for g in rows {
            let _ = writeln!(
                output,
                "  {:>5}  {:>12.4}  {:>12.4}  {:>12.4}",
                g.generation, g.best_fitness, g.mean_fitness, g.archive_fitness
            );
        }
    }

    output
}

/// Format a baseline episode as human-readable text.
pub(super) fn format_baseline_text(seed: u64, episode: &EpisodeResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Baseline dodger (seed: {seed})");
    let _ = writeln!(output, "  Ticks survived: {}", episode.ticks);
    let _ = writeln!(output, "  Hazards dodged: {}", episode.dodged);
    let _ = writeln!(output, "  Collided: {}", if episode.collided { "yes" } else { "no" });
    let _ = writeln!(output, "  Fitness: {:.4}", episode.fitness());
    output
}
