//! Evolve command implementation.

use super::output::{JsonEvolutionResult, format_evolution_text};
use super::{CliError, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use neuroevo::dodge::DodgeOracle;
use neuroevo::evolution::{Evaluation, EvolutionConfig, EvolutionEngine};
use std::path::Path;

/// Command-line settings that take precedence over the configuration file.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) population: Option<usize>,
    pub(crate) generations: Option<usize>,
    pub(crate) hidden: Option<usize>,
    pub(crate) mutation_rate: Option<f64>,
    pub(crate) crossover_rate: Option<f64>,
    pub(crate) tournament_size: Option<usize>,
    pub(crate) parallel: bool,
}

impl Overrides {
    fn apply(self, config: &mut EvolutionConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(n) = self.population {
            config.population_size = n;
        }
        if let Some(n) = self.generations {
            config.max_generations = n;
        }
        if let Some(n) = self.hidden {
            config.shape.hidden_dim = n;
        }
        if let Some(rate) = self.mutation_rate {
            config.mutation.mutation_rate = rate;
        }
        if let Some(rate) = self.crossover_rate {
            config.crossover.crossover_rate = rate;
        }
        if let Some(k) = self.tournament_size {
            config.selection.tournament_size = k;
        }
        if self.parallel {
            config.evaluation = Evaluation::Parallel;
        }
    }
}

/// Build the run configuration from an optional file plus overrides.
fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<EvolutionConfig, CliError> {
    let mut config = match path {
        Some(path) => EvolutionConfig::from_json_file(path)?,
        None => EvolutionConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Execute the evolve command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the run aborts.
pub(crate) fn execute(
    config_path: Option<&Path>,
    overrides: Overrides,
    threads: Option<usize>,
    format: OutputFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = load_config(config_path, overrides)?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new((config.max_generations as u64).saturating_add(1));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}")
                .map_err(|e| CliError::new(format!("invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let oracle = DodgeOracle;
    let mut engine = EvolutionEngine::new(config, &oracle)?;
    while let Some(stats) = engine.step()? {
        if let Some(pb) = &pb {
            pb.set_message(format!("archive={:.2}", stats.archive_fitness));
            pb.inc(1);
        }
    }
    let outcome = engine.run()?;

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_evolution_text(&config, &outcome));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonEvolutionResult::new(&config, &outcome))?;
            println!("{json}");
        }
    }

    Ok(())
}
