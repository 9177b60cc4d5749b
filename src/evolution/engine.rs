//! Main evolution loop.
//!
//! The engine moves through `Init -> Evolving -> Done`. `Init` builds and
//! evaluates a random population; each `Evolving` step breeds one complete
//! replacement generation through tournament selection, uniform crossover
//! and Gaussian mutation. The best individual ever evaluated is kept in a
//! separate archive, because generational replacement alone can lose it.

use crate::error::ConfigurationError;
use crate::evolution::config::EvolutionConfig;
use crate::evolution::crossover::crossover;
use crate::evolution::fitness::{Evaluation, FitnessError, FitnessOracle, evaluate_population};
use crate::evolution::mutation::mutate;
use crate::evolution::population::Population;
use crate::evolution::selection::select_parents;
use crate::network::NetworkController;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Where the engine is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing evaluated yet.
    Init,
    /// Generations remain to be bred.
    Evolving,
    /// The generation budget is spent; the archive is final.
    Done,
    /// A step failed and the run was abandoned.
    Failed,
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Generation number; 0 is the random initial population.
    pub generation: usize,
    /// Best fitness in this generation.
    pub best_fitness: f64,
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Fitness standard deviation.
    pub fitness_std: f64,
    /// Archive fitness once this generation was evaluated.
    pub archive_fitness: f64,
}

/// Overall statistics from an evolution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionStats {
    /// Statistics per generation, starting with generation 0.
    pub generations: Vec<GenerationStats>,
    /// Fitness of the archived individual.
    pub best_fitness: f64,
    /// Generation that produced the archived individual.
    pub best_generation: usize,
    /// Number of oracle calls made.
    pub evaluations: usize,
    /// Wall-clock time in seconds.
    pub elapsed_seconds: f64,
}

/// The result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOutcome {
    /// Best individual ever evaluated.
    pub best: NetworkController,
    /// Run statistics.
    pub stats: EvolutionStats,
}

/// Generational genetic algorithm over network weights.
pub struct EvolutionEngine<'a, O: FitnessOracle + ?Sized> {
    config: EvolutionConfig,
    oracle: &'a O,
    rng: SmallRng,
    state: EngineState,
    generation: usize,
    population: Option<Population>,
    archive: Option<NetworkController>,
    archive_generation: usize,
    history: Vec<GenerationStats>,
    evaluations: usize,
    started: Instant,
}

impl<'a, O: FitnessOracle + ?Sized> EvolutionEngine<'a, O> {
    /// Validate `config` and seed the run's random stream.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any setting is invalid.
    pub fn new(config: EvolutionConfig, oracle: &'a O) -> Result<Self, EvolutionError> {
        config.validate()?;
        Ok(Self {
            config,
            oracle,
            rng: SmallRng::seed_from_u64(config.seed),
            state: EngineState::Init,
            generation: 0,
            population: None,
            archive: None,
            archive_generation: 0,
            history: Vec::new(),
            evaluations: 0,
            started: Instant::now(),
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Number of generations bred after the initial population.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// The most recent fully evaluated generation.
    #[must_use]
    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    /// Best individual evaluated so far.
    #[must_use]
    pub fn archive(&self) -> Option<&NetworkController> {
        self.archive.as_ref()
    }

    /// Statistics for every generation evaluated so far.
    #[must_use]
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Advance by one transition.
    ///
    /// Returns the statistics of the generation just evaluated, or `None`
    /// once the run is done.
    ///
    /// # Errors
    ///
    /// Any configuration, inference or oracle failure aborts the run; later
    /// calls return [`EvolutionError::Aborted`].
    pub fn step(&mut self) -> Result<Option<GenerationStats>, EvolutionError> {
        let result = match self.state {
            EngineState::Init => self.initialize(),
            EngineState::Evolving => self.next_generation(),
            EngineState::Done => return Ok(None),
            EngineState::Failed => return Err(EvolutionError::Aborted),
        };
        if result.is_err() {
            self.state = EngineState::Failed;
        }
        result.map(Some)
    }

    /// Step until done and return the archived individual.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run.
    pub fn run(mut self) -> Result<EvolutionOutcome, EvolutionError> {
        while self.step()?.is_some() {}

        let best_fitness = self.archive_fitness();
        let best = self.archive.ok_or(EvolutionError::Aborted)?;
        let stats = EvolutionStats {
            best_fitness,
            best_generation: self.archive_generation,
            generations: self.history,
            evaluations: self.evaluations,
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
        };
        info!(
            best_fitness = stats.best_fitness,
            best_generation = stats.best_generation,
            evaluations = stats.evaluations,
            "evolution complete"
        );
        Ok(EvolutionOutcome { best, stats })
    }

    fn initialize(&mut self) -> Result<GenerationStats, EvolutionError> {
        info!(
            shape = %self.config.shape,
            population = self.config.population_size,
            generations = self.config.max_generations,
            seed = self.config.seed,
            "starting evolution"
        );

        let members = (0..self.config.population_size)
            .map(|_| NetworkController::random(self.config.shape, &mut self.rng))
            .collect::<Result<Vec<_>, _>>()?;
        let population =
            Population::evaluate(members, self.oracle, self.config.seed, self.config.evaluation)?;
        self.evaluations += population.len();

        let best = population
            .best()
            .cloned()
            .ok_or(ConfigurationError::EmptyPopulation)?;
        self.archive = Some(best);
        self.archive_generation = 0;

        self.state = if self.config.max_generations == 0 {
            EngineState::Done
        } else {
            EngineState::Evolving
        };
        Ok(self.record(population))
    }

    fn next_generation(&mut self) -> Result<GenerationStats, EvolutionError> {
        let parents = self.population.take().ok_or(EvolutionError::Aborted)?;
        let generation = self.generation + 1;
        let seed = self.config.seed;
        let size = self.config.population_size;

        let mut children = Vec::with_capacity(size);
        match self.config.evaluation {
            Evaluation::Sequential => {
                for idx in 0..size {
                    let mut child = self.breed(&parents)?;
                    let fitness = self.oracle.evaluate(&child, seed)?;
                    child.set_fitness(fitness);
                    self.evaluations += 1;
                    debug!(generation, child = idx, fitness, "evaluated child");
                    self.update_archive(&child, generation);
                    children.push(child);
                }
            }
            Evaluation::Parallel => {
                // The oracle never draws from the run's stream, so breeding the
                // whole generation up front consumes it in the same order.
                for _ in 0..size {
                    children.push(self.breed(&parents)?);
                }
                evaluate_population(&mut children, self.oracle, seed, Evaluation::Parallel)?;
                self.evaluations += size;
                for (idx, child) in children.iter().enumerate() {
                    debug!(generation, child = idx, fitness = ?child.fitness(), "evaluated child");
                    self.update_archive(child, generation);
                }
            }
        }

        self.generation = generation;
        if self.generation >= self.config.max_generations {
            self.state = EngineState::Done;
        }
        Ok(self.record(Population::from_evaluated(children)))
    }

    /// Select two parents, cross them over and mutate the child.
    fn breed(&mut self, parents: &Population) -> Result<NetworkController, EvolutionError> {
        let (i, j) = select_parents(parents.fitness(), &self.config.selection, &mut self.rng)
            .ok_or(ConfigurationError::EmptyPopulation)?;
        let members = parents.members();
        let mut child = crossover(&members[i], &members[j], &self.config.crossover, &mut self.rng)?;
        mutate(&mut child, &self.config.mutation, &mut self.rng)?;
        Ok(child)
    }

    /// Replace the archive if `candidate` strictly improves on it.
    fn update_archive(&mut self, candidate: &NetworkController, generation: usize) {
        let Some(fitness) = candidate.fitness() else {
            return;
        };
        let current = self.archive_fitness();
        if fitness > current {
            info!(generation, fitness, previous = current, "new best individual");
            self.archive = Some(candidate.clone());
            self.archive_generation = generation;
        }
    }

    /// Archive fitness, with a missing or NaN score counted as negative infinity.
    fn archive_fitness(&self) -> f64 {
        self.archive
            .as_ref()
            .and_then(NetworkController::fitness)
            .filter(|f| !f.is_nan())
            .unwrap_or(f64::NEG_INFINITY)
    }

    fn record(&mut self, population: Population) -> GenerationStats {
        let summary = population.stats();
        let stats = GenerationStats {
            generation: self.generation,
            best_fitness: summary.best_fitness,
            mean_fitness: summary.mean_fitness,
            fitness_std: summary.fitness_std,
            archive_fitness: self.archive_fitness(),
        };
        info!(
            "Gen {:>5}: best={:.4} mean={:.4} std={:.4} archive={:.4}",
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.fitness_std,
            stats.archive_fitness
        );
        self.history.push(stats);
        self.population = Some(population);
        stats
    }
}

impl<O: FitnessOracle + ?Sized> fmt::Debug for EvolutionEngine<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvolutionEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("archive", &self.archive)
            .finish_non_exhaustive()
    }
}

/// Run a complete evolution and return the best individual found.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any evaluation fails.
pub fn evolve<O: FitnessOracle + ?Sized>(
    config: &EvolutionConfig,
    oracle: &O,
) -> Result<EvolutionOutcome, EvolutionError> {
    EvolutionEngine::new(*config, oracle)?.run()
}

/// Error during evolution. Every variant is fatal to the run.
#[derive(Debug, Clone, PartialEq)]
pub enum EvolutionError {
    /// Invalid settings, dimensions or vector lengths.
    Configuration(ConfigurationError),
    /// A forward pass hit a zero softmax denominator.
    NumericDegeneracy,
    /// The oracle could not play an episode.
    Oracle(String),
    /// The engine was stepped after an earlier failure.
    Aborted,
}

impl fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
            Self::NumericDegeneracy => {
                write!(f, "numeric degeneracy: softmax denominator is zero")
            }
            Self::Oracle(msg) => write!(f, "oracle error: {msg}"),
            Self::Aborted => write!(f, "run aborted by an earlier failure"),
        }
    }
}

impl std::error::Error for EvolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for EvolutionError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

impl From<FitnessError> for EvolutionError {
    fn from(e: FitnessError) -> Self {
        use crate::error::NetworkError;

        match e {
            FitnessError::Network(NetworkError::Configuration(c)) => Self::Configuration(c),
            FitnessError::Network(NetworkError::NumericDegeneracy) => Self::NumericDegeneracy,
            FitnessError::Episode(msg) => Self::Oracle(msg),
        }
    }
}
