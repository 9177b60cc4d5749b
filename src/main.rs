//! Neuroevo CLI - evolve game controllers from the command line.

// Allow print in the CLI binary, unwrap in its tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Neuroevo - neuroevolution of fixed-topology game controllers
#[derive(Parser, Debug)]
#[command(name = "neuroevo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a controller against the dodge episode
    Evolve {
        /// JSON configuration file (flags below override it)
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Run seed (default: 42)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Individuals per generation (default: 100)
        #[arg(short, long)]
        population: Option<usize>,

        /// Generations after the initial one (default: 100)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Hidden layer width (default: 25)
        #[arg(long)]
        hidden: Option<usize>,

        /// Per-gene mutation probability (default: 0.1)
        #[arg(long)]
        mutation_rate: Option<f64>,

        /// Probability of taking a gene from the first parent (default: 0.8)
        #[arg(long)]
        crossover_rate: Option<f64>,

        /// Individuals sampled per tournament (default: 2)
        #[arg(short = 'k', long)]
        tournament_size: Option<usize>,

        /// Evaluate each generation on the thread pool
        #[arg(long)]
        parallel: bool,

        /// Thread pool size (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Score the hand-written dodger for comparison
    Baseline {
        /// Episode seed (default: 42)
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Evolve {
            config,
            seed,
            population,
            generations,
            hidden,
            mutation_rate,
            crossover_rate,
            tournament_size,
            parallel,
            threads,
            format,
            progress,
        } => {
            let overrides = cli::evolve::Overrides {
                seed,
                population,
                generations,
                hidden,
                mutation_rate,
                crossover_rate,
                tournament_size,
                parallel,
            };
            cli::evolve::execute(config.as_deref(), overrides, threads, format, progress)
        }

        Commands::Baseline { seed, format } => cli::baseline::execute(seed, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
