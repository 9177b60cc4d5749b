//! Baseline command implementation.

use super::output::{JsonBaselineResult, format_baseline_text};
use super::{CliError, OutputFormat};
use neuroevo::dodge::{dodger, run_episode};

/// Execute the baseline command.
///
/// # Errors
///
/// Returns an error if the episode cannot be played.
pub(crate) fn execute(seed: u64, format: OutputFormat) -> Result<(), CliError> {
    let episode = run_episode(&dodger(), seed)?;

    match format {
        OutputFormat::Text => print!("{}", format_baseline_text(seed, &episode)),
        OutputFormat::Json => {
            let result = JsonBaselineResult {
                seed,
                episode,
                fitness: episode.fitness(),
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
