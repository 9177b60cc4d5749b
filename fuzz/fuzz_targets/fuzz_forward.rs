#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use neuroevo::{NetworkController, NetworkError, NetworkShape};

/// Structured input for inference fuzzing.
#[derive(Arbitrary, Debug)]
struct ForwardInput {
    /// Layer sizes (capped to keep allocations small).
    input_dim: u8,
    hidden_dim: u8,
    output_dim: u8,
    /// Genes, cycled to fill the chromosome.
    genes: Vec<f64>,
    /// State vector handed to forward.
    state: Vec<f64>,
}

fuzz_target!(|input: ForwardInput| {
    let shape = match NetworkShape::new(
        usize::from(input.input_dim % 16).max(1),
        usize::from(input.hidden_dim % 32).max(1),
        usize::from(input.output_dim % 8).max(1),
    ) {
        Ok(shape) => shape,
        Err(_) => return,
    };
    if input.genes.is_empty() {
        return;
    }

    let chromosome: Vec<f64> = input
        .genes
        .iter()
        .copied()
        .cycle()
        .take(shape.chromosome_len())
        .collect();
    let controller = match NetworkController::from_chromosome(shape, &chromosome) {
        Ok(c) => c,
        Err(_) => return,
    };

    // Must never panic, whatever the weights or state hold
    match controller.forward(&input.state) {
        Ok(dist) => {
            assert_eq!(input.state.len(), shape.input_dim);
            assert_eq!(dist.len(), shape.output_dim);

            let finite = chromosome.iter().chain(&input.state).all(|v| v.is_finite());
            if finite && dist.iter().all(|p| p.is_finite()) {
                assert!(dist.iter().all(|p| (0.0..=1.0).contains(p)));
                let total: f64 = dist.iter().sum();
                assert!((total - 1.0).abs() < 1e-6, "sum = {total}");
            }
        }
        Err(NetworkError::Configuration(_)) => {
            assert_ne!(input.state.len(), shape.input_dim);
        }
        Err(NetworkError::NumericDegeneracy) => {}
    }
});
