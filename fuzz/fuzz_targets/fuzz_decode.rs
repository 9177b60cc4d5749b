#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use neuroevo::{NetworkController, NetworkShape};

/// Structured input for chromosome decoding.
#[derive(Arbitrary, Debug)]
struct DecodeInput {
    /// Layer sizes (capped to keep allocations small).
    input_dim: u8,
    hidden_dim: u8,
    output_dim: u8,
    /// Raw genes, any length and any bit pattern.
    genes: Vec<f64>,
}

fuzz_target!(|input: DecodeInput| {
    let shape = match NetworkShape::new(
        usize::from(input.input_dim % 32),
        usize::from(input.hidden_dim % 64),
        usize::from(input.output_dim % 16),
    ) {
        Ok(shape) => shape,
        Err(_) => return,
    };

    let mut controller = match NetworkController::new(shape) {
        Ok(c) => c,
        Err(_) => return,
    };
    let before = controller.encode();

    match controller.decode(&input.genes) {
        Ok(()) => {
            // Round-trip must be bit-exact, NaN payloads included
            assert_eq!(input.genes.len(), shape.chromosome_len());
            let encoded = controller.encode();
            assert!(encoded
                .iter()
                .zip(&input.genes)
                .all(|(a, b)| a.to_bits() == b.to_bits()));
            assert!(controller.fitness().is_none());
        }
        Err(_) => {
            // A rejected chromosome must leave the weights untouched
            assert_ne!(input.genes.len(), shape.chromosome_len());
            assert_eq!(controller.encode(), before);
        }
    }
});
