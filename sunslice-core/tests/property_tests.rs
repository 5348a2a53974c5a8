//! Property tests for the container and clamp invariants
//!
//! Randomized checks of the guarantees everything above relies on: rings
//! keep exactly the last N pushes, slice counts never reach zero, and the
//! frame assembler completes at the advertised byte.

use proptest::prelude::*;

use sunslice_core::buffer::Ring;
use sunslice_core::wire::FrameAssembler;
use sunslice_core::{Config, Ewma, SlicePredictor, Wcma};

proptest! {
    #[test]
    fn ring_retains_the_last_n_pushes(values in proptest::collection::vec(-1e6f32..1e6, 1..64)) {
        let mut ring: Ring<f32, 8> = Ring::new();
        for &v in &values {
            ring.push(v);
        }

        // Window = last 8 pushes (zero-padded when fewer), in push order.
        let mut expected = [0.0f32; 8];
        let tail = values.len().min(8);
        expected[8 - tail..].copy_from_slice(&values[values.len() - tail..]);

        let got: Vec<f32> = ring.iter().collect();
        prop_assert_eq!(got, expected.to_vec());

        // pop() is the most recent value, invariant under repetition.
        let last = *values.last().unwrap();
        prop_assert_eq!(ring.pop(), last);
        prop_assert_eq!(ring.pop(), last);
    }

    #[test]
    fn ewma_slices_stay_positive(samples in proptest::collection::vec(0.0f32..10.0, 1..96)) {
        let mut ewma: Ewma<48> = Ewma::new(&Config::default());

        for &sample in &samples {
            ewma.recompute(sample);
            prop_assert!(ewma.adaptive_slices() >= 1);
            prop_assert!(ewma.sleep_time() <= Config::default().min_duty_cycle);
        }
    }

    #[test]
    fn wcma_slices_stay_positive(samples in proptest::collection::vec(0.0f32..10.0, 1..96)) {
        let mut wcma: Wcma<4, 48, 3> = Wcma::new(&Config::default());

        for &sample in &samples {
            wcma.recompute(sample);
            prop_assert!(wcma.adaptive_slices() >= 1);
        }
    }

    #[test]
    fn assembler_completes_at_len_plus_three(
        address in any::<u8>(),
        kind in any::<u8>(),
        payload in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut assembler = FrameAssembler::new();

        prop_assert!(!assembler.digest(address));
        prop_assert!(!assembler.digest(kind));
        let header_done = assembler.digest(payload.len() as u8);
        prop_assert_eq!(header_done, payload.is_empty());

        for (i, &byte) in payload.iter().enumerate() {
            let finished = assembler.digest(byte);
            prop_assert_eq!(finished, i + 1 == payload.len());
        }

        prop_assert_eq!(assembler.address(), address);
        prop_assert_eq!(assembler.kind(), kind);
        prop_assert_eq!(assembler.payload(), payload.as_slice());
    }
}
