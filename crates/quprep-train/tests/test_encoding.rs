//! Amplitude encoding of raw data vectors.

use proptest::prelude::*;
use quprep_train::{QubitLayout, StateEncoder, TrainError, encode_with_ancilla};

fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

// ---------------------------------------------------------------------------
// Image-sized inputs
// ---------------------------------------------------------------------------

#[test]
fn test_image_pads_to_ten_qubits() {
    let pixels: Vec<f64> = (0..784).map(|i| ((i * 37) % 256) as f64 / 255.0).collect();
    let layout = QubitLayout::for_data_len(pixels.len(), 0);
    assert_eq!(layout.data_qubits, 10);
    assert_eq!(layout.dimension(), 1024);

    let target = StateEncoder::for_layout(&layout).unwrap().encode(&pixels).unwrap();
    assert_eq!(target.dimension(), 1024);
    assert_eq!(target.num_qubits(), 10);
    assert!((norm(target.as_slice()) - 1.0).abs() < 1e-12);
    assert!(target.as_slice()[784..].iter().all(|v| *v == 0.0));
}

#[test]
fn test_encoding_is_bit_identical() {
    let pixels: Vec<f64> = (0..784).map(|i| (i as f64).sin()).collect();
    let a = encode_with_ancilla(&pixels, 0).unwrap();
    let b = encode_with_ancilla(&pixels, 0).unwrap();
    let same = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .all(|(x, y)| x.to_bits() == y.to_bits());
    assert!(same);
}

#[test]
fn test_ancilla_doubles_dimension() {
    let data = vec![1.0; 8];
    let target = encode_with_ancilla(&data, 1).unwrap();
    assert_eq!(target.dimension(), 16);
    assert_eq!(target.num_qubits(), 4);
    assert!(target.as_slice()[8..].iter().all(|v| *v == 0.0));
}

// ---------------------------------------------------------------------------
// Rejected inputs
// ---------------------------------------------------------------------------

#[test]
fn test_rejects_bad_inputs() {
    let encoder = StateEncoder::new(4).unwrap();
    assert!(matches!(encoder.encode(&[]), Err(TrainError::EmptyInput)));
    assert!(matches!(
        encoder.encode(&[1.0; 5]),
        Err(TrainError::Dimension { len: 5, dim: 4 })
    ));
    assert!(matches!(encoder.encode(&[0.0; 3]), Err(TrainError::ZeroNorm)));
    assert!(matches!(
        encoder.encode(&[1.0, f64::INFINITY]),
        Err(TrainError::NonFiniteInput { index: 1 })
    ));
    assert!(matches!(StateEncoder::new(12), Err(TrainError::NotPowerOfTwo(12))));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn test_encoded_state_has_unit_norm(data in prop::collection::vec(-100.0_f64..100.0, 1..300)) {
        prop_assume!(data.iter().any(|v| v.abs() > 1e-6));
        let target = encode_with_ancilla(&data, 0).unwrap();
        prop_assert!(target.dimension().is_power_of_two());
        prop_assert!(target.dimension() >= data.len());
        prop_assert!(target.dimension() <= 2 * data.len());
        prop_assert!((norm(target.as_slice()) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_encoding_preserves_ratios(data in prop::collection::vec(0.5_f64..10.0, 2..64)) {
        let target = encode_with_ancilla(&data, 0).unwrap();
        let t = target.as_slice();
        let expected = data[1] / data[0];
        prop_assert!((t[1] / t[0] - expected).abs() < 1e-9 * expected.max(1.0));
    }
}
