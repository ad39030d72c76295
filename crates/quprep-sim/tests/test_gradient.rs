//! Adjoint gradients checked against central finite differences.

use quprep_sim::{Ansatz, CircuitSimulator, ParameterTensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const EPS: f64 = 1e-6;

/// `Σ_k w_k p_k(θ)`: a linear cost whose gradient is exactly the vjp.
fn linear_cost(sim: &CircuitSimulator, params: &ParameterTensor, weights: &[f64]) -> f64 {
    let out = sim.probabilities(params).unwrap();
    out.as_slice().iter().zip(weights).map(|(p, w)| p * w).sum()
}

fn check_against_finite_difference(num_qubits: usize, num_layers: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let sim = CircuitSimulator::new(Ansatz::new(num_qubits, num_layers).unwrap());
    let params = ParameterTensor::random_normal(num_qubits, num_layers, PI, &mut rng).unwrap();
    let weights: Vec<f64> = (0..sim.dimension()).map(|_| rng.gen_range(-1.0..1.0)).collect();

    let grad = sim.vjp(&params, &weights).unwrap();

    let indices: Vec<_> = sim.ansatz().gates().iter().filter_map(|g| g.param()).collect();
    for index in indices {
        let mut plus = params.clone();
        plus.set(index, params.get(index) + EPS);
        let mut minus = params.clone();
        minus.set(index, params.get(index) - EPS);
        let numeric =
            (linear_cost(&sim, &plus, &weights) - linear_cost(&sim, &minus, &weights)) / (2.0 * EPS);
        let analytic = grad.get(index);
        assert!(
            (numeric - analytic).abs() < 1e-6,
            "gradient mismatch at {index}: numeric {numeric}, adjoint {analytic}"
        );
    }
}

#[test]
fn test_two_qubits_one_layer() {
    check_against_finite_difference(2, 1, 1);
}

#[test]
fn test_three_qubits_two_layers() {
    check_against_finite_difference(3, 2, 2);
}

#[test]
fn test_four_qubits_three_layers() {
    check_against_finite_difference(4, 3, 3);
}

#[test]
fn test_backward_reuses_forward_state() {
    let mut rng = StdRng::seed_from_u64(9);
    let sim = CircuitSimulator::new(Ansatz::new(3, 2).unwrap());
    let params = ParameterTensor::random_normal(3, 2, PI, &mut rng).unwrap();
    let weights: Vec<f64> = (0..8).map(|k| k as f64).collect();

    let state = sim.run(&params).unwrap();
    let via_backward = sim.backward(&params, &state, &weights).unwrap();
    let via_vjp = sim.vjp(&params, &weights).unwrap();
    assert_eq!(via_backward, via_vjp);
}
