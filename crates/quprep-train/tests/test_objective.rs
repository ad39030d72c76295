//! Cost functions against hand-computed values and their gradients.

use approx::assert_relative_eq;
use proptest::prelude::*;
use quprep_sim::CircuitOutput;
use quprep_train::{Objective, StateEncoder, TargetState, TrainError, fidelity, overlap};

fn target(data: &[f64]) -> TargetState {
    StateEncoder::new(data.len()).unwrap().encode(data).unwrap()
}

/// Normalise arbitrary non-negative weights into a probability vector.
fn distribution(weights: &[f64]) -> CircuitOutput {
    let total: f64 = weights.iter().sum();
    CircuitOutput::new(weights.iter().map(|w| w / total).collect())
}

// ---------------------------------------------------------------------------
// Fixed values
// ---------------------------------------------------------------------------

#[test]
fn test_orthogonal_output_has_zero_fidelity() {
    let t = target(&[1.0, 0.0, 0.0, 0.0]);
    let out = CircuitOutput::new(vec![0.0, 0.0, 1.0, 0.0]);
    let eval = Objective::Fidelity.evaluate(&out, &t).unwrap();
    assert_relative_eq!(eval.cost, 1.0);
    assert_relative_eq!(eval.fidelity, 0.0);
}

#[test]
fn test_uniform_against_basis_state() {
    let t = target(&[1.0, 0.0, 0.0, 0.0]);
    let out = CircuitOutput::new(vec![0.25; 4]);
    assert_relative_eq!(overlap(&out, &t).unwrap(), 0.5, epsilon = 1e-12);
    assert_relative_eq!(fidelity(&out, &t).unwrap(), 0.25, epsilon = 1e-12);

    // √p = 0.5 everywhere, t = (1, 0, 0, 0).
    let mse = Objective::Mse.evaluate(&out, &t).unwrap();
    assert_relative_eq!(mse.cost, 0.25 + 3.0 * 0.25, epsilon = 1e-12);
    let l1 = Objective::L1.evaluate(&out, &t).unwrap();
    assert_relative_eq!(l1.cost, 0.5 + 3.0 * 0.5, epsilon = 1e-12);
}

#[test]
fn test_negative_target_cannot_be_matched() {
    let t = target(&[1.0, -1.0]);
    let out = CircuitOutput::new(vec![0.5, 0.5]);
    let eval = Objective::Fidelity.evaluate(&out, &t).unwrap();
    assert!(eval.fidelity < 1e-12);
}

#[test]
fn test_length_mismatch() {
    let t = target(&[1.0, 1.0]);
    let out = CircuitOutput::new(vec![0.25; 4]);
    assert!(matches!(
        Objective::Fidelity.evaluate(&out, &t),
        Err(TrainError::TargetMismatch { target: 2, circuit: 4 })
    ));
}

#[test]
fn test_objective_names_parse() {
    for objective in [Objective::Fidelity, Objective::Mse, Objective::L1] {
        assert_eq!(objective.to_string().parse::<Objective>().unwrap(), objective);
    }
    assert!("MSE".parse::<Objective>().is_ok());
    assert!(matches!("hinge".parse::<Objective>(), Err(TrainError::Config(_))));
}

// ---------------------------------------------------------------------------
// Gradients
// ---------------------------------------------------------------------------

#[test]
fn test_probability_gradient_matches_finite_difference() {
    let t = target(&[0.3, 0.1, 0.5, 0.2]);
    let p = [0.1, 0.2, 0.3, 0.4];
    let eps = 1e-7;
    for objective in [Objective::Fidelity, Objective::Mse] {
        let grad = objective
            .probability_gradient(&CircuitOutput::new(p.to_vec()), &t)
            .unwrap();
        for k in 0..p.len() {
            let mut plus = p;
            plus[k] += eps;
            let mut minus = p;
            minus[k] -= eps;
            let c_plus = objective
                .evaluate(&CircuitOutput::new(plus.to_vec()), &t)
                .unwrap()
                .cost;
            let c_minus = objective
                .evaluate(&CircuitOutput::new(minus.to_vec()), &t)
                .unwrap()
                .cost;
            let numeric = (c_plus - c_minus) / (2.0 * eps);
            assert_relative_eq!(grad[k], numeric, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_zero_probability_has_zero_gradient() {
    let t = target(&[1.0, 1.0]);
    let out = CircuitOutput::new(vec![1.0, 0.0]);
    for objective in [Objective::Fidelity, Objective::Mse, Objective::L1] {
        let grad = objective.probability_gradient(&out, &t).unwrap();
        assert_eq!(grad[1], 0.0);
        assert!(grad.iter().all(|g| g.is_finite()));
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn test_fidelity_cost_is_bounded(
        weights in prop::collection::vec(0.0_f64..1.0, 8),
        data in prop::collection::vec(-1.0_f64..1.0, 8),
    ) {
        prop_assume!(weights.iter().sum::<f64>() > 1e-3);
        prop_assume!(data.iter().any(|v| v.abs() > 1e-3));
        let out = distribution(&weights);
        let t = target(&data);
        let eval = Objective::Fidelity.evaluate(&out, &t).unwrap();
        prop_assert!(eval.cost >= -1e-12 && eval.cost <= 1.0 + 1e-12);
        prop_assert!((eval.cost - (1.0 - eval.fidelity)).abs() < 1e-15);
    }
}
