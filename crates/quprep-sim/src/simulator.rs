//! Exact statevector evaluation of the ansatz and its reverse-mode gradient.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ansatz::Ansatz;
use crate::error::{SimError, SimResult};
use crate::params::ParameterTensor;
use crate::statevector::Statevector;

/// Measurement probabilities over all 2^Q basis states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitOutput {
    probabilities: Vec<f64>,
}

impl CircuitOutput {
    /// Wrap a probability vector.
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self { probabilities }
    }

    /// Probabilities in basis-index order.
    pub fn as_slice(&self) -> &[f64] {
        &self.probabilities
    }

    /// Number of basis states.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// True for an empty output.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Sum of all probabilities (1 up to rounding).
    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Element-wise square roots: real, non-negative amplitudes.
    ///
    /// Relative phases of the simulated state are not recoverable from
    /// probabilities, so targets that need sign structure cannot be matched
    /// exactly through this view.
    pub fn amplitudes(&self) -> Vec<f64> {
        self.probabilities.iter().map(|p| p.max(0.0).sqrt()).collect()
    }

    /// Give up the wrapper.
    pub fn into_vec(self) -> Vec<f64> {
        self.probabilities
    }
}

/// Runs an [`Ansatz`] from |0…0⟩.
#[derive(Debug, Clone)]
pub struct CircuitSimulator {
    ansatz: Ansatz,
}

impl CircuitSimulator {
    /// Create a simulator for `ansatz`.
    pub fn new(ansatz: Ansatz) -> Self {
        Self { ansatz }
    }

    /// The simulated ansatz.
    pub fn ansatz(&self) -> &Ansatz {
        &self.ansatz
    }

    /// Statevector dimension, 2^Q.
    pub fn dimension(&self) -> usize {
        self.ansatz.dimension()
    }

    /// Final state after every gate.
    pub fn run(&self, params: &ParameterTensor) -> SimResult<Statevector> {
        self.ansatz.check_parameters(params)?;
        let mut state = Statevector::new(self.ansatz.num_qubits());
        for gate in self.ansatz.gates() {
            state.apply(gate, params);
        }
        Ok(state)
    }

    /// Measurement probabilities of the final state.
    pub fn probabilities(&self, params: &ParameterTensor) -> SimResult<CircuitOutput> {
        Ok(CircuitOutput::new(self.run(params)?.probabilities()))
    }

    /// Vector-Jacobian product of the probability map.
    ///
    /// Given `cotangent[k] = ∂C/∂p_k`, returns `∂C/∂θ` for every angle.
    pub fn vjp(&self, params: &ParameterTensor, cotangent: &[f64]) -> SimResult<ParameterTensor> {
        let state = self.run(params)?;
        self.backward(params, &state, cotangent)
    }

    /// Adjoint sweep from an already computed final state.
    ///
    /// With `G = diag(cotangent)` and `|λ⟩ = G|ψ⟩`, each angle receives
    /// `2·Re⟨λ_j| ∂U_j/∂θ |φ_{j-1}⟩`, where `φ_{j-1}` is the state entering
    /// gate `j` and `λ_j` is `λ` pulled back through the gates after it.
    /// Both are un-computed gate by gate, so memory stays at three states.
    ///
    /// `final_state` must be the output of [`Self::run`] for the same `params`.
    pub fn backward(
        &self,
        params: &ParameterTensor,
        final_state: &Statevector,
        cotangent: &[f64],
    ) -> SimResult<ParameterTensor> {
        self.ansatz.check_parameters(params)?;
        let dim = self.ansatz.dimension();
        if cotangent.len() != dim {
            return Err(SimError::LengthMismatch {
                expected: dim,
                got: cotangent.len(),
            });
        }
        if final_state.dimension() != dim {
            return Err(SimError::LengthMismatch {
                expected: dim,
                got: final_state.dimension(),
            });
        }

        let mut phi = final_state.clone();
        let mut lambda = phi.clone();
        lambda.scale_by(cotangent);
        let mut scratch = phi.clone();
        let mut grad = ParameterTensor::zeros(self.ansatz.num_qubits(), self.ansatz.num_layers());

        for gate in self.ansatz.gates().iter().rev() {
            phi.apply_inverse(gate, params);
            if let Some(index) = gate.param() {
                scratch.copy_from(&phi);
                scratch.apply_derivative(gate, params);
                let overlap = lambda.inner(&scratch);
                grad.set(index, grad.get(index) + 2.0 * overlap.re);
            }
            lambda.apply_inverse(gate, params);
        }

        trace!(n_params = grad.len(), "adjoint sweep finished");
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_angles_return_to_ground_state() {
        // Every layer is the identity, so H·H leaves |0…0⟩.
        let sim = CircuitSimulator::new(Ansatz::new(3, 2).unwrap());
        let out = sim.probabilities(&ParameterTensor::zeros(3, 2)).unwrap();
        assert!((out.as_slice()[0] - 1.0).abs() < 1e-12);
        assert!(out.as_slice()[1..].iter().all(|p| p.abs() < 1e-12));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let sim = CircuitSimulator::new(Ansatz::new(3, 2).unwrap());
        let err = sim.run(&ParameterTensor::zeros(3, 3)).unwrap_err();
        assert!(matches!(err, SimError::ParameterShape { .. }));
    }

    #[test]
    fn test_cotangent_length_checked() {
        let sim = CircuitSimulator::new(Ansatz::new(2, 1).unwrap());
        let err = sim.vjp(&ParameterTensor::zeros(2, 1), &[1.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            SimError::LengthMismatch {
                expected: 4,
                got: 3
            }
        ));
    }

    #[test]
    fn test_constant_cotangent_gives_zero_gradient() {
        // Σ p_k = 1 for every θ, so a uniform cotangent has zero gradient.
        let sim = CircuitSimulator::new(Ansatz::new(3, 2).unwrap());
        let params = ParameterTensor::from_fn(3, 2, |idx| {
            0.3 * idx.qubit as f64 + 0.7 * idx.layer as f64 + 0.1
        });
        let grad = sim.vjp(&params, &[1.0; 8]).unwrap();
        assert!(grad.iter().all(|g| g.abs() < 1e-10));
    }

    #[test]
    fn test_amplitudes_are_square_roots() {
        let out = CircuitOutput::new(vec![0.25, 0.0, 0.75, 0.0]);
        let amps = out.amplitudes();
        assert!((amps[0] - 0.5).abs() < 1e-15);
        assert!((amps[2] - 0.75_f64.sqrt()).abs() < 1e-15);
        assert!((out.total() - 1.0).abs() < 1e-15);
    }
}
