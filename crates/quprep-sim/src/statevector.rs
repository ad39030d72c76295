//! Statevector simulation engine.

use num_complex::Complex64;

use crate::gate::Gate;
use crate::params::ParameterTensor;

/// A 2×2 operator on the (|0⟩, |1⟩) pair of the target qubit.
type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// A statevector representing a quantum state.
///
/// Qubit 0 is the most significant bit of a basis index: basis state `k`
/// is the binary expansion of `k` read with qubit 0 first.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![ZERO; size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of basis states, 2^n.
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Overwrite this state with `other` without reallocating.
    ///
    /// # Panics
    ///
    /// Panics if the two states have different dimensions.
    pub fn copy_from(&mut self, other: &Statevector) {
        self.amplitudes.copy_from_slice(&other.amplitudes);
    }

    /// Apply `gate` with its angle taken from `params`.
    pub fn apply(&mut self, gate: &Gate, params: &ParameterTensor) {
        match *gate {
            Gate::Hadamard { qubit } => self.apply_h(qubit),
            Gate::Ry { qubit, param } => self.apply_ry(qubit, params.get(param)),
            Gate::Crx {
                control,
                target,
                param,
            } => self.apply_crx(control, target, params.get(param)),
        }
    }

    /// Apply the adjoint of `gate`.
    pub fn apply_inverse(&mut self, gate: &Gate, params: &ParameterTensor) {
        match *gate {
            Gate::Hadamard { qubit } => self.apply_h(qubit),
            Gate::Ry { qubit, param } => self.apply_ry(qubit, -params.get(param)),
            Gate::Crx {
                control,
                target,
                param,
            } => self.apply_crx(control, target, -params.get(param)),
        }
    }

    /// Replace the state `|φ⟩` with `∂U/∂θ |φ⟩` for the gate's own angle.
    ///
    /// The result is not normalised. For the parameter-free Hadamard the
    /// derivative is zero.
    pub fn apply_derivative(&mut self, gate: &Gate, params: &ParameterTensor) {
        match *gate {
            Gate::Hadamard { .. } => self.amplitudes.fill(ZERO),
            Gate::Ry { qubit, param } => {
                let m = ry_derivative(params.get(param));
                self.apply_matrix(self.mask(qubit), 0, &m);
            }
            Gate::Crx {
                control,
                target,
                param,
            } => {
                let m = rx_derivative(params.get(param));
                // The control-|0⟩ block of CRX is constant, so its derivative vanishes.
                self.apply_matrix(self.mask(target), self.mask(control), &m);
            }
        }
    }

    /// Measurement probabilities `|ψ_k|²` for every basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Squared norm `⟨ψ|ψ⟩`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Inner product `⟨self|other⟩`.
    pub fn inner(&self, other: &Statevector) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// Multiply each amplitude by a real weight (a diagonal operator).
    ///
    /// Weights beyond the state dimension are ignored.
    pub fn scale_by(&mut self, weights: &[f64]) {
        for (amp, w) in self.amplitudes.iter_mut().zip(weights) {
            *amp *= *w;
        }
    }

    fn mask(&self, qubit: usize) -> usize {
        1 << (self.num_qubits - 1 - qubit)
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    fn apply_h(&mut self, qubit: usize) {
        let mask = self.mask(qubit);
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = self.mask(qubit);
        let (s, c) = (theta / 2.0).sin_cos();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_crx(&mut self, control: usize, target: usize, theta: f64) {
        let ctrl_mask = self.mask(control);
        let tgt_mask = self.mask(target);
        let (s, c) = (theta / 2.0).sin_cos();
        let neg_i_s = Complex64::new(0.0, -s);
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    /// Apply `m` to the target pair where every bit of `ctrl_mask` is set and
    /// zero the amplitudes everywhere else. A zero `ctrl_mask` acts everywhere.
    fn apply_matrix(&mut self, tgt_mask: usize, ctrl_mask: usize, m: &Matrix2) {
        for i in 0..self.amplitudes.len() {
            if i & tgt_mask != 0 {
                continue;
            }
            let j = i | tgt_mask;
            if i & ctrl_mask != ctrl_mask {
                self.amplitudes[i] = ZERO;
                self.amplitudes[j] = ZERO;
                continue;
            }
            let a = self.amplitudes[i];
            let b = self.amplitudes[j];
            self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
            self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
        }
    }
}

/// `d/dθ RY(θ)`.
fn ry_derivative(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(-0.5 * s, 0.0), Complex64::new(-0.5 * c, 0.0)],
        [Complex64::new(0.5 * c, 0.0), Complex64::new(-0.5 * s, 0.0)],
    ]
}

/// `d/dθ RX(θ)`.
fn rx_derivative(theta: f64) -> Matrix2 {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(-0.5 * s, 0.0), Complex64::new(0.0, -0.5 * c)],
        [Complex64::new(0.0, -0.5 * c), Complex64::new(-0.5 * s, 0.0)],
    ]
}
