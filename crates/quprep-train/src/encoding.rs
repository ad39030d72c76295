//! Amplitude encoding of classical data into a target state.

use quprep_sim::MAX_QUBITS;
use serde::Serialize;

use crate::error::{TrainError, TrainResult};

/// How many qubits a data vector needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QubitLayout {
    /// `ceil(log2(len))` qubits carrying the data, at least one.
    pub data_qubits: usize,
    /// Extra qubits padding the register beyond the data.
    pub ancilla_qubits: usize,
}

impl QubitLayout {
    /// Layout for `len` data values plus `ancilla_qubits` extra qubits.
    pub fn for_data_len(len: usize, ancilla_qubits: usize) -> Self {
        Self {
            data_qubits: (len.next_power_of_two().trailing_zeros() as usize).max(1),
            ancilla_qubits,
        }
    }

    /// Register width.
    pub fn total_qubits(&self) -> usize {
        self.data_qubits.saturating_add(self.ancilla_qubits)
    }

    /// Padded state dimension, 2^total.
    ///
    /// Only meaningful for layouts that pass [`Self::validate`].
    pub fn dimension(&self) -> usize {
        1 << self.total_qubits().min(MAX_QUBITS)
    }

    /// Fail if the register is wider than the simulator supports.
    pub fn validate(&self) -> TrainResult<()> {
        if self.total_qubits() > MAX_QUBITS {
            return Err(TrainError::Config(format!(
                "{} data + {} ancilla qubits exceeds the limit of {MAX_QUBITS}",
                self.data_qubits, self.ancilla_qubits
            )));
        }
        Ok(())
    }
}

/// A unit-norm, real amplitude vector of length 2^n.
///
/// Only [`StateEncoder`] builds these, so the norm invariant always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetState {
    amplitudes: Vec<f64>,
}

impl TargetState {
    /// Amplitudes in basis-index order.
    pub fn as_slice(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Vector length, 2^n.
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// n.
    pub fn num_qubits(&self) -> usize {
        self.amplitudes.len().trailing_zeros() as usize
    }
}

/// Zero-pads data to a fixed power-of-two dimension and normalises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEncoder {
    dimension: usize,
}

impl StateEncoder {
    /// Encoder producing vectors of length `dimension`.
    pub fn new(dimension: usize) -> TrainResult<Self> {
        if !dimension.is_power_of_two() {
            return Err(TrainError::NotPowerOfTwo(dimension));
        }
        if dimension > 1 << MAX_QUBITS {
            return Err(TrainError::Config(format!(
                "dimension {dimension} exceeds 2^{MAX_QUBITS}"
            )));
        }
        Ok(Self { dimension })
    }

    /// Encoder for the register described by `layout`.
    pub fn for_layout(layout: &QubitLayout) -> TrainResult<Self> {
        layout.validate()?;
        Ok(Self {
            dimension: layout.dimension(),
        })
    }

    /// Output length.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Copy `data` into the front of a zero vector and divide by its norm.
    ///
    /// Pure: the same input always produces a bit-identical state.
    pub fn encode(&self, data: &[f64]) -> TrainResult<TargetState> {
        if data.is_empty() {
            return Err(TrainError::EmptyInput);
        }
        if data.len() > self.dimension {
            return Err(TrainError::Dimension {
                len: data.len(),
                dim: self.dimension,
            });
        }
        if let Some(index) = data.iter().position(|v| !v.is_finite()) {
            return Err(TrainError::NonFiniteInput { index });
        }

        let mut amplitudes = vec![0.0; self.dimension];
        amplitudes[..data.len()].copy_from_slice(data);

        let norm = amplitudes.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Err(TrainError::ZeroNorm);
        }
        for v in &mut amplitudes {
            *v /= norm;
        }
        Ok(TargetState { amplitudes })
    }
}

/// Encode `data` into the register described by `layout`.
pub fn encode_for_layout(data: &[f64], layout: &QubitLayout) -> TrainResult<TargetState> {
    StateEncoder::for_layout(layout)?.encode(data)
}

/// Encode `data` for a register of `ceil(log2(len)) + ancilla_qubits` qubits.
pub fn encode_with_ancilla(data: &[f64], ancilla_qubits: usize) -> TrainResult<TargetState> {
    encode_for_layout(data, &QubitLayout::for_data_len(data.len(), ancilla_qubits))
}
