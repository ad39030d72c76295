//! Error types for the simulator crate.

use thiserror::Error;

/// Errors produced while building or evaluating the ansatz.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The ring of controlled rotations needs distinct control and target qubits.
    #[error("Ansatz needs at least {min} qubits, got {got}")]
    TooFewQubits {
        /// Requested qubit count.
        got: usize,
        /// Smallest supported qubit count.
        min: usize,
    },

    /// The dense statevector would not fit in memory.
    #[error("Ansatz with {got} qubits exceeds the statevector limit of {max} qubits")]
    TooManyQubits {
        /// Requested qubit count.
        got: usize,
        /// Largest supported qubit count.
        max: usize,
    },

    /// num_layers must be ≥ 1.
    #[error("Ansatz needs at least one layer")]
    NoLayers,

    /// Parameter tensor does not match the ansatz it is evaluated against.
    #[error("Parameter tensor has shape {got:?} but the ansatz expects {expected:?}")]
    ParameterShape {
        /// Shape (qubits, layers, roles) required by the ansatz.
        expected: (usize, usize, usize),
        /// Shape of the supplied tensor.
        got: (usize, usize, usize),
    },

    /// A per-basis-state vector has the wrong length.
    #[error("Vector of length {got} does not match state dimension {expected}")]
    LengthMismatch {
        /// The statevector dimension 2^n.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },

    /// The normal distribution used for initialisation rejected its width.
    #[error("Standard deviation must be finite and non-negative, got {0}")]
    InvalidStdDev(f64),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
