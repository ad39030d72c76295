//! Error types for the training crate.

use quprep_sim::SimError;
use thiserror::Error;

/// Errors produced while encoding data, configuring or running training.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrainError {
    /// The input does not fit the padded target dimension.
    #[error("Input of length {len} exceeds the target dimension {dim}")]
    Dimension {
        /// Number of input values.
        len: usize,
        /// Padded dimension 2^n.
        dim: usize,
    },

    /// Target dimensions must be powers of two.
    #[error("Target dimension {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// Nothing to encode.
    #[error("Input data is empty")]
    EmptyInput,

    /// An all-zero input has no direction to normalise.
    #[error("Input data has zero norm and cannot be normalised")]
    ZeroNorm,

    /// NaN or infinite input value.
    #[error("Input value at index {index} is not finite")]
    NonFiniteInput {
        /// Position of the offending value.
        index: usize,
    },

    /// Target and circuit disagree on the number of basis states.
    #[error("Target state has dimension {target} but the circuit produces {circuit} probabilities")]
    TargetMismatch {
        /// Target dimension.
        target: usize,
        /// Circuit output length.
        circuit: usize,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML for [`TrainingConfig`](crate::TrainingConfig).
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// Simulator rejected the circuit or its parameters.
    #[error("Simulator error: {0}")]
    Sim(#[from] SimError),
}

/// Result type for training operations.
pub type TrainResult<T> = Result<T, TrainError>;
