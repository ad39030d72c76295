//! Gate model for the layered rotation ansatz.
//!
//! Only three gates exist: the parameter-free Hadamard used for the spread
//! steps, a single-qubit `RY` rotation and a controlled `RX` rotation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two per-layer angles of a qubit a parameter drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateRole {
    /// Angle of the single-qubit `RY` rotation.
    Rotation,
    /// Angle of the controlled `RX` rotation to the ring neighbour.
    Entangler,
}

impl GateRole {
    /// Both roles in tensor order.
    pub const ALL: [GateRole; 2] = [GateRole::Rotation, GateRole::Entangler];

    /// Position of this role along the last tensor axis.
    pub const fn index(self) -> usize {
        match self {
            GateRole::Rotation => 0,
            GateRole::Entangler => 1,
        }
    }
}

/// Address of one entry of a [`ParameterTensor`](crate::ParameterTensor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamIndex {
    /// Qubit the gate is anchored on (the control for entanglers).
    pub qubit: usize,
    /// Ansatz layer.
    pub layer: usize,
    /// Angle role.
    pub role: GateRole,
}

impl ParamIndex {
    /// Create a new parameter index.
    pub const fn new(qubit: usize, layer: usize, role: GateRole) -> Self {
        Self { qubit, layer, role }
    }

    /// The `[qubit, layer, role]` position in the backing array.
    pub const fn as_tuple(self) -> (usize, usize, usize) {
        (self.qubit, self.layer, self.role.index())
    }
}

impl fmt::Display for ParamIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "θ[{},{},{}]", self.qubit, self.layer, self.role.index())
    }
}

/// One operation of the ansatz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Hadamard gate.
    Hadamard {
        /// Target qubit.
        qubit: usize,
    },
    /// `RY(θ) = exp(-i θ Y / 2)`.
    Ry {
        /// Target qubit.
        qubit: usize,
        /// Angle source.
        param: ParamIndex,
    },
    /// `RX(θ)` on `target`, applied when `control` is |1⟩.
    Crx {
        /// Control qubit.
        control: usize,
        /// Target qubit.
        target: usize,
        /// Angle source.
        param: ParamIndex,
    },
}

impl Gate {
    /// Lower-case gate mnemonic.
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Hadamard { .. } => "h",
            Gate::Ry { .. } => "ry",
            Gate::Crx { .. } => "crx",
        }
    }

    /// The parameter driving this gate, if any.
    pub fn param(&self) -> Option<ParamIndex> {
        match self {
            Gate::Hadamard { .. } => None,
            Gate::Ry { param, .. } | Gate::Crx { param, .. } => Some(*param),
        }
    }

    /// Number of qubits the gate acts on.
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::Hadamard { .. } | Gate::Ry { .. } => 1,
            Gate::Crx { .. } => 2,
        }
    }

    /// Qubit the gate rotates.
    pub fn target(&self) -> usize {
        match self {
            Gate::Hadamard { qubit } | Gate::Ry { qubit, .. } => *qubit,
            Gate::Crx { target, .. } => *target,
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Hadamard { qubit } => write!(f, "h q{qubit}"),
            Gate::Ry { qubit, param } => write!(f, "ry({param}) q{qubit}"),
            Gate::Crx {
                control,
                target,
                param,
            } => write!(f, "crx({param}) q{control}, q{target}"),
        }
    }
}
