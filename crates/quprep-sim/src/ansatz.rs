//! The layered rotation ansatz.
//!
//! ```text
//! spread ─ [ RY on every qubit ─ CRX ring ] × K ─ spread
//! ```
//!
//! The spread step is a Hadamard on every qubit. Inside a layer, qubit `i`
//! controls an `RX` on qubit `(i + 1) mod Q`, closing the ring from the last
//! qubit back to qubit 0.

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::gate::{Gate, GateRole, ParamIndex};
use crate::params::{ParameterTensor, ROLES_PER_LAYER};

/// Smallest width for which the entangling ring has distinct endpoints.
pub const MIN_QUBITS: usize = 2;

/// Largest width the dense statevector supports.
pub const MAX_QUBITS: usize = 20;

/// Per-kind gate totals of an ansatz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateCounts {
    /// Hadamards in the two spread steps.
    pub spread: usize,
    /// Single-qubit `RY` rotations.
    pub rotation: usize,
    /// Controlled `RX` rotations.
    pub entangler: usize,
}

impl GateCounts {
    /// All gates.
    pub fn total(&self) -> usize {
        self.spread + self.rotation + self.entangler
    }
}

/// Fixed gate sequence for a given width and depth.
#[derive(Debug, Clone)]
pub struct Ansatz {
    num_qubits: usize,
    num_layers: usize,
    gates: Vec<Gate>,
}

impl Ansatz {
    /// Build the ansatz for `num_qubits` qubits and `num_layers` layers.
    pub fn new(num_qubits: usize, num_layers: usize) -> SimResult<Self> {
        if num_qubits < MIN_QUBITS {
            return Err(SimError::TooFewQubits {
                got: num_qubits,
                min: MIN_QUBITS,
            });
        }
        if num_qubits > MAX_QUBITS {
            return Err(SimError::TooManyQubits {
                got: num_qubits,
                max: MAX_QUBITS,
            });
        }
        if num_layers == 0 {
            return Err(SimError::NoLayers);
        }

        let mut gates = Vec::with_capacity(2 * num_qubits * (num_layers + 1));
        push_spread(&mut gates, num_qubits);
        for layer in 0..num_layers {
            for qubit in 0..num_qubits {
                gates.push(Gate::Ry {
                    qubit,
                    param: ParamIndex::new(qubit, layer, GateRole::Rotation),
                });
            }
            for qubit in 0..num_qubits {
                gates.push(Gate::Crx {
                    control: qubit,
                    target: (qubit + 1) % num_qubits,
                    param: ParamIndex::new(qubit, layer, GateRole::Entangler),
                });
            }
        }
        push_spread(&mut gates, num_qubits);

        debug!(
            num_qubits,
            num_layers,
            n_gates = gates.len(),
            "built layered rotation ansatz"
        );

        Ok(Self {
            num_qubits,
            num_layers,
            gates,
        })
    }

    /// Circuit width.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of parameterised layers.
    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Statevector dimension, 2^Q.
    pub fn dimension(&self) -> usize {
        1 << self.num_qubits
    }

    /// Gates in application order.
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Number of trainable angles, `2·Q·K`.
    pub fn num_parameters(&self) -> usize {
        self.num_qubits * self.num_layers * ROLES_PER_LAYER
    }

    /// Shape a [`ParameterTensor`] must have to drive this ansatz.
    pub fn parameter_shape(&self) -> (usize, usize, usize) {
        (self.num_qubits, self.num_layers, ROLES_PER_LAYER)
    }

    /// Gate totals by kind.
    pub fn gate_counts(&self) -> GateCounts {
        let mut counts = GateCounts {
            spread: 0,
            rotation: 0,
            entangler: 0,
        };
        for gate in &self.gates {
            match gate {
                Gate::Hadamard { .. } => counts.spread += 1,
                Gate::Ry { .. } => counts.rotation += 1,
                Gate::Crx { .. } => counts.entangler += 1,
            }
        }
        counts
    }

    /// Fail unless `params` has [`Self::parameter_shape`].
    pub fn check_parameters(&self, params: &ParameterTensor) -> SimResult<()> {
        let expected = self.parameter_shape();
        let got = params.shape();
        if got != expected {
            return Err(SimError::ParameterShape { expected, got });
        }
        Ok(())
    }
}

fn push_spread(gates: &mut Vec<Gate>, num_qubits: usize) {
    gates.extend((0..num_qubits).map(|qubit| Gate::Hadamard { qubit }));
}
