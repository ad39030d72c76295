//! `quprep-sim`: exact simulation of the quprep layered rotation ansatz.
//!
//! The ansatz is fixed: a Hadamard "spread" on every qubit, `K` layers of
//! `RY` rotations followed by a ring of controlled `RX` rotations, and a
//! closing spread. [`CircuitSimulator`] evaluates it on a dense statevector
//! and computes exact gradients of any cost of the output probabilities with
//! the adjoint method, one gate derivative at a time.
//!
//! # Quick start
//!
//! ```rust
//! use quprep_sim::{Ansatz, CircuitSimulator, ParameterTensor};
//!
//! let ansatz = Ansatz::new(3, 2).unwrap();
//! assert_eq!(ansatz.num_parameters(), 12);
//!
//! let sim = CircuitSimulator::new(ansatz);
//! let params = ParameterTensor::zeros(3, 2);
//! let out = sim.probabilities(&params).unwrap();
//! assert_eq!(out.len(), 8);
//! assert!((out.total() - 1.0).abs() < 1e-12);
//!
//! // Gradient of C = p_0 with respect to every angle.
//! let mut cotangent = vec![0.0; 8];
//! cotangent[0] = 1.0;
//! let grad = sim.vjp(&params, &cotangent).unwrap();
//! assert_eq!(grad.shape(), (3, 2, 2));
//! ```

pub mod ansatz;
pub mod error;
pub mod gate;
pub mod params;
pub mod simulator;
pub mod statevector;

pub use ansatz::{Ansatz, GateCounts, MAX_QUBITS, MIN_QUBITS};
pub use error::{SimError, SimResult};
pub use gate::{Gate, GateRole, ParamIndex};
pub use params::ParameterTensor;
pub use simulator::{CircuitOutput, CircuitSimulator};
pub use statevector::Statevector;
