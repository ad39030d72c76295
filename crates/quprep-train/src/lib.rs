//! `quprep-train`: fit the quprep ansatz to an amplitude-encoded vector.
//!
//! A classical vector is zero-padded to the next power of two and
//! normalised ([`StateEncoder`]). A [`TrainingLoop`] then adjusts the
//! ansatz angles so that the circuit's amplitudes `√p_k` approach that
//! target, using Rprop by default, and keeps the lowest-cost angles seen.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use quprep_train::{TrainingConfig, prepare_state};
//!
//! let data: Vec<f64> = (0..16).map(|i| i as f64).collect();
//! let config = TrainingConfig {
//!     layers: 4,
//!     steps: 100,
//!     ..TrainingConfig::default()
//! };
//! let outcome = prepare_state(&data, &config).unwrap();
//! println!("best cost {:.4}", outcome.best.cost());
//! ```

pub mod checkpoint;
pub mod config;
pub mod encoding;
pub mod error;
pub mod objective;
pub mod optimizer;
pub mod training;

pub use checkpoint::BestCheckpoint;
pub use config::TrainingConfig;
pub use encoding::{QubitLayout, StateEncoder, TargetState, encode_for_layout, encode_with_ancilla};
pub use error::{TrainError, TrainResult};
pub use objective::{Evaluation, Objective, fidelity, overlap};
pub use optimizer::{AdamW, AdamWConfig, Optimizer, OptimizerConfig, Rprop, RpropConfig};
pub use training::{ProgressRecord, TrainingLoop, TrainingOutcome, TrainingState, prepare_state};
