//! Costs comparing circuit output with the target state.
//!
//! The circuit's amplitudes are read back as `√p_k`, which are real and
//! non-negative. Relative phases of the simulated state are lost, so a
//! target with negative entries can never reach fidelity 1: its best
//! achievable overlap is with `|t_k|`.

use std::fmt;
use std::str::FromStr;

use quprep_sim::CircuitOutput;
use serde::{Deserialize, Serialize};

use crate::encoding::TargetState;
use crate::error::{TrainError, TrainResult};

/// Amplitudes at or below this are treated as exactly zero when
/// differentiating `√p`, whose derivative is unbounded there.
const AMPLITUDE_FLOOR: f64 = 1e-150;

/// Cost of one evaluation together with the true fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Value minimised by the optimizer.
    pub cost: f64,
    /// Squared overlap with the target.
    pub fidelity: f64,
}

/// Which cost the optimizer minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// `1 − (Σ √p_k t_k)²`.
    #[default]
    Fidelity,
    /// `Σ (√p_k − t_k)²`.
    Mse,
    /// `Σ |√p_k − t_k|`.
    L1,
}

impl Objective {
    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Objective::Fidelity => "fidelity",
            Objective::Mse => "mse",
            Objective::L1 => "l1",
        }
    }

    /// Score `output` against `target`.
    pub fn evaluate(&self, output: &CircuitOutput, target: &TargetState) -> TrainResult<Evaluation> {
        let fidelity = fidelity(output, target)?;
        let cost = match self {
            Objective::Fidelity => 1.0 - fidelity,
            Objective::Mse => amplitude_pairs(output, target)
                .map(|(a, t)| (a - t) * (a - t))
                .sum(),
            Objective::L1 => amplitude_pairs(output, target).map(|(a, t)| (a - t).abs()).sum(),
        };
        Ok(Evaluation { cost, fidelity })
    }

    /// `∂C/∂p_k` for every basis state, ready for the simulator's vjp.
    ///
    /// Basis states with zero probability contribute nothing.
    pub fn probability_gradient(
        &self,
        output: &CircuitOutput,
        target: &TargetState,
    ) -> TrainResult<Vec<f64>> {
        let overlap = overlap(output, target)?;
        let grad = amplitude_pairs(output, target)
            .map(|(a, t)| {
                if a <= AMPLITUDE_FLOOR {
                    return 0.0;
                }
                match self {
                    Objective::Fidelity => -overlap * t / a,
                    Objective::Mse => (a - t) / a,
                    Objective::L1 => sign(a - t) / (2.0 * a),
                }
            })
            .collect();
        Ok(grad)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Objective {
    type Err = TrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fidelity" => Ok(Objective::Fidelity),
            "mse" => Ok(Objective::Mse),
            "l1" => Ok(Objective::L1),
            other => Err(TrainError::Config(format!("unknown objective '{other}'"))),
        }
    }
}

/// `Σ √p_k t_k`.
pub fn overlap(output: &CircuitOutput, target: &TargetState) -> TrainResult<f64> {
    check_lengths(output, target)?;
    Ok(amplitude_pairs(output, target).map(|(a, t)| a * t).sum())
}

/// `(Σ √p_k t_k)²`.
pub fn fidelity(output: &CircuitOutput, target: &TargetState) -> TrainResult<f64> {
    let s = overlap(output, target)?;
    Ok(s * s)
}

fn check_lengths(output: &CircuitOutput, target: &TargetState) -> TrainResult<()> {
    if output.len() != target.dimension() {
        return Err(TrainError::TargetMismatch {
            target: target.dimension(),
            circuit: output.len(),
        });
    }
    Ok(())
}

fn amplitude_pairs<'a>(
    output: &'a CircuitOutput,
    target: &'a TargetState,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    output
        .as_slice()
        .iter()
        .zip(target.as_slice())
        .map(|(p, t)| (p.max(0.0).sqrt(), *t))
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
