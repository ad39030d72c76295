//! Best-so-far parameter tracking.

use quprep_sim::ParameterTensor;
use serde::Serialize;

/// Lowest cost seen during a run and the angles that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestCheckpoint {
    cost: f64,
    params: ParameterTensor,
    iteration: usize,
}

impl BestCheckpoint {
    /// Start tracking from an evaluated parameter set.
    pub fn new(cost: f64, params: ParameterTensor, iteration: usize) -> Self {
        Self {
            cost,
            params,
            iteration,
        }
    }

    /// Replace the checkpoint if `cost` is strictly lower.
    ///
    /// NaN is never accepted. A NaN initial cost is replaced by the first
    /// comparable one. Returns whether the checkpoint changed.
    pub fn offer(&mut self, cost: f64, params: &ParameterTensor, iteration: usize) -> bool {
        let improves = cost < self.cost || (self.cost.is_nan() && !cost.is_nan());
        if improves {
            self.cost = cost;
            self.params.clone_from(params);
            self.iteration = iteration;
        }
        improves
    }

    /// Lowest cost observed.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Angles that produced [`Self::cost`].
    pub fn params(&self) -> &ParameterTensor {
        &self.params
    }

    /// Iteration at which [`Self::cost`] was observed.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// `(cost, params)`.
    pub fn into_parts(self) -> (f64, ParameterTensor) {
        (self.cost, self.params)
    }
}
