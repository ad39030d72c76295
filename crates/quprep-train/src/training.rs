//! The optimisation loop.
//!
//! A run starts from angles drawn from `N(0, init_std²)`, evaluates them once
//! (iteration 0), then performs exactly `steps` updates. Each update takes
//! the gradient at the current angles, applies the optimizer, evaluates the
//! new angles and records the result. There is no convergence test; a caller
//! may only stop the loop between steps.

use std::ops::ControlFlow;

use quprep_sim::{Ansatz, CircuitOutput, CircuitSimulator, ParameterTensor, Statevector};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::checkpoint::BestCheckpoint;
use crate::config::TrainingConfig;
use crate::encoding::{QubitLayout, TargetState, encode_for_layout};
use crate::error::{TrainError, TrainResult};
use crate::objective::{Evaluation, Objective};
use crate::optimizer::Optimizer;

/// One entry of the training history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressRecord {
    /// 0 for the initial angles, `n` after the n-th update.
    pub iteration: usize,
    /// Cost of the angles at this iteration.
    pub cost: f64,
    /// Squared overlap with the target at this iteration.
    pub fidelity: f64,
    /// Best cost seen up to and including this iteration.
    pub best_cost: f64,
}

/// Where a [`TrainingLoop`] is in its fixed schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrainingState {
    /// Initial angles evaluated, no update applied yet.
    Initializing,
    /// `step` updates applied, more remain.
    Stepping {
        /// Updates completed so far.
        step: usize,
    },
    /// All configured updates applied.
    Exhausted,
}

/// Result handed to reporting once a run ends.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingOutcome {
    /// Lowest-cost angles seen.
    pub best: BestCheckpoint,
    /// One record per evaluated iteration, ordered by iteration.
    pub history: Vec<ProgressRecord>,
    /// Angles after the last applied update.
    pub final_params: ParameterTensor,
    /// Number of updates applied.
    pub steps_completed: usize,
    /// True if an observer stopped the run before the schedule ended.
    pub stopped_early: bool,
}

impl TrainingOutcome {
    /// Fidelity per iteration, in order.
    pub fn fidelity_values(&self) -> Vec<f64> {
        self.history.iter().map(|r| r.fidelity).collect()
    }

    /// Cost per iteration, in order.
    pub fn loss_values(&self) -> Vec<f64> {
        self.history.iter().map(|r| r.cost).collect()
    }
}

/// Forward pass cached for the current angles.
struct Forward {
    state: Statevector,
    output: CircuitOutput,
    evaluation: Evaluation,
}

/// Gradient descent on the ansatz angles towards a fixed target state.
pub struct TrainingLoop {
    simulator: CircuitSimulator,
    target: TargetState,
    objective: Objective,
    optimizer: Box<dyn Optimizer>,
    params: ParameterTensor,
    forward: Forward,
    best: BestCheckpoint,
    history: Vec<ProgressRecord>,
    steps: usize,
    log_every: usize,
    state: TrainingState,
}

impl TrainingLoop {
    /// Sample initial angles from `rng` and evaluate them.
    ///
    /// The register width is taken from the target: `Q = log2(dimension)`.
    pub fn new<R: Rng + ?Sized>(
        config: &TrainingConfig,
        target: TargetState,
        rng: &mut R,
    ) -> TrainResult<Self> {
        let params = ParameterTensor::random_normal(
            target.num_qubits(),
            config.layers,
            config.init_std,
            rng,
        )?;
        Self::with_parameters(config, target, params)
    }

    /// Start from explicit initial angles.
    pub fn with_parameters(
        config: &TrainingConfig,
        target: TargetState,
        params: ParameterTensor,
    ) -> TrainResult<Self> {
        config.validate()?;
        let ansatz = Ansatz::new(target.num_qubits(), config.layers)?;
        ansatz.check_parameters(&params)?;
        let simulator = CircuitSimulator::new(ansatz);
        if simulator.dimension() != target.dimension() {
            return Err(TrainError::TargetMismatch {
                target: target.dimension(),
                circuit: simulator.dimension(),
            });
        }

        let forward = evaluate(&simulator, config.objective, &target, &params)?;
        let initial = forward.evaluation;
        let best = BestCheckpoint::new(initial.cost, params.clone(), 0);
        let record = ProgressRecord {
            iteration: 0,
            cost: initial.cost,
            fidelity: initial.fidelity,
            best_cost: initial.cost,
        };
        info!("Cost after 0 steps is {:.4}", initial.cost);

        let mut history = Vec::with_capacity(config.steps + 1);
        history.push(record);

        Ok(Self {
            simulator,
            target,
            objective: config.objective,
            optimizer: config.optimizer.build(),
            params,
            forward,
            best,
            history,
            steps: config.steps,
            log_every: config.log_every,
            state: TrainingState::Initializing,
        })
    }

    /// Swap in a different update rule before the first step.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: Box<dyn Optimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Current schedule position.
    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Current angles.
    pub fn params(&self) -> &ParameterTensor {
        &self.params
    }

    /// Best angles so far.
    pub fn best(&self) -> &BestCheckpoint {
        &self.best
    }

    /// Records so far, starting with iteration 0.
    pub fn history(&self) -> &[ProgressRecord] {
        &self.history
    }

    /// The target state being approximated.
    pub fn target(&self) -> &TargetState {
        &self.target
    }

    /// The simulator evaluating the ansatz.
    pub fn simulator(&self) -> &CircuitSimulator {
        &self.simulator
    }

    /// Cost and fidelity of the current angles.
    pub fn current_evaluation(&self) -> Evaluation {
        self.forward.evaluation
    }

    /// Perform one update. Returns `None` once the schedule is exhausted.
    pub fn step(&mut self) -> TrainResult<Option<ProgressRecord>> {
        let completed = match self.state {
            TrainingState::Initializing => 0,
            TrainingState::Stepping { step } => step,
            TrainingState::Exhausted => return Ok(None),
        };
        if completed >= self.steps {
            self.state = TrainingState::Exhausted;
            return Ok(None);
        }

        let cotangent = self
            .objective
            .probability_gradient(&self.forward.output, &self.target)?;
        let mut grad = self
            .simulator
            .backward(&self.params, &self.forward.state, &cotangent)?;
        let dropped = grad.zero_non_finite();
        if dropped > 0 {
            warn!(
                step = completed,
                dropped, "non-finite gradient entries zeroed before update"
            );
        }
        self.optimizer.step(&mut self.params, &grad);

        self.forward = evaluate(&self.simulator, self.objective, &self.target, &self.params)?;
        let iteration = completed + 1;
        let Evaluation { cost, fidelity } = self.forward.evaluation;
        if !cost.is_finite() {
            warn!(iteration, cost, "non-finite cost; keeping previous best");
        }
        self.best.offer(cost, &self.params, iteration);

        let record = ProgressRecord {
            iteration,
            cost,
            fidelity,
            best_cost: self.best.cost(),
        };
        self.history.push(record);
        debug!(iteration, cost, fidelity, "step complete");
        if self.log_every > 0 && (iteration % self.log_every == 0 || iteration == self.steps) {
            info!("Cost after {} steps is {:.4}", iteration, cost);
        }

        self.state = if iteration >= self.steps {
            TrainingState::Exhausted
        } else {
            TrainingState::Stepping { step: iteration }
        };
        Ok(Some(record))
    }

    /// Run every remaining step.
    pub fn run(self) -> TrainResult<TrainingOutcome> {
        self.run_with(|_| ControlFlow::Continue(()))
    }

    /// Run remaining steps, letting `observer` stop the loop after any step.
    #[instrument(skip_all)]
    pub fn run_with<F>(mut self, mut observer: F) -> TrainResult<TrainingOutcome>
    where
        F: FnMut(&ProgressRecord) -> ControlFlow<()>,
    {
        info!(
            num_qubits = self.simulator.ansatz().num_qubits(),
            num_layers = self.simulator.ansatz().num_layers(),
            steps = self.steps,
            optimizer = self.optimizer.name(),
            objective = %self.objective,
            "starting training"
        );

        let mut stopped_early = false;
        while let Some(record) = self.step()? {
            if observer(&record).is_break() {
                stopped_early = self.state != TrainingState::Exhausted;
                break;
            }
        }

        info!(
            best_cost = self.best.cost(),
            best_iteration = self.best.iteration(),
            "training finished"
        );
        Ok(self.finish(stopped_early))
    }

    fn finish(self, stopped_early: bool) -> TrainingOutcome {
        TrainingOutcome {
            steps_completed: self.history.len() - 1,
            best: self.best,
            history: self.history,
            final_params: self.params,
            stopped_early,
        }
    }
}

fn evaluate(
    simulator: &CircuitSimulator,
    objective: Objective,
    target: &TargetState,
    params: &ParameterTensor,
) -> TrainResult<Forward> {
    let state = simulator.run(params)?;
    let output = CircuitOutput::new(state.probabilities());
    let evaluation = objective.evaluate(&output, target)?;
    Ok(Forward {
        state,
        output,
        evaluation,
    })
}

/// Encode `data`, seed from the config and train to completion.
pub fn prepare_state(data: &[f64], config: &TrainingConfig) -> TrainResult<TrainingOutcome> {
    config.validate()?;
    let layout = QubitLayout::for_data_len(data.len(), config.ancilla);
    let target = encode_for_layout(data, &layout)?;
    debug!(
        data_len = data.len(),
        data_qubits = layout.data_qubits,
        ancilla_qubits = layout.ancilla_qubits,
        "encoded target state"
    );
    let mut rng = config.rng();
    TrainingLoop::new(config, target, &mut rng)?.run()
}
