//! Gradient-based update rules for the ansatz angles.

use quprep_sim::ParameterTensor;
use serde::{Deserialize, Serialize};

use crate::error::{TrainError, TrainResult};

/// Trait for gradient-based optimizers.
pub trait Optimizer {
    /// Update `params` in place from the cost gradient `grad` (same shape).
    fn step(&mut self, params: &mut ParameterTensor, grad: &ParameterTensor);

    /// Forget all per-parameter state.
    fn reset(&mut self);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Resilient propagation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RpropConfig {
    /// Step size every parameter starts with.
    #[serde(default = "default_initial_step")]
    pub initial_step: f64,
    /// Factor applied when consecutive gradients disagree in sign.
    #[serde(default = "default_eta_minus")]
    pub eta_minus: f64,
    /// Factor applied when consecutive gradients agree in sign.
    #[serde(default = "default_eta_plus")]
    pub eta_plus: f64,
    /// Lower clamp for step sizes.
    #[serde(default = "default_min_step")]
    pub min_step: f64,
    /// Upper clamp for step sizes.
    #[serde(default = "default_max_step")]
    pub max_step: f64,
}

fn default_initial_step() -> f64 {
    0.01
}

fn default_eta_minus() -> f64 {
    0.5
}

fn default_eta_plus() -> f64 {
    1.2
}

fn default_min_step() -> f64 {
    1e-6
}

fn default_max_step() -> f64 {
    50.0
}

impl Default for RpropConfig {
    fn default() -> Self {
        Self {
            initial_step: default_initial_step(),
            eta_minus: default_eta_minus(),
            eta_plus: default_eta_plus(),
            min_step: default_min_step(),
            max_step: default_max_step(),
        }
    }
}

impl RpropConfig {
    fn validate(&self) -> TrainResult<()> {
        if !(0.0 < self.eta_minus && self.eta_minus < 1.0 && self.eta_plus > 1.0) {
            return Err(TrainError::Config(format!(
                "rprop etas must satisfy 0 < eta_minus < 1 < eta_plus, got ({}, {})",
                self.eta_minus, self.eta_plus
            )));
        }
        if !(0.0 < self.min_step && self.min_step <= self.max_step) {
            return Err(TrainError::Config(format!(
                "rprop step bounds must satisfy 0 < min_step <= max_step, got [{}, {}]",
                self.min_step, self.max_step
            )));
        }
        if !(self.initial_step > 0.0) {
            return Err(TrainError::Config(format!(
                "rprop initial_step must be positive, got {}",
                self.initial_step
            )));
        }
        Ok(())
    }
}

/// Resilient propagation.
///
/// Only the sign of each gradient entry is used. Every parameter keeps its
/// own step size, which grows by `eta_plus` while consecutive gradients agree
/// in sign and shrinks by `eta_minus` when they flip. After a flip that
/// parameter is not moved and its remembered gradient is cleared, so the next
/// step neither grows nor shrinks it.
#[derive(Debug, Clone)]
pub struct Rprop {
    config: RpropConfig,
    step_sizes: Vec<f64>,
    prev_grad: Vec<f64>,
}

impl Rprop {
    /// Create an optimizer with the given settings.
    pub fn new(config: RpropConfig) -> Self {
        Self {
            config,
            step_sizes: Vec::new(),
            prev_grad: Vec::new(),
        }
    }

    /// Current per-parameter step sizes, in tensor order.
    pub fn step_sizes(&self) -> &[f64] {
        &self.step_sizes
    }

    fn ensure_state(&mut self, len: usize) {
        if self.step_sizes.len() != len {
            self.step_sizes = vec![self.config.initial_step; len];
            self.prev_grad = vec![0.0; len];
        }
    }
}

impl Default for Rprop {
    fn default() -> Self {
        Self::new(RpropConfig::default())
    }
}

impl Optimizer for Rprop {
    fn step(&mut self, params: &mut ParameterTensor, grad: &ParameterTensor) {
        self.ensure_state(params.len());
        let cfg = self.config;

        let state = self.step_sizes.iter_mut().zip(self.prev_grad.iter_mut());
        for ((theta, &g), (step, prev)) in params.iter_mut().zip(grad.iter()).zip(state) {
            let agreement = g * *prev;
            let g = if agreement > 0.0 {
                *step *= cfg.eta_plus;
                g
            } else if agreement < 0.0 {
                *step *= cfg.eta_minus;
                0.0
            } else {
                g
            };
            *step = step.clamp(cfg.min_step, cfg.max_step);
            *theta -= sign(g) * *step;
            *prev = g;
        }
    }

    fn reset(&mut self) {
        self.step_sizes.clear();
        self.prev_grad.clear();
    }

    fn name(&self) -> &'static str {
        "rprop"
    }
}

/// Adam with decoupled weight decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamWConfig {
    /// Learning rate.
    #[serde(default = "default_adam_lr")]
    pub learning_rate: f64,
    /// First-moment decay.
    #[serde(default = "default_beta1")]
    pub beta1: f64,
    /// Second-moment decay.
    #[serde(default = "default_beta2")]
    pub beta2: f64,
    /// Denominator guard.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Decoupled weight decay factor.
    #[serde(default = "default_weight_decay")]
    pub weight_decay: f64,
}

fn default_adam_lr() -> f64 {
    1e-3
}

fn default_beta1() -> f64 {
    0.9
}

fn default_beta2() -> f64 {
    0.999
}

fn default_epsilon() -> f64 {
    1e-8
}

fn default_weight_decay() -> f64 {
    1e-2
}

impl Default for AdamWConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_adam_lr(),
            beta1: default_beta1(),
            beta2: default_beta2(),
            epsilon: default_epsilon(),
            weight_decay: default_weight_decay(),
        }
    }
}

impl AdamWConfig {
    fn validate(&self) -> TrainResult<()> {
        let betas_ok = (0.0..1.0).contains(&self.beta1) && (0.0..1.0).contains(&self.beta2);
        if !(self.learning_rate > 0.0 && betas_ok && self.epsilon > 0.0 && self.weight_decay >= 0.0)
        {
            return Err(TrainError::Config(format!("invalid adamw settings: {self:?}")));
        }
        Ok(())
    }
}

/// Adam with decoupled weight decay (AdamW).
#[derive(Debug, Clone)]
pub struct AdamW {
    config: AdamWConfig,
    first_moment: Vec<f64>,
    second_moment: Vec<f64>,
    t: i32,
}

impl AdamW {
    /// Create an optimizer with the given settings.
    pub fn new(config: AdamWConfig) -> Self {
        Self {
            config,
            first_moment: Vec::new(),
            second_moment: Vec::new(),
            t: 0,
        }
    }
}

impl Optimizer for AdamW {
    fn step(&mut self, params: &mut ParameterTensor, grad: &ParameterTensor) {
        if self.first_moment.len() != params.len() {
            self.first_moment = vec![0.0; params.len()];
            self.second_moment = vec![0.0; params.len()];
            self.t = 0;
        }
        self.t = self.t.saturating_add(1);
        let cfg = self.config;
        let bias1 = 1.0 - cfg.beta1.powi(self.t);
        let bias2 = 1.0 - cfg.beta2.powi(self.t);

        let moments = self.first_moment.iter_mut().zip(self.second_moment.iter_mut());
        for ((theta, &g), (m, v)) in params.iter_mut().zip(grad.iter()).zip(moments) {
            *theta *= 1.0 - cfg.learning_rate * cfg.weight_decay;
            *m = cfg.beta1 * *m + (1.0 - cfg.beta1) * g;
            *v = cfg.beta2 * *v + (1.0 - cfg.beta2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *theta -= cfg.learning_rate * m_hat / (v_hat.sqrt() + cfg.epsilon);
        }
    }

    fn reset(&mut self) {
        self.first_moment.clear();
        self.second_moment.clear();
        self.t = 0;
    }

    fn name(&self) -> &'static str {
        "adamw"
    }
}

/// Serializable optimizer choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    /// Resilient propagation (default).
    Rprop(RpropConfig),
    /// Adam with decoupled weight decay.
    #[serde(rename = "adamw")]
    AdamW(AdamWConfig),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig::Rprop(RpropConfig::default())
    }
}

impl OptimizerConfig {
    /// Instantiate the configured optimizer.
    pub fn build(&self) -> Box<dyn Optimizer> {
        match self {
            OptimizerConfig::Rprop(cfg) => Box::new(Rprop::new(*cfg)),
            OptimizerConfig::AdamW(cfg) => Box::new(AdamW::new(*cfg)),
        }
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> TrainResult<()> {
        match self {
            OptimizerConfig::Rprop(cfg) => cfg.validate(),
            OptimizerConfig::AdamW(cfg) => cfg.validate(),
        }
    }
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
