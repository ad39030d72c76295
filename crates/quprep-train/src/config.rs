//! Training configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QUPREP_ prefix)
//!
//! Values missing from a file fall back to the defaults below; environment
//! variables are applied on top with [`TrainingConfig::apply_env`].

use quprep_sim::MAX_QUBITS;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

use crate::error::{TrainError, TrainResult};
use crate::objective::Objective;
use crate::optimizer::OptimizerConfig;

/// Everything fixed before a training run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Ansatz depth K.
    #[serde(default = "default_layers")]
    pub layers: usize,

    /// Optimizer iterations.
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Extra qubits added on top of `ceil(log2(len))`.
    #[serde(default)]
    pub ancilla: usize,

    /// Seed for the parameter initialisation.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Standard deviation of the initial angles.
    #[serde(default = "default_init_std")]
    pub init_std: f64,

    /// Cost to minimise.
    #[serde(default)]
    pub objective: Objective,

    /// Update rule.
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Emit an info-level progress line every this many steps (0 disables).
    #[serde(default = "default_log_every")]
    pub log_every: usize,
}

fn default_layers() -> usize {
    12
}

fn default_steps() -> usize {
    500
}

fn default_seed() -> u64 {
    42
}

fn default_init_std() -> f64 {
    PI
}

fn default_log_every() -> usize {
    10
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            layers: default_layers(),
            steps: default_steps(),
            ancilla: 0,
            seed: default_seed(),
            init_std: default_init_std(),
            objective: Objective::default(),
            optimizer: OptimizerConfig::default(),
            log_every: default_log_every(),
        }
    }
}

impl TrainingConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> TrainResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml_str(contents: &str) -> TrainResult<Self> {
        let config: TrainingConfig = serde_yaml_ng::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> TrainResult<Self> {
        let mut config = TrainingConfig::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `QUPREP_*` environment variables.
    ///
    /// Recognised: `QUPREP_LAYERS`, `QUPREP_STEPS`, `QUPREP_ANCILLA`,
    /// `QUPREP_SEED`, `QUPREP_INIT_STD`, `QUPREP_OBJECTIVE`, `QUPREP_LOG_EVERY`.
    pub fn apply_env(&mut self) -> TrainResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from any key/value source using the `QUPREP_*` names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> TrainResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QUPREP_LAYERS") {
            self.layers = parse_var("QUPREP_LAYERS", &v)?;
        }
        if let Some(v) = lookup("QUPREP_STEPS") {
            self.steps = parse_var("QUPREP_STEPS", &v)?;
        }
        if let Some(v) = lookup("QUPREP_ANCILLA") {
            self.ancilla = parse_var("QUPREP_ANCILLA", &v)?;
        }
        if let Some(v) = lookup("QUPREP_SEED") {
            self.seed = parse_var("QUPREP_SEED", &v)?;
        }
        if let Some(v) = lookup("QUPREP_INIT_STD") {
            self.init_std = parse_var("QUPREP_INIT_STD", &v)?;
        }
        if let Some(v) = lookup("QUPREP_OBJECTIVE") {
            self.objective = v.parse()?;
        }
        if let Some(v) = lookup("QUPREP_LOG_EVERY") {
            self.log_every = parse_var("QUPREP_LOG_EVERY", &v)?;
        }
        Ok(())
    }

    /// Check that every setting is in range.
    pub fn validate(&self) -> TrainResult<()> {
        if self.layers == 0 {
            return Err(TrainError::Config("layers must be at least 1".into()));
        }
        // At least one data qubit is always present.
        if self.ancilla >= MAX_QUBITS {
            return Err(TrainError::Config(format!(
                "ancilla must be below {MAX_QUBITS}, got {}",
                self.ancilla
            )));
        }
        if !(self.init_std.is_finite() && self.init_std >= 0.0) {
            return Err(TrainError::Config(format!(
                "init_std must be finite and non-negative, got {}",
                self.init_std
            )));
        }
        self.optimizer.validate()
    }

    /// Random source seeded from [`Self::seed`].
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> TrainResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TrainError::Config(format!("{key}: cannot parse '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.layers, 12);
        assert_eq!(config.steps, 500);
        assert_eq!(config.ancilla, 0);
        assert_eq!(config.init_std, PI);
        assert_eq!(config.objective, Objective::Fidelity);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = TrainingConfig::from_yaml_str("layers: 4\nsteps: 50\n").unwrap();
        assert_eq!(config.layers, 4);
        assert_eq!(config.steps, 50);
        assert_eq!(config.seed, 42);
        assert_eq!(config.optimizer, OptimizerConfig::default());
    }

    #[test]
    fn test_yaml_optimizer_section() {
        let yaml = "objective: mse\noptimizer:\n  kind: adamw\n  learning_rate: 0.05\n";
        let config = TrainingConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.objective, Objective::Mse);
        match config.optimizer {
            OptimizerConfig::AdamW(cfg) => {
                assert_eq!(cfg.learning_rate, 0.05);
                assert_eq!(cfg.beta1, 0.9);
            }
            other => panic!("expected adamw, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_layers_rejected() {
        assert!(matches!(
            TrainingConfig::from_yaml_str("layers: 0\n"),
            Err(TrainError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("QUPREP_LAYERS", "3"),
            ("QUPREP_SEED", " 7 "),
            ("QUPREP_OBJECTIVE", "l1"),
        ]
        .into_iter()
        .collect();
        let mut config = TrainingConfig::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.layers, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.objective, Objective::L1);
        assert_eq!(config.steps, 500);
    }

    #[test]
    fn test_bad_override() {
        let mut config = TrainingConfig::default();
        let err = config
            .apply_overrides(|k| (k == "QUPREP_STEPS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("QUPREP_STEPS"));
    }

    #[test]
    fn test_ancilla_bounded() {
        let config = TrainingConfig {
            ancilla: 60,
            ..TrainingConfig::default()
        };
        assert!(matches!(config.validate(), Err(TrainError::Config(_))));

        let mut config = TrainingConfig::default();
        config
            .apply_overrides(|k| (k == "QUPREP_ANCILLA").then(|| "20".to_string()))
            .unwrap();
        assert!(matches!(config.validate(), Err(TrainError::Config(_))));
    }
}
