//! quprep demo helpers
//!
//! Shared pieces of the command-line demos: terminal output, input loading
//! and the synthetic image used when no data file is given.
//!
//! ```no_run
//! use quprep_demos::{IMAGE_SIDE, synthetic_digit};
//!
//! let pixels = synthetic_digit();
//! assert_eq!(pixels.len(), IMAGE_SIDE * IMAGE_SIDE);
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use quprep_train::{QubitLayout, TrainingConfig, TrainingOutcome};
use serde::{Deserialize, Serialize};

/// Width and height of the synthetic image.
pub const IMAGE_SIDE: usize = 28;

/// Create a progress bar for training runs.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// A hand-drawn looking "0": an anti-aliased ring of intensities in `[0, 1]`,
/// flattened row by row.
pub fn synthetic_digit() -> Vec<f64> {
    let centre = (IMAGE_SIDE as f64 - 1.0) / 2.0;
    let (radius, width) = (8.0, 2.5);
    (0..IMAGE_SIDE * IMAGE_SIDE)
        .map(|i| {
            let row = (i / IMAGE_SIDE) as f64 - centre;
            // Slightly taller than wide.
            let col = ((i % IMAGE_SIDE) as f64 - centre) * 1.3;
            let distance = (row * row + col * col).sqrt();
            (1.0 - (distance - radius).abs() / width).clamp(0.0, 1.0)
        })
        .collect()
}

/// Either a flat vector or a row-major grid.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputData {
    Flat(Vec<f64>),
    Grid(Vec<Vec<f64>>),
}

/// Read a JSON array of numbers, or an array of rows, and flatten it.
pub fn load_input(path: &Path) -> Result<Vec<f64>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_input(&text).with_context(|| format!("parsing {}", path.display()))
}

/// [`load_input`] on an in-memory string.
pub fn parse_input(text: &str) -> Result<Vec<f64>> {
    let data = match serde_json::from_str::<InputData>(text)? {
        InputData::Flat(values) => values,
        InputData::Grid(rows) => rows.into_iter().flatten().collect(),
    };
    if data.is_empty() {
        bail!("input contains no values");
    }
    Ok(data)
}

/// Everything written to `outcome.json`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// Settings the run used after all overrides.
    pub config: &'a TrainingConfig,
    /// Register split into data and ancilla qubits.
    pub layout: QubitLayout,
    /// Number of input values before padding.
    pub data_len: usize,
    /// Trainable angles, 2·Q·K.
    pub num_parameters: usize,
    /// Lowest cost seen.
    pub best_cost: f64,
    /// Fidelity at the best iteration.
    pub best_fidelity: f64,
    /// Iteration that produced [`Self::best_cost`].
    pub best_iteration: usize,
    /// Best checkpoint, full history and final angles.
    pub outcome: &'a TrainingOutcome,
}

impl<'a> RunReport<'a> {
    /// Summarise `outcome` for serialisation.
    pub fn new(
        config: &'a TrainingConfig,
        layout: QubitLayout,
        data_len: usize,
        outcome: &'a TrainingOutcome,
    ) -> Self {
        let best_iteration = outcome.best.iteration();
        let best_fidelity = outcome
            .history
            .get(best_iteration)
            .map_or(f64::NAN, |r| r.fidelity);
        Self {
            config,
            layout,
            data_len,
            num_parameters: outcome.final_params.len(),
            best_cost: outcome.best.cost(),
            best_fidelity,
            best_iteration,
            outcome,
        }
    }
}
