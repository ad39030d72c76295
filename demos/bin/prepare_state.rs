//! Amplitude State Preparation Demo
//!
//! Trains the layered rotation ansatz so that its measurement amplitudes
//! reproduce a classical vector, by default a synthetic 28×28 image on ten
//! qubits, and writes the best angles and the full history to
//! `<output>/outcome.json`.

use std::fs;
use std::ops::ControlFlow;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use quprep_train::{Objective, QubitLayout, StateEncoder, TrainingConfig, TrainingLoop};

use quprep_demos::{
    RunReport, create_progress_bar, load_input, print_header, print_result, print_section,
    print_success, synthetic_digit,
};

/// Amplitude state preparation by gradient training
#[derive(Parser, Debug)]
#[command(name = "prepare-state")]
#[command(about = "Fit a parameterised circuit to an amplitude-encoded vector")]
struct Args {
    /// JSON file with an array of numbers (or an array of rows)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// YAML training configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ansatz layers
    #[arg(short, long)]
    layers: Option<usize>,

    /// Optimizer steps
    #[arg(short, long)]
    steps: Option<usize>,

    /// Seed for the initial angles
    #[arg(long)]
    seed: Option<u64>,

    /// Cost to minimise: fidelity, mse or l1
    #[arg(long)]
    objective: Option<Objective>,

    /// Extra qubits beyond ceil(log2(len))
    #[arg(long)]
    ancilla: Option<usize>,

    /// Stop once the best cost drops below this value
    #[arg(long)]
    stop_below: Option<f64>,

    /// Output directory for results
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = resolve_config(&args)?;
    let data = match &args.input {
        Some(path) => load_input(path)?,
        None => synthetic_digit(),
    };

    print_header("Amplitude State Preparation");

    let layout = QubitLayout::for_data_len(data.len(), config.ancilla);
    let target = StateEncoder::for_layout(&layout)?.encode(&data)?;

    print_section("Problem Setup");
    print_result(
        "Input",
        args.input
            .as_ref()
            .map_or_else(|| "synthetic 28x28 image".to_string(), |p| p.display().to_string()),
    );
    print_result("Values", data.len());
    print_result(
        "Qubits",
        format!(
            "{} ({} data + {} ancilla)",
            layout.total_qubits(),
            layout.data_qubits,
            layout.ancilla_qubits
        ),
    );
    print_result("Layers", config.layers);
    print_result("Steps", config.steps);
    print_result("Objective", config.objective);
    print_result("Seed", config.seed);

    let mut rng = config.rng();
    let training = TrainingLoop::new(&config, target, &mut rng)?;
    print_result("Trainable parameters", training.params().len());
    print_result(
        "Initial cost",
        format!("{:.6}", training.current_evaluation().cost),
    );

    print_section("Training");
    let pb = create_progress_bar(config.steps as u64, "training");
    let stop_below = args.stop_below;
    let outcome = training.run_with(|record| {
        pb.set_position(record.iteration as u64);
        pb.set_message(format!("best cost {:.5}", record.best_cost));
        match stop_below {
            Some(threshold) if record.best_cost < threshold => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    })?;
    pb.finish_with_message(format!("best cost {:.5}", outcome.best.cost()));

    let report = RunReport::new(&config, layout, data.len(), &outcome);

    print_section("Results");
    print_result("Steps completed", outcome.steps_completed);
    if outcome.stopped_early {
        print_result("Stopped early", "best cost below threshold");
    }
    print_result("Best cost", format!("{:.6}", report.best_cost));
    print_result("Best fidelity", format!("{:.6}", report.best_fidelity));
    print_result("Best iteration", report.best_iteration);

    fs::create_dir_all(&args.output)?;
    let path = args.output.join("outcome.json");
    fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    info!("Results saved to: {}", path.display());

    println!();
    print_success("State preparation complete!");
    Ok(())
}

/// Defaults, then the YAML file, then `QUPREP_*` variables, then flags.
fn resolve_config(args: &Args) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_file(path)?,
        None => TrainingConfig::default(),
    };
    config.apply_env()?;

    if let Some(layers) = args.layers {
        config.layers = layers;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(objective) = args.objective {
        config.objective = objective;
    }
    if let Some(ancilla) = args.ancilla {
        config.ancilla = ancilla;
    }
    config.validate()?;
    Ok(config)
}
