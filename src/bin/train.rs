//! RBM training binary.
//!
//! Trains a Restricted Boltzmann Machine on a binary dataset (the built-in
//! toy dataset when no file is given), writes lifecycle events as JSONL, and
//! prints the learned weights and the per-epoch reconstruction error.

use clap::Parser;
use rbm::data::{example_dataset, load_dataset};
use rbm::display::{format_matrix, format_trace};
use rbm::{BiasInit, JsonlSink, Notation, PartialConfig, RandomSource, SeededSource, RBM};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "rbm-train",
    about = "Train a Restricted Boltzmann Machine with CD-15"
)]
struct Args {
    /// Binary dataset file (one row per line, 0/1 cells)
    #[arg(long)]
    data: Option<PathBuf>,

    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of hidden units
    #[arg(long)]
    hidden: Option<usize>,

    /// Number of visible units (defaults to the dataset width)
    #[arg(long)]
    visible: Option<usize>,

    /// Number of training epochs
    #[arg(long, default_value_t = 10)]
    epochs: usize,

    /// Base learning rate (alpha)
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Weight initialization standard deviation [default: 0.1]
    #[arg(long)]
    std_dev: Option<f64>,

    /// Bias initialization: zeros | random [default: zeros]
    #[arg(long)]
    bias_init: Option<String>,

    /// RNG seed (wall-clock seeded when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Event log file (JSONL, replaced on start unless --append-log)
    #[arg(long, default_value = "RBM_Log.jsonl")]
    log_file: PathBuf,

    /// Append to the event log instead of replacing it
    #[arg(long)]
    append_log: bool,

    /// Digits after the decimal point when printing
    #[arg(long, default_value_t = 5)]
    precision: usize,

    /// Number notation: fixed | scientific
    #[arg(long, default_value = "fixed")]
    notation: String,
}

/// Weight spread used when neither flag nor config file sets one.
const CLI_STD_DEV: f64 = 0.1;

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let notation: Notation = args.notation.parse()?;
    let bias_init = args
        .bias_init
        .as_deref()
        .map(str::parse::<BiasInit>)
        .transpose()?;

    let rows = match &args.data {
        Some(path) => load_dataset(path)?,
        None => example_dataset(),
    };

    let defaults = PartialConfig {
        std_dev: Some(CLI_STD_DEV),
        ..PartialConfig::default()
    };
    let file = match &args.config {
        Some(path) => PartialConfig::from_json_file(path)?,
        None => PartialConfig::default(),
    };
    let flags = PartialConfig {
        hidden: args.hidden,
        visible: args.visible,
        learning_rate: args.learning_rate,
        std_dev: args.std_dev,
        bias_init,
    };
    let config = defaults.merge(file).merge(flags).resolve(rows.ncols());

    let source: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(SeededSource::new(seed)),
        None => {
            let source = SeededSource::from_time();
            eprintln!("Seed: {}", source.seed());
            Box::new(source)
        }
    };

    let sink = if args.append_log {
        JsonlSink::append(&args.log_file)?
    } else {
        JsonlSink::create(&args.log_file)?
    };
    let mut rbm = RBM::with_source(source).with_sink(Box::new(sink));
    rbm.configure(&config)?;

    eprintln!(
        "RBM: {} visible, {} hidden, alpha={}, std_dev={}",
        config.visible, config.hidden, config.learning_rate, config.std_dev
    );
    eprintln!("Data: {} x {}", rows.nrows(), rows.ncols());

    rbm.load_data(&rows, rows.nrows())?;
    let report = rbm.train(args.epochs, false)?;

    eprintln!(
        "Training complete: {} epochs in {:.3}s",
        report.epochs,
        report.elapsed.as_secs_f64()
    );
    if let (Some(last), Some(mean)) = (report.final_error(), report.mean_error()) {
        eprintln!("Error: final {last:.5}, mean {mean:.5}");
    }

    if let Some(weights) = rbm.weights() {
        println!("Weights & Biases");
        print!("{}", format_matrix(weights, args.precision, notation)?);
    }
    println!("Error");
    print!("{}", format_trace(rbm.error_trace(), args.precision, notation)?);

    Ok(())
}
