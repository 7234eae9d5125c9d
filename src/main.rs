use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ferrite_mlp::{
    list_models, load_dataset, normalize_dataset, train_loop, EpochStats, NetError, Network,
    PersistedModel, TrainingConfig,
};

const MODELS_DIR: &str = "saved_models";

#[derive(Parser)]
#[command(name = "ferrite-mlp", version, about = "Train and query small feedforward networks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a new model on a CSV dataset
    Train {
        /// CSV file: header row, then numeric rows; targets are the last columns
        #[arg(short, long, value_name = "PATH")]
        data: PathBuf,
        /// JSON training config; command-line flags override its values
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Number of target columns at the end of each row
        #[arg(long, value_name = "INT")]
        outputs: Option<usize>,
        /// Hidden layer widths, e.g. 20,20
        #[arg(long, value_name = "LIST", value_delimiter = ',')]
        hidden: Option<Vec<usize>>,
        /// Activation per hidden layer, e.g. relu,relu
        #[arg(long, value_name = "LIST", value_delimiter = ',')]
        activations: Option<Vec<String>>,
        /// Output layer activation
        #[arg(long, value_name = "NAME")]
        output_activation: Option<String>,
        #[arg(short, long, value_name = "INT")]
        epochs: Option<usize>,
        #[arg(short, long, value_name = "FLOAT")]
        learning_rate: Option<f64>,
        /// Stop once an epoch's average error drops below this
        #[arg(long, value_name = "FLOAT")]
        error_goal: Option<f64>,
        /// Seed for weight initialization (and shuffling)
        #[arg(long, value_name = "INT")]
        seed: Option<u64>,
        /// Reshuffle samples every epoch
        #[arg(long)]
        shuffle: bool,
        /// Save the trained model as <models-dir>/<NAME>.json
        #[arg(short, long, value_name = "NAME")]
        save: Option<String>,
        #[arg(long, value_name = "DIR", default_value = MODELS_DIR)]
        models_dir: PathBuf,
    },
    /// Load a saved model and predict from raw inputs
    Predict {
        #[arg(short, long, value_name = "PATH")]
        model: PathBuf,
        /// Comma-separated raw input values
        #[arg(short, long, value_name = "LIST", allow_hyphen_values = true)]
        input: String,
    },
    /// List saved models
    Models {
        #[arg(long, value_name = "DIR", default_value = MODELS_DIR)]
        models_dir: PathBuf,
    },
}

fn install_logger() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    install_logger()?;
    let args = Cli::parse();

    let result = match args.command {
        Command::Train {
            data,
            config,
            outputs,
            hidden,
            activations,
            output_activation,
            epochs,
            learning_rate,
            error_goal,
            seed,
            shuffle,
            save,
            models_dir,
        } => {
            let overrides = TrainingConfig {
                num_outputs: outputs,
                hidden_layers: hidden,
                hidden_activations: activations,
                output_activation,
                epochs,
                learning_rate,
                error_goal,
                seed,
                shuffle: shuffle.then_some(true),
            };
            run_train(&data, config.as_deref(), overrides, save.as_deref(), &models_dir)
        }
        Command::Predict { model, input } => run_predict(&model, &input),
        Command::Models { models_dir } => run_models(&models_dir),
    };

    if let Err(ref e) = result {
        error!("{}", e);
    }
    result.map_err(Into::into)
}

fn run_train(
    data: &Path,
    config_path: Option<&Path>,
    overrides: TrainingConfig,
    save: Option<&str>,
    models_dir: &Path,
) -> Result<(), NetError> {
    let base = match config_path {
        Some(path) => TrainingConfig::load_json(path)?,
        None => TrainingConfig::default(),
    };
    let plan = base.merge(overrides).resolve()?;

    let raw = load_dataset(data, plan.num_outputs)?;
    let (dataset, normalization) = normalize_dataset(&raw)?;
    info!(
        path = %data.display(),
        rows = dataset.len(),
        inputs = dataset.num_inputs(),
        outputs = dataset.num_outputs(),
        "dataset loaded"
    );

    let spec = plan.network_spec(dataset.num_inputs())?;
    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut network = Network::new(&spec, &mut rng)?;

    // Per-epoch progress goes to stdout from a printer thread; it exits once
    // the config holding the sender is dropped.
    let (tx, rx) = mpsc::channel::<EpochStats>();
    let printer = thread::spawn(move || {
        for stats in rx {
            println!("{}", stats);
        }
    });
    let config = plan.train.with_progress(tx);
    let result = train_loop(&mut network, &dataset, &config);
    drop(config);
    if printer.join().is_err() {
        warn!("progress printer panicked");
    }
    let report = result?;
    println!(
        "Training complete: {} epochs, average error {:.6}{}",
        report.epochs_run,
        report.final_error,
        if report.goal_reached { " (goal reached)" } else { "" }
    );

    if let Some(name) = save {
        let name = name.trim();
        if name.is_empty() {
            return Err(NetError::Config("model name must not be empty".into()));
        }
        std::fs::create_dir_all(models_dir).map_err(|e| {
            NetError::Persistence(format!("cannot create {}: {}", models_dir.display(), e))
        })?;
        let path = models_dir.join(format!("{}.json", name));
        PersistedModel::new(network, normalization)?.save_json(&path)?;
        println!("Model saved to {}", path.display());
    }
    Ok(())
}

fn run_predict(model_path: &Path, input: &str) -> Result<(), NetError> {
    let model = PersistedModel::load_json(model_path)?;
    info!(path = %model_path.display(), "model loaded");

    let values = input
        .split(',')
        .map(|s| {
            let s = s.trim();
            s.parse::<f64>()
                .map_err(|_| NetError::Data(format!("'{}' is not a valid number", s)))
        })
        .collect::<Result<Vec<f64>, NetError>>()?;

    let prediction = model.predict(&values)?;
    let rendered: Vec<String> = prediction.iter().map(|v| format!("{:.6}", v)).collect();
    println!("Predicted output: {}", rendered.join(", "));
    Ok(())
}

fn run_models(models_dir: &Path) -> Result<(), NetError> {
    if !models_dir.exists() {
        println!("No saved models found in '{}'.", models_dir.display());
        return Ok(());
    }
    let models = list_models(models_dir)?;
    if models.is_empty() {
        println!("No saved models found in '{}'.", models_dir.display());
        return Ok(());
    }
    for (i, path) in models.iter().enumerate() {
        println!("  {}: {}", i + 1, path.display());
    }
    Ok(())
}
