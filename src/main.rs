use std::path::PathBuf;

use anyhow::{ Context, Result };
use clap::{ Args, Parser, Subcommand };
use rand::{ SeedableRng, rngs::StdRng };
use tracing::info;
use tracing_subscriber::EnvFilter;

use linclass::{ Dataset, LinearClassifier, OptimizerKind, TrainConfig, EvaluateConfig };


/// Train and evaluate a linear binary classifier on synthetic data.
#[derive(Parser, Debug)]
#[command(name = "linclass", version, about)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Generate data, train a classifier on it and report accuracy
  Train(TrainArgs),

  /// Score a saved classifier on freshly generated data
  Evaluate(EvaluateArgs),
}

/// Unset flags fall back to `LINCLASS_*` environment variables, then to defaults.
#[derive(Args, Debug)]
struct TrainArgs {
  /// Number of synthetic samples
  #[arg(long)]
  samples: Option<usize>,

  /// Number of features per sample
  #[arg(long)]
  features: Option<usize>,

  #[arg(long)]
  batch_size: Option<usize>,

  #[arg(long)]
  epochs: Option<usize>,

  #[arg(long)]
  learning_rate: Option<f64>,

  /// Either "adam" or "sgd"
  #[arg(long)]
  optimizer: Option<OptimizerKind>,

  /// Report the loss every this many epochs
  #[arg(long)]
  log_every: Option<usize>,

  #[arg(long)]
  seed: Option<u64>,

  /// Probability at or above which a sample is predicted positive
  #[arg(long)]
  threshold: Option<f32>,

  /// Write the trained parameters to this file
  #[arg(long)]
  save: Option<PathBuf>,
}

impl TrainArgs {
  fn config(&self) -> linclass::Result<TrainConfig> {
    let mut config = TrainConfig::from_env()?;
    if let Some(v) = self.samples { config.samples = v }
    if let Some(v) = self.features { config.features = v }
    if let Some(v) = self.batch_size { config.batch_size = v }
    if let Some(v) = self.epochs { config.epochs = v }
    if let Some(v) = self.learning_rate { config.learning_rate = v }
    if let Some(v) = self.optimizer { config.optimizer = v }
    if let Some(v) = self.log_every { config.log_every = v }
    if let Some(v) = self.seed { config.seed = v }
    if let Some(v) = self.threshold { config.threshold = v }
    config.validate()?;
    Ok(config)
  }
}

#[derive(Args, Debug)]
struct EvaluateArgs {
  /// Snapshot written by `train --save`
  #[arg(long)]
  model: PathBuf,

  #[arg(long, default_value_t = 100)]
  samples: usize,

  #[arg(long, default_value_t = 7)]
  seed: u64,

  #[arg(long, default_value_t = 0.5)]
  threshold: f32,
}

impl EvaluateArgs {
  fn config(&self) -> linclass::Result<EvaluateConfig> {
    let config = EvaluateConfig {
      samples: self.samples,
      seed: self.seed,
      threshold: self.threshold,
    };
    config.validate()?;
    Ok(config)
  }
}


fn main() -> Result<()> {
  // Diagnostics go to stderr, stdout carries the loss and accuracy report
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linclass=info")),
    )
    .init();

  match Cli::parse().command {
    Command::Train(args) => train(args),
    Command::Evaluate(args) => evaluate(args),
  }
}

fn train(args: TrainArgs) -> Result<()> {
  let config = args.config().context("invalid training configuration")?;
  let report = linclass::run(&config).context("training failed")?;

  if let Some(path) = &args.save {
    report.model.save(path)
      .with_context(|| format!("failed to save model to {}", path.display()))?;
    info!("saved model to {}", path.display());
  }

  for record in report.history.checkpoints(config.log_every) {
    println!("{}", record);
  }
  println!("{}", report.evaluation);
  info!(correct = report.evaluation.correct, total = report.evaluation.total, "scored training set");
  Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
  let config = args.config().context("invalid evaluation settings")?;
  let model = LinearClassifier::load(&args.model)
    .with_context(|| format!("failed to load model from {}", args.model.display()))?;
  let mut rng = StdRng::seed_from_u64(config.seed);
  let data = Dataset::synthetic(config.samples, model.n_features(), &mut rng)?;
  let evaluation = linclass::evaluate(&model, &data, config.threshold)?;
  println!("{}", evaluation);
  info!(correct = evaluation.correct, total = evaluation.total, "scored fresh samples");
  Ok(())
}
