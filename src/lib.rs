//! Linear binary classification, trained by automatic differentiation.
//! Tiny. CPU only. Reproducible from a single seed.
//!
//! # Features
//!
//! - **Synthetic data** — Standard normal samples, labeled by the sign
//! of their feature sum, so the classes are linearly separable by construction.
//!
//! - **Linear classifier** — One affine layer followed by a sigmoid, built on
//! [candle_nn::Linear] and trained through candle's autograd.
//!
//! - **Optimization** — Plain gradient descent or ADAM, behind a common
//! [Strategy](optimize::Strategy) interface.
//!
//! - **Snapshots** — Trained parameters can be saved to disc and loaded
//! elsewhere for evaluation.
//!
//! # Examples
//!
//! Training on 100 samples with two features and measuring accuracy:
//! ```
//! use linclass::{ TrainConfig, Dataset, LinearClassifier, fit, evaluate };
//! use rand::{ SeedableRng, rngs::StdRng };
//!
//! fn main() -> linclass::Result<()> {
//!   let config = TrainConfig::default();
//!   let mut rng = StdRng::seed_from_u64(config.seed);
//!
//!   let data = Dataset::synthetic(config.samples, config.features, &mut rng)?;
//!   let model = LinearClassifier::new(config.features, &mut rng)?;
//!
//!   let history = fit(&model, &data, &config, &mut rng)?;
//!   let evaluation = evaluate(&model, &data, config.threshold)?;
//!
//!   assert!(history.is_improving());
//!   assert!(evaluation.accuracy >= 0.9);
//!   Ok(())
//! }
//! ```
//!
//! Or let [run] do all of the above.

mod internal;

pub mod scalar;
pub mod error;
pub mod config;
pub mod data;
pub mod model;
pub mod loss;
pub mod optimize;
pub mod train;
pub mod evaluate;

pub use error::{ Error, Result };
pub use config::{ TrainConfig, EvaluateConfig, OptimizerKind };
pub use data::{ Dataset, Batch };
pub use model::{ LinearClassifier, ModelSnapshot };
pub use train::{ fit, History, EpochLoss };
pub use evaluate::{ evaluate, predict, Evaluation };

use rand::{ SeedableRng, rngs::StdRng };


/// Everything a complete training run produces.

#[derive(Debug, Clone)]
pub struct Report {
  pub model: LinearClassifier,
  pub history: History,
  pub evaluation: Evaluation,
}


/// Generate data, train a fresh model on it and score the
/// model on the same samples, all seeded from `config.seed`.

pub fn run(config: &TrainConfig) -> Result<Report> {
  config.validate()?;
  let mut rng = StdRng::seed_from_u64(config.seed);
  let data = Dataset::synthetic(config.samples, config.features, &mut rng)?;
  let model = LinearClassifier::new(config.features, &mut rng)?;
  let history = fit(&model, &data, config, &mut rng)?;
  let evaluation = evaluate(&model, &data, config.threshold)?;
  Ok(Report { model, history, evaluation })
}
