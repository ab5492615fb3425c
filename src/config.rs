//! Training configuration.
//!
//! [TrainConfig::default] reproduces the classic setup of 100 samples with
//! 2 features, trained for 100 epochs in batches of 10 using Adam.
//! Individual values may be overridden from `LINCLASS_*` environment variables
//! with [TrainConfig::from_env] and are checked by [TrainConfig::validate].

use std::fmt;
use std::str::FromStr;

use serde::{ Serialize, Deserialize };

use crate::error::{ Error, Result };


pub const ENV_PREFIX: &str = "LINCLASS_";


/// Optimization strategy used by the training loop.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizerKind {
  Adam,
  Sgd,
}

impl FromStr for OptimizerKind {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "adam" => Ok(Self::Adam),
      "sgd" => Ok(Self::Sgd),
      other => Err(format!("unknown optimizer '{other}', expected 'adam' or 'sgd'")),
    }
  }
}

impl fmt::Display for OptimizerKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Adam => write!(f, "adam"),
      Self::Sgd => write!(f, "sgd"),
    }
  }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
  pub samples: usize,
  pub features: usize,
  pub batch_size: usize,
  pub epochs: usize,
  pub learning_rate: f64,
  pub optimizer: OptimizerKind,
  /// Report the epoch loss every this many epochs.
  pub log_every: usize,
  pub seed: u64,
  /// Probability at or above which a sample counts as positive.
  pub threshold: f32,
}

impl Default for TrainConfig {
  fn default() -> Self {
    Self {
      samples: 100,
      features: 2,
      batch_size: 10,
      epochs: 100,
      learning_rate: 0.01,
      optimizer: OptimizerKind::Adam,
      log_every: 10,
      seed: 42,
      threshold: 0.5,
    }
  }
}

impl TrainConfig {
  pub fn validate(&self) -> Result<()> {
    let fail = |msg: &str| Err(Error::Config(msg.to_string()));
    if self.samples == 0 { return fail("samples must be positive") }
    if self.features == 0 { return fail("features must be positive") }
    if self.batch_size == 0 { return fail("batch_size must be positive") }
    if self.epochs == 0 { return fail("epochs must be positive") }
    if self.log_every == 0 { return fail("log_every must be positive") }
    if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
      return fail("learning_rate must be a positive finite number")
    }
    validate_threshold(self.threshold)
  }

  /// Start from the defaults and apply any `LINCLASS_*` overrides.
  pub fn from_env() -> Result<Self> {
    let mut config = Self::default();
    if let Some(v) = env_parsed("SAMPLES")? { config.samples = v }
    if let Some(v) = env_parsed("FEATURES")? { config.features = v }
    if let Some(v) = env_parsed("BATCH_SIZE")? { config.batch_size = v }
    if let Some(v) = env_parsed("EPOCHS")? { config.epochs = v }
    if let Some(v) = env_parsed("LEARNING_RATE")? { config.learning_rate = v }
    if let Some(v) = env_parsed("OPTIMIZER")? { config.optimizer = v }
    if let Some(v) = env_parsed("LOG_EVERY")? { config.log_every = v }
    if let Some(v) = env_parsed("SEED")? { config.seed = v }
    if let Some(v) = env_parsed("THRESHOLD")? { config.threshold = v }
    Ok(config)
  }
}


/// Settings for scoring a saved model on fresh synthetic samples.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateConfig {
  pub samples: usize,
  pub seed: u64,
  pub threshold: f32,
}

impl Default for EvaluateConfig {
  fn default() -> Self {
    Self { samples: 100, seed: 7, threshold: 0.5 }
  }
}

impl EvaluateConfig {
  pub fn validate(&self) -> Result<()> {
    if self.samples == 0 {
      return Err(Error::Config("samples must be positive".into()))
    }
    validate_threshold(self.threshold)
  }
}


/// Thresholds must lie strictly inside `(0, 1)`; NaN is rejected.

pub fn validate_threshold(threshold: f32) -> Result<()> {
  if threshold > 0.0 && threshold < 1.0 {
    Ok(())
  } else {
    Err(Error::Config(format!("threshold must lie strictly between 0 and 1, got {threshold}")))
  }
}


/// Read `LINCLASS_<suffix>` and parse it, `None` when unset.

pub fn env_parsed<T>(suffix: &str) -> Result<Option<T>>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  let key = format!("{ENV_PREFIX}{suffix}");
  let value = match std::env::var(&key) {
    Ok(value) => value,
    Err(std::env::VarError::NotPresent) => return Ok(None),
    Err(err) => return Err(Error::Config(format!("{key}: {err}"))),
  };
  value.trim().parse()
    .map(Some)
    .map_err(|err| Error::Config(format!("{key}={value:?}: {err}")) )
}
