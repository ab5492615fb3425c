use std::fmt;

use itertools::Itertools;
use rand::Rng;
use candle_core::Module;
use tracing::{ debug, info };

use crate::{
  config::TrainConfig,
  data::Dataset,
  error::{ Error, Result },
  loss::binary_cross_entropy,
  model::LinearClassifier,
  optimize::{ self, Optimizer, Strategy },
};


/// Mean training loss of a single epoch.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochLoss {
  pub epoch: usize,
  pub loss: f32,
}

impl fmt::Display for EpochLoss {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "epoch {}: loss {:.4}", self.epoch, self.loss)
  }
}


/// Loss curve of a training run, one entry per epoch.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
  pub epochs: Vec<EpochLoss>,
}

impl History {
  pub fn first(&self) -> Option<&EpochLoss> {
    self.epochs.first()
  }

  pub fn last(&self) -> Option<&EpochLoss> {
    self.epochs.last()
  }

  pub fn len(&self) -> usize {
    self.epochs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.epochs.is_empty()
  }

  pub fn losses(&self) -> Vec<f32> {
    self.epochs.iter().map(|e| e.loss ).collect()
  }

  /// Whether the loss went down on average, comparing the mean
  /// of the final quarter of epochs to that of the first quarter.
  pub fn is_improving(&self) -> bool {
    let quarter = (self.len() / 4).max(1);
    if self.len() < 2 { return false }
    let mean = |losses: &[EpochLoss]| losses.iter().map(|e| e.loss ).sum::<f32>() / losses.len() as f32;
    mean(&self.epochs[self.len() - quarter..]) < mean(&self.epochs[..quarter])
  }

  /// Every `log_every`th epoch, plus the final one.
  pub fn checkpoints(&self, log_every: usize) -> impl Iterator<Item = &EpochLoss> + '_ {
    let log_every = log_every.max(1);
    let last = self.epochs.last().map(|e| e.epoch );
    self.epochs
      .iter()
      .filter(move |e| e.epoch % log_every == 0 || Some(e.epoch) == last )
  }
}


/// Train `model` on `dataset` with the optimizer picked in `config`.

pub fn fit<R: Rng>(model: &LinearClassifier, dataset: &Dataset, config: &TrainConfig, rng: &mut R) -> Result<History> {
  let optimizer = Optimizer::new(config.learning_rate, optimize::strategy(config.optimizer));
  fit_with(model, dataset, config, optimizer, rng)
}


/// Train with an explicitly constructed optimizer.

pub fn fit_with<S, R>(
  model: &LinearClassifier,
  dataset: &Dataset,
  config: &TrainConfig,
  mut optimizer: Optimizer<S>,
  rng: &mut R,
) -> Result<History>
where
  S: Strategy,
  R: Rng,
{
  config.validate()?;
  if dataset.is_empty() {
    return Err(Error::Data("cannot train on an empty dataset".into()))
  }
  if dataset.n_features() != model.n_features() {
    return Err(Error::Data(format!(
      "dataset has {} features but the model expects {}", dataset.n_features(), model.n_features(),
    )))
  }

  let params = model.parameters();
  let mut history = History::default();

  info!(
    samples = dataset.len(),
    epochs = config.epochs,
    batch_size = config.batch_size,
    optimizer = %config.optimizer,
    "starting training"
  );

  for epoch in 1..=config.epochs {
    let mut total = 0.0;
    for batch in dataset.batches(config.batch_size, Some(&mut *rng)) {
      let (x, y) = batch.to_tensors(model.device())?;

      // Forward
      let probs = model.forward(&x)?;
      let loss = binary_cross_entropy(&probs, &y)?;

      // Backward & step
      optimizer.minimize(&loss, &params)?;

      let loss = loss.to_scalar::<f32>()?;
      debug!(epoch, step = optimizer.steps(), loss, "batch");
      total += loss * batch.len() as f32;
    }

    let loss = total / dataset.len() as f32;
    if !loss.is_finite() {
      return Err(Error::Diverged { epoch, loss })
    }
    history.epochs.push(EpochLoss { epoch, loss });

    if epoch % config.log_every == 0 || epoch == config.epochs {
      info!("{}", EpochLoss { epoch, loss });
    }
  }

  let weights = model.weights()?.iter().map(|w| format!("{:.4}", w) ).join(", ");
  info!("training finished with weights [{}] and bias {:.4}", weights, model.bias()?);

  Ok(history)
}


#[cfg(test)]
mod tests {
  use super::*;
  use rand::{ SeedableRng, rngs::StdRng };
  use crate::optimize::Sgd;

  fn history(losses: &[f32]) -> History {
    History {
      epochs: losses.iter().enumerate().map(|(i, &loss)| EpochLoss { epoch: i + 1, loss } ).collect(),
    }
  }

  #[test]
  fn improving_history() {
    assert!(history(&[1.0, 0.9, 0.95, 0.7, 0.6, 0.65, 0.5, 0.4]).is_improving());
    assert!(!history(&[0.4, 0.5, 0.6, 0.7]).is_improving());
    assert!(!history(&[0.4]).is_improving());
  }

  #[test]
  fn checkpoints_include_final_epoch() {
    let losses: Vec<f32> = (0..25).map(|i| 1.0 / (i + 1) as f32 ).collect();
    let epochs: Vec<usize> = history(&losses).checkpoints(10).map(|e| e.epoch ).collect();
    assert_eq!(epochs, vec![10, 20, 25]);
    let epochs: Vec<usize> = history(&losses[..20]).checkpoints(10).map(|e| e.epoch ).collect();
    assert_eq!(epochs, vec![10, 20]);
  }

  #[test]
  fn epoch_line_format() {
    let line = EpochLoss { epoch: 10, loss: 0.123456 }.to_string();
    assert_eq!(line, "epoch 10: loss 0.1235");
  }

  #[test]
  fn nan_loss_aborts_training() {
    let mut rng = StdRng::seed_from_u64(7);
    let data = Dataset::synthetic(10, 2, &mut rng).unwrap();
    let model = LinearClassifier::from_parts(&[f32::NAN, 1.0], 0.0).unwrap();
    let result = fit(&model, &data, &TrainConfig::default(), &mut rng);
    assert!(matches!(result, Err(Error::Diverged { epoch: 1, .. })), "{:?}", result);
  }

  #[test]
  fn records_every_epoch() {
    let mut rng = StdRng::seed_from_u64(3);
    let data = Dataset::synthetic(40, 2, &mut rng).unwrap();
    let model = LinearClassifier::new(2, &mut rng).unwrap();
    let config = TrainConfig { epochs: 12, batch_size: 8, ..Default::default() };
    let history = fit(&model, &data, &config, &mut rng).unwrap();
    assert_eq!(history.len(), 12);
    assert_eq!(history.first().unwrap().epoch, 1);
    assert_eq!(history.last().unwrap().epoch, 12);
    assert!(history.losses().iter().all(|l| l.is_finite() && *l > 0.0 ));
  }

  #[test]
  fn updates_parameters() {
    let mut rng = StdRng::seed_from_u64(4);
    let data = Dataset::synthetic(20, 2, &mut rng).unwrap();
    let model = LinearClassifier::from_parts(&[0.0, 0.0], 0.0).unwrap();
    let config = TrainConfig { epochs: 1, ..Default::default() };
    let optimizer = Optimizer::new(0.1, Sgd);
    fit_with(&model, &data, &config, optimizer, &mut rng).unwrap();
    assert_ne!(model.weights().unwrap(), vec![0.0, 0.0]);
  }

  #[test]
  fn rejects_feature_mismatch() {
    let mut rng = StdRng::seed_from_u64(5);
    let data = Dataset::synthetic(20, 3, &mut rng).unwrap();
    let model = LinearClassifier::new(2, &mut rng).unwrap();
    let result = fit(&model, &data, &TrainConfig::default(), &mut rng);
    assert!(matches!(result, Err(Error::Data(_))));
  }

  #[test]
  fn rejects_invalid_config() {
    let mut rng = StdRng::seed_from_u64(6);
    let data = Dataset::synthetic(20, 2, &mut rng).unwrap();
    let model = LinearClassifier::new(2, &mut rng).unwrap();
    let config = TrainConfig { epochs: 0, ..Default::default() };
    assert!(matches!(fit(&model, &data, &config, &mut rng), Err(Error::Config(_))));
  }
}
