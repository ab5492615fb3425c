use std::fmt;

use candle_core::{ Tensor, Module };

use crate::{
  config::validate_threshold,
  data::Dataset,
  error::{ Error, Result },
  model::LinearClassifier,
};


/// Outcome of scoring a model against labeled samples.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
  pub correct: usize,
  pub total: usize,
  pub accuracy: f32,
}

impl fmt::Display for Evaluation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "accuracy: {:.4}", self.accuracy)
  }
}


/// Probability of the positive class for every row of `features`,
/// computed without recording gradients.

pub fn probabilities(model: &LinearClassifier, features: &Tensor) -> Result<Vec<f32>> {
  let probs = model.forward(&features.detach())?.detach();
  Ok(probs.flatten_all()?.to_vec1()?)
}


/// Class predictions (`true` for positive) at the given probability threshold.

pub fn predict(model: &LinearClassifier, features: &Tensor, threshold: f32) -> Result<Vec<bool>> {
  validate_threshold(threshold)?;
  Ok(probabilities(model, features)?
    .into_iter()
    .map(|p| p >= threshold )
    .collect())
}


pub fn evaluate(model: &LinearClassifier, dataset: &Dataset, threshold: f32) -> Result<Evaluation> {
  validate_threshold(threshold)?;
  if dataset.is_empty() {
    return Err(Error::Data("cannot evaluate on an empty dataset".into()))
  }
  let (x, _) = dataset.to_tensors(model.device())?;
  let predictions = predict(model, &x, threshold)?;
  let correct = predictions
    .iter()
    .zip(dataset.labels())
    .filter(|(pred, label)| **pred == (**label == 1.0) )
    .count();
  let total = dataset.len();
  Ok(Evaluation {
    correct,
    total,
    accuracy: correct as f32 / total as f32,
  })
}


#[cfg(test)]
mod tests {
  use super::*;
  use candle_core::Device;

  #[test]
  fn perfect_separator() {
    // Sign of the feature sum is exactly what this model computes
    let model = LinearClassifier::from_parts(&[5.0, 5.0], 0.0).unwrap();
    let data = Dataset::new(
      vec![1.0, 1.0, -1.0, -0.5, 0.3, -0.1, -2.0, 1.0],
      vec![1.0, 0.0, 1.0, 0.0],
      2,
    ).unwrap();
    let evaluation = evaluate(&model, &data, 0.5).unwrap();
    assert_eq!(evaluation.correct, 4);
    assert_eq!(evaluation.accuracy, 1.0);
  }

  #[test]
  fn inverted_separator() {
    let model = LinearClassifier::from_parts(&[-5.0, -5.0], 0.0).unwrap();
    let data = Dataset::new(vec![1.0, 1.0, -1.0, -1.0], vec![1.0, 0.0], 2).unwrap();
    let evaluation = evaluate(&model, &data, 0.5).unwrap();
    assert_eq!(evaluation.correct, 0);
    assert_eq!(evaluation.accuracy, 0.0);
  }

  #[test]
  fn threshold_is_inclusive() {
    let model = LinearClassifier::from_parts(&[1.0], 0.0).unwrap();
    let x = Tensor::new(&[[0f32], [-1.], [1.]], &Device::Cpu).unwrap();
    assert_eq!(predict(&model, &x, 0.5).unwrap(), vec![true, false, true]);
  }

  #[test]
  fn probabilities_are_untracked() {
    let model = LinearClassifier::from_parts(&[1.0, 2.0], 0.5).unwrap();
    let x = Tensor::new(&[[0.5f32, -0.5]], &Device::Cpu).unwrap();
    let probs = probabilities(&model, &x).unwrap();
    assert_eq!(probs.len(), 1);
    assert!((probs[0] - 1.0 / (1.0 + (0.0f32).exp())).abs() < 1e-6);
  }

  #[test]
  fn empty_dataset() {
    let model = LinearClassifier::from_parts(&[1.0], 0.0).unwrap();
    let data = Dataset::new(vec![], vec![], 1).unwrap();
    assert!(evaluate(&model, &data, 0.5).is_err());
  }

  #[test]
  fn display() {
    let evaluation = Evaluation { correct: 9, total: 10, accuracy: 0.9 };
    assert_eq!(evaluation.to_string(), "accuracy: 0.9000");
  }

  #[test]
  fn rejects_degenerate_threshold() {
    let model = LinearClassifier::from_parts(&[1.0, 1.0], 0.0).unwrap();
    let data = Dataset::new(vec![1.0, 1.0, -1.0, -1.0], vec![1.0, 0.0], 2).unwrap();
    for threshold in [0.0, 1.0, 1.5, f32::NAN] {
      assert!(matches!(evaluate(&model, &data, threshold), Err(Error::Config(_))), "{}", threshold);
    }
  }
}
