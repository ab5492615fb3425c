use candle_core::{ Device, Tensor };
use rand::{ Rng, seq::SliceRandom };

use crate::{
  internal::randn_vec,
  error::{ Error, Result },
};


/// Labeled samples for binary classification.
///
/// Features are stored row-major, one row of `n_features` values per sample.
/// Labels are `1.0` for the positive class and `0.0` otherwise.

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
  features: Vec<f32>,
  labels: Vec<f32>,
  n_features: usize,
}

impl Dataset {
  pub fn new(features: Vec<f32>, labels: Vec<f32>, n_features: usize) -> Result<Self> {
    if n_features == 0 {
      return Err(Error::Data("samples need at least one feature".into()))
    }
    if features.len() != labels.len() * n_features {
      return Err(Error::Data(format!(
        "{} feature values don't match {} labels with {} features each",
        features.len(), labels.len(), n_features,
      )))
    }
    if let Some(value) = features.iter().find(|v| !v.is_finite() ) {
      return Err(Error::Data(format!("feature value {} is not finite", value)))
    }
    if let Some(label) = labels.iter().find(|l| **l != 0.0 && **l != 1.0 ) {
      return Err(Error::Data(format!("label {} is not binary", label)))
    }
    Ok(Self { features, labels, n_features })
  }

  /// Draw standard normal features and label each sample
  /// by the sign of its feature sum.
  pub fn synthetic<R: Rng>(n_samples: usize, n_features: usize, rng: &mut R) -> Result<Self> {
    let features: Vec<f32> = randn_vec(n_samples * n_features, rng);
    let labels = if n_features == 0 { vec![] } else {
      features
        .chunks(n_features)
        .map(Self::label_for)
        .collect()
    };
    Self::new(features, labels, n_features)
  }

  /// Positive iff the features sum to more than zero.
  pub fn label_for(row: &[f32]) -> f32 {
    if row.iter().sum::<f32>() > 0.0 { 1.0 } else { 0.0 }
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn n_features(&self) -> usize {
    self.n_features
  }

  pub fn row(&self, index: usize) -> &[f32] {
    &self.features[index * self.n_features..(index + 1) * self.n_features]
  }

  pub fn features(&self) -> &[f32] {
    &self.features
  }

  pub fn labels(&self) -> &[f32] {
    &self.labels
  }

  pub fn to_tensors(&self, device: &Device) -> Result<(Tensor, Tensor)> {
    to_tensors(&self.features, &self.labels, self.n_features, device)
  }

  /// Iterate over the dataset in chunks of `batch_size` samples.
  ///
  /// Sample order gets shuffled when an `rng` is given.
  /// The final batch may be smaller than the rest.
  pub fn batches<R: Rng>(&self, batch_size: usize, rng: Option<&mut R>) -> Batches<'_> {
    let mut order: Vec<usize> = (0..self.len()).collect();
    if let Some(rng) = rng {
      order.shuffle(rng);
    }
    Batches {
      dataset: self,
      order,
      batch_size: batch_size.max(1),
      cursor: 0,
    }
  }
}


/// A contiguous copy of some samples of a [Dataset].

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
  pub features: Vec<f32>,
  pub labels: Vec<f32>,
  pub n_features: usize,
}

impl Batch {
  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn to_tensors(&self, device: &Device) -> Result<(Tensor, Tensor)> {
    to_tensors(&self.features, &self.labels, self.n_features, device)
  }
}


/// Iterator returned by [Dataset::batches].

#[derive(Debug)]
pub struct Batches<'a> {
  dataset: &'a Dataset,
  order: Vec<usize>,
  batch_size: usize,
  cursor: usize,
}

impl Iterator for Batches<'_> {
  type Item = Batch;

  fn next(&mut self) -> Option<Batch> {
    if self.cursor >= self.order.len() { return None }
    let end = (self.cursor + self.batch_size).min(self.order.len());
    let indices = &self.order[self.cursor..end];
    self.cursor = end;

    let features = indices
      .iter()
      .flat_map(|&i| self.dataset.row(i).iter().copied() )
      .collect();
    let labels = indices
      .iter()
      .map(|&i| self.dataset.labels[i] )
      .collect();

    Some(Batch { features, labels, n_features: self.dataset.n_features })
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let remaining = (self.order.len() - self.cursor + self.batch_size - 1) / self.batch_size;
    (remaining, Some(remaining))
  }
}

impl ExactSizeIterator for Batches<'_> {}


fn to_tensors(features: &[f32], labels: &[f32], n_features: usize, device: &Device) -> Result<(Tensor, Tensor)> {
  let n = labels.len();
  let x = Tensor::from_slice(features, (n, n_features), device)?;
  let y = Tensor::from_slice(labels, (n, 1), device)?;
  Ok((x, y))
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;
  use rand::{ SeedableRng, rngs::StdRng };

  #[test]
  fn synthetic_labels_follow_feature_sum() {
    let mut rng = StdRng::seed_from_u64(0);
    let data = Dataset::synthetic(100, 2, &mut rng).unwrap();
    assert_eq!(data.len(), 100);
    assert_eq!(data.features().len(), 200);
    for i in 0..data.len() {
      let row = data.row(i);
      let expected = if row[0] + row[1] > 0.0 { 1.0 } else { 0.0 };
      assert_eq!(data.labels()[i], expected);
    }
  }

  #[test]
  fn synthetic_is_seeded() {
    let a = Dataset::synthetic(50, 2, &mut StdRng::seed_from_u64(9)).unwrap();
    let b = Dataset::synthetic(50, 2, &mut StdRng::seed_from_u64(9)).unwrap();
    let c = Dataset::synthetic(50, 2, &mut StdRng::seed_from_u64(10)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn both_classes_present() {
    let data = Dataset::synthetic(100, 2, &mut StdRng::seed_from_u64(42)).unwrap();
    let positives = data.labels().iter().filter(|l| **l == 1.0 ).count();
    assert!(positives > 20 && positives < 80, "{}", positives);
  }

  #[test]
  fn label_rule() {
    assert_eq!(Dataset::label_for(&[0.5, -0.2]), 1.0);
    assert_eq!(Dataset::label_for(&[0.5, -0.7]), 0.0);
    assert_eq!(Dataset::label_for(&[0.0, 0.0]), 0.0);
  }

  #[test]
  fn rejects_mismatched_lengths() {
    assert!(Dataset::new(vec![1.0, 2.0, 3.0], vec![1.0, 0.0], 2).is_err());
    assert!(Dataset::new(vec![], vec![], 0).is_err());
    assert!(Dataset::new(vec![1.0, 2.0], vec![0.5], 2).is_err());
  }

  #[test]
  fn rejects_non_finite_features() {
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
      let result = Dataset::new(vec![bad, 1.0, 0.5, 0.5], vec![1.0, 1.0], 2);
      assert!(matches!(result, Err(Error::Data(_))), "{}", bad);
    }
  }

  #[test]
  fn batches_cover_every_sample_once() {
    let data = Dataset::synthetic(23, 2, &mut StdRng::seed_from_u64(1)).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let batches: Vec<Batch> = data.batches(5, Some(&mut rng)).collect();
    assert_eq!(batches.len(), 5);
    assert_eq!(batches.iter().map(|b| b.len() ).collect::<Vec<_>>(), vec![5, 5, 5, 5, 3]);

    let rows: HashSet<Vec<u32>> = batches
      .iter()
      .flat_map(|b| b.features.chunks(2).map(|r| r.iter().map(|v| v.to_bits() ).collect() ).collect::<Vec<_>>() )
      .collect();
    assert_eq!(rows.len(), 23);

    for batch in &batches {
      for (row, label) in batch.features.chunks(2).zip(&batch.labels) {
        assert_eq!(Dataset::label_for(row), *label);
      }
    }
  }

  #[test]
  fn unshuffled_batches_keep_order() {
    let data = Dataset::new(vec![1.0, -2.0, 3.0], vec![1.0, 0.0, 1.0], 1).unwrap();
    let batches: Vec<Batch> = data.batches::<StdRng>(2, None).collect();
    assert_eq!(batches[0].features, vec![1.0, -2.0]);
    assert_eq!(batches[1].features, vec![3.0]);
  }

  #[test]
  fn tensor_shapes() {
    let data = Dataset::synthetic(8, 3, &mut StdRng::seed_from_u64(5)).unwrap();
    let (x, y) = data.to_tensors(&Device::Cpu).unwrap();
    assert_eq!(x.dims(), &[8, 3]);
    assert_eq!(y.dims(), &[8, 1]);
  }
}
