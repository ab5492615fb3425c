use std::fs;
use std::path::Path;

use candle_core::{ Device, Tensor, Var, Module };
use candle_nn::{ Linear, ops::sigmoid };
use rand::Rng;
use serde::{ Serialize, Deserialize };

use crate::{
  internal::uniform_vec,
  error::{ Error, Result },
};


/// Single affine layer followed by a sigmoid.
///
/// Maps each row of an `(n, n_features)` input to the probability of it
/// belonging to the positive class.

#[derive(Debug, Clone)]
pub struct LinearClassifier {
  weight: Var,
  bias: Var,
  linear: Linear,
}

impl LinearClassifier {
  /// Initialize parameters uniformly in `±1/sqrt(n_features)`.
  pub fn new<R: Rng>(n_features: usize, rng: &mut R) -> Result<Self> {
    if n_features == 0 {
      return Err(Error::Data("classifier needs at least one input feature".into()))
    }
    let bound = 1.0 / (n_features as f32).sqrt();
    let weights = uniform_vec(n_features, bound, rng);
    let bias = uniform_vec(1, bound, rng)[0];
    Self::from_parts(&weights, bias)
  }

  pub fn from_parts(weights: &[f32], bias: f32) -> Result<Self> {
    if weights.is_empty() {
      return Err(Error::Data("classifier needs at least one input feature".into()))
    }
    let device = Device::Cpu;
    let weight = Var::from_tensor(&Tensor::from_slice(weights, (1, weights.len()), &device)?)?;
    let bias = Var::from_tensor(&Tensor::from_slice(&[bias], 1, &device)?)?;
    let linear = Linear::new(weight.as_tensor().clone(), Some(bias.as_tensor().clone()));
    Ok(Self { weight, bias, linear })
  }

  pub fn n_features(&self) -> usize {
    self.weight.dims()[1]
  }

  pub fn device(&self) -> &Device {
    self.weight.device()
  }

  /// Raw affine output of shape `(n, 1)`.
  pub fn logits(&self, input: &Tensor) -> Result<Tensor> {
    Ok(self.linear.forward(input)?)
  }

  /// Trainable variables, in `[weight, bias]` order.
  pub fn parameters(&self) -> Vec<Var> {
    vec![self.weight.clone(), self.bias.clone()]
  }

  pub fn weights(&self) -> Result<Vec<f32>> {
    Ok(self.weight.as_tensor().flatten_all()?.to_vec1()?)
  }

  pub fn bias(&self) -> Result<f32> {
    Ok(self.bias.as_tensor().flatten_all()?.to_vec1::<f32>()?[0])
  }

  pub fn snapshot(&self) -> Result<ModelSnapshot> {
    Ok(ModelSnapshot {
      weights: self.weights()?,
      bias: self.bias()?,
    })
  }

  pub fn from_snapshot(snapshot: &ModelSnapshot) -> Result<Self> {
    Self::from_parts(&snapshot.weights, snapshot.bias)
  }

  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let bytes = postcard::to_allocvec(&self.snapshot()?)?;
    fs::write(path, bytes)?;
    Ok(())
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let bytes = fs::read(path)?;
    let snapshot: ModelSnapshot = postcard::from_bytes(&bytes)?;
    Self::from_snapshot(&snapshot)
  }
}

impl Module for LinearClassifier {
  fn forward(&self, input: &Tensor) -> candle_core::Result<Tensor> {
    sigmoid(&self.linear.forward(input)?)
  }
}


/// Serializable parameters of a [LinearClassifier].

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
  pub weights: Vec<f32>,
  pub bias: f32,
}
