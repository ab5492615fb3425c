use std::collections::{ HashMap, hash_map::Entry };

use candle_core::{ Tensor, TensorId, Var, backprop::GradStore };
use candle_nn::{ AdamW, ParamsAdamW, SGD, Optimizer as _ };

use crate::{
  config::OptimizerKind,
  error::{ Error, Result },
};


/// An optimization strategy to be used with [Optimizer].
///
/// Each call updates exactly the parameters it is given. Stateful strategies
/// keep their state per parameter, so the parameter set may change between calls.

pub trait Strategy {
  fn update(&mut self, params: &[Var], grads: &GradStore, rate: f64) -> Result<()>;
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
  fn update(&mut self, params: &[Var], grads: &GradStore, rate: f64) -> Result<()> {
    (**self).update(params, grads, rate)
  }
}


/// Generic optimizer that allows for several optimization [strategies](Strategy) to be used.

#[derive(Debug)]
pub struct Optimizer<S: Strategy> {
  strategy: S,
  pub learning_rate: f64,
  step: usize,
}

impl<S: Strategy> Optimizer<S> {
  pub fn new(learning_rate: f64, strategy: S) -> Self {
    Self { strategy, learning_rate, step: 0 }
  }

  /// Number of updates applied so far.
  pub fn steps(&self) -> usize {
    self.step
  }

  pub fn minimize(&mut self, loss: &Tensor, params: &[Var]) -> Result<()> {
    // Compute gradients
    let grads = loss.backward()?;

    for param in params {
      if grads.get(param).is_none() {
        return Err(Error::Data(format!("parameter of shape {:?} does not contribute to the loss", param.dims())))
      }
    }

    // Execute strategy
    self.strategy.update(params, &grads, self.learning_rate)?;

    self.step += 1;
    Ok(())
  }
}


/// Pick a boxed strategy at runtime.

pub fn strategy(kind: OptimizerKind) -> Box<dyn Strategy> {
  match kind {
    OptimizerKind::Adam => Box::new(Adam::default()),
    OptimizerKind::Sgd => Box::new(Sgd),
  }
}


/// Stochastic Gradient Descent strategy

#[derive(Debug, Clone, Default)]
pub struct Sgd;

impl Strategy for Sgd {
  fn update(&mut self, params: &[Var], grads: &GradStore, rate: f64) -> Result<()> {
    SGD::new(params.to_vec(), rate)?.step(grads)?;
    Ok(())
  }
}


/// Adaptive Movement Estimation strategy (ADAM)

#[derive(Debug)]
pub struct Adam {
  pub beta1: f64,
  pub beta2: f64,
  pub eps: f64,
  moments: HashMap<TensorId, AdamW>,
}

impl Adam {
  pub fn new(beta1: f64, beta2: f64) -> Self {
    Self { beta1, beta2, eps: 1e-8, moments: HashMap::new() }
  }
}

impl Default for Adam {
  fn default() -> Self {
    Self::new(0.9, 0.999)
  }
}

impl Strategy for Adam {
  fn update(&mut self, params: &[Var], grads: &GradStore, rate: f64) -> Result<()> {
    for param in params {
      let adam = match self.moments.entry(param.id()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
          let config = ParamsAdamW {
            lr: rate,
            beta1: self.beta1,
            beta2: self.beta2,
            eps: self.eps,
            // Plain Adam
            weight_decay: 0.0,
          };
          entry.insert(AdamW::new(vec![param.clone()], config)?)
        },
      };
      adam.set_learning_rate(rate);
      adam.step(grads)?;
    }
    Ok(())
  }
}
