use candle_core::Tensor;

use crate::error::{ Error, Result };


/// Probabilities get clamped to `[EPSILON, 1 - EPSILON]` before taking
/// their logarithm, so saturated outputs still yield a finite loss.

pub const EPSILON: f32 = 1e-7;


/// Mean binary cross-entropy between predicted probabilities and
/// binary targets of the same shape.
///
/// Differentiable with respect to `probs`.

pub fn binary_cross_entropy(probs: &Tensor, targets: &Tensor) -> Result<Tensor> {
  if probs.dims() != targets.dims() {
    return Err(Error::Data(format!(
      "predictions {:?} and targets {:?} differ in shape", probs.dims(), targets.dims(),
    )))
  }
  let probs = probs.clamp(EPSILON, 1.0 - EPSILON)?;
  let positive = (targets * probs.log()?)?;
  let negative = (targets.affine(-1.0, 1.0)? * probs.affine(-1.0, 1.0)?.log()?)?;
  Ok((positive + negative)?.neg()?.mean_all()?)
}
