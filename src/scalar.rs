use rand::distributions::uniform::SampleUniform;
use num_traits::Float;


/// Continuous numeric types that synthetic samples and
/// parameter initializations can be drawn in.
///
/// This trait gets implemented automatically for all types
/// that satisfy its dependent traits.

pub trait Real: Float + SampleUniform + Copy + Send + Sync + std::fmt::Debug {}
impl<T: Float + SampleUniform + Copy + Send + Sync + std::fmt::Debug> Real for T {}


/// Convert a value between real types, for constants that
/// always fit the target type.

#[inline]
pub fn real<T: Real>(value: f64) -> T {
  T::from(value).unwrap_or_else(T::nan)
}
