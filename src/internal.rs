use rand::Rng;

use crate::scalar::{ Real, real };


// Polar Box-Muller transformation

pub fn randn<T: Real, R: Rng>(rng: &mut R) -> (T, T) {
  loop {
    let u = rng.gen_range(-T::one(), T::one());
    let v = rng.gen_range(-T::one(), T::one());
    let r = u * u + v * v;
    // Try again if outside interval
    if r == T::zero() || r >= T::one() { continue }
    let c = (real::<T>(-2.0) * r.ln() / r).sqrt();
    return (u * c, v * c)
  }
}


/// Fill a buffer of `len` standard normal samples.

pub fn randn_vec<T: Real, R: Rng>(len: usize, rng: &mut R) -> Vec<T> {
  let mut data = vec![T::zero(); len];
  for i in 0..(len + 1) / 2 {
    let j = i * 2;
    let (r1, r2): (T, T) = randn(rng);
    data[j] = r1;
    if j + 1 < len { data[j + 1] = r2 }
  }
  data
}


/// Fill a buffer of `len` samples drawn uniformly from `[-bound, bound)`.

pub fn uniform_vec<T: Real, R: Rng>(len: usize, bound: T, rng: &mut R) -> Vec<T> {
  (0..len).map(|_| rng.gen_range(-bound, bound) ).collect()
}
