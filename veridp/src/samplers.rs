//! Noise samplers.
//!
//! Every randomized invocation draws from its own generator returned by
//! [`fresh_rng`]; samplers take the generator explicitly so tests can replay a
//! stream.

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Exp, Geometric, Normal};

use crate::error::{fallible, Error, Fallible};
use crate::traits::{cast, Float};

/// A generator seeded from the host entropy source.
pub fn fresh_rng() -> Fallible<ChaCha20Rng> {
    Ok(veridp_entropy::host_rng()?)
}

pub fn sample_bernoulli<R: Rng + ?Sized>(rng: &mut R, prob: f64) -> Fallible<bool> {
    let dist = Bernoulli::new(prob)
        .map_err(|err| Error::FailedFunction(format!("bernoulli({prob}): {err}")))?;
    Ok(dist.sample(rng))
}

/// Continuous Laplace noise centered at zero.
pub fn sample_laplace<T: Float, R: Rng + ?Sized>(rng: &mut R, scale: T) -> Fallible<T> {
    let scale: f64 = cast(scale)?;
    if scale == 0.0 {
        return Ok(T::zero());
    }
    let exp = Exp::new(1.0 / scale)
        .map_err(|err| Error::FailedFunction(format!("laplace({scale}): {err}")))?;
    let magnitude = exp.sample(rng);
    let noise = if rng.gen::<bool>() { magnitude } else { -magnitude };
    cast(noise)
}

pub fn sample_gaussian<T: Float, R: Rng + ?Sized>(rng: &mut R, scale: T) -> Fallible<T> {
    let scale: f64 = cast(scale)?;
    let normal = Normal::new(0.0, scale)
        .map_err(|err| Error::FailedFunction(format!("gaussian({scale}): {err}")))?;
    cast(normal.sample(rng))
}

/// Discrete Laplace noise, the difference of two i.i.d. geometric draws with
/// success probability `1 - exp(-1/scale)`.
pub fn sample_discrete_laplace<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> Fallible<i64> {
    if scale == 0.0 {
        return Ok(0);
    }
    if scale.is_nan() || scale < 0.0 {
        return fallible!(FailedFunction, "discrete laplace scale {} is negative", scale);
    }
    let p = -(-1.0 / scale).exp_m1();
    let geometric = Geometric::new(p)
        .map_err(|err| Error::FailedFunction(format!("geometric({p}): {err}")))?;
    let positive = geometric.sample(rng).min(i64::MAX as u64) as i64;
    let negative = geometric.sample(rng).min(i64::MAX as u64) as i64;
    Ok(positive - negative)
}

/// Discrete Gaussian noise by rejection from discrete Laplace proposals
/// (Canonne, Kamath and Steinke, 2020).
pub fn sample_discrete_gaussian<R: Rng + ?Sized>(rng: &mut R, scale: f64) -> Fallible<i64> {
    let sigma2 = scale * scale;
    // a variance that underflows leaves no mass off zero worth representing
    if sigma2 == 0.0 {
        return Ok(0);
    }
    let t = scale.floor() + 1.0;
    loop {
        let y = sample_discrete_laplace(rng, t)?;
        let bias = (y.unsigned_abs() as f64 - sigma2 / t).powi(2) / (2.0 * sigma2);
        if sample_bernoulli(rng, (-bias).exp())? {
            return Ok(y);
        }
    }
}
