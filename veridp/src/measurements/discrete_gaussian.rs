use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, Measurement, PrivacyMap};
use crate::error::{fallible, Fallible};
use crate::measures::ZeroConcentratedDivergence;
use crate::samplers::{fresh_rng, sample_discrete_gaussian};
use crate::traits::{cast, inf_div, inf_square, Float, Integer};

use super::{saturating_add_noise, GaussianDomain};

/// Adds discrete Gaussian noise to an integer or to each integer of a
/// vector. ρ = (d_in / scale)² / 2.
pub fn make_base_discrete_gaussian<D, QO>(
    capabilities: &Capabilities,
    scale: QO,
) -> Fallible<Measurement<D, D, D::InputMetric, ZeroConcentratedDivergence<QO>>>
where
    D: GaussianDomain,
    D::Atom: Integer,
    QO: Float,
{
    capabilities.require(&[Capability::Contrib])?;
    if scale.is_nan() || scale < QO::zero() || scale.is_infinite() {
        return fallible!(InvalidParameter, "scale ({:?}) must be finite and non-negative", scale);
    }
    let f64_scale: f64 = cast(scale)?;
    debug!(scale = f64_scale, domain = %D::default().descriptor(), "built discrete gaussian mechanism");

    let two = QO::one() + QO::one();
    Ok(Measurement::new(
        D::default(),
        D::default(),
        Function::new_fallible(move |arg: &D::Carrier| {
            let mut rng = fresh_rng()?;
            D::map_atoms(arg, |v| {
                Ok(saturating_add_noise(v, sample_discrete_gaussian(&mut rng, f64_scale)?))
            })
        }),
        D::InputMetric::default(),
        ZeroConcentratedDivergence::default(),
        PrivacyMap::new_fallible(move |d_in: &D::Atom| {
            let d_in: QO = cast(*d_in)?;
            if d_in.is_zero() {
                return Ok(QO::zero());
            }
            if scale.is_zero() {
                return Ok(QO::infinity());
            }
            Ok(inf_div(inf_square(inf_div(d_in, scale)), two))
        }),
    ))
}
