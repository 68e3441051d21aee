use tracing::debug;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, StabilityMap, Transformation};
use crate::domains::{AllDomain, BoundedDomain, VectorDomain};
use crate::error::Fallible;
use crate::metrics::SymmetricDistance;
use crate::traits::Number;

/// Clamps every record into `[lower, upper]`. Record-wise maps are 1-stable
/// under the symmetric distance.
pub fn make_clamp<T: Number>(
    capabilities: &Capabilities,
    bounds: (T, T),
) -> Fallible<
    Transformation<VectorDomain<AllDomain<T>>, VectorDomain<BoundedDomain<T>>, SymmetricDistance, SymmetricDistance>,
> {
    capabilities.require(&[Capability::Contrib])?;
    let output_element = BoundedDomain::new_closed(bounds)?;
    let (lower, upper) = bounds;
    debug!(lower = ?lower, upper = ?upper, "built clamp");

    Ok(Transformation::new(
        VectorDomain::new_all(),
        VectorDomain::new(output_element),
        Function::new(move |arg: &Vec<T>| {
            arg.iter()
                .map(|v| {
                    if *v < lower {
                        lower
                    } else if *v > upper {
                        upper
                    } else {
                        *v
                    }
                })
                .collect()
        }),
        SymmetricDistance,
        SymmetricDistance,
        StabilityMap::new(|d_in: &u32| *d_in),
    ))
}
