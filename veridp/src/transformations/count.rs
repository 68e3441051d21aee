use std::collections::HashMap;

use num_traits::Bounded;

use crate::capability::{Capabilities, Capability};
use crate::core::{Function, StabilityMap, Transformation};
use crate::domains::{AllDomain, MapDomain, VectorDomain};
use crate::error::Fallible;
use crate::metrics::{AbsoluteDistance, L1Distance, SymmetricDistance};
use crate::traits::{cast, Hashable, Number, Primitive};

/// Number of records, saturating at the largest `TO`.
pub fn make_count<TIA, TO>(
    capabilities: &Capabilities,
) -> Fallible<Transformation<VectorDomain<AllDomain<TIA>>, AllDomain<TO>, SymmetricDistance, AbsoluteDistance<TO>>>
where
    TIA: Primitive,
    TO: Number + Bounded,
{
    capabilities.require(&[Capability::Contrib])?;
    Ok(Transformation::new(
        VectorDomain::new_all(),
        AllDomain::new(),
        Function::new(|arg: &Vec<TIA>| cast(arg.len()).unwrap_or_else(|_| TO::max_value())),
        SymmetricDistance,
        AbsoluteDistance::default(),
        StabilityMap::new_from_constant(TO::one()),
    ))
}

/// Number of occurrences of each distinct record, each saturating at the
/// largest `TV`. Adding or removing a record moves one count by at most one,
/// so the map is 1-stable into L1.
pub fn make_count_by<TK, TV>(
    capabilities: &Capabilities,
) -> Fallible<
    Transformation<
        VectorDomain<AllDomain<TK>>,
        MapDomain<AllDomain<TK>, AllDomain<TV>>,
        SymmetricDistance,
        L1Distance<TV>,
    >,
>
where
    TK: Hashable,
    TV: Number + Bounded,
{
    capabilities.require(&[Capability::Contrib])?;
    Ok(Transformation::new(
        VectorDomain::new_all(),
        MapDomain::new(AllDomain::new(), AllDomain::new()),
        Function::new(|arg: &Vec<TK>| {
            let mut tallies: HashMap<TK, usize> = HashMap::new();
            for key in arg {
                *tallies.entry(key.clone()).or_default() += 1;
            }
            tallies
                .into_iter()
                .map(|(key, tally)| (key, cast(tally).unwrap_or_else(|_| TV::max_value())))
                .collect::<HashMap<TK, TV>>()
        }),
        SymmetricDistance,
        L1Distance::default(),
        StabilityMap::new_from_constant(TV::one()),
    ))
}
