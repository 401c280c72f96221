//! Distance primitives.
//!
//! Orbit-count vectors are compared with a weighted, log-scaled metric;
//! real-valued feature rows (such as vectorised correlation matrices) use a
//! closed set of conventional metrics. Both feed condensed matrices consumed
//! by the hierarchical cluster engine.

mod condensed;
mod feature;
mod orbit;

pub use self::condensed::{
    CondensedDistances, condensed_index, condensed_len, pairwise_feature_distances,
    pairwise_orbit_distances,
};
pub use self::feature::FeatureMetric;
pub use self::orbit::{OrbitWeights, orbit_distance};
