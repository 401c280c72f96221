//! Builder utilities for configuring Streetprint profiling.
//!
//! Collects the graphlet size, weighting and clustering choices and validates
//! them together before a [`Profiler`] is constructed, so no stage starts with
//! a configuration that would fail half-way.

use std::num::NonZeroUsize;

use tracing::debug;

use crate::{
    distance::{FeatureMetric, OrbitWeights},
    error::{MetricFamily, Result, StreetprintError},
    gcm::GcmVectorisation,
    hierarchy::{FlatCriterion, LinkageMethod},
    orbit::GraphletSize,
    profiler::Profiler,
};

const DEFAULT_MAX_CLUSTERS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(4);

/// Configures and constructs [`Profiler`] instances.
///
/// Defaults: four-node graphlets, L1-normalised orbit weights, node trees
/// for the single, complete, average and weighted methods, Ward linkage over
/// Euclidean distances between upper-triangle correlation vectors, and a cut
/// into at most five clusters.
///
/// # Examples
/// ```
/// use streetprint_core::{GraphletSize, LinkageMethod, ProfilerBuilder};
///
/// let profiler = ProfilerBuilder::new()
///     .with_graphlet_size(GraphletSize::Five)
///     .with_node_methods([LinkageMethod::Average])
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(profiler.graphlet_size(), GraphletSize::Five);
/// assert_eq!(profiler.weights().len(), 73);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ProfilerBuilder {
    graphlet_size: GraphletSize,
    normalise_weights: bool,
    node_methods: Vec<LinkageMethod>,
    gcm_metric: FeatureMetric,
    gcm_method: LinkageMethod,
    gcm_vectorisation: GcmVectorisation,
    criterion: FlatCriterion,
}

impl Default for ProfilerBuilder {
    fn default() -> Self {
        Self {
            graphlet_size: GraphletSize::Four,
            normalise_weights: true,
            node_methods: vec![
                LinkageMethod::Single,
                LinkageMethod::Complete,
                LinkageMethod::Average,
                LinkageMethod::Weighted,
            ],
            gcm_metric: FeatureMetric::Euclidean,
            gcm_method: LinkageMethod::Ward,
            gcm_vectorisation: GcmVectorisation::UpperTriangle,
            criterion: FlatCriterion::MaxClusters(DEFAULT_MAX_CLUSTERS),
        }
    }
}

impl ProfilerBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the largest graphlet counted.
    #[must_use]
    pub const fn with_graphlet_size(mut self, size: GraphletSize) -> Self {
        self.graphlet_size = size;
        self
    }

    /// Returns the configured graphlet size.
    #[must_use]
    #[rustfmt::skip]
    pub const fn graphlet_size(&self) -> GraphletSize { self.graphlet_size }

    /// Enables or disables L1 normalisation of the orbit weights.
    #[must_use]
    pub const fn with_normalised_weights(mut self, normalise: bool) -> Self {
        self.normalise_weights = normalise;
        self
    }

    /// Returns whether orbit weights are L1-normalised.
    #[must_use]
    #[rustfmt::skip]
    pub const fn normalised_weights(&self) -> bool { self.normalise_weights }

    /// Sets the linkage methods used for node-level trees.
    #[must_use]
    pub fn with_node_methods(mut self, methods: impl IntoIterator<Item = LinkageMethod>) -> Self {
        self.node_methods = methods.into_iter().collect();
        self
    }

    /// Returns the node-level linkage methods.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_methods(&self) -> &[LinkageMethod] { &self.node_methods }

    /// Sets the metric comparing vectorised correlation matrices.
    #[must_use]
    pub const fn with_gcm_metric(mut self, metric: FeatureMetric) -> Self {
        self.gcm_metric = metric;
        self
    }

    /// Sets the linkage method for region clustering.
    #[must_use]
    pub const fn with_gcm_method(mut self, method: LinkageMethod) -> Self {
        self.gcm_method = method;
        self
    }

    /// Sets how correlation matrices are flattened.
    #[must_use]
    pub const fn with_gcm_vectorisation(mut self, vectorisation: GcmVectorisation) -> Self {
        self.gcm_vectorisation = vectorisation;
        self
    }

    /// Sets the criterion used to cut every tree into flat clusters.
    #[must_use]
    pub const fn with_criterion(mut self, criterion: FlatCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Returns the configured flat-cluster criterion.
    #[must_use]
    #[rustfmt::skip]
    pub const fn criterion(&self) -> FlatCriterion { self.criterion }

    /// Validates the configuration and constructs a [`Profiler`].
    ///
    /// # Errors
    /// - [`StreetprintError::InvalidParameter`] when no node method is
    ///   configured, the metric parameter is invalid or the distance
    ///   threshold is not finite.
    /// - [`StreetprintError::InvalidMetric`] when a node method needs
    ///   Euclidean distances (orbit distances never are), or the region
    ///   method needs Euclidean distances the region metric does not give.
    pub fn build(self) -> Result<Profiler> {
        if self.node_methods.is_empty() {
            return Err(StreetprintError::InvalidParameter {
                name: "node_methods",
                value: "[]".into(),
                reason: "at least one linkage method is required",
            });
        }
        let orbit_metric = MetricFamily::OrbitSignature;
        if let Some(&method) = self
            .node_methods
            .iter()
            .find(|method| method.requires_euclidean())
        {
            return Err(StreetprintError::InvalidMetric {
                method,
                metric: orbit_metric,
            });
        }
        self.gcm_metric.validate()?;
        let gcm_metric = MetricFamily::Feature(self.gcm_metric);
        if self.gcm_method.requires_euclidean() && !gcm_metric.is_euclidean() {
            return Err(StreetprintError::InvalidMetric {
                method: self.gcm_method,
                metric: gcm_metric,
            });
        }
        if let FlatCriterion::Distance(height) = self.criterion
            && (!height.is_finite() || height < 0.0)
        {
            return Err(StreetprintError::InvalidParameter {
                name: "distance_threshold",
                value: height.to_string().into(),
                reason: "must be finite and non-negative",
            });
        }

        let mut node_methods = self.node_methods;
        let mut seen = Vec::with_capacity(node_methods.len());
        node_methods.retain(|method| {
            let fresh = !seen.contains(method);
            seen.push(*method);
            fresh
        });
        debug!(
            size = %self.graphlet_size,
            methods = node_methods.len(),
            "profiler configuration validated"
        );

        Ok(Profiler::new(
            self.graphlet_size,
            OrbitWeights::for_size(self.graphlet_size, self.normalise_weights),
            node_methods,
            self.gcm_metric,
            self.gcm_method,
            self.gcm_vectorisation,
            self.criterion,
        ))
    }
}
