//! Error types for the Streetprint core library.
//!
//! Defines the error enums exposed by the public API, their stable codes and a
//! convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{distance::FeatureMetric, hierarchy::LinkageMethod};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Structural defect that makes a graph unusable for orbit counting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GraphDefect {
    /// An edge joins a node to itself.
    SelfLoop {
        /// Node carrying the loop.
        node: usize,
    },
    /// The same unordered pair appears more than once, in either direction.
    DuplicateEdge {
        /// Smaller endpoint of the repeated pair.
        left: usize,
        /// Larger endpoint of the repeated pair.
        right: usize,
    },
    /// An edge references a node id outside `0..node_count`.
    NodeOutOfRange {
        /// Offending node id.
        node: usize,
        /// Number of nodes declared for the graph.
        node_count: usize,
    },
}

impl fmt::Display for GraphDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { node } => write!(f, "self-loop on node {node}"),
            Self::DuplicateEdge { left, right } => {
                write!(f, "edge ({left}, {right}) appears more than once")
            }
            Self::NodeOutOfRange { node, node_count } => {
                write!(f, "node {node} is outside 0..{node_count}")
            }
        }
    }
}

/// An error produced by [`crate::GraphSource`] implementations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphSourceError {
    /// The source could not be read.
    #[error("graph source could not be read: {message}")]
    Unreadable {
        /// Description of the underlying failure.
        message: Arc<str>,
    },
    /// A record in the source could not be parsed.
    #[error("line {line} is malformed: {message}")]
    Malformed {
        /// One-based line number of the offending record.
        line: usize,
        /// Description of the parse failure.
        message: Arc<str>,
    },
    /// The source described no nodes at all.
    #[error("graph source contains no nodes")]
    Empty,
}

define_error_codes! {
    /// Stable codes describing [`GraphSourceError`] variants.
    enum GraphSourceErrorCode for GraphSourceError {
        /// The source could not be read.
        Unreadable => Unreadable { .. } => "GRAPH_SOURCE_UNREADABLE",
        /// A record in the source could not be parsed.
        Malformed => Malformed { .. } => "GRAPH_SOURCE_MALFORMED",
        /// The source described no nodes at all.
        Empty => Empty => "GRAPH_SOURCE_EMPTY",
    }
}

/// Error type produced by the profiling pipeline.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StreetprintError {
    /// The input graph violates the simple undirected graph contract.
    #[error("invalid graph: {defect}")]
    InvalidGraph {
        /// The first defect found.
        defect: GraphDefect,
    },
    /// An input had fewer items than the operation requires.
    #[error("{what} has {actual} items but at least {required} are required")]
    EmptyInput {
        /// Name of the undersized input.
        what: &'static str,
        /// Minimum number of items accepted.
        required: usize,
        /// Number of items supplied.
        actual: usize,
    },
    /// Vectors or rows had inconsistent lengths.
    #[error("dimension mismatch at row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Row (or argument position) with the unexpected length.
        row: usize,
        /// Length established by the first row.
        expected: usize,
        /// Length observed at `row`.
        actual: usize,
    },
    /// A numeric routine received a non-finite or out-of-domain value.
    #[error("{context} contains an unusable value at index {index}: {value}")]
    DegenerateInput {
        /// Routine or input that rejected the value.
        context: &'static str,
        /// Position of the value within the input.
        index: usize,
        /// The rejected value.
        value: f64,
    },
    /// The linkage method cannot be combined with the input's metric.
    #[error("{method} linkage requires Euclidean distances but the input uses {metric}")]
    InvalidMetric {
        /// Requested linkage method.
        method: LinkageMethod,
        /// Metric family of the supplied input.
        metric: MetricFamily,
    },
    /// A configuration value is outside its accepted domain.
    #[error("invalid value {value} for `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value, rendered for diagnostics.
        value: Arc<str>,
        /// Accepted domain.
        reason: &'static str,
    },
    /// A batch stage was cancelled before the unit could run.
    #[error("cancelled before processing `{unit}`")]
    Cancelled {
        /// Identifier of the first unit that was not processed.
        unit: Arc<str>,
    },
    /// A [`crate::GraphSource`] failed to supply its graph.
    #[error("graph source `{source_name}` failed: {error}")]
    GraphSource {
        /// Name reported by the failing source.
        source_name: Arc<str>,
        /// Underlying source error.
        #[source]
        error: GraphSourceError,
    },
}

define_error_codes! {
    /// Stable codes describing [`StreetprintError`] variants.
    enum ErrorCode for StreetprintError {
        /// The input graph violates the simple undirected graph contract.
        InvalidGraph => InvalidGraph { .. } => "STREETPRINT_INVALID_GRAPH",
        /// An input had fewer items than the operation requires.
        EmptyInput => EmptyInput { .. } => "STREETPRINT_EMPTY_INPUT",
        /// Vectors or rows had inconsistent lengths.
        DimensionMismatch => DimensionMismatch { .. } => "STREETPRINT_DIMENSION_MISMATCH",
        /// A numeric routine received a non-finite or out-of-domain value.
        DegenerateInput => DegenerateInput { .. } => "STREETPRINT_DEGENERATE_INPUT",
        /// The linkage method cannot be combined with the input's metric.
        InvalidMetric => InvalidMetric { .. } => "STREETPRINT_INVALID_METRIC",
        /// A configuration value is outside its accepted domain.
        InvalidParameter => InvalidParameter { .. } => "STREETPRINT_INVALID_PARAMETER",
        /// A batch stage was cancelled before the unit could run.
        Cancelled => Cancelled { .. } => "STREETPRINT_CANCELLED",
        /// A graph source failed to supply its graph.
        GraphSourceFailure => GraphSource { .. } => "STREETPRINT_GRAPH_SOURCE_FAILURE",
    }
}

impl StreetprintError {
    /// Retrieve the inner [`GraphSourceErrorCode`] when the error originated in a
    /// [`crate::GraphSource`].
    #[must_use]
    pub const fn graph_source_code(&self) -> Option<GraphSourceErrorCode> {
        match self {
            Self::GraphSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Metric family of a distance input, used to validate linkage methods.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricFamily {
    /// Distances come from the weighted orbit signature metric.
    OrbitSignature,
    /// Distances come from a feature-space metric.
    Feature(FeatureMetric),
    /// Distances were supplied by the caller without provenance.
    Precomputed,
}

impl MetricFamily {
    /// Returns `true` when distances are Euclidean norms of feature differences.
    #[must_use]
    pub const fn is_euclidean(self) -> bool {
        matches!(self, Self::Feature(FeatureMetric::Euclidean))
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrbitSignature => f.write_str("orbit-signature"),
            Self::Feature(metric) => write!(f, "{metric}"),
            Self::Precomputed => f.write_str("precomputed"),
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, StreetprintError>;
