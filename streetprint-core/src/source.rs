//! Graph source abstraction for the profiling pipeline.

use crate::{error::GraphSourceError, graph::Graph};

/// Supplies one normalised graph for profiling.
///
/// Implementations own acquisition and cleaning (reading files, dropping
/// self-loops, relabelling node ids); the pipeline only sees the validated
/// [`Graph`].
///
/// # Examples
/// ```
/// use streetprint_core::{Graph, GraphSource, GraphSourceError};
///
/// struct Triangle;
///
/// impl GraphSource for Triangle {
///     fn name(&self) -> &str { "triangle" }
///     fn load_graph(&self) -> Result<Graph, GraphSourceError> {
///         Graph::from_edges(3, &[(0, 1), (1, 2), (0, 2)]).map_err(|err| {
///             GraphSourceError::Unreadable { message: err.to_string().into() }
///         })
///     }
/// }
///
/// let graph = Triangle.load_graph()?;
/// assert_eq!(graph.edge_count(), 3);
/// assert_eq!(Triangle.name(), "triangle");
/// # Ok::<(), GraphSourceError>(())
/// ```
pub trait GraphSource {
    /// Returns a human-readable name, also used as the unit key in batch
    /// stages.
    fn name(&self) -> &str;

    /// Loads the graph.
    ///
    /// # Errors
    /// Returns a [`GraphSourceError`] when the graph cannot be read or parsed.
    fn load_graph(&self) -> Result<Graph, GraphSourceError>;
}
