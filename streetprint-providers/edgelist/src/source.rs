//! Edge-list parsing and the file-backed graph source.

use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use streetprint_core::{Graph, GraphSource, GraphSourceError};
use tracing::{debug, info, instrument};

use crate::errors::EdgeListError;

/// Records dropped while normalising an edge list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DropReport {
    /// Edges joining a node to itself.
    pub self_loops: usize,
    /// Repeated undirected edges, in either orientation.
    pub duplicate_edges: usize,
}

impl DropReport {
    /// Total number of dropped records.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.self_loops + self.duplicate_edges
    }
}

/// A parsed edge list: the normalised graph plus the original node labels.
#[derive(Clone, Debug)]
pub struct EdgeList {
    graph: Graph,
    labels: Vec<String>,
    index: HashMap<String, usize>,
    report: DropReport,
}

impl EdgeList {
    /// The normalised graph with dense node ids.
    #[must_use]
    #[rustfmt::skip]
    pub fn graph(&self) -> &Graph { &self.graph }

    /// Original label of every node id.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &[String] { &self.labels }

    /// Dense id assigned to `label`.
    #[must_use]
    pub fn node_id(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// What normalisation dropped.
    #[must_use]
    #[rustfmt::skip]
    pub const fn report(&self) -> DropReport { self.report }

    /// Consumes the edge list and returns its graph.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

/// Returns the fields of a record, or `None` for blank and comment lines.
pub(crate) fn record_fields(line: &str) -> Option<Vec<&str>> {
    let content = line.split_once('#').map_or(line, |(before, _)| before);
    let fields: Vec<&str> = content.split_whitespace().collect();
    (!fields.is_empty()).then_some(fields)
}

/// Parses an edge list.
///
/// Each record is `u v` (further fields such as weights are ignored) or a
/// single `u` declaring a possibly isolated node. Labels are arbitrary
/// tokens; `#` starts a comment. Self-loops and repeated undirected edges
/// are dropped and counted. Nodes are numbered in order of first appearance.
///
/// # Errors
/// Returns [`EdgeListError::Io`] when reading fails and
/// [`EdgeListError::Empty`] when no node is declared.
///
/// # Examples
/// ```
/// use streetprint_providers_edgelist::parse_edge_list;
///
/// let text = "# streets\na b\nb c\nc b\nd d\ne\n";
/// let edges = parse_edge_list(text.as_bytes())?;
/// assert_eq!(edges.graph().node_count(), 5);
/// assert_eq!(edges.graph().edge_count(), 2);
/// assert_eq!(edges.report().total(), 2);
/// assert_eq!(edges.node_id("e"), Some(4));
/// # Ok::<(), streetprint_providers_edgelist::EdgeListError>(())
/// ```
pub fn parse_edge_list<R: BufRead>(reader: R) -> Result<EdgeList, EdgeListError> {
    let mut labels: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut intern = |label: &str| -> usize {
        if let Some(&id) = index.get(label) {
            return id;
        }
        let id = labels.len();
        labels.push(label.to_owned());
        index.insert(label.to_owned(), id);
        id
    };

    let mut edges = Vec::new();
    let mut seen = HashSet::new();
    let mut report = DropReport::default();
    for record in reader.lines() {
        let line = record?;
        let Some(fields) = record_fields(&line) else {
            continue;
        };
        let Some((&first, rest)) = fields.split_first() else {
            continue;
        };
        let u = intern(first);
        let Some(&other) = rest.first() else {
            continue;
        };
        let v = intern(other);
        if u == v {
            report.self_loops += 1;
        } else if seen.insert((u.min(v), u.max(v))) {
            edges.push((u, v));
        } else {
            report.duplicate_edges += 1;
        }
    }

    if labels.is_empty() {
        return Err(EdgeListError::Empty);
    }
    let graph = Graph::from_edges(labels.len(), &edges)?;
    if report.total() > 0 {
        debug!(
            self_loops = report.self_loops,
            duplicate_edges = report.duplicate_edges,
            "dropped edge records"
        );
    }
    Ok(EdgeList {
        graph,
        labels,
        index,
        report,
    })
}

/// [`GraphSource`] reading an edge-list file.
#[derive(Clone, Debug)]
pub struct EdgeListSource {
    name: String,
    path: PathBuf,
}

impl EdgeListSource {
    /// Creates a source named `name` reading `path`.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Creates a source named after the file stem of `path`.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let location: PathBuf = path.into();
        let name = location.file_stem().map_or_else(
            || location.display().to_string(),
            |stem| stem.to_string_lossy().into_owned(),
        );
        Self {
            name,
            path: location,
        }
    }

    /// Path read by this source.
    #[must_use]
    #[rustfmt::skip]
    pub fn path(&self) -> &Path { &self.path }

    /// Reads and normalises the file, keeping node labels.
    ///
    /// # Errors
    /// Returns [`EdgeListError`] when the file cannot be read or declares no
    /// nodes.
    #[instrument(name = "edgelist.load", err, skip(self), fields(source = %self.name))]
    pub fn load(&self) -> Result<EdgeList, EdgeListError> {
        let file = File::open(&self.path)?;
        let edges = parse_edge_list(BufReader::new(file))?;
        info!(
            nodes = edges.graph().node_count(),
            edges = edges.graph().edge_count(),
            dropped = edges.report().total(),
            "edge list loaded"
        );
        Ok(edges)
    }
}

impl GraphSource for EdgeListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_graph(&self) -> Result<Graph, GraphSourceError> {
        self.load()
            .map(EdgeList::into_graph)
            .map_err(GraphSourceError::from)
    }
}
