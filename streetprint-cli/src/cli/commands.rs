//! Command execution.

use std::path::{Path, PathBuf};

use serde::Serialize;
use streetprint_core::{
    CancellationToken, ClusterAssignment, ClusterId, GcmVectorisation, GraphSource, GraphletSize,
    InMemoryStore, LinkageMethod, Merge, ProfilerBuilder, StreetprintError, UnitOutcome,
};
use streetprint_providers_edgelist::{EdgeList, EdgeListError, EdgeListSource, read_regions_path};
use thiserror::Error;
use tracing::{info, instrument};

use super::args::{Cli, Command, CountArgs, NodesArgs, RegionsArgs};

/// Errors surfaced while executing commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// An input file could not be read or parsed.
    #[error("failed to read `{path}`: {source}")]
    Input {
        /// File that triggered the failure.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: EdgeListError,
    },
    /// The profiling pipeline rejected the configuration or the data.
    #[error(transparent)]
    Core(#[from] StreetprintError),
}

impl CliError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Input { .. } => "STREETPRINT_CLI_INPUT",
            Self::Core(error) => error.code().as_str(),
        }
    }
}

/// Result of one command, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Report {
    /// Output of `count`.
    Count(CountReport),
    /// Output of `nodes`.
    Nodes(NodesReport),
    /// Output of `regions`.
    Regions(RegionsReport),
}

/// Orbit counts of a population of edge lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountReport {
    /// Largest graphlet counted.
    pub graphlet_size: usize,
    /// One entry per input file, in argument order.
    pub units: Vec<CountUnit>,
}

/// Orbit counts of one edge list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountUnit {
    /// Unit name (the file stem).
    pub unit: String,
    /// `computed`, `failed` or `skipped`.
    pub status: &'static str,
    /// Failure rendered as `CODE: message`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Orbit counts per node, in first-appearance order of the node labels.
    pub rows: Vec<Vec<u64>>,
}

/// Node clusters of one edge list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodesReport {
    /// Unit name (the file stem).
    pub source: String,
    /// Largest graphlet counted.
    pub graphlet_size: usize,
    /// One merge tree per linkage method.
    pub trees: Vec<TreeReport>,
}

/// A merge tree and its flat clusters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeReport {
    /// Linkage method of the tree.
    pub method: LinkageMethod,
    /// Number of flat clusters.
    pub clusters: usize,
    /// Agglomeration steps in height order.
    pub merges: Vec<Merge>,
    /// Cluster of every node.
    pub members: Vec<Member>,
}

/// Cluster membership of one labelled entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Node label or region name.
    pub label: String,
    /// Cluster id, or `None` when unassigned.
    pub cluster: Option<usize>,
}

/// Region clusters of one edge list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionsReport {
    /// Unit name of the edge list.
    pub source: String,
    /// Region records naming nodes absent from the edge list.
    pub unknown_nodes: usize,
    /// Linkage method of the region tree.
    pub method: LinkageMethod,
    /// Number of flat clusters.
    pub clusters: usize,
    /// Agglomeration steps over the clustered regions.
    pub merges: Vec<Merge>,
    /// One entry per region, in first-seen order.
    pub regions: Vec<RegionEntry>,
}

/// Correlation matrix state and cluster of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionEntry {
    /// Region name.
    pub region: String,
    /// `computed`, `failed` or `skipped`.
    pub status: &'static str,
    /// Nodes behind a computed matrix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<usize>,
    /// Whether a computed matrix is finite everywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    /// Failure (`CODE: message`) or skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Cluster id, or `None` when the region was not clustered.
    pub cluster: Option<usize>,
}

/// Executes the command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when an input cannot be read or the pipeline fails.
pub fn run_cli(cli: &Cli) -> Result<Report, CliError> {
    match &cli.command {
        Command::Count(args) => run_count(args).map(Report::Count),
        Command::Nodes(args) => run_nodes(args).map(Report::Nodes),
        Command::Regions(args) => run_regions(args).map(Report::Regions),
    }
}

#[instrument(name = "cli.count", err, skip(args), fields(files = args.paths.len()))]
pub(super) fn run_count(args: &CountArgs) -> Result<CountReport, CliError> {
    let size = GraphletSize::try_from(args.graphlet_size)?;
    let profiler = ProfilerBuilder::new().with_graphlet_size(size).build()?;
    let sources: Vec<EdgeListSource> = args.paths.iter().map(EdgeListSource::from_path).collect();
    let store = InMemoryStore::new();
    let results = profiler.count_population(&sources, &store, &CancellationToken::new())?;

    let units = results
        .into_iter()
        .map(|result| {
            let rows = result
                .outcome
                .computed()
                .map(|counts| counts.iter_rows().map(<[u64]>::to_vec).collect())
                .unwrap_or_default();
            CountUnit {
                unit: result.unit.to_string(),
                status: result.outcome.status(),
                error: result.outcome.failure().map(ToString::to_string),
                rows,
            }
        })
        .collect();
    Ok(CountReport {
        graphlet_size: size.nodes(),
        units,
    })
}

#[instrument(name = "cli.nodes", err, skip(args), fields(path = %args.path.display()))]
pub(super) fn run_nodes(args: &NodesArgs) -> Result<NodesReport, CliError> {
    let size = GraphletSize::try_from(args.graphlet_size)?;
    let mut builder = ProfilerBuilder::new()
        .with_graphlet_size(size)
        .with_normalised_weights(!args.raw_weights);
    if !args.methods.is_empty() {
        builder = builder.with_node_methods(args.methods.iter().copied().map(LinkageMethod::from));
    }
    if let Some(criterion) = args.cut.criterion() {
        builder = builder.with_criterion(criterion);
    }
    let profiler = builder.build()?;

    let source = EdgeListSource::from_path(&args.path);
    let edges = load_edges(&source)?;
    let profile = profiler.node_profile(edges.graph())?;
    let trees = profile
        .linkages()
        .iter()
        .zip(profile.assignments())
        .map(|(linkage, assignment)| TreeReport {
            method: linkage.method(),
            clusters: assignment.cluster_count(),
            merges: linkage.merges().to_vec(),
            members: members(edges.labels().iter().map(String::as_str), assignment),
        })
        .collect();
    Ok(NodesReport {
        source: source.name().to_owned(),
        graphlet_size: size.nodes(),
        trees,
    })
}

#[instrument(
    name = "cli.regions",
    err,
    skip(args),
    fields(edges = %args.edges.display(), regions = %args.regions.display()),
)]
pub(super) fn run_regions(args: &RegionsArgs) -> Result<RegionsReport, CliError> {
    let size = GraphletSize::try_from(args.graphlet_size)?;
    let vectorisation = if args.full_matrix {
        GcmVectorisation::Full
    } else {
        GcmVectorisation::UpperTriangle
    };
    let mut builder = ProfilerBuilder::new()
        .with_graphlet_size(size)
        .with_gcm_metric(args.metric.resolve(args.minkowski_p))
        .with_gcm_method(args.method.into())
        .with_gcm_vectorisation(vectorisation);
    if let Some(criterion) = args.cut.criterion() {
        builder = builder.with_criterion(criterion);
    }
    let profiler = builder.build()?;

    let source = EdgeListSource::from_path(&args.edges);
    let edges = load_edges(&source)?;
    let regions = read_regions_path(&args.regions, &edges)
        .map_err(|error| input_error(&args.regions, error))?;

    let counts = profiler.count(edges.graph());
    let store = InMemoryStore::new();
    let gcms = profiler.region_gcms(
        &counts,
        &regions.membership,
        &store,
        &CancellationToken::new(),
    )?;
    let clusters = profiler.cluster_regions(&gcms)?;
    let assignment = clusters.assignment();
    info!(
        regions = gcms.len(),
        clusters = assignment.cluster_count(),
        unassigned = assignment.unassigned(),
        "regions clustered"
    );

    let entries = gcms
        .iter()
        .zip(assignment.labels())
        .map(|(result, label)| {
            let computed = result.outcome.computed();
            let detail = match &result.outcome {
                UnitOutcome::Failed(failure) => Some(failure.to_string()),
                UnitOutcome::Skipped(reason) => Some(reason.to_string()),
                UnitOutcome::Computed(_) => None,
            };
            RegionEntry {
                region: result.unit.to_string(),
                status: result.outcome.status(),
                population: computed.map(|gcm| gcm.population()),
                valid: computed.map(|gcm| gcm.is_valid()),
                detail,
                cluster: label.cluster().map(ClusterId::get),
            }
        })
        .collect();
    Ok(RegionsReport {
        source: source.name().to_owned(),
        unknown_nodes: regions.unknown_nodes,
        method: clusters.linkage().method(),
        clusters: assignment.cluster_count(),
        merges: clusters.linkage().merges().to_vec(),
        regions: entries,
    })
}

fn load_edges(source: &EdgeListSource) -> Result<EdgeList, CliError> {
    source.load().map_err(|error| input_error(source.path(), error))
}

fn input_error(path: &Path, source: EdgeListError) -> CliError {
    CliError::Input {
        path: path.to_path_buf(),
        source,
    }
}

fn members<'a>(
    labels: impl Iterator<Item = &'a str>,
    assignment: &ClusterAssignment,
) -> Vec<Member> {
    labels
        .zip(assignment.labels())
        .map(|(label, cluster)| Member {
            label: label.to_owned(),
            cluster: cluster.cluster().map(ClusterId::get),
        })
        .collect()
}
