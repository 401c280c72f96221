//! Command-line arguments parsed by [`clap`].

use std::{num::NonZeroUsize, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use streetprint_core::{FeatureMetric, FlatCriterion, LinkageMethod};

const DEFAULT_GRAPHLET_SIZE: u8 = 4;

/// Top-level options.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "streetprint",
    version,
    about = "Structural fingerprints of street networks."
)]
pub struct Cli {
    /// Rendering of the command report on stdout.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Count graphlet orbits for every node of one or more edge lists.
    Count(CountArgs),
    /// Cluster the nodes of an edge list by their orbit signatures.
    Nodes(NodesArgs),
    /// Cluster the regions of an edge list by graphlet correlation.
    Regions(RegionsArgs),
}

/// Report rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated text.
    #[default]
    Human,
    /// A single JSON document.
    Json,
}

/// Options accepted by `count`.
#[derive(Debug, Args, Clone)]
pub struct CountArgs {
    /// Edge-list files; each is one unit named after its file stem.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Largest graphlet counted (4 or 5 nodes).
    #[arg(
        long = "graphlet-size",
        default_value_t = DEFAULT_GRAPHLET_SIZE,
        value_parser = clap::value_parser!(u8).range(4..=5),
    )]
    pub graphlet_size: u8,
}

/// Options accepted by `nodes`.
#[derive(Debug, Args, Clone)]
pub struct NodesArgs {
    /// Edge-list file.
    pub path: PathBuf,

    /// Largest graphlet counted (4 or 5 nodes).
    #[arg(
        long = "graphlet-size",
        default_value_t = DEFAULT_GRAPHLET_SIZE,
        value_parser = clap::value_parser!(u8).range(4..=5),
    )]
    pub graphlet_size: u8,

    /// Linkage methods, one merge tree each (default: single, complete,
    /// average and weighted).
    #[arg(long = "method", value_enum, value_delimiter = ',')]
    pub methods: Vec<MethodArg>,

    /// Use raw orbit influence as weights instead of normalising them.
    #[arg(long)]
    pub raw_weights: bool,

    /// How merge trees are cut into clusters.
    #[command(flatten)]
    pub cut: CutArgs,
}

/// Options accepted by `regions`.
#[derive(Debug, Args, Clone)]
pub struct RegionsArgs {
    /// Edge-list file.
    pub edges: PathBuf,

    /// File of `node region` records.
    pub regions: PathBuf,

    /// Largest graphlet counted (4 or 5 nodes).
    #[arg(
        long = "graphlet-size",
        default_value_t = DEFAULT_GRAPHLET_SIZE,
        value_parser = clap::value_parser!(u8).range(4..=5),
    )]
    pub graphlet_size: u8,

    /// Metric between vectorised correlation matrices.
    #[arg(long, value_enum, default_value_t = MetricArg::Euclidean)]
    pub metric: MetricArg,

    /// Norm order used with `--metric minkowski`.
    #[arg(long = "minkowski-p", default_value_t = 2.0)]
    pub minkowski_p: f64,

    /// Linkage method for the region tree.
    #[arg(long, value_enum, default_value_t = MethodArg::Ward)]
    pub method: MethodArg,

    /// Vectorise all 121 matrix entries instead of the upper triangle.
    #[arg(long)]
    pub full_matrix: bool,

    /// How the region tree is cut into clusters.
    #[command(flatten)]
    pub cut: CutArgs,
}

/// Flat cluster criterion; the library default applies when neither is set.
#[derive(Debug, Args, Clone, Copy, Default)]
pub struct CutArgs {
    /// Keep at most this many clusters.
    #[arg(long = "max-clusters", conflicts_with = "distance")]
    pub max_clusters: Option<NonZeroUsize>,

    /// Apply every merge at or below this height.
    #[arg(long)]
    pub distance: Option<f64>,
}

impl CutArgs {
    /// The requested criterion, if any.
    #[must_use]
    pub const fn criterion(self) -> Option<FlatCriterion> {
        match (self.max_clusters, self.distance) {
            (Some(limit), _) => Some(FlatCriterion::MaxClusters(limit)),
            (None, Some(height)) => Some(FlatCriterion::Distance(height)),
            (None, None) => None,
        }
    }
}

/// Linkage method names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Minimum pairwise distance.
    Single,
    /// Maximum pairwise distance.
    Complete,
    /// Unweighted mean pairwise distance.
    Average,
    /// Mean of the merged clusters' distances.
    Weighted,
    /// Minimum variance increase; Euclidean metric only.
    Ward,
}

impl From<MethodArg> for LinkageMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Single => Self::Single,
            MethodArg::Complete => Self::Complete,
            MethodArg::Average => Self::Average,
            MethodArg::Weighted => Self::Weighted,
            MethodArg::Ward => Self::Ward,
        }
    }
}

/// Feature metric names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Euclidean distance.
    Euclidean,
    /// Squared Euclidean distance.
    Sqeuclidean,
    /// City-block distance.
    Cityblock,
    /// Chebyshev distance.
    Chebyshev,
    /// Cosine distance.
    Cosine,
    /// Minkowski distance of order `--minkowski-p`.
    Minkowski,
}

impl MetricArg {
    /// Resolves the metric, taking the Minkowski order from `p`.
    #[must_use]
    pub const fn resolve(self, p: f64) -> FeatureMetric {
        match self {
            Self::Euclidean => FeatureMetric::Euclidean,
            Self::Sqeuclidean => FeatureMetric::SquaredEuclidean,
            Self::Cityblock => FeatureMetric::Cityblock,
            Self::Chebyshev => FeatureMetric::Chebyshev,
            Self::Cosine => FeatureMetric::Cosine,
            Self::Minkowski => FeatureMetric::Minkowski { p },
        }
    }
}
