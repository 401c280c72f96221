//! Command-line interface orchestration.
//!
//! Three commands share one pipeline configuration: `count` reports orbit
//! counts for a population of edge lists, `nodes` clusters the nodes of one
//! edge list and `regions` clusters its regions by graphlet correlation.

mod args;
mod commands;
mod render;

pub use args::{
    Cli, Command, CountArgs, CutArgs, MethodArg, MetricArg, NodesArgs, OutputFormat, RegionsArgs,
};
pub use commands::{
    CliError, CountReport, CountUnit, Member, NodesReport, RegionEntry, RegionsReport, Report,
    TreeReport, run_cli,
};
pub use render::render_report;
