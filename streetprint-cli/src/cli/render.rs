//! Report rendering.

use std::io::{self, Write};

use super::{
    args::OutputFormat,
    commands::{CountReport, NodesReport, RegionsReport, Report},
};

/// Renders `report` to `writer` in `format`.
///
/// Human output is tab-separated with `-` marking an unassigned cluster;
/// JSON output is one document tagged with the command name.
///
/// # Errors
/// Returns [`io::Error`] if writing or serialising fails.
///
/// # Examples
/// ```
/// use streetprint_cli::cli::{CountReport, CountUnit, OutputFormat, Report, render_report};
///
/// let report = Report::Count(CountReport {
///     graphlet_size: 4,
///     units: vec![CountUnit {
///         unit: "edge".into(),
///         status: "computed",
///         error: None,
///         rows: vec![vec![1, 0, 0]],
///     }],
/// });
/// let mut buffer = Vec::new();
/// render_report(&report, OutputFormat::Human, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8_lossy(&buffer),
///     "graphlet size: 4\nunit: edge\tcomputed\n0\t1 0 0\n"
/// );
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_report(
    report: &Report,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)
        }
        OutputFormat::Human => match report {
            Report::Count(count) => render_count(count, &mut writer),
            Report::Nodes(nodes) => render_nodes(nodes, &mut writer),
            Report::Regions(regions) => render_regions(regions, &mut writer),
        },
    }
}

fn render_count(report: &CountReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "graphlet size: {}", report.graphlet_size)?;
    for unit in &report.units {
        write!(writer, "unit: {}\t{}", unit.unit, unit.status)?;
        match &unit.error {
            Some(error) => writeln!(writer, "\t{error}")?,
            None => writeln!(writer)?,
        }
        for (node, row) in unit.rows.iter().enumerate() {
            let counts: Vec<String> = row.iter().map(u64::to_string).collect();
            writeln!(writer, "{node}\t{}", counts.join(" "))?;
        }
    }
    Ok(())
}

fn render_nodes(report: &NodesReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "source: {}", report.source)?;
    writeln!(writer, "graphlet size: {}", report.graphlet_size)?;
    for tree in &report.trees {
        writeln!(writer, "method: {}\tclusters: {}", tree.method, tree.clusters)?;
        for member in &tree.members {
            writeln!(writer, "{}\t{}", member.label, cluster_cell(member.cluster))?;
        }
    }
    Ok(())
}

fn render_regions(report: &RegionsReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "source: {}", report.source)?;
    writeln!(
        writer,
        "method: {}\tclusters: {}\tunknown nodes: {}",
        report.method, report.clusters, report.unknown_nodes
    )?;
    for entry in &report.regions {
        write!(
            writer,
            "{}\t{}\t{}",
            entry.region,
            entry.status,
            cluster_cell(entry.cluster)
        )?;
        match &entry.detail {
            Some(detail) => writeln!(writer, "\t{detail}")?,
            None => writeln!(writer)?,
        }
    }
    Ok(())
}

fn cluster_cell(cluster: Option<usize>) -> String {
    cluster.map_or_else(|| "-".to_owned(), |id| id.to_string())
}
