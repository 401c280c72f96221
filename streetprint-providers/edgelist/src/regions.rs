//! Node-to-region membership files.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use streetprint_core::RegionMembership;
use tracing::{instrument, warn};

use crate::{errors::EdgeListError, source::EdgeList, source::record_fields};

/// Region membership read from a file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionFile {
    /// Regions in first-seen order.
    pub membership: RegionMembership,
    /// Records naming a node absent from the edge list.
    pub unknown_nodes: usize,
}

/// Reads `node region` records, resolving node labels through `edges`.
///
/// A region whose records all name unknown nodes is still declared, so it
/// surfaces downstream as an empty region.
///
/// # Errors
/// Returns [`EdgeListError::Io`] when reading fails and
/// [`EdgeListError::Malformed`] for a record without a region.
///
/// # Examples
/// ```
/// use streetprint_providers_edgelist::{parse_edge_list, read_regions};
///
/// let edges = parse_edge_list("a b\nb c\n".as_bytes())?;
/// let regions = read_regions("a west\nc east\nz east\n".as_bytes(), &edges)?;
/// assert_eq!(regions.membership.nodes("east"), Some(&[2][..]));
/// assert_eq!(regions.unknown_nodes, 1);
/// # Ok::<(), streetprint_providers_edgelist::EdgeListError>(())
/// ```
pub fn read_regions<R: BufRead>(reader: R, edges: &EdgeList) -> Result<RegionFile, EdgeListError> {
    let mut file = RegionFile::default();
    for (number, record) in reader.lines().enumerate() {
        let line = record?;
        let Some(fields) = record_fields(&line) else {
            continue;
        };
        let [node, region, ..] = fields.as_slice() else {
            return Err(EdgeListError::Malformed {
                line: number + 1,
                message: "expected `node region`".to_owned(),
            });
        };
        if let Some(id) = edges.node_id(node) {
            file.membership.insert(region, id);
            continue;
        }
        file.membership.declare(region);
        file.unknown_nodes += 1;
    }
    if file.unknown_nodes > 0 {
        warn!(
            unknown_nodes = file.unknown_nodes,
            "region records reference nodes missing from the edge list"
        );
    }
    Ok(file)
}

/// Reads a region membership file from `path`.
///
/// # Errors
/// See [`read_regions`].
#[instrument(name = "edgelist.regions", err, skip(edges), fields(path = %path.display()))]
pub fn read_regions_path(path: &Path, edges: &EdgeList) -> Result<RegionFile, EdgeListError> {
    let file = File::open(path)?;
    read_regions(BufReader::new(file), edges)
}
