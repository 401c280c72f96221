//! Edge-list provider for Streetprint.
//!
//! Reads whitespace-separated edge lists into normalised graphs and
//! node-to-region membership files into [`RegionMembership`] tables keyed by
//! the same node labels.
//!
//! [`RegionMembership`]: streetprint_core::RegionMembership

mod errors;
mod regions;
mod source;

pub use crate::{
    errors::EdgeListError,
    regions::{RegionFile, read_regions, read_regions_path},
    source::{DropReport, EdgeList, EdgeListSource, parse_edge_list},
};
