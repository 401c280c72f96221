//! Node populations grouped by region.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

/// Assignment of graph nodes to named regions.
///
/// Regions keep the order in which they were first seen; each region lists
/// its nodes in insertion order without duplicates. A node may belong to
/// several regions. Regions can be declared without nodes, which makes them
/// empty populations downstream.
///
/// # Examples
/// ```
/// use streetprint_core::RegionMembership;
///
/// let regions: RegionMembership = [("north", 0), ("south", 2), ("north", 1)]
///     .into_iter()
///     .collect();
/// assert_eq!(regions.len(), 2);
/// assert_eq!(regions.nodes("north"), Some(&[0, 1][..]));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionMembership {
    regions: Vec<Region>,
    index: HashMap<Arc<str>, usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Region {
    name: Arc<str>,
    nodes: Vec<usize>,
    seen: HashSet<usize>,
}

impl Region {
    fn new(name: Arc<str>) -> Self {
        Self {
            name,
            nodes: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn insert(&mut self, node: usize) {
        if self.seen.insert(node) {
            self.nodes.push(node);
        }
    }
}

impl RegionMembership {
    /// Creates an empty membership table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `region` if unknown and returns its position.
    pub fn declare(&mut self, region: &str) -> usize {
        if let Some(&position) = self.index.get(region) {
            return position;
        }
        let name: Arc<str> = Arc::from(region);
        let position = self.regions.len();
        self.regions.push(Region::new(Arc::clone(&name)));
        self.index.insert(name, position);
        position
    }

    /// Adds `node` to `region`; repeated pairs are ignored.
    pub fn insert(&mut self, region: &str, node: usize) {
        let position = self.declare(region);
        if let Some(entry) = self.regions.get_mut(position) {
            entry.insert(node);
        }
    }

    /// Number of regions.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.regions.len() }

    /// Returns `true` when no region is declared.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    /// Nodes of `region`, if declared.
    #[must_use]
    pub fn nodes(&self, region: &str) -> Option<&[usize]> {
        self.index
            .get(region)
            .and_then(|&position| self.regions.get(position))
            .map(|entry| entry.nodes.as_slice())
    }

    /// Regions with their nodes, in first-seen order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Arc<str>, &[usize])> + '_ {
        self.regions
            .iter()
            .map(|entry| (&entry.name, entry.nodes.as_slice()))
    }
}

impl<'a> FromIterator<(&'a str, usize)> for RegionMembership {
    fn from_iter<I: IntoIterator<Item = (&'a str, usize)>>(iter: I) -> Self {
        let mut membership = Self::new();
        for (region, node) in iter {
            membership.insert(region, node);
        }
        membership
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_regions_may_be_empty() {
        let mut regions = RegionMembership::new();
        regions.declare("empty");
        regions.insert("full", 3);
        regions.insert("full", 3);
        let listed: Vec<(&str, usize)> = regions
            .iter()
            .map(|(name, nodes)| (name.as_ref(), nodes.len()))
            .collect();
        assert_eq!(listed, [("empty", 0), ("full", 1)]);
        assert_eq!(regions.nodes("missing"), None);
    }

    #[test]
    fn large_regions_keep_first_seen_order_without_duplicates() {
        let mut regions = RegionMembership::new();
        for node in (0..50_000).rev().chain(0..50_000) {
            regions.insert("city", node);
        }
        let nodes = regions.nodes("city").unwrap_or_default();
        assert_eq!(nodes.len(), 50_000);
        assert_eq!(nodes.first(), Some(&49_999));
        assert_eq!(nodes.last(), Some(&0));
    }
}
