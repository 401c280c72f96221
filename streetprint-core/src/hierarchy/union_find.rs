//! Union-find over entities, used to name and cut merge trees.
//!
//! Each component carries its member count and the id of the dendrogram node
//! that currently represents it, so replaying merges in height order yields
//! both the children's latest cluster ids and the merged size.

#[derive(Clone, Debug)]
pub(super) struct DisjointSet {
    parent: Vec<usize>,
    members: Vec<usize>,
    cluster_id: Vec<usize>,
}

#[expect(
    clippy::indexing_slicing,
    reason = "component ids are entity indices below the set size"
)]
impl DisjointSet {
    pub(super) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            members: vec![1; n],
            cluster_id: (0..n).collect(),
        }
    }

    /// Root of `node`'s component, halving paths on the way up.
    pub(super) fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            let grandparent = self.parent[self.parent[node]];
            self.parent[node] = grandparent;
            node = grandparent;
        }
        node
    }

    /// Dendrogram id currently naming the component of `node`.
    pub(super) fn cluster_of(&mut self, node: usize) -> usize {
        let root = self.find(node);
        self.cluster_id[root]
    }

    /// Joins the components of `left` and `right` under dendrogram id
    /// `cluster` and returns the merged member count.
    pub(super) fn merge(&mut self, left: usize, right: usize, cluster: usize) -> usize {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            self.cluster_id[left_root] = cluster;
            return self.members[left_root];
        }
        let (large, small) = if self.members[left_root] >= self.members[right_root] {
            (left_root, right_root)
        } else {
            (right_root, left_root)
        };
        self.parent[small] = large;
        self.members[large] += self.members[small];
        self.cluster_id[large] = cluster;
        self.members[large]
    }
}
