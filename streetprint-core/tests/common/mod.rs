use streetprint_core::{Graph, GraphSource, GraphSourceError};

/// In-memory graph source for integration tests.
#[derive(Clone, Debug)]
pub struct EdgeSource {
    name: String,
    node_count: usize,
    edges: Vec<(usize, usize)>,
}

impl EdgeSource {
    #[must_use]
    pub fn new(name: &str, node_count: usize, edges: &[(usize, usize)]) -> Self {
        Self {
            name: name.to_owned(),
            node_count,
            edges: edges.to_vec(),
        }
    }

    /// A `width × height` street grid with node `y * width + x`.
    #[must_use]
    pub fn grid(name: &str, width: usize, height: usize) -> Self {
        let mut edges = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let node = y * width + x;
                if x + 1 < width {
                    edges.push((node, node + 1));
                }
                if y + 1 < height {
                    edges.push((node, node + width));
                }
            }
        }
        Self::new(name, width * height, &edges)
    }
}

impl GraphSource for EdgeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_graph(&self) -> Result<Graph, GraphSourceError> {
        if self.node_count == 0 {
            return Err(GraphSourceError::Empty);
        }
        Graph::from_edges(self.node_count, &self.edges).map_err(|err| {
            GraphSourceError::Malformed {
                line: 0,
                message: err.to_string().into(),
            }
        })
    }
}
