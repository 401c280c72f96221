use std::sync::Arc;

use streetprint_core::GraphSourceError;
use thiserror::Error;

/// Failures while reading edge-list or region files.
#[derive(Debug, Error)]
pub enum EdgeListError {
    /// The file could not be opened or read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// A record has the wrong number of fields.
    #[error("line {line}: {message}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// What was wrong with the record.
        message: String,
    },
    /// The edge list declares no nodes.
    #[error("edge list contains no nodes")]
    Empty,
    /// The normalised edges were rejected by the graph model.
    #[error("graph construction failed: {0}")]
    Graph(#[from] streetprint_core::StreetprintError),
}

impl From<EdgeListError> for GraphSourceError {
    fn from(error: EdgeListError) -> Self {
        match error {
            EdgeListError::Io(err) => Self::Unreadable {
                message: Arc::from(err.to_string()),
            },
            EdgeListError::Malformed { line, message } => Self::Malformed {
                line,
                message: Arc::from(message),
            },
            EdgeListError::Empty => Self::Empty,
            EdgeListError::Graph(err) => Self::Malformed {
                line: 0,
                message: Arc::from(err.to_string()),
            },
        }
    }
}
