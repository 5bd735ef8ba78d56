//! Error types for Tripart

use thiserror::Error;
use tripart_algorithms::GraphError;

/// Errors that can occur while partitioning, counting or reading input
#[derive(Error, Debug)]
pub enum TriangleError {
    /// Invalid job settings, detected before any edge is processed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Graph operation on an absent vertex
    #[error("Graph error: {0}")]
    Graph(GraphError),

    /// Input record that does not decode to two integers (strict mode only)
    #[error("Malformed record at line {line}: {record:?}")]
    MalformedRecord { line: usize, record: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

impl From<GraphError> for TriangleError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::InvalidPartitionCount(_) => TriangleError::Configuration(err.to_string()),
            other => TriangleError::Graph(other),
        }
    }
}

pub type TriangleResult<T> = Result<T, TriangleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_count_is_configuration_error() {
        let err: TriangleError = GraphError::InvalidPartitionCount(1).into();
        assert!(matches!(err, TriangleError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid partition count 1: must be greater than 1"
        );
    }

    #[test]
    fn test_not_found_stays_graph_error() {
        let err: TriangleError = GraphError::VertexNotFound(9).into();
        assert!(matches!(err, TriangleError::Graph(GraphError::VertexNotFound(9))));
    }
}
