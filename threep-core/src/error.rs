//! Error types for threep

use thiserror::Error;

/// Main error type for threep operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Attribute mismatch: {0}")]
    AttributeMismatch(String),

    #[error("Vertex {vertex} out of range (vertex count {count})")]
    VertexOutOfRange { vertex: usize, count: usize },

    #[error("Degenerate cell {cell}: {indices:?}")]
    DegenerateCell { cell: usize, indices: [usize; 3] },

    #[error("Ring index {index} out of range for vertex {vertex} (ring size {len})")]
    RingIndexOutOfRange { vertex: usize, index: usize, len: usize },

    #[error("Vertex {vertex} does not have a closed triangle fan")]
    OpenFan { vertex: usize },

    #[error("Vertex {vertex} has a non-manifold triangle fan")]
    NonManifoldFan { vertex: usize },

    #[error("Vertex {vertex} is not incident to cell {cell}")]
    NotIncident { vertex: usize, cell: usize },

    #[error("Vertex split at {vertex} has inconsistent face orientation")]
    InconsistentOrientation { vertex: usize },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for threep operations
pub type Result<T> = std::result::Result<T, Error>;
