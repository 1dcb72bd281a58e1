//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while reading or writing progressive meshes
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported file format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid magic number {found:?}, expected \"3PB\\n\"")]
    BadMagic { found: Vec<u8> },

    #[error("Unexpected end of data while reading {section}")]
    Truncated { section: &'static str },

    #[error("Unknown scalar type code {code}")]
    UnknownTypeCode { code: u32 },

    #[error("Attribute name is not ASCII: {name:?}")]
    NonAsciiName { name: String },

    #[error("Split section declared at byte {declared} but starts at byte {actual}")]
    SplitOffsetMismatch { declared: u32, actual: usize },

    #[error("{trailing} trailing bytes do not form a whole vertex split record")]
    TrailingBytes { trailing: usize },

    #[error("Count mismatch: {message}")]
    CountMismatch { message: String },

    #[error("Ring index {index} of vertex split {split} does not fit in 7 bits")]
    RingIndexTooLarge { split: usize, index: usize },

    #[error("{what} {value} does not fit in 32 bits")]
    Overflow { what: &'static str, value: usize },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] threep_core::Error),
}

/// Result type alias for I/O operations
pub type IoResult<T> = std::result::Result<T, IoError>;
