//! Error types for the similarity index.

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while building or querying a similarity index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// A row's dimension differs from the first row.
    #[error("dimension mismatch at row {row}: expected {expected}, got {actual}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Two vectors compared directly have different lengths.
    #[error("length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Label vector is not aligned with the embedding rows.
    #[error("label count mismatch: {labels} labels for {items} embeddings")]
    LabelCountMismatch { labels: usize, items: usize },

    /// Name list is not aligned with the embedding rows.
    #[error("name count mismatch: {names} names for {items} embeddings")]
    NameCountMismatch { names: usize, items: usize },

    /// Fewer than two items, or zero-dimensional vectors.
    #[error("need at least 2 embeddings of dimension >= 1, got {items} of dimension {dimension}")]
    EmptyInput { items: usize, dimension: usize },

    /// Embedding contains NaN or an infinity.
    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    /// Requested neighbor count is unusable.
    #[error("invalid k {k}: {reason}")]
    InvalidK { k: usize, reason: String },

    /// Query index does not name an item in the index.
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
