//! Error types for retrieval evaluation.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur while evaluating or querying an index.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Index error.
    #[error("index error: {0}")]
    Index(#[from] imgsim_index::IndexError),

    /// Precision requested on an index built without labels.
    #[error("precision@k requires labels, but the index has none")]
    MissingLabels,

    /// k cannot yield k distinct non-self neighbors.
    #[error("invalid k {k}: must be between 1 and {} for {corpus_size} items", .corpus_size.saturating_sub(1))]
    InvalidK { k: usize, corpus_size: usize },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
