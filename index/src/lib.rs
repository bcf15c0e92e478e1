//! # Similarity Index
//!
//! Cosine similarity search over a fixed corpus of image embeddings.
//!
//! ## Features
//!
//! - **Validated Construction**: Rejects ragged, non-finite or undersized input
//! - **Self-Excluding Top-k**: Neighbors of an item never include the item
//! - **Deterministic Ranking**: Ties broken by ascending row
//! - **Shared Pairwise Matrix**: Computed once in parallel, reused afterwards
//! - **Snapshots**: JSON hand-off format for encoder output
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Similarity Index                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingSnapshot ──► EmbeddingMatrix ──► SimilarityIndex      │
//! │                                               │                 │
//! │                                               ▼                 │
//! │                      similarity_row / full_similarity_matrix    │
//! │                                               │                 │
//! │                                               ▼                 │
//! │                                   rank_neighbors (top-k)        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod index;
pub mod matrix;
pub mod similarity;
pub mod snapshot;

pub use error::{IndexError, Result};
pub use index::SimilarityIndex;
pub use matrix::{EmbeddingMatrix, SimilarityMatrix};
pub use similarity::{EXCLUDED_SCORE, RankedNeighbor, cosine_similarity, rank_neighbors};
pub use snapshot::{EmbeddingSnapshot, Label};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
