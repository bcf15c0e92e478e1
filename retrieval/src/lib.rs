//! # Retrieval Evaluation
//!
//! This crate measures how well similarity search over image embeddings
//! recovers items of the same category, and answers "find similar" queries
//! for presentation layers.
//!
//! - **Precision@k**: leave-one-out top-k retrieval for every item, averaged
//! - **Breakdowns**: per-item and per-label precision
//! - **Similar-item queries**: ranked neighbors of a single item
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Retrieval Evaluation                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   RetrievalConfig ──► RetrievalEvaluator ◄── SimilarityIndex    │
//! │                          │          │                           │
//! │                          ▼          ▼                           │
//! │                precision_at_k   find_similar                    │
//! │                   evaluate                                      │
//! │                          │                                      │
//! │                          ▼                                      │
//! │                  EvaluationReport                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use imgsim_retrieval::{RetrievalEvaluator, SimilarityIndex};
//!
//! let index = SimilarityIndex::from_labeled_rows(
//!     vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 1.0]],
//!     vec!["A", "A", "B", "B"],
//! )?;
//! let evaluator = RetrievalEvaluator::new(&index);
//!
//! assert_eq!(evaluator.precision_at_k(1)?, 1.0);
//! assert_eq!(evaluator.find_similar(0, 1)?[0].index, 1);
//! # Ok::<(), imgsim_retrieval::RetrievalError>(())
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod report;

pub use config::RetrievalConfig;
pub use error::{Result, RetrievalError};
pub use evaluator::RetrievalEvaluator;
pub use report::{EvaluationReport, LabelPrecision};

// Re-export from dependencies for convenience
pub use imgsim_index::{EmbeddingSnapshot, Label, RankedNeighbor, SimilarityIndex};
