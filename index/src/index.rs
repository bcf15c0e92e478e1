//! Similarity index over a fixed embedding corpus.

use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::Embedding;
use crate::error::{IndexError, Result};
use crate::matrix::{EmbeddingMatrix, SimilarityMatrix};
use crate::similarity::{RankedNeighbor, cosine_from_parts, dot, norm, rank_neighbors};
use crate::snapshot::EmbeddingSnapshot;

/// A cosine similarity index over an immutable embedding matrix.
///
/// Items are addressed by their row in the matrix. Labels, when present,
/// are aligned with the rows and are only used by evaluation.
///
/// Rows are not assumed to be unit length: each similarity divides by both
/// norms. The full pairwise matrix is computed at most once, on first use,
/// and shared by every later caller.
#[derive(Debug)]
pub struct SimilarityIndex<L = u32> {
    /// Stored embeddings.
    embeddings: EmbeddingMatrix,

    /// L2 norm of each row.
    norms: Vec<f64>,

    /// Category of each row.
    labels: Option<Vec<L>>,

    /// Lazily computed pairwise similarities.
    full_matrix: OnceLock<SimilarityMatrix>,
}

impl SimilarityIndex {
    /// Create an unlabeled index.
    pub fn new(embeddings: EmbeddingMatrix) -> Self {
        Self::build(embeddings, None)
    }

    /// Validate raw rows and create an unlabeled index.
    pub fn from_rows(rows: Vec<Embedding>) -> Result<Self> {
        Ok(Self::new(EmbeddingMatrix::from_rows(rows)?))
    }
}

impl<L> SimilarityIndex<L> {
    /// Create an index whose rows carry category labels.
    pub fn with_labels(embeddings: EmbeddingMatrix, labels: Vec<L>) -> Result<Self> {
        Self::from_parts(embeddings, Some(labels))
    }

    /// Validate raw rows and labels and create a labeled index.
    pub fn from_labeled_rows(rows: Vec<Embedding>, labels: Vec<L>) -> Result<Self> {
        Self::with_labels(EmbeddingMatrix::from_rows(rows)?, labels)
    }

    pub(crate) fn from_parts(embeddings: EmbeddingMatrix, labels: Option<Vec<L>>) -> Result<Self> {
        let label_count = labels.as_ref().map_or(embeddings.len(), Vec::len);
        if label_count != embeddings.len() {
            return Err(IndexError::LabelCountMismatch {
                labels: label_count,
                items: embeddings.len(),
            });
        }
        Ok(Self::build(embeddings, labels))
    }

    fn build(embeddings: EmbeddingMatrix, labels: Option<Vec<L>>) -> Self {
        let norms: Vec<f64> = embeddings.rows().map(norm).collect();

        let zero_rows = norms.iter().filter(|n| **n == 0.0).count();
        if zero_rows > 0 {
            warn!("{zero_rows} zero-norm embeddings will score 0.0 against every item");
        }

        info!(
            "Built similarity index with {} embeddings (dim={}, labeled={})",
            embeddings.len(),
            embeddings.dimension(),
            labels.is_some()
        );

        Self {
            embeddings,
            norms,
            labels,
            full_matrix: OnceLock::new(),
        }
    }

    /// Number of items in the index.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.embeddings.dimension()
    }

    /// The stored embeddings.
    pub fn embeddings(&self) -> &EmbeddingMatrix {
        &self.embeddings
    }

    /// Labels aligned with the rows, if any were supplied.
    pub fn labels(&self) -> Option<&[L]> {
        self.labels.as_deref()
    }

    /// Whether every row has unit norm within `tolerance`.
    ///
    /// Informational only; similarities are computed the same way either way.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        self.norms.iter().all(|n| (n - 1.0).abs() <= tolerance)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(IndexError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn cosine(&self, i: usize, j: usize, row_i: &[f32]) -> f32 {
        let row_j = self.embeddings.row(j).unwrap_or_default();
        cosine_from_parts(dot(row_i, row_j), self.norms[i], self.norms[j])
    }

    fn fill_row(&self, i: usize, out: &mut [f32]) {
        let row_i = self.embeddings.row(i).unwrap_or_default();
        for (j, slot) in out.iter_mut().enumerate() {
            *slot = self.cosine(i, j, row_i);
        }
    }

    /// Compute similarity between two items in the index.
    pub fn similarity(&self, i: usize, j: usize) -> Result<f32> {
        self.check_index(i)?;
        self.check_index(j)?;
        let row_i = self.embeddings.row(i).unwrap_or_default();
        Ok(self.cosine(i, j, row_i))
    }

    /// Similarity of item `index` against every item, itself included.
    pub fn similarity_row(&self, index: usize) -> Result<Vec<f32>> {
        self.check_index(index)?;
        let mut row = vec![0.0; self.len()];
        self.fill_row(index, &mut row);
        Ok(row)
    }

    /// The `k` most similar items to `index`, never including `index` itself.
    ///
    /// Returns `min(k, len - 1)` neighbors ordered by descending score, ties
    /// broken by ascending row.
    pub fn top_k_neighbors(&self, index: usize, k: usize) -> Result<Vec<RankedNeighbor>> {
        let row = self.similarity_row(index)?;
        let neighbors = rank_neighbors(&row, index, k)?;
        debug!(
            "Ranked {} neighbors for item {index} (k={k})",
            neighbors.len()
        );
        Ok(neighbors)
    }

    /// Export the index contents as a snapshot.
    pub fn to_snapshot(&self) -> EmbeddingSnapshot<L>
    where
        L: Clone,
    {
        EmbeddingSnapshot {
            embeddings: self.embeddings.to_rows(),
            labels: self.labels.clone(),
            names: None,
        }
    }
}

impl<L: Sync> SimilarityIndex<L> {
    /// Pairwise similarities between all items.
    ///
    /// Computed in parallel on first call and cached; concurrent first callers
    /// wait for the same computation.
    pub fn full_similarity_matrix(&self) -> &SimilarityMatrix {
        self.full_matrix.get_or_init(|| self.compute_full_matrix())
    }

    fn compute_full_matrix(&self) -> SimilarityMatrix {
        let n = self.len();
        debug!("Computing {n}x{n} similarity matrix");

        let mut scores = vec![0.0f32; n * n];
        scores
            .par_chunks_mut(n)
            .enumerate()
            .for_each(|(i, row)| self.fill_row(i, row));

        SimilarityMatrix::from_scores(scores, n)
    }
}
