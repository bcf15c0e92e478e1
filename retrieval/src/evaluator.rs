//! Leave-one-out retrieval evaluation.

use std::hash::Hash;

use imgsim_index::{IndexError, RankedNeighbor, SimilarityIndex, rank_neighbors};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{Result, RetrievalError};
use crate::report::EvaluationReport;

/// Measures how well similarity retrieval recovers same-label items.
///
/// Borrows the index; every call is a pure computation over it. The batch
/// path reads the index's shared similarity matrix, the query path computes
/// a single fresh row.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalEvaluator<'a, L = u32> {
    index: &'a SimilarityIndex<L>,
}

impl<'a, L> RetrievalEvaluator<'a, L> {
    /// Create an evaluator over an index.
    pub fn new(index: &'a SimilarityIndex<L>) -> Self {
        Self { index }
    }

    /// The index being evaluated.
    pub fn index(&self) -> &'a SimilarityIndex<L> {
        self.index
    }

    /// Ranked neighbors of one item, for presentation by the caller.
    ///
    /// Same contract as [`SimilarityIndex::top_k_neighbors`]: `k` larger than
    /// the corpus returns every other item rather than failing.
    pub fn find_similar(&self, query_index: usize, k: usize) -> Result<Vec<RankedNeighbor>> {
        debug!("Finding {k} items similar to {query_index}");
        Ok(self.index.top_k_neighbors(query_index, k)?)
    }

    fn labels(&self) -> Result<&'a [L]> {
        self.index.labels().ok_or(RetrievalError::MissingLabels)
    }

    /// Leave-one-out needs k distinct neighbors besides the query.
    fn check_k(&self, k: usize) -> Result<()> {
        let corpus_size = self.index.len();
        if k == 0 || k >= corpus_size {
            return Err(RetrievalError::InvalidK { k, corpus_size });
        }
        Ok(())
    }
}

impl<L: PartialEq + Sync> RetrievalEvaluator<'_, L> {
    /// Mean fraction of each item's top-k neighbors sharing its label.
    pub fn precision_at_k(&self, k: usize) -> Result<f64> {
        let per_item = self.item_precisions(k)?;
        let precision = mean(&per_item);
        info!("Precision@{k}: {precision:.4} over {} items", per_item.len());
        Ok(precision)
    }

    /// Per-item label-match fraction, in row order.
    fn item_precisions(&self, k: usize) -> Result<Vec<f64>> {
        let labels = self.labels()?;
        self.check_k(k)?;

        let matrix = self.index.full_similarity_matrix();
        let len = matrix.len();

        (0..len)
            .into_par_iter()
            .map(|i| -> Result<f64> {
                let row = matrix
                    .row(i)
                    .ok_or(IndexError::IndexOutOfRange { index: i, len })?;
                let hits = rank_neighbors(row, i, k)?
                    .iter()
                    .filter(|neighbor| labels[neighbor.index] == labels[i])
                    .count();
                Ok(hits as f64 / k as f64)
            })
            .collect()
    }
}

impl<L: Eq + Hash + Clone + Sync> RetrievalEvaluator<'_, L> {
    /// Full precision@k breakdown: overall, per item and per label.
    pub fn evaluate(&self, k: usize) -> Result<EvaluationReport<L>> {
        let per_item = self.item_precisions(k)?;
        let report = EvaluationReport::new(k, self.labels()?, per_item);
        info!(
            "Precision@{k}: {:.4} over {} items in {} labels",
            report.precision,
            report.per_item.len(),
            report.per_label.len()
        );
        Ok(report)
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
