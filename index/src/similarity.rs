//! Similarity computation and neighbor ranking.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Score written over the query's own slot before ranking.
///
/// Strictly below the cosine range of [-1.0, 1.0], so the query can never
/// outrank a real neighbor. It is never returned as a score.
pub const EXCLUDED_SCORE: f32 = f32::NEG_INFINITY;

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors, or either vector is all zeros
/// - -1.0 means opposite vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(IndexError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    Ok(cosine_from_parts(dot(a, b), norm(a), norm(b)))
}

/// Combine a dot product and two norms into a cosine score.
///
/// A zero norm on either side yields 0.0 rather than NaN.
pub(crate) fn cosine_from_parts(dot: f64, norm_a: f64, norm_b: f64) -> f32 {
    let denominator = norm_a * norm_b;
    if denominator == 0.0 {
        return 0.0;
    }
    (dot / denominator).clamp(-1.0, 1.0) as f32
}

/// Dot product accumulated in f64.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

/// Euclidean norm accumulated in f64.
pub(crate) fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt()
}

/// One entry of a ranked neighbor list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedNeighbor {
    /// Row of the neighbor in the embedding matrix.
    pub index: usize,

    /// Cosine similarity to the query.
    pub score: f32,
}

impl RankedNeighbor {
    /// Create a new ranked neighbor.
    pub fn new(index: usize, score: f32) -> Self {
        Self { index, score }
    }
}

impl From<RankedNeighbor> for (usize, f32) {
    fn from(neighbor: RankedNeighbor) -> Self {
        (neighbor.index, neighbor.score)
    }
}

/// Excluded slot last, then descending score, then ascending index.
fn rank_key(
    exclude: usize,
) -> impl Fn(&(usize, f32)) -> (bool, Reverse<OrderedFloat<f32>>, usize) {
    move |&(index, score)| (index == exclude, Reverse(OrderedFloat(score)), index)
}

/// Rank the k best entries of a similarity row, leaving out `exclude`.
///
/// `row` is not modified; the exclusion is applied to a copy. Returns
/// `min(k, row.len() - 1)` neighbors.
pub fn rank_neighbors(row: &[f32], exclude: usize, k: usize) -> Result<Vec<RankedNeighbor>> {
    if k == 0 {
        return Err(IndexError::InvalidK {
            k,
            reason: "must request at least one neighbor".to_string(),
        });
    }
    if exclude >= row.len() {
        return Err(IndexError::IndexOutOfRange {
            index: exclude,
            len: row.len(),
        });
    }

    let mut scores: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
    scores[exclude].1 = EXCLUDED_SCORE;

    // The excluded slot sorts last whatever the other scores are, so it
    // always falls past the cut.
    let take = k.min(scores.len() - 1);
    let key = rank_key(exclude);
    scores.select_nth_unstable_by_key(take, &key);
    scores.truncate(take);
    scores.sort_unstable_by_key(&key);

    Ok(scores
        .into_iter()
        .map(|(index, score)| RankedNeighbor::new(index, score))
        .collect())
}
