//! Dense row-major matrices backing the index.

use crate::Embedding;
use crate::error::{IndexError, Result};

/// N embeddings of a shared dimension, stored row-major.
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    values: Vec<f32>,
    rows: usize,
    dimension: usize,
}

impl EmbeddingMatrix {
    /// Build a matrix from one vector per item.
    ///
    /// Requires at least two rows, a dimension of at least one, equal row
    /// lengths and finite values.
    pub fn from_rows(rows: Vec<Embedding>) -> Result<Self> {
        let dimension = rows.first().map_or(0, Vec::len);
        if rows.len() < 2 {
            return Err(IndexError::EmptyInput {
                items: rows.len(),
                dimension,
            });
        }

        let mut values = Vec::with_capacity(rows.len() * dimension);
        for (row, embedding) in rows.iter().enumerate() {
            if embedding.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    row,
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            if let Some(column) = embedding.iter().position(|x| !x.is_finite()) {
                return Err(IndexError::NonFiniteValue { row, column });
            }
            values.extend_from_slice(embedding);
        }
        if dimension == 0 {
            return Err(IndexError::EmptyInput {
                items: rows.len(),
                dimension,
            });
        }

        Ok(Self {
            values,
            rows: rows.len(),
            dimension,
        })
    }

    /// Number of embeddings.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Always false: construction rejects fewer than two rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Dimension shared by every row.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding for item `index`.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dimension;
        Some(&self.values[start..start + self.dimension])
    }

    /// Iterate over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks_exact(self.dimension)
    }

    /// Copy the rows back out as nested vectors.
    pub fn to_rows(&self) -> Vec<Embedding> {
        self.rows().map(<[f32]>::to_vec).collect()
    }
}

/// Pairwise cosine similarities between every pair of items.
///
/// Symmetric. The diagonal holds each item's similarity to itself and must
/// never be ranked as a neighbor.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Vec<f32>,
    len: usize,
}

impl SimilarityMatrix {
    pub(crate) fn from_scores(scores: Vec<f32>, len: usize) -> Self {
        debug_assert_eq!(scores.len(), len * len);
        Self { scores, len }
    }

    /// Number of items (the matrix is `len × len`).
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for a matrix with no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Similarities of item `index` against every item.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.len {
            return None;
        }
        let start = index * self.len;
        Some(&self.scores[start..start + self.len])
    }

    /// Similarity between items `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.len || j >= self.len {
            return None;
        }
        Some(self.scores[i * self.len + j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_rows_keeps_order() {
        let matrix = EmbeddingMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.dimension(), 2);
        assert_eq!(matrix.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(matrix.row(2), None);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![0.5; 128], vec![0.5; 128], vec![0.5; 64]];
        assert!(matches!(
            EmbeddingMatrix::from_rows(rows),
            Err(IndexError::DimensionMismatch {
                row: 2,
                expected: 128,
                actual: 64,
            })
        ));
    }

    #[test]
    fn test_from_rows_rejects_single_item() {
        assert!(matches!(
            EmbeddingMatrix::from_rows(vec![vec![1.0, 0.0]]),
            Err(IndexError::EmptyInput { items: 1, .. })
        ));
        assert!(matches!(
            EmbeddingMatrix::from_rows(Vec::new()),
            Err(IndexError::EmptyInput { items: 0, .. })
        ));
    }

    #[test]
    fn test_from_rows_rejects_zero_dimension() {
        assert!(matches!(
            EmbeddingMatrix::from_rows(vec![Vec::new(), Vec::new()]),
            Err(IndexError::EmptyInput { dimension: 0, .. })
        ));
    }

    #[test]
    fn test_from_rows_empty_first_row_is_ragged() {
        assert!(matches!(
            EmbeddingMatrix::from_rows(vec![Vec::new(), vec![1.0, 2.0]]),
            Err(IndexError::DimensionMismatch {
                row: 1,
                expected: 0,
                actual: 2,
            })
        ));
    }

    #[test]
    fn test_from_rows_rejects_nan() {
        let rows = vec![vec![1.0, 0.0], vec![0.0, f32::NAN]];
        assert!(matches!(
            EmbeddingMatrix::from_rows(rows),
            Err(IndexError::NonFiniteValue { row: 1, column: 1 })
        ));
    }

    #[test]
    fn test_similarity_matrix_lookup() {
        let matrix = SimilarityMatrix::from_scores(vec![1.0, 0.5, 0.5, 1.0], 2);
        assert_eq!(matrix.get(0, 1), Some(0.5));
        assert_eq!(matrix.row(1), Some(&[0.5, 1.0][..]));
        assert_eq!(matrix.get(2, 0), None);
    }
}
