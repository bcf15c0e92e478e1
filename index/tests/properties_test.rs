//! Property tests for the similarity index.
//!
//! Each property is checked over a handful of seeded random corpora plus
//! corpora with deliberate duplicates and zero vectors.

use imgsim_index::{EXCLUDED_SCORE, Embedding, IndexError, RankedNeighbor, SimilarityIndex};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_rows(seed: u64, n: usize, dim: usize) -> Vec<Embedding> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect())
        .collect()
}

/// Random rows with exact duplicates and a zero vector mixed in.
fn corpora() -> Vec<Vec<Embedding>> {
    let mut with_duplicates = random_rows(11, 6, 4);
    with_duplicates.push(with_duplicates[2].clone());
    with_duplicates.push(with_duplicates[2].clone());
    with_duplicates.push(vec![0.0; 4]);

    vec![
        random_rows(1, 2, 1),
        random_rows(2, 5, 3),
        random_rows(3, 17, 8),
        with_duplicates,
    ]
}

fn assert_ranked(neighbors: &[RankedNeighbor]) {
    for pair in neighbors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(
            a.score > b.score || (a.score == b.score && a.index < b.index),
            "out of order: {a:?} before {b:?}"
        );
    }
}

#[test]
fn test_self_never_returned() {
    for rows in corpora() {
        let n = rows.len();
        let index = SimilarityIndex::from_rows(rows).unwrap();
        for i in 0..n {
            for k in 1..=n + 1 {
                let neighbors = index.top_k_neighbors(i, k).unwrap();
                assert!(
                    neighbors.iter().all(|nb| nb.index != i),
                    "item {i} returned as its own neighbor at k={k}"
                );
                assert!(neighbors.iter().all(|nb| nb.score != EXCLUDED_SCORE));
            }
        }
    }
}

#[test]
fn test_neighbor_count_and_order() {
    for rows in corpora() {
        let n = rows.len();
        let index = SimilarityIndex::from_rows(rows).unwrap();
        for i in 0..n {
            for k in 1..=n + 1 {
                let neighbors = index.top_k_neighbors(i, k).unwrap();
                assert_eq!(neighbors.len(), k.min(n - 1));
                assert_ranked(&neighbors);
            }
        }
    }
}

#[test]
fn test_top_k_is_prefix_of_full_ranking() {
    for rows in corpora() {
        let n = rows.len();
        let index = SimilarityIndex::from_rows(rows).unwrap();
        for i in 0..n {
            let all = index.top_k_neighbors(i, n - 1).unwrap();
            for k in 1..n {
                assert_eq!(index.top_k_neighbors(i, k).unwrap(), all[..k].to_vec());
            }
        }
    }
}

#[test]
fn test_similarity_is_symmetric() {
    for rows in corpora() {
        let n = rows.len();
        let index = SimilarityIndex::from_rows(rows).unwrap();
        let matrix = index.full_similarity_matrix();
        for i in 0..n {
            let row_i = index.similarity_row(i).unwrap();
            for j in 0..n {
                let row_j = index.similarity_row(j).unwrap();
                assert!((row_i[j] - row_j[i]).abs() < 1e-6);
                assert_eq!(matrix.get(i, j), Some(row_i[j]));
            }
        }
    }
}

#[test]
fn test_scores_stay_in_cosine_range() {
    for rows in corpora() {
        let n = rows.len();
        let index = SimilarityIndex::from_rows(rows).unwrap();
        for i in 0..n {
            for score in index.similarity_row(i).unwrap() {
                assert!((-1.0..=1.0).contains(&score), "score {score} out of range");
            }
        }
    }
}

#[test]
fn test_duplicates_tie_by_index() {
    let rows = vec![
        vec![0.0, 1.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
    ];
    let index = SimilarityIndex::from_rows(rows).unwrap();

    let indices: Vec<usize> = index
        .top_k_neighbors(2, 4)
        .unwrap()
        .iter()
        .map(|nb| nb.index)
        .collect();
    assert_eq!(indices, vec![0, 4, 1, 3]);
}

#[test]
fn test_zero_vectors_score_zero() {
    let rows = vec![
        vec![0.0, 0.0, 0.0],
        vec![1.0, -2.0, 0.5],
        vec![0.0, 0.0, 0.0],
    ];
    let index = SimilarityIndex::from_rows(rows).unwrap();

    for i in 0..3 {
        let row = index.similarity_row(i).unwrap();
        assert!(row.iter().all(|s| !s.is_nan()));
    }
    assert_eq!(index.similarity_row(0).unwrap(), vec![0.0, 0.0, 0.0]);
    assert_eq!(index.similarity(2, 0).unwrap(), 0.0);
    assert_eq!(index.similarity(1, 2).unwrap(), 0.0);
}

#[test]
fn test_mixed_dimensions_rejected() {
    let rows = vec![vec![0.1; 128], vec![0.1; 64]];
    assert!(matches!(
        SimilarityIndex::from_rows(rows),
        Err(IndexError::DimensionMismatch {
            row: 1,
            expected: 128,
            actual: 64,
        })
    ));
}

#[test]
fn test_single_item_rejected() {
    assert!(matches!(
        SimilarityIndex::from_rows(vec![vec![1.0, 2.0]]),
        Err(IndexError::EmptyInput { items: 1, .. })
    ));
}

#[test]
fn test_full_matrix_shared_across_threads() {
    let index = SimilarityIndex::from_rows(random_rows(5, 40, 16)).unwrap();

    let addresses: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| std::ptr::from_ref(index.full_similarity_matrix()) as usize)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(index.full_similarity_matrix().len(), 40);
}
