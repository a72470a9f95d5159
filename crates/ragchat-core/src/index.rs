//! Vector index abstraction and the exact (flat) implementation.
//!
//! The [`VectorIndex`] trait is the seam between the retrieval pipeline and
//! the nearest-neighbor algorithm. [`FlatIndex`] is an exhaustive scan over
//! contiguously stored vectors: O(n·d) per query, exact results, under any
//! [`Distance`] (Euclidean by default).
//!
//! Positions are zero-based and assigned in insertion order. They are
//! the join key with [`DocumentStore`](crate::store::DocumentStore).

use std::marker::PhantomData;

use crate::distance::{Distance, L2};
use crate::error::{RagError, Result};

/// A single nearest-neighbor hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    /// Distance to the query under the index's metric.
    pub distance: f32,
}

/// Append-only vector index with k-nearest-neighbor search.
///
/// Implementations must:
/// - reject vectors whose length differs from [`dims`](VectorIndex::dims)
///   without mutating,
/// - assign each added vector the position equal to the pre-call `len()`,
/// - return at most `min(k, len())` neighbors in non-decreasing distance
///   order, with a deterministic order for ties.
pub trait VectorIndex: Send + Sync {
    fn dims(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector and return its position.
    fn add(&mut self, vector: &[f32]) -> Result<usize>;

    /// Return up to `k` nearest stored vectors by ascending distance.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Exhaustive index. Vectors live in one flat buffer, row-major.
///
/// The vector count is tracked separately from the buffer so that
/// zero-dimensional vectors still occupy positions.
#[derive(Debug, Clone)]
pub struct FlatIndex<D: Distance = L2> {
    dims: usize,
    count: usize,
    data: Vec<f32>,
    metric: PhantomData<D>,
}

impl FlatIndex {
    /// An empty Euclidean index.
    pub fn new(dims: usize) -> Self {
        Self::with_metric(dims)
    }
}

impl<D: Distance> FlatIndex<D> {
    /// An empty index ranked by `D`.
    pub fn with_metric(dims: usize) -> Self {
        Self {
            dims,
            count: 0,
            data: Vec::new(),
            metric: PhantomData,
        }
    }

    /// The stored vector at `position`, if any.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.count {
            return None;
        }
        let start = position * self.dims;
        Some(&self.data[start..start + self.dims])
    }

    fn check_dims(&self, v: &[f32]) -> Result<()> {
        if v.len() != self.dims {
            return Err(RagError::DimensionMismatch {
                expected: self.dims,
                actual: v.len(),
            });
        }
        Ok(())
    }
}

impl<D: Distance> VectorIndex for FlatIndex<D> {
    fn dims(&self) -> usize {
        self.dims
    }

    fn len(&self) -> usize {
        self.count
    }

    fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dims(vector)?;
        let position = self.count;
        self.data.extend_from_slice(vector);
        self.count += 1;
        Ok(position)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(RagError::InvalidK(k));
        }
        self.check_dims(query)?;

        let mut scored: Vec<(usize, f32)> = (0..self.count)
            .map(|position| {
                let start = position * self.dims;
                (position, D::score(query, &self.data[start..start + self.dims]))
            })
            .collect();

        // Stable sort: equidistant vectors keep insertion order.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, score)| Neighbor {
                position,
                distance: D::report(score),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(vectors: &[[f32; 2]]) -> FlatIndex {
        let mut index = FlatIndex::new(2);
        for v in vectors {
            index.add(v).unwrap();
        }
        index
    }

    #[test]
    fn test_add_assigns_sequential_positions() {
        let mut index = FlatIndex::new(3);
        assert_eq!(index.add(&[1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 1);
        assert_eq!(index.add(&[0.0, 0.0, 1.0]).unwrap(), 2);
        assert_eq!(index.len(), 3);
        assert_eq!(index.vector(1), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(index.vector(3), None);
    }

    #[test]
    fn test_add_rejects_wrong_dimension_without_mutating() {
        let mut index = FlatIndex::new(3);
        index.add(&[1.0, 2.0, 3.0]).unwrap();
        let err = index.add(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = index_of(&[[10.0, 0.0], [1.0, 0.0], [5.0, 0.0]]);
        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 2, 0]);
        assert!((hits[0].distance - 1.0).abs() < 1e-6);
        assert!((hits[1].distance - 5.0).abs() < 1e-6);
        assert!((hits[2].distance - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let index = index_of(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[1].position, 1);
    }

    #[test]
    fn test_search_returns_short_set_when_k_exceeds_size() {
        let index = index_of(&[[0.0, 0.0], [1.0, 1.0]]);
        let hits = index.search(&[0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_empty_index() {
        let index = FlatIndex::new(2);
        assert!(index.search(&[0.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_zero_k() {
        let index = index_of(&[[0.0, 0.0]]);
        assert!(matches!(
            index.search(&[0.0, 0.0], 0),
            Err(RagError::InvalidK(0))
        ));
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = index_of(&[[0.0, 0.0]]);
        assert!(matches!(
            index.search(&[0.0, 0.0, 0.0], 1),
            Err(RagError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_ties_resolve_first_inserted_first() {
        let index = index_of(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]]);
        let hits = index.search(&[0.0, 0.0], 4).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);

        // Same state, same answer.
        let again: Vec<usize> = index
            .search(&[0.0, 0.0], 4)
            .unwrap()
            .iter()
            .map(|h| h.position)
            .collect();
        assert_eq!(positions, again);
    }

    #[test]
    fn test_zero_dimensional_vectors_occupy_positions() {
        let mut index = FlatIndex::new(0);
        assert_eq!(index.add(&[]).unwrap(), 0);
        assert_eq!(index.add(&[]).unwrap(), 1);
        assert_eq!(index.len(), 2);
        assert_eq!(index.vector(1), Some(&[][..]));

        let hits = index.search(&[], 5).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1]);
        assert!(hits.iter().all(|h| h.distance == 0.0));
    }

    /// Manhattan distance, to exercise a non-default metric.
    #[derive(Debug, Clone)]
    struct L1;

    impl Distance for L1 {
        fn score(a: &[f32], b: &[f32]) -> f32 {
            a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
        }
    }

    #[test]
    fn test_custom_metric_changes_ranking() {
        // From the origin: [3, 3] is L2 4.24 / L1 6, [0, 5] is L2 5 / L1 5.
        let vectors = [[3.0, 3.0], [0.0, 5.0]];

        let euclidean = index_of(&vectors);
        let hits = euclidean.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].position, 0);

        let mut manhattan: FlatIndex<L1> = FlatIndex::with_metric(2);
        for v in &vectors {
            manhattan.add(v).unwrap();
        }
        let hits = manhattan.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].position, 1);
        assert!((hits[0].distance - 5.0).abs() < 1e-6);
        assert!((hits[1].distance - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_results_non_decreasing() {
        let vectors: Vec<[f32; 2]> = (0..50)
            .map(|i| {
                let x = ((i * 37) % 17) as f32 - 8.0;
                let y = ((i * 13) % 11) as f32 - 5.0;
                [x, y]
            })
            .collect();
        let index = index_of(&vectors);
        for k in [1, 5, 17, 50, 80] {
            let hits = index.search(&[0.5, -0.25], k).unwrap();
            assert!(hits.len() <= k);
            assert!(hits.len() <= index.len());
            for w in hits.windows(2) {
                assert!(w[0].distance <= w[1].distance);
            }
        }
    }
}
