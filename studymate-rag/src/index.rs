//! Exact nearest-neighbour vector index.
//!
//! [`FlatIndex`] keeps every vector in insertion order and answers queries
//! by brute-force distance computation. The dimension is fixed by the
//! first insert; the metric is fixed at construction.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::ChunkId;
use crate::error::{RagError, Result};

/// Distance function used by a [`FlatIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// L2 distance.
    #[default]
    Euclidean,
    /// `1 - cosine similarity`; a zero vector is at distance 1 from everything.
    Cosine,
}

impl DistanceMetric {
    /// Distance between two vectors of equal length.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Euclidean => euclidean_distance(a, b),
            Self::Cosine => 1.0 - cosine_similarity(a, b),
        }
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[derive(Debug, Clone)]
struct Entry {
    id: ChunkId,
    vector: Vec<f32>,
}

/// An append-only exact vector index.
///
/// Re-inserting an existing id replaces its vector but keeps its original
/// insertion position, which is what ties in [`search`](FlatIndex::search)
/// are broken by.
///
/// # Example
///
/// ```rust,ignore
/// use studymate_rag::{DistanceMetric, FlatIndex};
///
/// let mut index = FlatIndex::new(DistanceMetric::Euclidean);
/// index.insert("a".into(), vec![0.0, 1.0])?;
/// let hits = index.search(&[0.0, 1.0], 1)?;
/// assert_eq!(hits[0].1, 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    metric: DistanceMetric,
    dimension: Option<usize>,
    entries: Vec<Entry>,
    positions: HashMap<ChunkId, usize>,
}

impl FlatIndex {
    /// Create an empty index with the given metric.
    pub fn new(metric: DistanceMetric) -> Self {
        Self { metric, ..Self::default() }
    }

    /// The metric fixed at construction.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// The vector dimension, once the first vector has been inserted.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of distinct ids stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` has been inserted.
    pub fn contains(&self, id: &ChunkId) -> bool {
        self.positions.contains_key(id)
    }

    /// Insert or overwrite the vector stored for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the vector's length
    /// differs from the dimension set by the first insert. The index is
    /// left unchanged in that case.
    pub fn insert(&mut self, id: ChunkId, vector: Vec<f32>) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(RagError::DimensionMismatch { expected, actual: vector.len() });
            }
            Some(_) => {}
            None => self.dimension = Some(vector.len()),
        }

        match self.positions.get(&id) {
            Some(&position) => self.entries[position].vector = vector,
            None => {
                self.positions.insert(id.clone(), self.entries.len());
                self.entries.push(Entry { id, vector });
            }
        }
        Ok(())
    }

    /// Return the `k` entries nearest to `query`, ascending by distance.
    ///
    /// The result has `min(k, len)` entries; equal distances keep
    /// insertion order. Entries whose distance is NaN (a vector holding
    /// NaN) rank after every other entry.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if nothing has been inserted and
    /// [`RagError::DimensionMismatch`] if the query has the wrong length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(ChunkId, f32)>> {
        let expected = self.dimension.ok_or(RagError::EmptyIndex)?;
        if query.len() != expected {
            return Err(RagError::DimensionMismatch { expected, actual: query.len() });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, self.metric.distance(&entry.vector, query)))
            .collect();

        // `sort_by` is stable, so equal distances stay in insertion order.
        scored.sort_by(|a, b| compare_distance(a.1, b.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| (self.entries[position].id.clone(), distance))
            .collect())
    }
}

/// Ascending order with NaN greater than any number.
fn compare_distance(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_distance_of_zero_vector_is_one() {
        assert_eq!(DistanceMetric::Cosine.distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut index = FlatIndex::new(DistanceMetric::Euclidean);
        index.insert("a".into(), vec![1.0]).unwrap();
        index.insert("b".into(), vec![1.0]).unwrap();
        index.insert("a".into(), vec![1.0]).unwrap();

        assert_eq!(index.len(), 2);
        let hits = index.search(&[1.0], 2).unwrap();
        assert_eq!(hits[0].0.as_str(), "a");
        assert_eq!(hits[1].0.as_str(), "b");
    }
}
