//! Tests for the exact vector index.

use proptest::prelude::*;
use studymate_rag::document::ChunkId;
use studymate_rag::error::RagError;
use studymate_rag::index::{DistanceMetric, FlatIndex};

#[test]
fn search_before_insert_is_empty_index() {
    let index = FlatIndex::new(DistanceMetric::Euclidean);
    assert!(matches!(index.search(&[0.0, 0.0], 1), Err(RagError::EmptyIndex)));
}

#[test]
fn returns_two_closest_in_ascending_order() {
    let mut index = FlatIndex::new(DistanceMetric::Euclidean);
    index.insert("far".into(), vec![5.0, 0.0]).unwrap();
    index.insert("exact".into(), vec![0.0, 0.0]).unwrap();
    index.insert("near".into(), vec![0.0, 1.0]).unwrap();

    let hits = index.search(&[0.0, 0.0], 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0], (ChunkId::from("exact"), 0.0));
    assert_eq!(hits[1], (ChunkId::from("near"), 1.0));
}

#[test]
fn result_length_is_min_of_k_and_entries() {
    let mut index = FlatIndex::new(DistanceMetric::Euclidean);
    index.insert("a".into(), vec![1.0]).unwrap();
    index.insert("b".into(), vec![2.0]).unwrap();
    assert_eq!(index.search(&[0.0], 10).unwrap().len(), 2);
    assert!(index.search(&[0.0], 0).unwrap().is_empty());
}

#[test]
fn mismatched_insert_leaves_index_unchanged() {
    let mut index = FlatIndex::new(DistanceMetric::Euclidean);
    index.insert("a".into(), vec![1.0, 2.0, 3.0]).unwrap();

    let err = index.insert("b".into(), vec![1.0, 2.0]).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));
    assert_eq!(index.len(), 1);
    assert!(!index.contains(&"b".into()));
    assert_eq!(index.dimension(), Some(3));
}

#[test]
fn mismatched_query_is_rejected() {
    let mut index = FlatIndex::new(DistanceMetric::Cosine);
    index.insert("a".into(), vec![1.0, 0.0]).unwrap();
    assert!(matches!(
        index.search(&[1.0, 0.0, 0.0], 1),
        Err(RagError::DimensionMismatch { expected: 2, actual: 3 })
    ));
}

#[test]
fn reinsert_overwrites_vector() {
    let mut index = FlatIndex::new(DistanceMetric::Euclidean);
    index.insert("a".into(), vec![10.0]).unwrap();
    index.insert("b".into(), vec![5.0]).unwrap();
    index.insert("a".into(), vec![0.0]).unwrap();

    let hits = index.search(&[0.0], 1).unwrap();
    assert_eq!(hits[0].0.as_str(), "a");
    assert_eq!(index.len(), 2);
}

#[test]
fn ties_keep_insertion_order() {
    let mut index = FlatIndex::new(DistanceMetric::Euclidean);
    for id in ["first", "second", "third"] {
        index.insert(id.into(), vec![1.0, 1.0]).unwrap();
    }
    let ids: Vec<String> =
        index.search(&[0.0, 0.0], 3).unwrap().into_iter().map(|(id, _)| id.to_string()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn cosine_ranks_by_angle() {
    let mut index = FlatIndex::new(DistanceMetric::Cosine);
    index.insert("orthogonal".into(), vec![0.0, 1.0]).unwrap();
    index.insert("parallel".into(), vec![3.0, 0.0]).unwrap();

    let hits = index.search(&[1.0, 0.0], 2).unwrap();
    assert_eq!(hits[0].0.as_str(), "parallel");
    assert!(hits[0].1.abs() < 1e-6);
    assert!((hits[1].1 - 1.0).abs() < 1e-6);
}

#[test]
fn nan_vectors_rank_last() {
    let mut index = FlatIndex::new(DistanceMetric::Euclidean);
    for i in 0..64 {
        let value = if i % 3 == 0 { f32::NAN } else { i as f32 };
        index.insert(ChunkId::from(format!("v{i}")), vec![value]).unwrap();
    }

    let hits = index.search(&[0.0], 5).unwrap();
    let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2", "v4", "v5", "v7"]);
    assert!(hits.iter().all(|(_, distance)| distance.is_finite()));

    let all = index.search(&[0.0], 64).unwrap();
    let finite = all.iter().take_while(|(_, distance)| !distance.is_nan()).count();
    assert_eq!(finite, 42);
    assert!(all[finite..].iter().all(|(_, distance)| distance.is_nan()));
    // NaN entries keep insertion order among themselves.
    assert_eq!(all[finite].0.as_str(), "v0");
    assert_eq!(all[finite + 1].0.as_str(), "v3");
}

#[test]
fn negative_nan_also_ranks_last() {
    let mut index = FlatIndex::new(DistanceMetric::Cosine);
    index.insert("nan".into(), vec![-f32::NAN, 1.0]).unwrap();
    index.insert("far".into(), vec![-1.0, 0.0]).unwrap();
    index.insert("near".into(), vec![1.0, 0.0]).unwrap();

    let hits = index.search(&[1.0, 0.0], 3).unwrap();
    let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["near", "far", "nan"]);
}

fn arb_vectors(dim: usize) -> impl Strategy<Value = Vec<Vec<f32>>> {
    proptest::collection::vec(proptest::collection::vec(-100.0f32..100.0, dim), 1..30)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn inserted_vector_is_found_at_distance_zero(
        vectors in arb_vectors(8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut index = FlatIndex::new(DistanceMetric::Euclidean);
        for (i, vector) in vectors.iter().enumerate() {
            index.insert(ChunkId::from(format!("v{i}")), vector.clone()).unwrap();
        }

        let target = pick.index(vectors.len());
        let hits = index.search(&vectors[target], 1).unwrap();
        prop_assert_eq!(hits.len(), 1);
        prop_assert_eq!(hits[0].1, 0.0);
        // A duplicate inserted earlier may win the tie; it must be identical.
        let winner: usize = hits[0].0.as_str()[1..].parse().unwrap();
        prop_assert_eq!(&vectors[winner], &vectors[target]);
    }

    #[test]
    fn results_ascend_and_are_bounded(
        vectors in arb_vectors(4),
        query in proptest::collection::vec(-100.0f32..100.0, 4),
        k in 0usize..40,
    ) {
        let mut index = FlatIndex::new(DistanceMetric::Euclidean);
        for (i, vector) in vectors.iter().enumerate() {
            index.insert(ChunkId::from(format!("v{i}")), vector.clone()).unwrap();
        }

        let hits = index.search(&query, k).unwrap();
        prop_assert_eq!(hits.len(), k.min(vectors.len()));
        for pair in hits.windows(2) {
            prop_assert!(pair[0].1 <= pair[1].1);
        }
    }
}
