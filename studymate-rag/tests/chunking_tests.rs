//! Tests for word-window chunking.

use proptest::prelude::*;
use studymate_rag::chunking::{
    Chunker, WordWindowChunker, reconstruct_words, split_words, word_windows,
};
use studymate_rag::document::Document;
use studymate_rag::error::RagError;

#[test]
fn six_words_size_three_overlap_one() {
    let chunks = split_words("A B C D E F", 3, 1).unwrap();
    assert_eq!(chunks, vec!["A B C", "C D E", "E F"]);
}

#[test]
fn short_document_yields_one_chunk() {
    let chunks = split_words("only four words here", 10, 9).unwrap();
    assert_eq!(chunks, vec!["only four words here"]);
}

#[test]
fn exactly_size_words_still_steps_by_window() {
    let chunks = split_words("A B C", 3, 1).unwrap();
    assert_eq!(chunks, vec!["A B C", "C"]);
    assert_eq!(reconstruct_words(&chunks, 1), vec!["A", "B", "C"]);

    assert_eq!(split_words("A B C", 3, 0).unwrap(), vec!["A B C"]);
}

#[test]
fn empty_text_yields_no_chunks() {
    assert!(split_words(" \n\t ", 5, 1).unwrap().is_empty());
}

#[test]
fn zero_overlap_partitions_words() {
    let chunks = split_words("a b c d e f g", 3, 0).unwrap();
    assert_eq!(chunks, vec!["a b c", "d e f", "g"]);
}

#[test]
fn whitespace_is_normalised() {
    let chunks = split_words("a\n\nb\tc   d", 2, 0).unwrap();
    assert_eq!(chunks, vec!["a b", "c d"]);
}

#[test]
fn overlap_not_less_than_size_is_invalid() {
    assert!(matches!(split_words("a b c", 3, 3), Err(RagError::InvalidConfig(_))));
    assert!(matches!(split_words("a b c", 3, 5), Err(RagError::InvalidConfig(_))));
    assert!(matches!(WordWindowChunker::new(2, 2), Err(RagError::InvalidConfig(_))));
}

#[test]
fn zero_size_is_invalid() {
    assert!(matches!(split_words("a b c", 0, 0), Err(RagError::InvalidConfig(_))));
}

#[test]
fn chunker_sets_ids_and_sources() {
    let chunker = WordWindowChunker::new(3, 1).unwrap();
    let document = Document::from_page("notes.pdf", 2, "A B C D E F");
    let chunks = chunker.chunk(&document);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].id.as_str(), "notes.pdf#p2_0");
    assert_eq!(chunks[2].id.as_str(), "notes.pdf#p2_2");
    assert_eq!(chunks[1].document_id, "notes.pdf#p2");
    assert_eq!(chunks[1].source.to_string(), "notes.pdf (page 2)");
    assert_eq!((chunks[1].start_word, chunks[1].end_word), (2, 5));
    assert_eq!(chunks[2].word_count(), 2);
}

fn expected_count(words: usize, size: usize, overlap: usize) -> usize {
    if words == 0 {
        0
    } else if words < size {
        1
    } else {
        words.div_ceil(size - overlap)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn reconstruction_recovers_word_sequence(
        words in proptest::collection::vec("[a-z]{1,6}", 0..120),
        size in 1usize..20,
        overlap_seed in 0usize..20,
    ) {
        let overlap = overlap_seed % size;
        let text = words.join(" ");

        let chunks = split_words(&text, size, overlap).unwrap();
        prop_assert_eq!(reconstruct_words(&chunks, overlap), words);
    }

    #[test]
    fn chunk_count_matches_window_formula(
        word_count in 0usize..500,
        size in 1usize..40,
        overlap_seed in 0usize..40,
    ) {
        let overlap = overlap_seed % size;
        let spans = word_windows(word_count, size, overlap).unwrap();
        prop_assert_eq!(spans.len(), expected_count(word_count, size, overlap));

        for span in &spans {
            prop_assert!(span.end - span.start <= size);
        }
        for pair in spans.windows(2) {
            // consecutive windows leave no gap
            prop_assert!(pair[1].start <= pair[0].end);
        }
    }

    #[test]
    fn chunking_is_deterministic(
        text in "[a-z ]{0,200}",
        size in 1usize..10,
        overlap_seed in 0usize..10,
    ) {
        let overlap = overlap_seed % size;
        let first = split_words(&text, size, overlap).unwrap();
        prop_assert_eq!(first, split_words(&text, size, overlap).unwrap());
    }
}
