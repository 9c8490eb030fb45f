//! Tests for study material generation.

use std::sync::Arc;

use async_trait::async_trait;
use studymate_rag::{
    ChatModel, Document, RagError, ReportKind, SUPPORTED_LANGUAGES, Studio, StudioOptions,
};

struct BrokenModel;

#[async_trait]
impl ChatModel for BrokenModel {
    fn name(&self) -> &str {
        "broken"
    }

    async fn generate(&self, _prompt: &str) -> studymate_rag::Result<String> {
        Err(RagError::generation("broken", "quota exceeded"))
    }
}

fn documents(count: usize, len: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            let letter = char::from(b'a' + i as u8);
            Document::new(format!("doc{i}"), letter.to_string().repeat(len))
        })
        .collect()
}

#[test]
fn audio_prompt_substitutes_language() {
    let prompt = Studio::render_prompt(
        ReportKind::AudioOverview,
        &documents(1, 10),
        &StudioOptions::with_language("Tamil"),
    )
    .unwrap();
    assert!(prompt.starts_with("Create a comprehensive audio overview"));
    assert!(prompt.contains("in Tamil."));
    assert!(!prompt.contains("{language}"));
}

#[test]
fn only_first_five_documents_are_used() {
    let prompt =
        Studio::render_prompt(ReportKind::Quiz, &documents(7, 10), &StudioOptions::default())
            .unwrap();
    assert!(prompt.contains(&"e".repeat(10)));
    assert!(!prompt.contains(&"f".repeat(10)));
}

#[test]
fn report_uses_all_documents_and_larger_budget() {
    let prompt =
        Studio::render_prompt(ReportKind::Report, &documents(7, 10), &StudioOptions::default())
            .unwrap();
    assert!(prompt.contains(&"g".repeat(10)));

    let long = documents(1, 5000);
    let options = StudioOptions::default();
    let report = Studio::render_prompt(ReportKind::Report, &long, &options).unwrap();
    let quiz = Studio::render_prompt(ReportKind::Quiz, &long, &StudioOptions::default()).unwrap();
    assert!(report.contains(&format!("{}...", "a".repeat(3000))));
    assert!(!report.contains(&"a".repeat(3001)));
    assert!(quiz.contains(&format!("{}...", "a".repeat(2000))));
    assert!(!quiz.contains(&"a".repeat(2001)));
}

#[test]
fn no_documents_renders_nothing() {
    for kind in ReportKind::ALL {
        assert!(Studio::render_prompt(kind, &[], &StudioOptions::default()).is_none());
    }
}

#[tokio::test]
async fn empty_document_set_message() {
    let studio = Studio::new(Arc::new(BrokenModel));
    let output = studio.generate(ReportKind::AudioOverview, &[], &StudioOptions::default()).await;
    assert_eq!(output.content, "No documents available for audio overview generation.");
}

#[tokio::test]
async fn model_error_is_reported_in_content() {
    let studio = Studio::new(Arc::new(BrokenModel));
    let output =
        studio.generate(ReportKind::MindMap, &documents(1, 5), &StudioOptions::default()).await;
    assert_eq!(output.kind, ReportKind::MindMap);
    assert_eq!(
        output.content,
        "Error generating mind map: Generation failed (broken): quota exceeded"
    );

    let err = studio
        .try_generate(ReportKind::MindMap, &documents(1, 5), &StudioOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::Generation { .. }));
}

#[test]
fn report_kind_parses_loose_names() {
    assert_eq!("audio-overview".parse::<ReportKind>().unwrap(), ReportKind::AudioOverview);
    assert_eq!("Mind Map".parse::<ReportKind>().unwrap(), ReportKind::MindMap);
    assert_eq!("video".parse::<ReportKind>().unwrap(), ReportKind::VideoOverview);
    assert_eq!("FLASHCARDS".parse::<ReportKind>().unwrap(), ReportKind::Flashcards);
    assert!(matches!("essay".parse::<ReportKind>(), Err(RagError::InvalidConfig(_))));

    for kind in ReportKind::ALL {
        assert_eq!(kind.title().parse::<ReportKind>().unwrap(), kind);
    }
}

#[test]
fn english_is_the_default_language() {
    assert_eq!(StudioOptions::default().language, "English");
    assert!(SUPPORTED_LANGUAGES.contains(&"English"));
    assert_eq!(SUPPORTED_LANGUAGES.len(), 10);
}
