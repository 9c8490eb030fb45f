//! Study material generation ("Studio").
//!
//! Every [`ReportKind`] is described by a [`ReportTemplate`] held as data;
//! a single [`Studio::generate`] renders the template over the document
//! set and sends it to a [`ChatModel`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::answer::ChatModel;
use crate::document::Document;
use crate::error::{RagError, Result};

/// Languages offered for audio overviews.
pub const SUPPORTED_LANGUAGES: [&str; 10] = [
    "English",
    "Hindi",
    "Bengali",
    "Gujarati",
    "Kannada",
    "Malayalam",
    "Marathi",
    "Punjabi",
    "Tamil",
    "Telugu",
];

/// The kinds of study material the studio can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// A narrated overview suitable for audio.
    AudioOverview,
    /// A video script with visual cues and timings.
    VideoOverview,
    /// A hierarchical JSON mind map.
    MindMap,
    /// A structured report.
    Report,
    /// Question/answer flashcards.
    Flashcards,
    /// A multiple-choice quiz.
    Quiz,
}

impl ReportKind {
    /// All kinds, in display order.
    pub const ALL: [ReportKind; 6] = [
        Self::AudioOverview,
        Self::VideoOverview,
        Self::MindMap,
        Self::Report,
        Self::Flashcards,
        Self::Quiz,
    ];

    /// Human-readable name.
    pub fn title(self) -> &'static str {
        match self {
            Self::AudioOverview => "Audio Overview",
            Self::VideoOverview => "Video Overview",
            Self::MindMap => "Mind Map",
            Self::Report => "Report",
            Self::Flashcards => "Flashcards",
            Self::Quiz => "Quiz",
        }
    }

    /// The template used to generate this kind.
    pub fn template(self) -> &'static ReportTemplate {
        match self {
            Self::AudioOverview => &AUDIO_OVERVIEW,
            Self::VideoOverview => &VIDEO_OVERVIEW,
            Self::MindMap => &MIND_MAP,
            Self::Report => &REPORT,
            Self::Flashcards => &FLASHCARDS,
            Self::Quiz => &QUIZ,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for ReportKind {
    type Err = RagError;

    /// Accepts `audio-overview`, `audio_overview`, `audiooverview`, or the
    /// title, case-insensitively. `audio`, `video`, and `report`s work too.
    fn from_str(s: &str) -> Result<Self> {
        let key: String =
            s.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();
        match key.as_str() {
            "audiooverview" | "audio" => Ok(Self::AudioOverview),
            "videooverview" | "video" => Ok(Self::VideoOverview),
            "mindmap" => Ok(Self::MindMap),
            "report" | "reports" => Ok(Self::Report),
            "flashcards" | "flashcard" => Ok(Self::Flashcards),
            "quiz" => Ok(Self::Quiz),
            _ => Err(RagError::InvalidConfig(format!("unknown report kind '{s}'"))),
        }
    }
}

/// How one [`ReportKind`] is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTemplate {
    /// Opening instruction; `{language}` is substituted when `uses_language`.
    pub task: &'static str,
    /// Formatting requirements appended after the content.
    pub requirements: &'static str,
    /// Characters of document text included.
    pub content_budget: usize,
    /// Leading documents included; `None` means all.
    pub document_limit: Option<usize>,
    /// Whether the template takes a language option.
    pub uses_language: bool,
}

const AUDIO_OVERVIEW: ReportTemplate = ReportTemplate {
    task: "Create a comprehensive audio overview of the following document content in {language}. \
           The overview should be conversational and suitable for audio narration.",
    requirements: "Please provide:\n\
                   1. A brief introduction to the topic\n\
                   2. Key points and main ideas\n\
                   3. Important details and examples\n\
                   4. A conclusion summarizing the main takeaways\n\
                   Format the response as a natural, flowing narrative suitable for audio \
                   presentation.",
    content_budget: 2000,
    document_limit: Some(5),
    uses_language: true,
};

const VIDEO_OVERVIEW: ReportTemplate = ReportTemplate {
    task: "Create a video overview script for the following content. \
           Include visual cues and timing suggestions.",
    requirements: "Please provide:\n\
                   1. Opening hook (0-10 seconds)\n\
                   2. Main content sections with visual suggestions\n\
                   3. Key points with timing\n\
                   4. Closing summary (last 10 seconds)\n\
                   Format as a video script with timestamps and visual cues.",
    content_budget: 2000,
    document_limit: Some(5),
    uses_language: false,
};

const MIND_MAP: ReportTemplate = ReportTemplate {
    task: "Create a mind map structure for the following content. \
           Organize information hierarchically.",
    requirements: "Please provide a JSON structure representing the mind map with:\n\
                   - Main topic (center)\n\
                   - Primary branches (major themes)\n\
                   - Secondary branches (subtopics)\n\
                   - Tertiary branches (details)\n\
                   Format as JSON with nested structure.",
    content_budget: 2000,
    document_limit: Some(5),
    uses_language: false,
};

const REPORT: ReportTemplate = ReportTemplate {
    task: "Create a comprehensive report based on the following content.",
    requirements: "Please provide:\n\
                   1. Executive Summary\n\
                   2. Key Findings\n\
                   3. Detailed Analysis\n\
                   4. Conclusions\n\
                   5. Recommendations\n\
                   Format as a professional report with clear sections and bullet points.",
    content_budget: 3000,
    document_limit: None,
    uses_language: false,
};

const FLASHCARDS: ReportTemplate = ReportTemplate {
    task: "Create flashcards based on the following content. Generate 10-15 flashcards.",
    requirements: "Format each flashcard as:\n\
                   Front: [Question or term]\n\
                   Back: [Answer or definition]\n\
                   Provide flashcards covering the most important concepts.",
    content_budget: 2000,
    document_limit: Some(5),
    uses_language: false,
};

const QUIZ: ReportTemplate = ReportTemplate {
    task: "Create a quiz based on the following content. Generate 10 multiple choice questions.",
    requirements: "Format each question as:\n\
                   Question: [Question text]\n\
                   A) [Option 1]\n\
                   B) [Option 2]\n\
                   C) [Option 3]\n\
                   D) [Option 4]\n\
                   Answer: [Correct answer]\n\
                   Explanation: [Brief explanation]\n\
                   Include questions of varying difficulty levels.",
    content_budget: 2000,
    document_limit: Some(5),
    uses_language: false,
};

/// Per-request studio options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioOptions {
    /// Output language for kinds that take one.
    pub language: String,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self { language: "English".to_string() }
    }
}

impl StudioOptions {
    /// Options with the given language.
    pub fn with_language(language: impl Into<String>) -> Self {
        Self { language: language.into() }
    }
}

/// A generated piece of study material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioOutput {
    /// What was generated.
    pub kind: ReportKind,
    /// The generated text, or a message explaining why there is none.
    pub content: String,
    /// When generation finished.
    pub created_at: DateTime<Utc>,
}

/// Generates study material from a document set with a hosted model.
pub struct Studio {
    model: Arc<dyn ChatModel>,
}

impl Studio {
    /// Create a studio backed by `model`.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Render the prompt for `kind`, or `None` when there are no documents.
    pub fn render_prompt(
        kind: ReportKind,
        documents: &[Document],
        options: &StudioOptions,
    ) -> Option<String> {
        if documents.is_empty() {
            return None;
        }
        let template = kind.template();

        let selected = match template.document_limit {
            Some(limit) => &documents[..documents.len().min(limit)],
            None => documents,
        };
        let text: Vec<&str> = selected.iter().map(|d| d.text.as_str()).collect();
        let content: String = text.join("\n").chars().take(template.content_budget).collect();

        let task = if template.uses_language {
            template.task.replace("{language}", &options.language)
        } else {
            template.task.to_string()
        };

        Some(format!("{task}\n\nContent:\n{content}...\n\n{}", template.requirements))
    }

    /// Generate `kind` over `documents`.
    ///
    /// Never fails: an empty document set or a model error is reported in
    /// [`StudioOutput::content`].
    pub async fn generate(
        &self,
        kind: ReportKind,
        documents: &[Document],
        options: &StudioOptions,
    ) -> StudioOutput {
        let content = match Self::render_prompt(kind, documents, options) {
            None => {
                format!("No documents available for {} generation.", kind.title().to_lowercase())
            }
            Some(prompt) => match self.model.generate(&prompt).await {
                Ok(content) => {
                    info!(kind = %kind, documents = documents.len(), "generated studio output");
                    content
                }
                Err(e) => {
                    error!(kind = %kind, error = %e, "studio generation failed");
                    format!("Error generating {}: {e}", kind.title().to_lowercase())
                }
            },
        };

        StudioOutput { kind, content, created_at: Utc::now() }
    }

    /// Like [`generate`](Studio::generate) but surfacing model errors.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotIngested`] for an empty document set and
    /// propagates [`RagError::Generation`].
    pub async fn try_generate(
        &self,
        kind: ReportKind,
        documents: &[Document],
        options: &StudioOptions,
    ) -> Result<StudioOutput> {
        let prompt =
            Self::render_prompt(kind, documents, options).ok_or(RagError::NotIngested)?;
        let content = self.model.generate(&prompt).await?;
        Ok(StudioOutput { kind, content, created_at: Utc::now() })
    }
}
