//! Renders generated content into downloadable documents.
//!
//! Every format works from the same [`ExportDocument`]: a title and a list of
//! paragraphs pulled out of the stored payload.

pub mod docx;
pub mod pdf;
pub mod pptx;

use std::path::PathBuf;

use chrono::Local;
use serde_json::Value;
use thiserror::Error;

use crate::{
    models::domain::{FlashcardDeck, QuizPayload},
    services::text_helpers::normalize_breaks,
};

pub const DEFAULT_TITLE: &str = "Educational Content";

/// Payload keys that hold the main prose, in order of preference.
const BODY_KEYS: [&str; 6] = ["content", "script", "description", "plan", "homework", "answer"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("PDF generation error: {0}")]
    PdfError(String),
    #[error("DOCX generation error: {0}")]
    DocxError(String),
    #[error("PPTX generation error: {0}")]
    PptxError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
    Pptx,
}

impl ExportFormat {
    /// `None` means the default, PDF.
    pub fn parse(value: Option<&str>) -> Result<Self, ExportError> {
        let Some(value) = value else {
            return Ok(ExportFormat::Pdf);
        };

        match value.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            "ppt" | "pptx" => Ok(ExportFormat::Pptx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Pptx => "pptx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub title: String,
    pub paragraphs: Vec<String>,
}

impl ExportDocument {
    /// The title comes from the payload's `topic`, then `fallback_title`,
    /// then [`DEFAULT_TITLE`].
    pub fn from_payload(payload: &Value, fallback_title: Option<&str>) -> Self {
        let title = payload
            .get("topic")
            .and_then(Value::as_str)
            .filter(|topic| !topic.trim().is_empty())
            .or(fallback_title)
            .unwrap_or(DEFAULT_TITLE)
            .to_string();

        let body = normalize_breaks(&body_text(payload)).replace("\r\n", "\n");
        let paragraphs = body
            .split("\n\n")
            .map(str::trim)
            .filter(|paragraph| !paragraph.is_empty())
            .map(str::to_string)
            .collect();

        Self { title, paragraphs }
    }
}

fn body_text(payload: &Value) -> String {
    if let Some(text) = BODY_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
    {
        return text.to_string();
    }

    if payload.get("questions").is_some() {
        if let Ok(quiz) = serde_json::from_value::<QuizPayload>(payload.clone()) {
            return render_quiz(&quiz);
        }
    }

    if payload.get("cards").is_some() {
        if let Ok(deck) = serde_json::from_value::<FlashcardDeck>(payload.clone()) {
            return render_flashcards(&deck);
        }
    }

    match payload {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

fn render_quiz(quiz: &QuizPayload) -> String {
    quiz.questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let mut block = format!("{}. {}", i + 1, question.question);
            for (j, option) in question.options.iter().enumerate() {
                let label = char::from(b'A' + (j % 26) as u8);
                block.push_str(&format!("\n{}) {}", label, option));
            }
            if let Some(answer) = question.correct_answer() {
                block.push_str(&format!("\nAnswer: {}", answer));
            }
            if !question.explanation.is_empty() {
                block.push_str(&format!("\n{}", question.explanation));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_flashcards(deck: &FlashcardDeck) -> String {
    deck.cards
        .iter()
        .map(|card| format!("Front: {}\nBack: {}", card.front, card.back))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ExportWriter {
    exports_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            exports_dir: exports_dir.into(),
        }
    }

    pub fn render(document: &ExportDocument, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Pdf => pdf::render(document),
            ExportFormat::Docx => docx::render(document),
            ExportFormat::Pptx => pptx::render(document, Local::now().date_naive()),
        }
    }

    /// Renders the payload and writes it to the exports directory as
    /// `edumentor_export_{timestamp}.{ext}`.
    pub async fn export(
        &self,
        payload: &Value,
        fallback_title: Option<&str>,
        format: ExportFormat,
    ) -> Result<ExportedFile, ExportError> {
        let document = ExportDocument::from_payload(payload, fallback_title);
        let bytes = Self::render(&document, format)?;

        tokio::fs::create_dir_all(&self.exports_dir).await?;
        let file_name = format!(
            "edumentor_export_{}.{}",
            Local::now().format("%Y%m%d_%H%M%S"),
            format.extension()
        );
        let path = self.exports_dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;

        log::info!(
            "Exported '{}' as {} ({} bytes) to {}",
            document.title,
            format.extension(),
            bytes.len(),
            path.display()
        );

        Ok(ExportedFile {
            file_name,
            path,
            format,
            bytes,
        })
    }
}
