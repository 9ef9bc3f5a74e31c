use async_graphql::InputObject;
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::models::domain::{ContentType, Difficulty};

pub const DEFAULT_QUIZ_QUESTIONS: u32 = 10;
pub const DEFAULT_FLASHCARDS: u32 = 20;
pub const DEFAULT_LESSON_MINUTES: u32 = 60;
pub const MIN_PASSWORD_LENGTH: u64 = 6;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("is required".into()));
    }
    Ok(())
}

fn difficulty_or_default(value: &Option<String>) -> Difficulty {
    value
        .as_deref()
        .map(Difficulty::parse_or_default)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 80))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = MIN_PASSWORD_LENGTH, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub topic: String,

    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub difficulty: Option<String>,

    #[serde(default)]
    #[validate(length(min = 2, max = 16))]
    pub language: Option<String>,

    #[serde(default)]
    pub use_internet: Option<bool>,
}

impl GenerateRequest {
    pub fn content_type(&self) -> Option<ContentType> {
        match self.content_type.as_deref() {
            None => Some(ContentType::Notes),
            Some(value) => ContentType::parse(value),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        difficulty_or_default(&self.difficulty)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuizRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub topic: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 50))]
    pub num_questions: Option<u32>,

    #[serde(default)]
    pub difficulty: Option<String>,

    #[serde(default)]
    pub use_internet: Option<bool>,
}

impl QuizRequest {
    pub fn num_questions(&self) -> usize {
        self.num_questions.unwrap_or(DEFAULT_QUIZ_QUESTIONS) as usize
    }

    pub fn difficulty(&self) -> Difficulty {
        difficulty_or_default(&self.difficulty)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FlashcardsRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub topic: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 100))]
    pub num_cards: Option<u32>,
}

impl FlashcardsRequest {
    pub fn num_cards(&self) -> usize {
        self.num_cards.unwrap_or(DEFAULT_FLASHCARDS) as usize
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DoubtRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 4000))]
    pub question: String,

    #[serde(default)]
    #[validate(length(max = 8000))]
    pub context: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LessonPlanRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub topic: String,

    #[serde(default)]
    #[validate(range(min = 5, max = 480))]
    pub duration: Option<u32>,

    #[serde(default)]
    #[validate(length(min = 1, max = 50))]
    pub grade_level: Option<String>,
}

impl LessonPlanRequest {
    pub fn duration(&self) -> u32 {
        self.duration.unwrap_or(DEFAULT_LESSON_MINUTES)
    }

    pub fn grade_level(&self) -> &str {
        self.grade_level.as_deref().unwrap_or("middle")
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HomeworkRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub topic: String,

    #[serde(default)]
    pub difficulty: Option<String>,
}

impl HomeworkRequest {
    pub fn difficulty(&self) -> Difficulty {
        difficulty_or_default(&self.difficulty)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExportRequest {
    #[serde(default)]
    pub content_id: Option<String>,

    /// Inline payload, used when no `content_id` is given.
    #[serde(default)]
    pub content: Option<Value>,

    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct ProgressUpdateRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 200))]
    pub topic: String,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "Score must be between 0 and 100"))]
    pub score: f64,

    #[serde(default)]
    pub difficulty: Option<String>,
}

impl ProgressUpdateRequest {
    pub fn difficulty(&self) -> Difficulty {
        difficulty_or_default(&self.difficulty)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdaptiveDifficultyQuery {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub topic: String,
}
