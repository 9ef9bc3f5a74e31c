use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{Difficulty, GeneratedContent, Progress, User, UserRole};

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Body of a successful login or registration. The token is also set as the
/// session cookie.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ProgressEntryDto {
    pub id: String,
    pub topic: String,
    #[serde(rename = "difficulty")]
    pub difficulty_level: Difficulty,
    pub score: f64,
    pub completed_at: DateTime<Utc>,
}

impl From<Progress> for ProgressEntryDto {
    fn from(progress: Progress) -> Self {
        Self {
            id: progress.id,
            topic: progress.topic,
            difficulty_level: progress.difficulty_level,
            score: progress.score,
            completed_at: progress.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AdaptiveDifficultyDto {
    pub topic: String,
    pub suggested_difficulty: Difficulty,
}

/// Stored generation as exposed over GraphQL; `content` is the JSON payload text.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct GeneratedContentDto {
    pub id: String,
    pub content_type: String,
    pub topic: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<GeneratedContent> for GeneratedContentDto {
    fn from(content: GeneratedContent) -> Self {
        Self {
            id: content.id,
            content_type: content.content_type.as_str().to_string(),
            topic: content.topic,
            content: content.content,
            created_at: content.created_at,
        }
    }
}
