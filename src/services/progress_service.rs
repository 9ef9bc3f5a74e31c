use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::AppResult,
    models::{
        domain::{progress::adaptive_difficulty, Difficulty, Progress},
        dto::{
            request::ProgressUpdateRequest,
            response::{AdaptiveDifficultyDto, ProgressEntryDto},
        },
    },
    repositories::ProgressRepository,
};

pub struct ProgressService {
    repository: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    pub fn new(repository: Arc<dyn ProgressRepository>) -> Self {
        Self { repository }
    }

    /// Appends a progress row; earlier rows for the topic are kept as history.
    pub async fn record(
        &self,
        user_id: &str,
        request: ProgressUpdateRequest,
    ) -> AppResult<ProgressEntryDto> {
        request.validate()?;

        let progress = Progress::new(
            user_id,
            request.topic.trim(),
            request.difficulty(),
            request.score,
        );
        let saved = self.repository.create(progress).await?;

        log::info!(
            "Recorded score {} on '{}' for user {}",
            saved.score,
            saved.topic,
            user_id
        );
        Ok(saved.into())
    }

    pub async fn list(&self, user_id: &str) -> AppResult<Vec<ProgressEntryDto>> {
        let rows = self.repository.find_by_user(user_id).await?;
        Ok(rows.into_iter().map(ProgressEntryDto::from).collect())
    }

    pub async fn suggest_difficulty(&self, user_id: &str, topic: &str) -> AppResult<Difficulty> {
        let history = self
            .repository
            .find_by_user_and_topic(user_id, topic.trim())
            .await?;
        let scores: Vec<f64> = history.iter().map(|row| row.score).collect();
        Ok(adaptive_difficulty(&scores))
    }

    pub async fn adaptive(&self, user_id: &str, topic: &str) -> AppResult<AdaptiveDifficultyDto> {
        Ok(AdaptiveDifficultyDto {
            topic: topic.trim().to_string(),
            suggested_difficulty: self.suggest_difficulty(user_id, topic).await?,
        })
    }
}
