use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::Progress};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn create(&self, progress: Progress) -> AppResult<Progress>;
    /// All rows for a user, newest first.
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<Progress>>;
    /// Rows for a user on one topic, newest first.
    async fn find_by_user_and_topic(&self, user_id: &str, topic: &str)
        -> AppResult<Vec<Progress>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoProgressRepository {
    collection: Collection<Progress>,
}

impl MongoProgressRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

// Timestamps are stored as RFC 3339 strings, so ordering happens here rather
// than in a Mongo sort.
fn newest_first(mut rows: Vec<Progress>) -> Vec<Progress> {
    rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    rows
}

#[async_trait]
impl ProgressRepository for MongoProgressRepository {
    async fn create(&self, progress: Progress) -> AppResult<Progress> {
        self.collection.insert_one(&progress).await?;
        Ok(progress)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<Progress>> {
        let cursor = self.collection.find(doc! { "user_id": user_id }).await?;
        let rows: Vec<Progress> = cursor.try_collect().await?;
        Ok(newest_first(rows))
    }

    async fn find_by_user_and_topic(
        &self,
        user_id: &str,
        topic: &str,
    ) -> AppResult<Vec<Progress>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id, "topic": topic })
            .await?;
        let rows: Vec<Progress> = cursor.try_collect().await?;
        Ok(newest_first(rows))
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let user_topic_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "topic": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_topic".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(user_topic_index).await?;
        log::info!("Created indexes for progress collection");
        Ok(())
    }
}
