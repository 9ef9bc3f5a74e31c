use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::GeneratedContent};

/// Generated content is append-only: there is no update or delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn create(&self, content: GeneratedContent) -> AppResult<GeneratedContent>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedContent>>;
    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<GeneratedContent>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoContentRepository {
    collection: Collection<GeneratedContent>,
}

impl MongoContentRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl ContentRepository for MongoContentRepository {
    async fn create(&self, content: GeneratedContent) -> AppResult<GeneratedContent> {
        self.collection.insert_one(&content).await?;
        Ok(content)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedContent>> {
        let content = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(content)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<GeneratedContent>> {
        let cursor = self.collection.find(doc! { "user_id": user_id }).await?;
        let mut items: Vec<GeneratedContent> = cursor.try_collect().await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let user_index = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(IndexOptions::builder().name("user_id".to_string()).build())
            .build();

        self.collection.create_index(user_index).await?;
        log::info!("Created indexes for generated content collection");
        Ok(())
    }
}
