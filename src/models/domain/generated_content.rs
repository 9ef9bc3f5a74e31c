use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::domain::content::{ContentType, Difficulty};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub generated_from_internet: bool,
}

/// A generation result as stored. Rows are written once and never updated.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeneratedContent {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: Option<String>,
    pub content_type: ContentType,
    pub topic: String,
    /// JSON-serialized payload; its shape depends on `content_type`.
    pub content: String,
    #[serde(default)]
    pub metadata: ContentMetadata,
    pub created_at: DateTime<Utc>,
}

impl GeneratedContent {
    pub fn new(
        user_id: Option<&str>,
        content_type: ContentType,
        topic: &str,
        payload: &Value,
        metadata: ContentMetadata,
    ) -> Result<Self, serde_json::Error> {
        Ok(GeneratedContent {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(str::to_string),
            content_type,
            topic: topic.to_string(),
            content: serde_json::to_string(payload)?,
            metadata,
            created_at: Utc::now(),
        })
    }

    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_round_trips_through_stored_string() {
        let payload = json!({"type": "notes", "topic": "Cells", "content": "Cells are small."});
        let stored = GeneratedContent::new(
            Some("user-1"),
            ContentType::Notes,
            "Cells",
            &payload,
            ContentMetadata {
                difficulty: Some(Difficulty::Easy),
                language: Some("en".to_string()),
                generated_from_internet: false,
            },
        )
        .unwrap();

        assert_eq!(stored.user_id.as_deref(), Some("user-1"));
        assert_eq!(stored.payload().unwrap(), payload);
    }

    #[test]
    fn stored_document_uses_mongo_id_field() {
        let stored = GeneratedContent::new(
            None,
            ContentType::Quiz,
            "Rust",
            &json!({"questions": []}),
            ContentMetadata::default(),
        )
        .unwrap();

        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value["_id"], json!(stored.id));
        assert_eq!(value["content_type"], json!("quiz"));
    }
}
