use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use schemars::schema_for;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    constants::prompts::SYSTEM_PROMPT,
    models::domain::{FlashcardDeck, QuizPayload},
};

const TEMPERATURE: f32 = 0.7;

/// Shape the caller expects back. Structured shapes are requested with a JSON
/// schema response format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    Text,
    Quiz,
    Flashcards,
}

impl ReplyFormat {
    pub fn response_format(&self) -> Option<Value> {
        let (name, schema) = match self {
            ReplyFormat::Text => return None,
            ReplyFormat::Quiz => ("quiz", schema_for!(QuizPayload)),
            ReplyFormat::Flashcards => ("flashcards", schema_for!(FlashcardDeck)),
        };

        Some(json!({
            "type": "json_schema",
            "json_schema": { "name": name, "schema": schema }
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub format: ReplyFormat,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, format: ReplyFormat) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            format,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Api(String),

    #[error("completion reply had no content")]
    EmptyReply,
}

/// A single prompt-in, text-out call to a language model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

pub struct OpenAiCompletion {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(api_key: &SecretString, model: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": request.prompt }
            ],
            "max_tokens": request.max_tokens,
            "temperature": TEMPERATURE
        });

        if let Some(response_format) = request.format.response_format() {
            body["response_format"] = response_format;
        }

        body
    }
}

#[async_trait]
impl TextCompletion for OpenAiCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = self.request_body(&request);

        let response: Value = self
            .client
            .chat()
            .create_byot(body)
            .await
            .map_err(|e| CompletionError::Api(e.to_string()))?;

        response["choices"][0]["message"]["content"]
            .as_str()
            .filter(|content| !content.trim().is_empty())
            .map(str::to_string)
            .ok_or(CompletionError::EmptyReply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_replies_have_no_response_format() {
        assert!(ReplyFormat::Text.response_format().is_none());
    }

    #[test]
    fn quiz_response_format_carries_schema() {
        let format = ReplyFormat::Quiz.response_format().unwrap();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "quiz");
        assert!(format["json_schema"]["schema"]["properties"]["questions"].is_object());
    }

    #[test]
    fn request_body_includes_system_prompt_and_budget() {
        let completion = OpenAiCompletion::new(&SecretString::from("sk-test".to_string()), "gpt-4o-mini");
        let body = completion.request_body(&CompletionRequest::new(
            "Explain gravity",
            2000,
            ReplyFormat::Flashcards,
        ));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["content"], "Explain gravity");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["response_format"]["json_schema"]["name"], "flashcards");
    }
}
