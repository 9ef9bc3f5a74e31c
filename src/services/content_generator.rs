use std::sync::Arc;

use serde_json::{json, Value};

use crate::{
    config::Config,
    constants::prompts,
    models::domain::{
        ContentType, Difficulty, Flashcard, FlashcardDeck, QuizPayload, QuizQuestion,
    },
    services::{
        completion::{CompletionRequest, OpenAiCompletion, ReplyFormat, TextCompletion},
        text_helpers::strip_code_fences,
    },
};

pub const TEXT_TOKENS: u32 = 2000;
pub const QUIZ_TOKENS: u32 = 3000;
pub const LESSON_PLAN_TOKENS: u32 = 2500;

const MOCK_TEXT: &str =
    "This is a sample generated content. Please configure OpenAI API key for full functionality.";

/// Builds prompts per content type and turns completion replies into payloads.
///
/// Without a completion backend the generator stays in mock mode and answers
/// every call with a canned reply of the expected shape. A failed completion
/// call falls back to the same canned reply, so generation never fails.
#[derive(Clone)]
pub struct ContentGenerator {
    completion: Option<Arc<dyn TextCompletion>>,
}

impl ContentGenerator {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self {
            completion: Some(completion),
        }
    }

    pub fn mock() -> Self {
        Self { completion: None }
    }

    pub fn from_config(config: &Config) -> Self {
        match &config.openai_api_key {
            Some(api_key) => {
                log::info!("Content generation uses model '{}'", config.openai_model);
                Self::new(Arc::new(OpenAiCompletion::new(api_key, &config.openai_model)))
            }
            None => {
                log::warn!("OPENAI_API_KEY is not set; content generation runs in mock mode");
                Self::mock()
            }
        }
    }

    pub fn is_mock(&self) -> bool {
        self.completion.is_none()
    }

    async fn call(&self, prompt: String, max_tokens: u32, format: ReplyFormat) -> String {
        let Some(completion) = &self.completion else {
            return mock_reply(format);
        };

        match completion
            .complete(CompletionRequest::new(prompt, max_tokens, format))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Completion failed, using placeholder reply: {}", e);
                mock_reply(format)
            }
        }
    }

    /// Sends a prompt as-is, bypassing the templates.
    pub async fn complete_raw(&self, prompt: &str, max_tokens: u32) -> String {
        self.call(prompt.to_string(), max_tokens, ReplyFormat::Text)
            .await
    }

    pub async fn generate(
        &self,
        topic: &str,
        content_type: ContentType,
        difficulty: Difficulty,
        language: &str,
    ) -> Value {
        let mut prompt = prompts::text_prompt(topic, content_type, difficulty);
        if let Some(instruction) = prompts::language_instruction(language) {
            prompt.push(' ');
            prompt.push_str(&instruction);
        }

        let result = self.call(prompt, TEXT_TOKENS, ReplyFormat::Text).await;
        text_payload(topic, content_type, difficulty, result)
    }

    pub async fn generate_quiz(
        &self,
        topic: &str,
        num_questions: usize,
        difficulty: Difficulty,
    ) -> QuizPayload {
        let prompt = prompts::quiz_prompt(topic, num_questions, difficulty);
        let reply = self.call(prompt, QUIZ_TOKENS, ReplyFormat::Quiz).await;
        parse_quiz(&reply, topic, num_questions)
    }

    pub async fn generate_flashcards(&self, topic: &str, num_cards: usize) -> FlashcardDeck {
        let prompt = prompts::flashcards_prompt(topic, num_cards);
        let reply = self.call(prompt, TEXT_TOKENS, ReplyFormat::Flashcards).await;
        parse_flashcards(&reply, topic, num_cards)
    }

    pub async fn solve_doubt(&self, question: &str, context: &str) -> Value {
        let answer = self
            .call(prompts::doubt_prompt(question, context), TEXT_TOKENS, ReplyFormat::Text)
            .await;

        json!({
            "question": question,
            "answer": answer,
            "context": context,
        })
    }

    pub async fn generate_lesson_plan(&self, topic: &str, duration: u32, grade_level: &str) -> Value {
        let plan = self
            .call(
                prompts::lesson_plan_prompt(topic, duration, grade_level),
                LESSON_PLAN_TOKENS,
                ReplyFormat::Text,
            )
            .await;

        json!({
            "topic": topic,
            "duration": duration,
            "grade_level": grade_level,
            "plan": plan,
        })
    }

    pub async fn generate_homework(&self, topic: &str, difficulty: Difficulty) -> Value {
        let homework = self
            .call(prompts::homework_prompt(topic, difficulty), TEXT_TOKENS, ReplyFormat::Text)
            .await;

        json!({
            "topic": topic,
            "difficulty": difficulty,
            "homework": homework,
        })
    }
}

fn mock_reply(format: ReplyFormat) -> String {
    match format {
        ReplyFormat::Text => MOCK_TEXT.to_string(),
        ReplyFormat::Quiz => json!({
            "questions": [{
                "question": "What is the main topic?",
                "options": ["Option A", "Option B", "Option C", "Option D"],
                "correct": 0,
                "explanation": "This is a sample explanation."
            }]
        })
        .to_string(),
        ReplyFormat::Flashcards => json!({
            "cards": [{ "front": "Question?", "back": "Answer" }]
        })
        .to_string(),
    }
}

fn text_payload(topic: &str, content_type: ContentType, difficulty: Difficulty, result: String) -> Value {
    match content_type {
        ContentType::DiagramDescription => json!({
            "type": "diagram",
            "topic": topic,
            "description": result,
            "difficulty": difficulty,
        }),
        ContentType::VideoScript => json!({
            "type": "video_script",
            "topic": topic,
            "script": result,
            "difficulty": difficulty,
        }),
        other => json!({
            "type": other.as_str(),
            "topic": topic,
            "content": result,
            "difficulty": difficulty,
        }),
    }
}

/// Malformed replies, and replies with no usable question, become a single
/// placeholder question.
pub fn parse_quiz(reply: &str, topic: &str, limit: usize) -> QuizPayload {
    let parsed = serde_json::from_str::<QuizPayload>(strip_code_fences(reply));

    let mut questions: Vec<QuizQuestion> = match parsed {
        Ok(payload) => payload
            .questions
            .into_iter()
            .filter(QuizQuestion::is_well_formed)
            .collect(),
        Err(e) => {
            log::debug!("Quiz reply is not valid JSON: {}", e);
            Vec::new()
        }
    };

    questions.truncate(limit);
    if questions.is_empty() {
        return QuizPayload::placeholder(topic, "Sample explanation");
    }

    QuizPayload { questions }
}

pub fn parse_flashcards(reply: &str, topic: &str, limit: usize) -> FlashcardDeck {
    let parsed = serde_json::from_str::<FlashcardDeck>(strip_code_fences(reply));

    let mut cards: Vec<Flashcard> = match parsed {
        Ok(deck) => deck
            .cards
            .into_iter()
            .filter(|card| !card.front.trim().is_empty())
            .collect(),
        Err(e) => {
            log::debug!("Flashcard reply is not valid JSON: {}", e);
            Vec::new()
        }
    };

    cards.truncate(limit);
    if cards.is_empty() {
        return FlashcardDeck::placeholder(topic);
    }

    FlashcardDeck { cards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::{CompletionError, MockTextCompletion};

    fn generator_replying(reply: &'static str) -> ContentGenerator {
        let mut completion = MockTextCompletion::new();
        completion
            .expect_complete()
            .times(1)
            .returning(move |_| Ok(reply.to_string()));
        ContentGenerator::new(Arc::new(completion))
    }

    #[tokio::test]
    async fn mock_mode_payloads_have_type_specific_keys() {
        let generator = ContentGenerator::mock();
        assert!(generator.is_mock());

        let cases = [
            (ContentType::Notes, "notes", "content"),
            (ContentType::Summary, "summary", "content"),
            (ContentType::DiagramDescription, "diagram", "description"),
            (ContentType::VideoScript, "video_script", "script"),
        ];

        for (content_type, type_name, body_key) in cases {
            let payload = generator
                .generate("Photosynthesis", content_type, Difficulty::Easy, "en")
                .await;
            assert_eq!(payload["type"], type_name);
            assert_eq!(payload["topic"], "Photosynthesis");
            assert_eq!(payload["difficulty"], "easy");
            assert!(payload[body_key].as_str().is_some_and(|s| !s.is_empty()));
        }
    }

    #[tokio::test]
    async fn mock_mode_structured_payloads() {
        let generator = ContentGenerator::mock();

        let quiz = generator.generate_quiz("Rust", 5, Difficulty::Medium).await;
        assert_eq!(quiz.questions.len(), 1);
        assert!(quiz.questions[0].is_well_formed());

        let deck = generator.generate_flashcards("Rust", 5).await;
        assert_eq!(deck.cards[0].front, "Question?");

        let doubt = generator.solve_doubt("Why?", "").await;
        assert_eq!(doubt["question"], "Why?");
        assert!(doubt["answer"].is_string());

        let plan = generator.generate_lesson_plan("Fractions", 45, "primary").await;
        assert_eq!(plan["duration"], 45);
        assert_eq!(plan["grade_level"], "primary");

        let homework = generator.generate_homework("Fractions", Difficulty::Hard).await;
        assert_eq!(homework["difficulty"], "hard");
        assert!(homework["homework"].is_string());
    }

    #[tokio::test]
    async fn non_english_requests_carry_translation_instruction() {
        let mut completion = MockTextCompletion::new();
        completion
            .expect_complete()
            .withf(|request| {
                request.prompt.ends_with("Translate the content to es.")
                    && request.max_tokens == TEXT_TOKENS
                    && request.format == ReplyFormat::Text
            })
            .times(1)
            .returning(|_| Ok("Apuntes".to_string()));

        let generator = ContentGenerator::new(Arc::new(completion));
        let payload = generator
            .generate("Cells", ContentType::Notes, Difficulty::Medium, "es")
            .await;
        assert_eq!(payload["content"], "Apuntes");
    }

    #[tokio::test]
    async fn completion_failure_falls_back_to_placeholder() {
        let mut completion = MockTextCompletion::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_| Err(CompletionError::Api("timeout".to_string())));

        let generator = ContentGenerator::new(Arc::new(completion));
        let payload = generator
            .generate("Cells", ContentType::Summary, Difficulty::Medium, "en")
            .await;
        assert_eq!(payload["content"], MOCK_TEXT);
    }

    #[tokio::test]
    async fn fenced_quiz_reply_is_parsed_and_truncated() {
        let generator = generator_replying(
            "```json\n{\"questions\": [\
             {\"question\": \"Q1?\", \"options\": [\"a\", \"b\"], \"correct\": 1, \"explanation\": \"b\"},\
             {\"question\": \"Q2?\", \"options\": [\"a\", \"b\"], \"correct\": 0},\
             {\"question\": \"Q3?\", \"options\": [\"a\", \"b\"], \"correct\": 0}]}\n```",
        );

        let quiz = generator.generate_quiz("Rust", 2, Difficulty::Medium).await;
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.questions[0].correct_answer(), Some("b"));
    }

    #[tokio::test]
    async fn malformed_flashcard_reply_becomes_placeholder() {
        let generator = generator_replying("Here are your flashcards: front/back");
        let deck = generator.generate_flashcards("Mitosis", 10).await;
        assert_eq!(deck, FlashcardDeck::placeholder("Mitosis"));
    }

    #[test]
    fn out_of_bounds_questions_are_dropped() {
        let reply = r#"{"questions": [
            {"question": "Bad?", "options": ["a"], "correct": 3},
            {"question": "Good?", "options": ["a", "b"], "correct": 1}
        ]}"#;
        let quiz = parse_quiz(reply, "Topic", 10);
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].question, "Good?");
    }

    #[test]
    fn quiz_with_missing_keys_becomes_placeholder() {
        let quiz = parse_quiz(r#"{"items": []}"#, "Topic", 10);
        assert_eq!(quiz.questions[0].question, "Sample question about Topic?");
    }
}
