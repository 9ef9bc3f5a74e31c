use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::{
    config::Config,
    models::domain::{Difficulty, QuizPayload, QuizQuestion},
    services::{
        content_generator::ContentGenerator,
        http_helpers::{build_client, SourceError},
        text_helpers::decode_entities,
    },
};

/// Open Trivia DB caps a single request at 50 questions.
pub const MAX_TRIVIA_BATCH: usize = 50;
pub const GENERAL_KNOWLEDGE: u32 = 9;

/// Checked in order; the first keyword contained in the topic wins.
const CATEGORY_TABLE: &[(&str, u32)] = &[
    ("science", 17),
    ("mathematics", 19),
    ("computers", 18),
    ("history", 23),
    ("geography", 22),
    ("sports", 21),
    ("animals", 27),
    ("mythology", 20),
    ("politics", 24),
    ("art", 25),
    ("celebrities", 26),
    ("vehicles", 28),
    ("general", GENERAL_KNOWLEDGE),
];

const NO_SOURCE_EXPLANATION: &str =
    "This is a placeholder question. Please configure internet quiz sources or AI generator.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriviaQuestion {
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<TriviaQuestion>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TriviaSource: Send + Sync {
    /// Multiple-choice questions with HTML-encoded text. An empty list means
    /// the source had nothing for this request.
    async fn fetch(
        &self,
        category: u32,
        amount: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<TriviaQuestion>, SourceError>;
}

pub struct OpenTdbClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenTdbClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            base_url: base_url.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        Self::new(&config.opentdb_url, config.http_timeout_secs)
    }
}

#[async_trait]
impl TriviaSource for OpenTdbClient {
    async fn fetch(
        &self,
        category: u32,
        amount: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<TriviaQuestion>, SourceError> {
        let response: TriviaResponse = self
            .client
            .get(&self.base_url)
            .query(&[
                ("amount", amount.min(MAX_TRIVIA_BATCH).to_string()),
                ("type", "multiple".to_string()),
                ("difficulty", difficulty.as_str().to_string()),
                ("category", category.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.response_code != 0 {
            log::debug!(
                "Open Trivia DB answered with response_code {} for category {}",
                response.response_code,
                category
            );
            return Ok(Vec::new());
        }

        Ok(response.results)
    }
}

/// Case-insensitive keyword lookup; unknown topics map to general knowledge.
pub fn category_for_topic(topic: &str) -> u32 {
    let topic = topic.to_lowercase();
    CATEGORY_TABLE
        .iter()
        .find(|(keyword, _)| topic.contains(keyword))
        .map(|(_, category)| *category)
        .unwrap_or(GENERAL_KNOWLEDGE)
}

/// Decodes entities and shuffles the answers, tracking where the correct one lands.
pub fn format_trivia_question(question: TriviaQuestion) -> QuizQuestion {
    let correct_answer = decode_entities(&question.correct_answer).into_owned();

    let mut options: Vec<String> = question
        .incorrect_answers
        .iter()
        .map(|answer| decode_entities(answer).into_owned())
        .collect();
    options.push(correct_answer.clone());
    options.shuffle(&mut rand::rng());

    let correct = options
        .iter()
        .position(|option| *option == correct_answer)
        .unwrap_or(options.len() - 1);

    QuizQuestion {
        question: decode_entities(&question.question).into_owned(),
        options,
        correct,
        explanation: format!("The correct answer is {}.", correct_answer),
    }
}

/// A resolved quiz and whether any of its questions came from the trivia
/// service.
#[derive(Debug, Clone)]
pub struct SourcedQuiz {
    pub quiz: QuizPayload,
    pub from_trivia: bool,
}

/// Trivia service first, then the generator for whatever is missing.
pub struct QuizSourceResolver {
    trivia: Arc<dyn TriviaSource>,
    generator: Option<Arc<ContentGenerator>>,
}

impl QuizSourceResolver {
    pub fn new(trivia: Arc<dyn TriviaSource>, generator: Option<Arc<ContentGenerator>>) -> Self {
        Self { trivia, generator }
    }

    pub async fn fetch_quiz(
        &self,
        topic: &str,
        num_questions: usize,
        difficulty: Difficulty,
    ) -> SourcedQuiz {
        let category = category_for_topic(topic);
        let fetched = match self
            .trivia
            .fetch(category, num_questions.min(MAX_TRIVIA_BATCH), difficulty)
            .await
        {
            Ok(questions) => questions,
            Err(e) => {
                log::warn!("Trivia fetch for '{}' failed: {}", topic, e);
                Vec::new()
            }
        };

        let mut questions: Vec<QuizQuestion> =
            fetched.into_iter().map(format_trivia_question).collect();

        if questions.len() >= num_questions {
            questions.truncate(num_questions);
            return SourcedQuiz {
                quiz: QuizPayload { questions },
                from_trivia: true,
            };
        }

        if !questions.is_empty() {
            let shortfall = num_questions - questions.len();
            if let Some(generator) = &self.generator {
                log::info!(
                    "Trivia returned {} of {} questions for '{}'; generating {} more",
                    questions.len(),
                    num_questions,
                    topic,
                    shortfall
                );
                let extra = generator.generate_quiz(topic, shortfall, difficulty).await;
                questions.extend(extra.questions.into_iter().take(shortfall));
            }
            return SourcedQuiz {
                quiz: QuizPayload { questions },
                from_trivia: true,
            };
        }

        let quiz = match &self.generator {
            Some(generator) => {
                log::info!("No trivia questions for '{}'; falling back to generation", topic);
                generator.generate_quiz(topic, num_questions, difficulty).await
            }
            None => QuizPayload::placeholder(topic, NO_SOURCE_EXPLANATION),
        };
        SourcedQuiz {
            quiz,
            from_trivia: false,
        }
    }
}
