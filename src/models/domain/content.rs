use async_graphql::Enum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selects the prompt template and the payload shape of a generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Notes,
    Summary,
    DiagramDescription,
    VideoScript,
    Quiz,
    Flashcards,
    LessonPlan,
    Homework,
    DoubtAnswer,
}

impl ContentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "notes" => Some(ContentType::Notes),
            "summary" => Some(ContentType::Summary),
            "diagram_description" | "diagram" => Some(ContentType::DiagramDescription),
            "video_script" => Some(ContentType::VideoScript),
            "quiz" => Some(ContentType::Quiz),
            "flashcards" | "flashcard" => Some(ContentType::Flashcards),
            "lesson_plan" => Some(ContentType::LessonPlan),
            "homework" => Some(ContentType::Homework),
            "doubt_answer" | "doubt" => Some(ContentType::DoubtAnswer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Notes => "notes",
            ContentType::Summary => "summary",
            ContentType::DiagramDescription => "diagram_description",
            ContentType::VideoScript => "video_script",
            ContentType::Quiz => "quiz",
            ContentType::Flashcards => "flashcards",
            ContentType::LessonPlan => "lesson_plan",
            ContentType::Homework => "homework",
            ContentType::DoubtAnswer => "doubt_answer",
        }
    }

    /// Prose types produced by a single template prompt.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ContentType::Notes
                | ContentType::Summary
                | ContentType::DiagramDescription
                | ContentType::VideoScript
        )
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Anything other than easy/medium/hard maps to medium.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && self.correct < self.options.len()
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.options.get(self.correct).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct QuizPayload {
    pub questions: Vec<QuizQuestion>,
}

impl QuizPayload {
    pub fn placeholder(topic: &str, explanation: &str) -> Self {
        QuizPayload {
            questions: vec![QuizQuestion {
                question: format!("Sample question about {}?", topic),
                options: vec![
                    "Option A".to_string(),
                    "Option B".to_string(),
                    "Option C".to_string(),
                    "Option D".to_string(),
                ],
                correct: 0,
                explanation: explanation.to_string(),
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct FlashcardDeck {
    pub cards: Vec<Flashcard>,
}

impl FlashcardDeck {
    pub fn placeholder(topic: &str) -> Self {
        FlashcardDeck {
            cards: vec![Flashcard {
                front: format!("What is {}?", topic),
                back: format!("Definition of {}", topic),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_parse_accepts_wire_names() {
        for content_type in [
            ContentType::Notes,
            ContentType::Summary,
            ContentType::DiagramDescription,
            ContentType::VideoScript,
            ContentType::Quiz,
            ContentType::Flashcards,
            ContentType::LessonPlan,
            ContentType::Homework,
            ContentType::DoubtAnswer,
        ] {
            assert_eq!(ContentType::parse(content_type.as_str()), Some(content_type));
        }
        assert_eq!(ContentType::parse("podcast"), None);
    }

    #[test]
    fn difficulty_defaults_to_medium() {
        assert_eq!(Difficulty::parse_or_default("HARD"), Difficulty::Hard);
        assert_eq!(Difficulty::parse_or_default("expert"), Difficulty::Medium);
    }

    #[test]
    fn quiz_question_well_formedness() {
        let mut question = QuizQuestion {
            question: "2 + 2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            correct: 1,
            explanation: String::new(),
        };
        assert!(question.is_well_formed());
        assert_eq!(question.correct_answer(), Some("4"));

        question.correct = 2;
        assert!(!question.is_well_formed());
    }

    #[test]
    fn quiz_question_explanation_is_optional_on_input() {
        let parsed: QuizQuestion =
            serde_json::from_str(r#"{"question":"Q?","options":["a","b"],"correct":0}"#).unwrap();
        assert!(parsed.explanation.is_empty());
    }
}
