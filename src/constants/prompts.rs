use crate::models::domain::{ContentType, Difficulty};

pub const SYSTEM_PROMPT: &str = "You are an expert educational content creator.";

pub const QUIZ_JSON_SHAPE: &str = r#"Format as JSON with this structure:
{
    "questions": [
        {
            "question": "Question text",
            "options": ["A", "B", "C", "D"],
            "correct": 0,
            "explanation": "Why this answer is correct"
        }
    ]
}"#;

pub const FLASHCARD_JSON_SHAPE: &str = r#"Format as JSON:
{
    "cards": [
        {"front": "Question or term", "back": "Answer or definition"}
    ]
}"#;

/// Appended when the requested language is not English.
pub fn language_instruction(language: &str) -> Option<String> {
    (language != "en").then(|| format!("Translate the content to {}.", language))
}

/// Template for the four prose content types. Anything else gets the notes template.
pub fn text_prompt(topic: &str, content_type: ContentType, difficulty: Difficulty) -> String {
    match content_type {
        ContentType::Summary => format!(
            "Create a concise summary of '{topic}' for {difficulty} level. \
             Include main points and key takeaways."
        ),
        ContentType::DiagramDescription => format!(
            "Describe a visual diagram or concept map for '{topic}' suitable for {difficulty} level. \
             Include what elements should be shown and how they connect."
        ),
        ContentType::VideoScript => format!(
            "Create an engaging video script for teaching '{topic}' to {difficulty} level students. \
             Include introduction, main content, examples, and conclusion."
        ),
        _ => format!(
            "Create comprehensive study notes on '{topic}' suitable for {difficulty} level students. \
             Include key concepts, definitions, examples, and important points."
        ),
    }
}

pub fn quiz_prompt(topic: &str, num_questions: usize, difficulty: Difficulty) -> String {
    format!(
        "Create {num_questions} multiple-choice questions on '{topic}' for {difficulty} level students. \
         Each question has exactly 4 options and `correct` is the zero-based index of the right option.\n\
         {QUIZ_JSON_SHAPE}"
    )
}

pub fn flashcards_prompt(topic: &str, num_cards: usize) -> String {
    format!("Create {num_cards} flashcards on '{topic}'.\n{FLASHCARD_JSON_SHAPE}")
}

pub fn doubt_prompt(question: &str, context: &str) -> String {
    let context_line = if context.trim().is_empty() {
        String::new()
    } else {
        format!("Context: {}\n", context)
    };

    format!(
        "A student asks: \"{question}\"\n{context_line}\n\
         Provide a clear, educational explanation that helps the student understand. \
         Use simple language and include examples if helpful."
    )
}

pub fn lesson_plan_prompt(topic: &str, duration: u32, grade_level: &str) -> String {
    format!(
        "Create a detailed lesson plan for teaching '{topic}' to {grade_level} level students.\n\
         Duration: {duration} minutes.\n\n\
         Include:\n\
         - Learning objectives\n\
         - Materials needed\n\
         - Step-by-step activities\n\
         - Assessment methods\n\
         - Homework suggestions"
    )
}

pub fn homework_prompt(topic: &str, difficulty: Difficulty) -> String {
    format!(
        "Create homework assignments on '{topic}' for {difficulty} level students.\n\
         Include:\n\
         - Clear instructions\n\
         - Multiple question types (short answer, essay, problems)\n\
         - Expected completion time\n\
         - Answer key for teachers"
    )
}

/// Synthesis prompt over fetched encyclopedia excerpts.
pub fn study_material_prompt(
    topic: &str,
    content_type: ContentType,
    difficulty: Difficulty,
    sources_text: &str,
) -> String {
    match content_type {
        ContentType::Notes => format!(
            "Based on the following information from internet sources about '{topic}', \
             create comprehensive study notes suitable for {difficulty} level students.\n\n\
             Internet Sources Information:\n{sources_text}\n\n\
             Please create well-organized study notes that:\n\
             1. Synthesize information from the sources above\n\
             2. Include key concepts, definitions, and important points\n\
             3. Organize content in a clear, structured format\n\
             4. Add examples and explanations where helpful\n\
             5. Maintain accuracy based on the source material\n\n\
             Format the notes with clear headings and sections."
        ),
        ContentType::Summary => format!(
            "Based on the following information from internet sources about '{topic}', \
             create a concise summary suitable for {difficulty} level.\n\n\
             Internet Sources Information:\n{sources_text}\n\n\
             Please create a summary that:\n\
             1. Captures the main points from the sources\n\
             2. Is clear and easy to understand\n\
             3. Includes key takeaways"
        ),
        other => format!(
            "Create {} on '{topic}' for {difficulty} level students.\n\n\
             Additional information from internet sources:\n{sources_text}\n\n\
             Use this information to create accurate and comprehensive content.",
            other.as_str().replace('_', " ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_instruction_only_for_non_english() {
        assert_eq!(language_instruction("en"), None);
        assert_eq!(
            language_instruction("fr").as_deref(),
            Some("Translate the content to fr.")
        );
    }

    #[test]
    fn text_prompts_mention_topic_and_difficulty() {
        let prompt = text_prompt("Volcanoes", ContentType::VideoScript, Difficulty::Hard);
        assert!(prompt.contains("'Volcanoes'"));
        assert!(prompt.contains("hard level"));
        assert!(prompt.contains("video script"));
    }

    #[test]
    fn doubt_prompt_omits_empty_context() {
        assert!(!doubt_prompt("Why is the sky blue?", "").contains("Context:"));
        assert!(doubt_prompt("Why?", "Optics").contains("Context: Optics"));
    }

    #[test]
    fn quiz_prompt_asks_for_json() {
        let prompt = quiz_prompt("Rust", 7, Difficulty::Easy);
        assert!(prompt.starts_with("Create 7 multiple-choice questions"));
        assert!(prompt.contains("\"questions\""));
    }
}
