pub mod content;
pub mod generated_content;
pub mod progress;
pub mod user;
pub use content::{ContentType, Difficulty, Flashcard, FlashcardDeck, QuizPayload, QuizQuestion};
pub use generated_content::{ContentMetadata, GeneratedContent};
pub use progress::Progress;
pub use user::{User, UserRole};
