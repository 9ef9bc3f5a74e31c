use std::sync::Arc;

use serde_json::{json, Value};
use validator::Validate;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::{
        domain::{ContentMetadata, ContentType, Difficulty, GeneratedContent},
        dto::request::{
            DoubtRequest, ExportRequest, FlashcardsRequest, GenerateRequest, HomeworkRequest,
            LessonPlanRequest, QuizRequest, DEFAULT_FLASHCARDS, DEFAULT_QUIZ_QUESTIONS,
        },
    },
    repositories::ContentRepository,
    services::{
        content_generator::ContentGenerator,
        export::{ExportFormat, ExportWriter, ExportedFile},
        quiz_source::QuizSourceResolver,
        study_material::StudyMaterialResolver,
    },
};

/// A stored generation: the payload handed back to the caller and the id it
/// can later be exported by.
#[derive(Debug, Clone)]
pub struct Generated {
    pub payload: Value,
    pub content_id: String,
}

/// Picks a generation path per request, persists the result and exports
/// stored or inline payloads.
pub struct ContentService {
    repository: Arc<dyn ContentRepository>,
    generator: Arc<ContentGenerator>,
    quiz_resolver: QuizSourceResolver,
    study_resolver: StudyMaterialResolver,
    export_writer: ExportWriter,
}

impl ContentService {
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        generator: Arc<ContentGenerator>,
        quiz_resolver: QuizSourceResolver,
        study_resolver: StudyMaterialResolver,
        export_writer: ExportWriter,
    ) -> Self {
        Self {
            repository,
            generator,
            quiz_resolver,
            study_resolver,
            export_writer,
        }
    }

    async fn persist(
        &self,
        user_id: &str,
        content_type: ContentType,
        topic: &str,
        payload: Value,
        metadata: ContentMetadata,
    ) -> AppResult<Generated> {
        let stored = GeneratedContent::new(Some(user_id), content_type, topic, &payload, metadata)?;
        let stored = self.repository.create(stored).await?;

        log::info!(
            "Stored {} content '{}' for user {} as {}",
            content_type,
            topic,
            user_id,
            stored.id
        );

        Ok(Generated {
            payload,
            content_id: stored.id,
        })
    }

    /// Quiz payload plus whether any question came from the trivia service.
    async fn quiz_payload(
        &self,
        topic: &str,
        num_questions: usize,
        difficulty: Difficulty,
        use_internet: bool,
    ) -> AppResult<(Value, bool)> {
        let (quiz, from_trivia) = if use_internet {
            let sourced = self
                .quiz_resolver
                .fetch_quiz(topic, num_questions, difficulty)
                .await;
            (sourced.quiz, sourced.from_trivia)
        } else {
            let quiz = self
                .generator
                .generate_quiz(topic, num_questions, difficulty)
                .await;
            (quiz, false)
        };

        let mut payload = serde_json::to_value(quiz)?;
        payload["type"] = json!(ContentType::Quiz.as_str());
        payload["topic"] = json!(topic);
        payload["difficulty"] = json!(difficulty);
        Ok((payload, from_trivia))
    }

    async fn flashcards_payload(&self, topic: &str, num_cards: usize) -> AppResult<Value> {
        let deck = self.generator.generate_flashcards(topic, num_cards).await;
        let mut payload = serde_json::to_value(deck)?;
        payload["type"] = json!(ContentType::Flashcards.as_str());
        payload["topic"] = json!(topic);
        Ok(payload)
    }

    /// `/api/generate`: prose types, quizzes and flashcards. Lesson plans,
    /// homework and doubt answers have dedicated operations.
    pub async fn generate(&self, user_id: &str, request: GenerateRequest) -> AppResult<Generated> {
        request.validate()?;

        let content_type = request.content_type().ok_or_else(|| {
            AppError::ValidationError(format!(
                "Unsupported content type '{}'",
                request.content_type.as_deref().unwrap_or_default()
            ))
        })?;
        let topic = request.topic.trim();
        let difficulty = request.difficulty();
        let language = request.language();
        let use_internet = request.use_internet.unwrap_or(false);

        let (payload, generated_from_internet) = match content_type {
            ContentType::Quiz => {
                self.quiz_payload(topic, DEFAULT_QUIZ_QUESTIONS as usize, difficulty, use_internet)
                    .await?
            }
            ContentType::Flashcards => {
                let payload = self
                    .flashcards_payload(topic, DEFAULT_FLASHCARDS as usize)
                    .await?;
                (payload, false)
            }
            text if text.is_text() && use_internet => {
                let payload = self
                    .study_resolver
                    .compile(topic, text, difficulty, language)
                    .await;
                let from_sources = payload
                    .get("generated_from_internet")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                (payload, from_sources)
            }
            text if text.is_text() => {
                let payload = self
                    .generator
                    .generate(topic, text, difficulty, language)
                    .await;
                (payload, false)
            }
            other => {
                return Err(AppError::ValidationError(format!(
                    "Content type '{}' is not supported by this operation",
                    other
                )))
            }
        };

        let metadata = ContentMetadata {
            difficulty: Some(difficulty),
            language: Some(language.to_string()),
            generated_from_internet,
        };

        self.persist(user_id, content_type, topic, payload, metadata)
            .await
    }

    pub async fn quiz(&self, user_id: &str, request: QuizRequest) -> AppResult<Generated> {
        request.validate()?;

        let topic = request.topic.trim();
        let difficulty = request.difficulty();
        let use_internet = request.use_internet.unwrap_or(true);
        let (payload, from_trivia) = self
            .quiz_payload(topic, request.num_questions(), difficulty, use_internet)
            .await?;

        let metadata = ContentMetadata {
            difficulty: Some(difficulty),
            language: None,
            generated_from_internet: from_trivia,
        };
        self.persist(user_id, ContentType::Quiz, topic, payload, metadata)
            .await
    }

    pub async fn flashcards(
        &self,
        user_id: &str,
        request: FlashcardsRequest,
    ) -> AppResult<Generated> {
        request.validate()?;

        let topic = request.topic.trim();
        let payload = self.flashcards_payload(topic, request.num_cards()).await?;
        self.persist(
            user_id,
            ContentType::Flashcards,
            topic,
            payload,
            ContentMetadata::default(),
        )
        .await
    }

    pub async fn solve_doubt(&self, user_id: &str, request: DoubtRequest) -> AppResult<Generated> {
        request.validate()?;

        let question = request.question.trim();
        let payload = self
            .generator
            .solve_doubt(question, request.context.trim())
            .await;
        self.persist(
            user_id,
            ContentType::DoubtAnswer,
            question,
            payload,
            ContentMetadata::default(),
        )
        .await
    }

    pub async fn lesson_plan(
        &self,
        user_id: &str,
        request: LessonPlanRequest,
    ) -> AppResult<Generated> {
        request.validate()?;

        let topic = request.topic.trim();
        let payload = self
            .generator
            .generate_lesson_plan(topic, request.duration(), request.grade_level())
            .await;
        self.persist(
            user_id,
            ContentType::LessonPlan,
            topic,
            payload,
            ContentMetadata::default(),
        )
        .await
    }

    pub async fn homework(&self, user_id: &str, request: HomeworkRequest) -> AppResult<Generated> {
        request.validate()?;

        let topic = request.topic.trim();
        let difficulty = request.difficulty();
        let payload = self.generator.generate_homework(topic, difficulty).await;
        let metadata = ContentMetadata {
            difficulty: Some(difficulty),
            ..ContentMetadata::default()
        };
        self.persist(user_id, ContentType::Homework, topic, payload, metadata)
            .await
    }

    /// Stored content is visible to its owner and to admins.
    pub async fn get_content(&self, claims: &Claims, id: &str) -> AppResult<GeneratedContent> {
        let content = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content with id '{}' not found", id)))?;

        match content.user_id.as_deref() {
            Some(owner) if owner != claims.sub && !claims.is_admin() => Err(AppError::Forbidden(
                "Content belongs to another user".to_string(),
            )),
            _ => Ok(content),
        }
    }

    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<GeneratedContent>> {
        self.repository.find_by_user(user_id).await
    }

    /// Exports stored content by id, or the inline payload when no id is given.
    pub async fn export(&self, claims: &Claims, request: ExportRequest) -> AppResult<ExportedFile> {
        let format = ExportFormat::parse(request.format.as_deref())?;

        let (payload, fallback_title) = match (request.content_id.as_deref(), request.content) {
            (Some(id), _) if !id.trim().is_empty() => {
                let stored = self.get_content(claims, id.trim()).await?;
                (stored.payload()?, Some(stored.topic))
            }
            (_, Some(content)) if !content.is_null() => (content, None),
            _ => return Err(AppError::ValidationError("Content is required".to_string())),
        };

        let file = self
            .export_writer
            .export(&payload, fallback_title.as_deref(), format)
            .await?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::UserRole,
        repositories::MockContentRepository,
        services::{
            quiz_source::{MockTriviaSource, TriviaQuestion},
            study_material::MockEncyclopediaSource,
        },
        test_utils::fixtures::claims_for,
    };

    fn storing_repository() -> MockContentRepository {
        let mut repository = MockContentRepository::new();
        repository.expect_create().returning(Ok);
        repository
    }

    fn trivia_returning(count: usize) -> MockTriviaSource {
        let mut trivia = MockTriviaSource::new();
        trivia.expect_fetch().returning(move |_, _, _| {
            Ok((0..count)
                .map(|n| TriviaQuestion {
                    question: format!("Trivia {}?", n),
                    correct_answer: "Yes".to_string(),
                    incorrect_answers: vec!["No".to_string(), "Maybe".to_string()],
                })
                .collect())
        });
        trivia
    }

    fn service_with(repository: MockContentRepository, exports: &std::path::Path) -> ContentService {
        service_with_trivia(repository, trivia_returning(0), exports)
    }

    fn service_with_trivia(
        repository: MockContentRepository,
        trivia: MockTriviaSource,
        exports: &std::path::Path,
    ) -> ContentService {
        let generator = Arc::new(ContentGenerator::mock());

        let mut encyclopedia = MockEncyclopediaSource::new();
        encyclopedia.expect_summary().returning(|_| Ok(None));
        encyclopedia.expect_search().returning(|_| Ok(None));

        ContentService::new(
            Arc::new(repository),
            generator.clone(),
            QuizSourceResolver::new(Arc::new(trivia), Some(generator.clone())),
            StudyMaterialResolver::new(Arc::new(encyclopedia), Some(generator)),
            ExportWriter::new(exports),
        )
    }

    fn generate_request(content_type: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            topic: "Photosynthesis".to_string(),
            content_type: content_type.map(str::to_string),
            difficulty: Some("easy".to_string()),
            language: None,
            use_internet: None,
        }
    }

    #[tokio::test]
    async fn test_generate_defaults_to_notes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut repository = MockContentRepository::new();
        repository
            .expect_create()
            .withf(|c| {
                c.content_type == ContentType::Notes
                    && c.user_id.as_deref() == Some("user-1")
                    && c.metadata.difficulty == Some(Difficulty::Easy)
            })
            .times(1)
            .returning(Ok);

        let service = service_with(repository, dir.path());
        let generated = service.generate("user-1", generate_request(None)).await.unwrap();

        assert_eq!(generated.payload["type"], "notes");
        assert_eq!(generated.payload["topic"], "Photosynthesis");
        assert!(!generated.content_id.is_empty());
    }

    #[tokio::test]
    async fn test_generate_rejects_unknown_and_dedicated_types() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(MockContentRepository::new(), dir.path());

        for content_type in ["podcast", "lesson_plan", "homework", "doubt_answer"] {
            let result = service
                .generate("user-1", generate_request(Some(content_type)))
                .await;
            assert!(
                matches!(result, Err(AppError::ValidationError(_))),
                "{} should be rejected",
                content_type
            );
        }
    }

    #[tokio::test]
    async fn test_internet_notes_without_sources_are_not_marked_internet() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(storing_repository(), dir.path());

        let mut request = generate_request(Some("notes"));
        request.use_internet = Some(true);
        let generated = service.generate("user-1", request).await.unwrap();

        assert_eq!(generated.payload["generated_from_internet"], false);
        assert_eq!(generated.payload["sources"], json!([]));
    }

    fn quiz_request(use_internet: Option<bool>) -> QuizRequest {
        QuizRequest {
            topic: "Mythology".to_string(),
            num_questions: Some(5),
            difficulty: None,
            use_internet,
        }
    }

    fn repository_expecting_provenance(from_internet: bool) -> MockContentRepository {
        let mut repository = MockContentRepository::new();
        repository
            .expect_create()
            .withf(move |c| {
                c.content_type == ContentType::Quiz
                    && c.metadata.generated_from_internet == from_internet
            })
            .times(1)
            .returning(Ok);
        repository
    }

    #[tokio::test]
    async fn test_generated_quiz_is_not_marked_internet() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(repository_expecting_provenance(false), dir.path());

        let generated = service.quiz("user-1", quiz_request(None)).await.unwrap();
        assert_eq!(
            generated.payload["questions"][0]["question"],
            "What is the main topic?"
        );
    }

    #[tokio::test]
    async fn test_trivia_quiz_is_marked_internet() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with_trivia(
            repository_expecting_provenance(true),
            trivia_returning(5),
            dir.path(),
        );

        let generated = service.quiz("user-1", quiz_request(None)).await.unwrap();
        assert_eq!(generated.payload["questions"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_quiz_without_internet_skips_trivia() {
        let dir = tempfile::tempdir().unwrap();
        let mut trivia = MockTriviaSource::new();
        trivia.expect_fetch().times(0);
        let service =
            service_with_trivia(repository_expecting_provenance(false), trivia, dir.path());

        service
            .quiz("user-1", quiz_request(Some(false)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_generate_quiz_provenance_follows_trivia() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = generate_request(Some("quiz"));
        request.use_internet = Some(true);

        let from_trivia = service_with_trivia(
            repository_expecting_provenance(true),
            trivia_returning(10),
            dir.path(),
        );
        from_trivia.generate("user-1", request.clone()).await.unwrap();

        let from_generator = service_with(repository_expecting_provenance(false), dir.path());
        from_generator.generate("user-1", request).await.unwrap();
    }

    #[tokio::test]
    async fn test_quiz_falls_back_to_generator_when_trivia_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(storing_repository(), dir.path());

        let generated = service
            .quiz(
                "user-1",
                QuizRequest {
                    topic: "Mythology".to_string(),
                    num_questions: Some(5),
                    difficulty: None,
                    use_internet: None,
                },
            )
            .await
            .unwrap();

        let questions = generated.payload["questions"].as_array().unwrap();
        assert!(!questions.is_empty() && questions.len() <= 5);
        assert_eq!(generated.payload["type"], "quiz");
    }

    #[tokio::test]
    async fn test_export_by_id_uses_stored_topic_as_title() {
        let dir = tempfile::tempdir().unwrap();
        let stored = GeneratedContent::new(
            Some("user-1"),
            ContentType::LessonPlan,
            "Fractions",
            &json!({"plan": "Warm-up\n\nMain activity"}),
            ContentMetadata::default(),
        )
        .unwrap();
        let id = stored.id.clone();

        let mut repository = MockContentRepository::new();
        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service_with(repository, dir.path());
        let file = service
            .export(
                &claims_for("user-1", UserRole::Teacher),
                ExportRequest {
                    content_id: Some(id),
                    content: None,
                    format: Some("docx".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(file.format, ExportFormat::Docx);
        assert!(file.file_name.ends_with(".docx"));
        assert!(file.path.exists());
    }

    #[tokio::test]
    async fn test_export_of_foreign_content_is_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        let stored = GeneratedContent::new(
            Some("owner"),
            ContentType::Notes,
            "Cells",
            &json!({"content": "Cells"}),
            ContentMetadata::default(),
        )
        .unwrap();

        let mut repository = MockContentRepository::new();
        repository
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));

        let service = service_with(repository, dir.path());
        let request = ExportRequest {
            content_id: Some("any".to_string()),
            content: None,
            format: None,
        };

        let result = service
            .export(&claims_for("intruder", UserRole::Student), request.clone())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let as_admin = service
            .export(&claims_for("root", UserRole::Admin), request)
            .await;
        assert!(as_admin.is_ok());
    }

    #[tokio::test]
    async fn test_export_requires_content_and_known_format() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(MockContentRepository::new(), dir.path());
        let claims = claims_for("user-1", UserRole::Student);

        let missing = service
            .export(
                &claims,
                ExportRequest {
                    content_id: None,
                    content: None,
                    format: None,
                },
            )
            .await;
        assert!(matches!(missing, Err(AppError::ValidationError(_))));

        let bad_format = service
            .export(
                &claims,
                ExportRequest {
                    content_id: None,
                    content: Some(json!({"content": "x"})),
                    format: Some("odt".to_string()),
                },
            )
            .await;
        assert!(matches!(bad_format, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_missing_content_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut repository = MockContentRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));

        let service = service_with(repository, dir.path());
        let result = service
            .get_content(&claims_for("user-1", UserRole::Student), "missing")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
