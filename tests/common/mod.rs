#![allow(dead_code)]

use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use edumentor_server::{
    app_state::{AppState, ContentSources, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{Difficulty, GeneratedContent, Progress, User, UserRole},
    repositories::{ContentRepository, ProgressRepository, UserRepository},
    services::{
        content_generator::ContentGenerator,
        http_helpers::SourceError,
        quiz_source::{TriviaQuestion, TriviaSource},
        study_material::{Article, EncyclopediaSource},
    },
};

pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken || users.contains_key(&user.id) {
            return Err(AppError::AlreadyExists(
                "Username or email already exists".to_string(),
            ));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryContentRepository {
    contents: Arc<RwLock<HashMap<String, GeneratedContent>>>,
}

impl InMemoryContentRepository {
    pub fn new() -> Self {
        Self {
            contents: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn create(&self, content: GeneratedContent) -> AppResult<GeneratedContent> {
        let mut contents = self.contents.write().await;
        if contents.contains_key(&content.id) {
            return Err(AppError::AlreadyExists(format!(
                "Content with id '{}' already exists",
                content.id
            )));
        }
        contents.insert(content.id.clone(), content.clone());
        Ok(content)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<GeneratedContent>> {
        Ok(self.contents.read().await.get(id).cloned())
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<GeneratedContent>> {
        let contents = self.contents.read().await;
        let mut items: Vec<_> = contents
            .values()
            .filter(|c| c.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryProgressRepository {
    rows: Arc<RwLock<Vec<Progress>>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

// Rows are kept in insertion order; reversing gives newest first even when
// two rows share a timestamp.
#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn create(&self, progress: Progress) -> AppResult<Progress> {
        self.rows.write().await.push(progress.clone());
        Ok(progress)
    }

    async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<Progress>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_user_and_topic(&self, user_id: &str, topic: &str) -> AppResult<Vec<Progress>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id && p.topic == topic)
            .cloned()
            .collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Trivia service that never has questions.
pub struct EmptyTrivia;

#[async_trait]
impl TriviaSource for EmptyTrivia {
    async fn fetch(
        &self,
        _category: u32,
        _amount: usize,
        _difficulty: Difficulty,
    ) -> Result<Vec<TriviaQuestion>, SourceError> {
        Ok(Vec::new())
    }
}

/// Encyclopedia that is unreachable.
pub struct OfflineEncyclopedia;

#[async_trait]
impl EncyclopediaSource for OfflineEncyclopedia {
    async fn summary(&self, _title: &str) -> Result<Option<Article>, SourceError> {
        Err(SourceError::InvalidUrl("offline".to_string()))
    }

    async fn search(&self, _query: &str) -> Result<Option<Article>, SourceError> {
        Err(SourceError::InvalidUrl("offline".to_string()))
    }
}

pub struct TestContext {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub contents: Arc<InMemoryContentRepository>,
    pub progress: Arc<InMemoryProgressRepository>,
}

impl TestContext {
    /// Mock-mode generator, in-memory storage and offline sources; exports
    /// land in `exports_dir`.
    pub fn new(exports_dir: &Path) -> Self {
        let mut config = Config::test_config();
        config.exports_dir = exports_dir.to_string_lossy().into_owned();

        let users = Arc::new(InMemoryUserRepository::new());
        let contents = Arc::new(InMemoryContentRepository::new());
        let progress = Arc::new(InMemoryProgressRepository::new());

        let state = AppState::from_parts(
            config,
            Repositories {
                users: users.clone(),
                content: contents.clone(),
                progress: progress.clone(),
            },
            ContentSources {
                generator: ContentGenerator::mock(),
                trivia: Arc::new(EmptyTrivia),
                encyclopedia: Arc::new(OfflineEncyclopedia),
            },
        );

        Self {
            state,
            users,
            contents,
            progress,
        }
    }

    /// Stores an account directly and returns a bearer token for it.
    pub async fn token_for(&self, username: &str, role: UserRole) -> (User, String) {
        let user = User::new(
            username,
            &format!("{}@example.com", username),
            "$argon2id$not-used",
            role,
        );
        let user = self.users.create(user).await.expect("store user");
        let token = self
            .state
            .jwt_service
            .create_token(&user)
            .expect("token should be created");
        (user, token)
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
