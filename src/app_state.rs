use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        ContentRepository, MongoContentRepository, MongoProgressRepository, MongoUserRepository,
        ProgressRepository, UserRepository,
    },
    services::{
        content_generator::ContentGenerator,
        content_service::ContentService,
        export::ExportWriter,
        progress_service::ProgressService,
        quiz_source::{OpenTdbClient, QuizSourceResolver, TriviaSource},
        study_material::{EncyclopediaSource, StudyMaterialResolver, WikipediaClient},
        user_service::UserService,
    },
};

/// Storage backends behind the services.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub content: Arc<dyn ContentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

/// Outbound collaborators of the content pipeline.
pub struct ContentSources {
    pub generator: ContentGenerator,
    pub trivia: Arc<dyn TriviaSource>,
    pub encyclopedia: Arc<dyn EncyclopediaSource>,
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub content_service: Arc<ContentService>,
    pub progress_service: Arc<ProgressService>,
    pub jwt_service: Arc<JwtService>,
    /// `None` when the state was assembled without MongoDB.
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db, &config.users_collection));
        users.ensure_indexes().await?;
        let content = Arc::new(MongoContentRepository::new(&db, &config.content_collection));
        content.ensure_indexes().await?;
        let progress = Arc::new(MongoProgressRepository::new(&db, &config.progress_collection));
        progress.ensure_indexes().await?;

        let sources = ContentSources {
            generator: ContentGenerator::from_config(&config),
            trivia: Arc::new(OpenTdbClient::from_config(&config)?),
            encyclopedia: Arc::new(WikipediaClient::from_config(&config)?),
        };

        let mut state = Self::from_parts(
            config,
            Repositories {
                users,
                content,
                progress,
            },
            sources,
        );
        state.db = Some(db);

        if state.config.uses_default_admin_password() {
            log::warn!("DEFAULT_ADMIN_PASSWORD is not set; the admin account uses the default password");
        }
        state
            .user_service
            .seed_admin(&state.config.default_admin_password)
            .await?;

        Ok(state)
    }

    /// Wires services over the given repositories and sources without
    /// touching the network.
    pub fn from_parts(config: Config, repositories: Repositories, sources: ContentSources) -> Self {
        let generator = Arc::new(sources.generator);

        let content_service = ContentService::new(
            repositories.content,
            generator.clone(),
            QuizSourceResolver::new(sources.trivia, Some(generator.clone())),
            StudyMaterialResolver::new(sources.encyclopedia, Some(generator)),
            ExportWriter::new(&config.exports_dir),
        );

        Self {
            user_service: Arc::new(UserService::new(repositories.users)),
            content_service: Arc::new(content_service),
            progress_service: Arc::new(ProgressService::new(repositories.progress)),
            jwt_service: Arc::new(JwtService::new(
                &config.jwt_secret,
                config.jwt_expiration_hours,
            )),
            db: None,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_cloneable() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
