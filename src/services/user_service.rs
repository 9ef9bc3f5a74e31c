use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use validator::Validate;

use crate::{
    auth::{hash_password, verify_password, Claims},
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::request::{LoginRequest, RegisterRequest},
    },
    repositories::UserRepository,
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@edumentor.ai";

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    /// Creates a password account. Only an admin may create another admin;
    /// anyone else asking for that role gets a student account.
    pub async fn register(
        &self,
        request: RegisterRequest,
        requester: Option<&Claims>,
    ) -> AppResult<User> {
        request.validate()?;

        let username = request.username.trim();
        let email = request.email.trim();

        let mut role = request
            .role
            .as_deref()
            .map(UserRole::parse_or_default)
            .unwrap_or_default();
        if role == UserRole::Admin && !requester.is_some_and(Claims::is_admin) {
            log::warn!("Admin role requested by non-admin for '{}'; using student", username);
            role = UserRole::Student;
        }

        if self.repository.find_by_username(username).await?.is_some() {
            return Err(AppError::AlreadyExists("Username already exists".to_string()));
        }
        if self.repository.find_by_email(email).await?.is_some() {
            return Err(AppError::AlreadyExists("Email already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .repository
            .create(User::new(username, email, &password_hash, role))
            .await?;

        log::info!("Registered {} account '{}'", user.role, user.username);
        Ok(user)
    }

    /// Accepts either the username or the email in `request.username`.
    pub async fn login(&self, request: LoginRequest) -> AppResult<User> {
        request.validate()?;

        let identifier = request.username.trim();
        let user = match self.repository.find_by_username(identifier).await? {
            Some(user) => Some(user),
            None => self.repository.find_by_email(identifier).await?,
        };

        match user {
            Some(user) if verify_password(&request.password, &user.password_hash) => Ok(user),
            _ => {
                log::info!("Failed login attempt for '{}'", identifier);
                Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    /// Creates the default admin account when it does not exist yet.
    /// Returns whether an account was created.
    pub async fn seed_admin(&self, password: &SecretString) -> AppResult<bool> {
        if self
            .repository
            .find_by_username(DEFAULT_ADMIN_USERNAME)
            .await?
            .is_some()
        {
            return Ok(false);
        }

        let password_hash = hash_password(password.expose_secret())?;
        let admin = User::new(
            DEFAULT_ADMIN_USERNAME,
            DEFAULT_ADMIN_EMAIL,
            &password_hash,
            UserRole::Admin,
        );

        match self.repository.create(admin).await {
            Ok(_) => {
                log::info!("Created default admin account '{}'", DEFAULT_ADMIN_USERNAME);
                Ok(true)
            }
            // Another instance seeded it first.
            Err(AppError::AlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
