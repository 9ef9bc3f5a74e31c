use std::env;
use secrecy::SecretString;

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub users_collection: String,
    pub content_collection: String,
    pub progress_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub openai_api_key: Option<SecretString>,
    pub openai_model: String,
    pub opentdb_url: String,
    pub wikipedia_summary_url: String,
    pub wikipedia_search_url: String,
    pub http_timeout_secs: u64,
    pub exports_dir: String,
    pub default_admin_password: SecretString,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "edumentor-local".to_string()),
            users_collection: env::var("USERS_COLLECTION").unwrap_or_else(|_| "users".to_string()),
            content_collection: env::var("CONTENT_COLLECTION")
                .unwrap_or_else(|_| "generated_content".to_string()),
            progress_collection: env::var("PROGRESS_COLLECTION")
                .unwrap_or_else(|_| "progress".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: SecretString::from(env::var("JWT_SECRET")
                .unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string())),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),
            // An empty key counts as missing so that `OPENAI_API_KEY=` in a .env
            // file still selects mock mode.
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            opentdb_url: env::var("OPENTDB_URL")
                .unwrap_or_else(|_| "https://opentdb.com/api.php".to_string()),
            wikipedia_summary_url: env::var("WIKIPEDIA_SUMMARY_URL").unwrap_or_else(|_| {
                "https://en.wikipedia.org/api/rest_v1/page/summary/".to_string()
            }),
            wikipedia_search_url: env::var("WIKIPEDIA_SEARCH_URL").unwrap_or_else(|_| {
                "https://en.wikipedia.org/w/rest.php/v1/search/page".to_string()
            }),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            exports_dir: env::var("EXPORTS_DIR").unwrap_or_else(|_| "exports".to_string()),
            default_admin_password: SecretString::from(env::var("DEFAULT_ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string())),
        }
    }

    pub fn uses_default_admin_password(&self) -> bool {
        use secrecy::ExposeSecret;
        self.default_admin_password.expose_secret() == DEFAULT_ADMIN_PASSWORD
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.uses_default_admin_password() {
            panic!(
                "FATAL: DEFAULT_ADMIN_PASSWORD is using default value! Set DEFAULT_ADMIN_PASSWORD environment variable."
            );
        }
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "edumentor-test".to_string(),
            users_collection: "users".to_string(),
            content_collection: "generated_content".to_string(),
            progress_collection: "progress".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            opentdb_url: "http://127.0.0.1:9/api.php".to_string(),
            wikipedia_summary_url: "http://127.0.0.1:9/summary/".to_string(),
            wikipedia_search_url: "http://127.0.0.1:9/search".to_string(),
            http_timeout_secs: 1,
            exports_dir: std::env::temp_dir()
                .join("edumentor-test-exports")
                .to_string_lossy()
                .into_owned(),
            default_admin_password: SecretString::from("test-admin-password".to_string()),
        }
    }
}
