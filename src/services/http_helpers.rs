use std::time::Duration;

use thiserror::Error;

pub const USER_AGENT: &str = concat!("EduMentor/", env!("CARGO_PKG_VERSION"));

/// Failure of an outbound fetch. Callers treat it as "no data" and move on to
/// their next fallback.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid source url '{0}'")]
    InvalidUrl(String),
}

/// Client shared by the external content sources.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, SourceError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
