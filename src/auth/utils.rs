use actix_web::{
    http::header::{self, Header, HeaderMap},
    HttpRequest,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use async_graphql::Context;

use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::user::UserRole,
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Browser requests get redirects instead of JSON errors. A request counts as
/// a browser request when its body is not JSON and it accepts `text/html`
/// without also accepting `application/json`.
pub fn prefers_html(headers: &HeaderMap) -> bool {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase()
    };

    if header_value(header::CONTENT_TYPE).contains("application/json") {
        return false;
    }

    let accept = header_value(header::ACCEPT);
    accept.contains("text/html") && !accept.contains("application/json")
}

/// Bearer header first, then the session cookie.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Ok(auth) = Authorization::<Bearer>::parse(req) {
        return Some(auth.into_scheme().token().to_string());
    }

    req.cookie(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

pub fn require_role(claims: &Claims, allowed: &[UserRole]) -> AppResult<()> {
    if !allowed.contains(&claims.role) {
        return Err(AppError::Forbidden(format!(
            "Role '{}' cannot perform this action",
            claims.role
        )));
    }
    Ok(())
}

pub fn extract_claims_from_context(ctx: &Context<'_>) -> AppResult<Claims> {
    ctx.data::<Claims>()
        .cloned()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))
}
