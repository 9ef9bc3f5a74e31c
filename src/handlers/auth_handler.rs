use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    get, post, web, Either, HttpResponse,
};
use serde_json::json;

use crate::{
    app_state::AppState,
    auth::{OptionalClaims, ACCESS_TOKEN_COOKIE},
    errors::AppError,
    models::{
        domain::User,
        dto::{
            request::{LoginRequest, RegisterRequest},
            response::AuthResponse,
        },
    },
};

fn session_cookie(token: &str, hours: i64) -> Cookie<'static> {
    Cookie::build(ACCESS_TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(hours))
        .finish()
}

fn session_response(state: &AppState, user: User, message: &str) -> Result<HttpResponse, AppError> {
    let token = state.jwt_service.create_token(&user)?;
    let cookie = session_cookie(&token, state.jwt_service.expiration_hours());

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        success: true,
        message: message.to_string(),
        user: user.into(),
        token,
    }))
}

#[get("/auth/login")]
async fn login_page() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "POST username (or email) and password to /auth/login",
        "register": "/auth/register",
    }))
}

/// Accepts JSON or form bodies. Registration also starts a session.
#[post("/auth/register")]
async fn register(
    state: web::Data<AppState>,
    requester: OptionalClaims,
    body: Either<web::Json<RegisterRequest>, web::Form<RegisterRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let user = state
        .user_service
        .register(request, requester.0.as_ref())
        .await?;
    session_response(&state, user, "Registration successful")
}

#[post("/auth/login")]
async fn login(
    state: web::Data<AppState>,
    body: Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
) -> Result<HttpResponse, AppError> {
    let request = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let user = state.user_service.login(request).await?;
    log::info!("User '{}' logged in", user.username);
    session_response(&state, user, "Login successful")
}

#[post("/auth/logout")]
async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(ACCESS_TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(json!({
        "success": true,
        "message": "You have been logged out",
    }))
}
