use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{AdaptiveDifficultyQuery, ProgressUpdateRequest},
};

#[get("/progress")]
async fn get_progress(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state.progress_service.list(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "progress": progress })))
}

#[post("/progress")]
async fn update_progress(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<ProgressUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let entry = state
        .progress_service
        .record(&auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "entry": entry })))
}

#[get("/progress/adaptive")]
async fn adaptive_difficulty(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    query: web::Query<AdaptiveDifficultyQuery>,
) -> Result<HttpResponse, AppError> {
    query.validate()?;

    let suggestion = state
        .progress_service
        .adaptive(&auth.0.sub, &query.topic)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "topic": suggestion.topic,
        "difficulty": suggestion.suggested_difficulty,
    })))
}
