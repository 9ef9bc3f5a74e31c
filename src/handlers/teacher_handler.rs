use actix_web::{post, web, HttpResponse};
use serde_json::json;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{HomeworkRequest, LessonPlanRequest},
};

// Mounted under the teacher scope, which only lets teachers and admins through.

#[post("/lesson-plan")]
async fn lesson_plan(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<LessonPlanRequest>,
) -> Result<HttpResponse, AppError> {
    let generated = state
        .content_service
        .lesson_plan(&auth.0.sub, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "lesson_plan": generated.payload,
        "content_id": generated.content_id,
    })))
}

#[post("/homework")]
async fn homework(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<HomeworkRequest>,
) -> Result<HttpResponse, AppError> {
    let generated = state
        .content_service
        .homework(&auth.0.sub, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "homework": generated.payload,
        "content_id": generated.content_id,
    })))
}
