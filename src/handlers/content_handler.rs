use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    post, web, HttpResponse,
};
use serde_json::json;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{
        DoubtRequest, ExportRequest, FlashcardsRequest, GenerateRequest, QuizRequest,
    },
};

#[post("/generate")]
async fn generate(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<GenerateRequest>,
) -> Result<HttpResponse, AppError> {
    let generated = state
        .content_service
        .generate(&auth.0.sub, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "content": generated.payload,
        "content_id": generated.content_id,
    })))
}

#[post("/quiz")]
async fn quiz(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<QuizRequest>,
) -> Result<HttpResponse, AppError> {
    let generated = state
        .content_service
        .quiz(&auth.0.sub, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "quiz": generated.payload,
        "content_id": generated.content_id,
    })))
}

#[post("/flashcards")]
async fn flashcards(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<FlashcardsRequest>,
) -> Result<HttpResponse, AppError> {
    let generated = state
        .content_service
        .flashcards(&auth.0.sub, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "flashcards": generated.payload,
        "content_id": generated.content_id,
    })))
}

#[post("/doubt-solve")]
async fn solve_doubt(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<DoubtRequest>,
) -> Result<HttpResponse, AppError> {
    let generated = state
        .content_service
        .solve_doubt(&auth.0.sub, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "answer": generated.payload,
        "content_id": generated.content_id,
    })))
}

/// Sends the rendered document as an attachment.
#[post("/export")]
async fn export(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
    request: web::Json<ExportRequest>,
) -> Result<HttpResponse, AppError> {
    let file = state
        .content_service
        .export(&auth.0, request.into_inner())
        .await?;

    Ok(HttpResponse::Ok()
        .content_type(file.format.mime_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.file_name)],
        })
        .body(file.bytes))
}
