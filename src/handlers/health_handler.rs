use actix_web::{get, web, HttpResponse};

use crate::app_state::AppState;

#[get("/")]
async fn index(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "name": "EduMentor",
        "version": env!("CARGO_PKG_VERSION"),
        "ai_mode": if state.config.openai_api_key.is_some() { "openai" } else { "mock" },
        "endpoints": {
            "auth": ["/auth/register", "/auth/login", "/auth/logout"],
            "content": [
                "/api/generate",
                "/api/quiz",
                "/api/flashcards",
                "/api/doubt-solve",
                "/api/export"
            ],
            "progress": ["/api/progress", "/api/progress/adaptive"],
            "teacher": ["/api/teacher/lesson-plan", "/api/teacher/homework"],
            "graphql": "/api/graphql"
        }
    }))
}

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
async fn health_check_ready(state: web::Data<AppState>) -> HttpResponse {
    let db_ok = match &state.db {
        Some(db) => db.health_check().await.is_ok(),
        None => false,
    };

    let response = serde_json::json!({
        "status": if db_ok { "ready" } else { "not_ready" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": if db_ok { "ok" } else { "error" }
        }
    });

    if db_ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[get("/health/live")]
async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
