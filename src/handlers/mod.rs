pub mod auth_handler;
pub mod content_handler;
pub mod graphql_handler;
pub mod health_handler;
pub mod progress_handler;
pub mod teacher_handler;

use actix_web::web;

use crate::{
    auth::{AuthMiddleware, RoleGuard},
    errors::AppError,
};

/// Registers every route. Everything under `/api` requires a session, and
/// `/api/teacher` additionally requires the teacher or admin role.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(err.to_string()).into()
    }))
    .service(health_handler::index)
    .service(health_handler::health_check)
    .service(health_handler::health_check_live)
    .service(health_handler::health_check_ready)
    .service(auth_handler::login_page)
    .service(auth_handler::login)
    .service(auth_handler::register)
    .service(auth_handler::logout)
    .service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .service(
                web::scope("/teacher")
                    .wrap(RoleGuard::teachers())
                    .service(teacher_handler::lesson_plan)
                    .service(teacher_handler::homework),
            )
            .service(content_handler::generate)
            .service(content_handler::quiz)
            .service(content_handler::flashcards)
            .service(content_handler::solve_doubt)
            .service(content_handler::export)
            .service(progress_handler::get_progress)
            .service(progress_handler::update_progress)
            .service(progress_handler::adaptive_difficulty)
            .service(graphql_handler::graphql),
    );
}
