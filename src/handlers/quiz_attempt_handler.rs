use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{PaginationParams, SubmitAnswersRequest},
    models::dto::response::ApiResponse,
};

#[post("/quizzes/{quiz_id}/start")]
async fn start_quiz(
    state: web::Data<AppState>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .quiz_attempt_service
        .start_quiz(&auth.0.sub, &quiz_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::created(attempt)))
}

#[post("/blocks/{block_id}/quiz/start")]
async fn start_block_quiz(
    state: web::Data<AppState>,
    block_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .quiz_attempt_service
        .start_block_quiz(&auth.0.sub, &block_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::created(attempt)))
}

#[post("/blocks/{block_id}/quiz/retry")]
async fn retry_block_quiz(
    state: web::Data<AppState>,
    block_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .quiz_attempt_service
        .retry_block_quiz(&auth.0.sub, &block_id)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::created(attempt)))
}

#[post("/quiz-attempts/{attempt_id}/submit")]
async fn submit_quiz_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    request: web::Json<SubmitAnswersRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .quiz_attempt_service
        .submit(&attempt_id, &auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}

#[get("/quiz-attempts")]
async fn list_quiz_attempts(
    state: web::Data<AppState>,
    params: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempts = state
        .quiz_attempt_service
        .list_attempts(&auth.0.sub, &params)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempts)))
}

#[get("/quiz-attempts/{attempt_id}")]
async fn get_quiz_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .quiz_attempt_service
        .get_attempt(&attempt_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}
