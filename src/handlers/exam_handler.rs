use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::SubmitAnswersRequest,
    models::dto::response::ApiResponse,
};

#[post("/exams/{exam_id}/start")]
async fn start_exam(
    state: web::Data<AppState>,
    exam_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .exam_attempt_service
        .start_exam(&exam_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::created(attempt)))
}

#[get("/exam-attempts/{attempt_id}")]
async fn get_exam_attempt(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .exam_attempt_service
        .get_attempt(&attempt_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}

#[get("/exam-attempts/{attempt_id}/sections/{section_id}")]
async fn get_section_questions(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (attempt_id, section_id) = path.into_inner();
    let view = state
        .exam_attempt_service
        .get_section_questions(&attempt_id, &section_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(view)))
}

#[post("/exam-attempts/{attempt_id}/sections/{section_id}/submit")]
async fn submit_section(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<SubmitAnswersRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (attempt_id, section_id) = path.into_inner();
    let attempt = state
        .exam_attempt_service
        .submit_section(&attempt_id, &section_id, &auth.0.sub, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}

#[post("/exam-attempts/{attempt_id}/submit")]
async fn complete_exam(
    state: web::Data<AppState>,
    attempt_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let attempt = state
        .exam_attempt_service
        .complete_exam(&attempt_id, &auth.0.sub)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(attempt)))
}
