//! Question API endpoints
//!
//! - POST   /api/v1/question/create
//! - GET    /api/v1/question/all
//! - GET    /api/v1/question/all/{userId}
//! - PUT    /api/v1/question/edit/{questionId}
//! - DELETE /api/v1/question/delete/{questionId}

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use crate::api::middleware::{session_token, ApiError, AppState};
use crate::api::responses::{
    parse_path_uuid, ContentRequest, QuestionDetailsResponse, StatusResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_question))
        .route("/all", get(list_questions))
        .route("/all/{user_id}", get(list_user_questions))
        .route("/edit/{question_id}", put(edit_question))
        .route("/delete/{question_id}", delete(delete_question))
}

/// POST /api/v1/question/create
async fn create_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = state
        .question_service
        .create(&session_token(&headers), &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::new(question.uuid, "QUESTION CREATED")),
    ))
}

/// GET /api/v1/question/all
async fn list_questions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<QuestionDetailsResponse>>, ApiError> {
    let questions = state
        .question_service
        .list_all(&session_token(&headers))
        .await?;

    Ok(Json(questions.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/question/all/{userId}
async fn list_user_questions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<QuestionDetailsResponse>>, ApiError> {
    let questions = state
        .question_service
        .list_by_user(&session_token(&headers), parse_path_uuid(&user_id))
        .await?;

    Ok(Json(questions.into_iter().map(Into::into).collect()))
}

/// PUT /api/v1/question/edit/{questionId}
async fn edit_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
    Json(req): Json<ContentRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let question = state
        .question_service
        .edit(
            &session_token(&headers),
            parse_path_uuid(&question_id),
            &req.content,
        )
        .await?;

    Ok(Json(StatusResponse::new(question.uuid, "QUESTION EDITED")))
}

/// DELETE /api/v1/question/delete/{questionId}
async fn delete_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let question = state
        .question_service
        .delete(&session_token(&headers), parse_path_uuid(&question_id))
        .await?;

    Ok(Json(StatusResponse::new(question.uuid, "QUESTION DELETED")))
}
