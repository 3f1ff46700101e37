//! Answer API endpoints
//!
//! - POST   /api/v1/question/{questionId}/answer/create
//! - PUT    /api/v1/answer/edit/{answerId}
//! - DELETE /api/v1/answer/delete/{answerId}
//! - GET    /api/v1/answer/all/{questionId}

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{session_token, ApiError, AppState};
use crate::api::responses::{
    parse_path_uuid, AnswerDetailsResponse, ContentRequest, StatusResponse,
};

/// Request body for answering a question
#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    pub answer: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/question/{question_id}/answer/create",
            post(create_answer),
        )
        .route("/answer/edit/{answer_id}", put(edit_answer))
        .route("/answer/delete/{answer_id}", delete(delete_answer))
        .route("/answer/all/{question_id}", get(list_answers))
}

/// POST /api/v1/question/{questionId}/answer/create
async fn create_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
    Json(req): Json<CreateAnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let answer = state
        .answer_service
        .create(
            &session_token(&headers),
            parse_path_uuid(&question_id),
            &req.answer,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::new(answer.uuid, "ANSWER CREATED")),
    ))
}

/// PUT /api/v1/answer/edit/{answerId}
async fn edit_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(answer_id): Path<String>,
    Json(req): Json<ContentRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let answer = state
        .answer_service
        .edit(
            &session_token(&headers),
            parse_path_uuid(&answer_id),
            &req.content,
        )
        .await?;

    Ok(Json(StatusResponse::new(answer.uuid, "ANSWER EDITED")))
}

/// DELETE /api/v1/answer/delete/{answerId}
async fn delete_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(answer_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let answer = state
        .answer_service
        .delete(&session_token(&headers), parse_path_uuid(&answer_id))
        .await?;

    Ok(Json(StatusResponse::new(answer.uuid, "ANSWER DELETED")))
}

/// GET /api/v1/answer/all/{questionId}
async fn list_answers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(question_id): Path<String>,
) -> Result<Json<Vec<AnswerDetailsResponse>>, ApiError> {
    let answers = state
        .answer_service
        .list_for_question(&session_token(&headers), parse_path_uuid(&question_id))
        .await?;

    Ok(Json(answers.into_iter().map(Into::into).collect()))
}
