//! Admin API endpoints
//!
//! - DELETE /api/v1/admin/user/{userId}

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::delete,
    Json, Router,
};

use crate::api::middleware::{session_token, ApiError, AppState};
use crate::api::responses::{parse_path_uuid, StatusResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/user/{user_id}", delete(delete_user))
}

/// DELETE /api/v1/admin/user/{userId}
async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let user = state
        .user_service
        .delete_user(&session_token(&headers), parse_path_uuid(&user_id))
        .await?;

    Ok(Json(StatusResponse::new(user.uuid, "USER SUCCESSFULLY DELETED")))
}
