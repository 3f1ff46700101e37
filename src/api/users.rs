//! User profile endpoint
//!
//! - GET /api/v1/userprofile/{userId}

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};

use crate::api::middleware::{session_token, ApiError, AppState};
use crate::api::responses::{parse_path_uuid, UserDetailsResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/userprofile/{user_id}", get(get_profile))
}

/// GET /api/v1/userprofile/{userId}
async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    let user = state
        .user_service
        .profile(&session_token(&headers), parse_path_uuid(&user_id))
        .await?;

    Ok(Json(user.into()))
}
