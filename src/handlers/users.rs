use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::Pagination;
use crate::database::{models::User, users};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// User as exposed to clients. The password hash never leaves the database
/// layer.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_admin: user.is_admin,
        }
    }
}

/// GET /users/me - Current authenticated user's details
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = users::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;
    Ok(Json(user.into()))
}

/// GET /users/:user_id - Details of a specific user (admin only)
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    current.require_admin()?;

    let user = users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user.into()))
}

/// GET /users - List all users (admin only)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    current.require_admin()?;

    let (skip, limit) = page.clamped();
    let users = users::list(&state.pool, skip, limit).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// DELETE /users/:user_id - Delete a user (admin only)
///
/// An admin cannot delete their own account through this path.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    current.require_admin()?;

    let user = users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.id == current.id {
        return Err(ApiError::bad_request(
            "Cannot delete your own admin account through this endpoint.",
        ));
    }

    users::delete(&state.pool, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
