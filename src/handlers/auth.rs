use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Form, Json};
use serde::{Deserialize, Serialize};

use super::users::UserResponse;
use crate::auth::password;
use crate::database::users;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /auth/register - Create a new user account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::bad_request("Username must not be empty"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::bad_request("Password must not be empty"));
    }

    if users::find_by_username(&state.pool, &payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("Username already registered."));
    }

    let password_hash = password::hash_password(payload.password).await.map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to process registration")
    })?;

    let user = match users::insert(
        &state.pool,
        &payload.username,
        &password_hash,
        payload.email.as_deref(),
        payload.is_admin,
    )
    .await
    {
        Ok(user) => user,
        // Losing a concurrent race at the unique index reports the same 400
        // as the precheck above
        Err(e) if e.is_unique_violation() => {
            return Err(ApiError::bad_request("Username or email already registered."))
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Registered user '{}'", user.username);
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login - Authenticate with form credentials, returns a bearer
/// token valid for the configured TTL
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = users::find_by_username(&state.pool, &form.username).await?;

    // Run verification only when the user exists; both failure paths report
    // the same message so usernames cannot be probed
    let verified = match &user {
        Some(user) => password::verify_password(form.password, user.password_hash.clone())
            .await
            .map_err(|e| {
                tracing::error!("Password verification failed: {}", e);
                ApiError::internal_server_error("Failed to process login")
            })?,
        None => false,
    };

    let user = match (user, verified) {
        (Some(user), true) => user,
        _ => return Err(ApiError::unauthorized("Incorrect username or password")),
    };

    let access_token = state.tokens.issue(&user.username, user.is_admin).map_err(|e| {
        tracing::error!("Token issuance failed: {}", e);
        ApiError::internal_server_error("Failed to issue access token")
    })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
