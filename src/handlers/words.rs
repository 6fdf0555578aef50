use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Pagination;
use crate::database::{models::WordWithCreator, words};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// Vocabulary text is unique case-sensitively across the whole list.
const MAX_WORD_LENGTH: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WordCreate {
    pub text: String,
}

/// Explicit patch body: only fields present in the request are applied.
#[derive(Debug, Deserialize)]
pub struct WordUpdate {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WordResponse {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub creator_id: Uuid,
    pub creator_username: Option<String>,
}

impl From<WordWithCreator> for WordResponse {
    fn from(word: WordWithCreator) -> Self {
        Self {
            id: word.id,
            text: word.text,
            created_at: word.created_at,
            creator_id: word.creator_id,
            creator_username: word.creator_username,
        }
    }
}

/// Creator or admin may update/delete a word; everyone authenticated may
/// read and create.
fn can_modify_word(user: &AuthUser, creator_id: Uuid) -> bool {
    user.is_admin || user.id == creator_id
}

fn validate_text(text: &str) -> Result<(), ApiError> {
    if text.is_empty() {
        return Err(ApiError::bad_request("Word text must not be empty"));
    }
    // varchar(64) bounds characters, not bytes
    if text.chars().count() > MAX_WORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Word text must be at most {} characters",
            MAX_WORD_LENGTH
        )));
    }
    Ok(())
}

/// POST /words - Add a new word to the vocabulary
pub async fn create_word(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Json(payload): Json<WordCreate>,
) -> Result<(StatusCode, Json<WordResponse>), ApiError> {
    validate_text(&payload.text)?;

    // The unique index is the arbiter; a concurrent duplicate loses here
    let word = match words::insert(&state.pool, &payload.text, current.id).await {
        Ok(word) => word,
        Err(e) if e.is_unique_violation() => {
            return Err(ApiError::conflict("Word already exists in the vocabulary."))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((StatusCode::CREATED, Json(word.into())))
}

/// GET /words - List the vocabulary (any authenticated user)
pub async fn list_words(
    State(state): State<Arc<AppState>>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<WordResponse>>, ApiError> {
    let (skip, limit) = page.clamped();
    let words = words::list(&state.pool, skip, limit).await?;
    Ok(Json(words.into_iter().map(WordResponse::from).collect()))
}

/// PUT /words/:word_id - Update a word (creator or admin)
pub async fn update_word(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Path(word_id): Path<Uuid>,
    Json(patch): Json<WordUpdate>,
) -> Result<Json<WordResponse>, ApiError> {
    let word = words::find_by_id(&state.pool, word_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Word not found"))?;

    if !can_modify_word(&current, word.creator_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to update this word.",
        ));
    }

    // Apply the patch field by field; an empty patch is a no-op
    let Some(new_text) = patch.text else {
        return Ok(Json(word.into()));
    };
    validate_text(&new_text)?;
    if new_text == word.text {
        return Ok(Json(word.into()));
    }

    let updated = match words::update_text(&state.pool, word.id, &new_text).await {
        Ok(updated) => updated,
        Err(e) if e.is_unique_violation() => {
            return Err(ApiError::conflict(
                "New word value already exists for another entry.",
            ))
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(updated.into()))
}

/// DELETE /words/:word_id - Delete a word (creator or admin)
pub async fn delete_word(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Path(word_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let word = words::find_by_id(&state.pool, word_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Word not found"))?;

    if !can_modify_word(&current, word.creator_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to delete this word.",
        ));
    }

    words::delete(&state.pool, word.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            username: if is_admin { "root" } else { "alice" }.to_string(),
            is_admin,
        }
    }

    #[test]
    fn creator_and_admin_may_modify_a_word() {
        let creator = user(false);
        let admin = user(true);
        let other = user(false);

        assert!(can_modify_word(&creator, creator.id));
        assert!(can_modify_word(&admin, creator.id));
        assert!(!can_modify_word(&other, creator.id));
    }

    #[test]
    fn text_validation_bounds() {
        assert!(validate_text("hello").is_ok());
        assert!(validate_text(&"x".repeat(MAX_WORD_LENGTH)).is_ok());
        assert!(validate_text("").is_err());
        assert!(validate_text(&"x".repeat(MAX_WORD_LENGTH + 1)).is_err());
    }

    #[test]
    fn text_length_counts_characters_not_bytes() {
        // 40 two-byte characters: within the 64-character column bound even
        // though the byte length exceeds it
        let multibyte = "ü".repeat(40);
        assert!(multibyte.len() > MAX_WORD_LENGTH);
        assert!(validate_text(&multibyte).is_ok());

        assert!(validate_text(&"ü".repeat(MAX_WORD_LENGTH + 1)).is_err());
    }

    #[test]
    fn patch_body_distinguishes_absent_from_present() {
        let empty: WordUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty.text.is_none());

        let set: WordUpdate = serde_json::from_str(r#"{"text": "anemone"}"#).unwrap();
        assert_eq!(set.text.as_deref(), Some("anemone"));
    }
}
