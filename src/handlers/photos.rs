use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{models::PhotoWithOwner, photos};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::storage;

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub id: Uuid,
    pub object_key: String,
    /// Presigned, time-limited URL; clients never talk to the object store
    /// by key directly.
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub owner_username: Option<String>,
}

impl PhotoResponse {
    fn new(row: PhotoWithOwner, url: String) -> Self {
        Self {
            id: row.id,
            object_key: row.object_key,
            url,
            uploaded_at: row.uploaded_at,
            owner_id: row.owner_id,
            owner_username: row.owner_username,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PhotoListQuery {
    pub owner_id: Option<Uuid>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Owner or admin may read/delete a specific photo.
fn can_access_photo(user: &AuthUser, owner_id: Uuid) -> bool {
    user.is_admin || user.id == owner_id
}

/// Resolve the listing filter: non-admins see their own photos unless they
/// explicitly (and legitimately) filter; admins see everything by default.
fn resolve_owner_filter(
    user: &AuthUser,
    requested: Option<Uuid>,
) -> Result<Option<Uuid>, ApiError> {
    match requested {
        Some(owner) if !user.is_admin && owner != user.id => Err(ApiError::forbidden(
            "You can only view your own photos or list all photos as an admin.",
        )),
        Some(owner) => Ok(Some(owner)),
        None if user.is_admin => Ok(None),
        None => Ok(Some(user.id)),
    }
}

/// POST /photos/upload - Upload a new photo (multipart `file` part)
///
/// Order of operations: MIME check, object-store write, metadata insert,
/// presign. A metadata failure after a successful store write triggers a
/// compensating delete of the object so no unreferenced blob is left behind.
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PhotoResponse>), ApiError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
            file = Some((filename, content_type, data.to_vec()));
            break;
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| ApiError::bad_request("Missing 'file' field in multipart payload"))?;

    // Rejected before anything touches the object store
    if !storage::is_image(&content_type) {
        return Err(ApiError::bad_request("Only image files are allowed."));
    }

    let object_key = storage::object_key(&current.username, &filename);
    state.storage.put(&object_key, data, &content_type).await?;

    let photo = match photos::insert(&state.pool, &object_key, current.id).await {
        Ok(photo) => photo,
        Err(db_err) => {
            // Compensating delete so the store holds no unreferenced object
            if let Err(cleanup_err) = state.storage.delete(&object_key).await {
                tracing::warn!(
                    "Failed to clean up object '{}' after metadata insert error: {}",
                    object_key,
                    cleanup_err
                );
            }
            return Err(db_err.into());
        }
    };

    // Past this point the photo exists; a presign failure surfaces as a 500
    // and the caller retries listing to obtain a URL
    let url = state.storage.presigned_url(&photo.object_key).await?;

    tracing::info!("User '{}' uploaded photo {}", current.username, photo.id);
    Ok((
        StatusCode::CREATED,
        Json(PhotoResponse {
            id: photo.id,
            object_key: photo.object_key,
            url,
            uploaded_at: photo.uploaded_at,
            owner_id: photo.owner_id,
            owner_username: Some(current.username),
        }),
    ))
}

/// GET /photos - List photos, own by default, all or filtered for admins
///
/// Listing is partial-success: an item whose presigned URL cannot be derived
/// is skipped with a warning instead of failing the whole request.
pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Query(query): Query<PhotoListQuery>,
) -> Result<Json<Vec<PhotoResponse>>, ApiError> {
    let owner_filter = resolve_owner_filter(&current, query.owner_id)?;
    let page = super::Pagination {
        skip: query.skip,
        limit: query.limit,
    };
    let (skip, limit) = page.clamped();

    let rows = photos::list_with_owner(&state.pool, owner_filter, skip, limit).await?;

    let mut responses = Vec::with_capacity(rows.len());
    for row in rows {
        match state.storage.presigned_url(&row.object_key).await {
            Ok(url) => responses.push(PhotoResponse::new(row, url)),
            Err(e) => {
                tracing::warn!("Could not generate URL for photo {}, skipping: {}", row.id, e);
            }
        }
    }
    Ok(Json(responses))
}

/// GET /photos/:photo_id - Details of a specific photo (owner or admin)
///
/// Unlike listing, a presign failure here hard-fails the request.
pub async fn get_photo(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Path(photo_id): Path<Uuid>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let photo = photos::find_with_owner(&state.pool, photo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Photo not found"))?;

    if !can_access_photo(&current, photo.owner_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to view this photo.",
        ));
    }

    let url = state.storage.presigned_url(&photo.object_key).await?;
    Ok(Json(PhotoResponse::new(photo, url)))
}

/// DELETE /photos/:photo_id - Delete a photo (owner or admin)
///
/// The blob is removed first; if that fails, the metadata row stays so the
/// delete path never produces a record without backing storage.
pub async fn delete_photo(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<AuthUser>,
    Path(photo_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let photo = photos::find_with_owner(&state.pool, photo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Photo not found"))?;

    if !can_access_photo(&current, photo.owner_id) {
        return Err(ApiError::forbidden(
            "You are not authorized to delete this photo.",
        ));
    }

    state.storage.delete(&photo.object_key).await?;
    photos::delete(&state.pool, photo.id).await?;

    tracing::info!("User '{}' deleted photo {}", current.username, photo.id);
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
    fn owner_and_admin_may_access_a_photo() {
        let owner = user(false);
        let admin = user(true);
        let other = user(false);

        assert!(can_access_photo(&owner, owner.id));
        assert!(can_access_photo(&admin, owner.id));
        assert!(!can_access_photo(&other, owner.id));
    }

    #[test]
    fn non_admin_listing_defaults_to_own_photos() {
        let alice = user(false);
        assert_eq!(resolve_owner_filter(&alice, None).unwrap(), Some(alice.id));
        assert_eq!(
            resolve_owner_filter(&alice, Some(alice.id)).unwrap(),
            Some(alice.id)
        );
    }

    #[test]
    fn non_admin_requesting_another_owner_is_forbidden() {
        let alice = user(false);
        let err = resolve_owner_filter(&alice, Some(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn admin_may_list_everything_or_filter_anyone() {
        let admin = user(true);
        let someone = Uuid::new_v4();
        assert_eq!(resolve_owner_filter(&admin, None).unwrap(), None);
        assert_eq!(
            resolve_owner_filter(&admin, Some(someone)).unwrap(),
            Some(someone)
        );
    }
}
