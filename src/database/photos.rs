use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Photo, PhotoWithOwner};
use super::DatabaseError;

/// Columns for photo rows joined with the owning user's username.
const JOINED_COLUMNS: &str = "p.id, p.object_key, p.uploaded_at, p.owner_id, \
                              u.username AS owner_username";

pub async fn insert(
    pool: &PgPool,
    object_key: &str,
    owner_id: Uuid,
) -> Result<Photo, DatabaseError> {
    let photo = sqlx::query_as::<_, Photo>(
        "INSERT INTO photos (object_key, owner_id) VALUES ($1, $2) \
         RETURNING id, object_key, uploaded_at, owner_id",
    )
    .bind(object_key)
    .bind(owner_id)
    .fetch_one(pool)
    .await?;
    Ok(photo)
}

pub async fn find_with_owner(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<PhotoWithOwner>, DatabaseError> {
    let photo = sqlx::query_as::<_, PhotoWithOwner>(&format!(
        "SELECT {} FROM photos p LEFT JOIN users u ON u.id = p.owner_id WHERE p.id = $1",
        JOINED_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(photo)
}

/// List photos newest first, optionally restricted to one owner.
pub async fn list_with_owner(
    pool: &PgPool,
    owner_id: Option<Uuid>,
    skip: i64,
    limit: i64,
) -> Result<Vec<PhotoWithOwner>, DatabaseError> {
    let photos = match owner_id {
        Some(owner) => {
            sqlx::query_as::<_, PhotoWithOwner>(&format!(
                "SELECT {} FROM photos p LEFT JOIN users u ON u.id = p.owner_id \
                 WHERE p.owner_id = $1 ORDER BY p.uploaded_at DESC OFFSET $2 LIMIT $3",
                JOINED_COLUMNS
            ))
            .bind(owner)
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, PhotoWithOwner>(&format!(
                "SELECT {} FROM photos p LEFT JOIN users u ON u.id = p.owner_id \
                 ORDER BY p.uploaded_at DESC OFFSET $1 LIMIT $2",
                JOINED_COLUMNS
            ))
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };
    Ok(photos)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM photos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
