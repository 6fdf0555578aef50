use sqlx::PgPool;
use uuid::Uuid;

use super::models::WordWithCreator;
use super::DatabaseError;

/// Every word query yields the creator's username alongside the row; for
/// writes the username comes from a scalar subquery over the returned row.
const RETURNING: &str = "id, text, created_at, creator_id, \
                         (SELECT username FROM users WHERE id = creator_id) AS creator_username";

const JOINED_COLUMNS: &str = "w.id, w.text, w.created_at, w.creator_id, \
                              u.username AS creator_username";

pub async fn insert(
    pool: &PgPool,
    text: &str,
    creator_id: Uuid,
) -> Result<WordWithCreator, DatabaseError> {
    let word = sqlx::query_as::<_, WordWithCreator>(&format!(
        "INSERT INTO words (text, creator_id) VALUES ($1, $2) RETURNING {}",
        RETURNING
    ))
    .bind(text)
    .bind(creator_id)
    .fetch_one(pool)
    .await?;
    Ok(word)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<WordWithCreator>, DatabaseError> {
    let word = sqlx::query_as::<_, WordWithCreator>(&format!(
        "SELECT {} FROM words w LEFT JOIN users u ON u.id = w.creator_id WHERE w.id = $1",
        JOINED_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(word)
}

pub async fn list(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<WordWithCreator>, DatabaseError> {
    let words = sqlx::query_as::<_, WordWithCreator>(&format!(
        "SELECT {} FROM words w LEFT JOIN users u ON u.id = w.creator_id \
         ORDER BY w.created_at DESC OFFSET $1 LIMIT $2",
        JOINED_COLUMNS
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(words)
}

pub async fn update_text(
    pool: &PgPool,
    id: Uuid,
    text: &str,
) -> Result<WordWithCreator, DatabaseError> {
    let word = sqlx::query_as::<_, WordWithCreator>(&format!(
        "UPDATE words SET text = $2 WHERE id = $1 RETURNING {}",
        RETURNING
    ))
    .bind(id)
    .bind(text)
    .fetch_optional(pool)
    .await?;
    word.ok_or_else(|| DatabaseError::NotFound("Word not found".to_string()))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM words WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
