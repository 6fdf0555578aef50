use sqlx::PgPool;
use uuid::Uuid;

use super::models::User;
use super::DatabaseError;

const COLUMNS: &str = "id, username, password_hash, email, is_admin, is_active";

pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = $1",
        COLUMNS
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn insert(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    email: Option<&str>,
    is_admin: bool,
) -> Result<User, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, password_hash, email, is_admin) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        COLUMNS
    ))
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .bind(is_admin)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<User>, DatabaseError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY username OFFSET $1 LIMIT $2",
        COLUMNS
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Returns true when a row was actually deleted.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
