use sqlx::FromRow;
use uuid::Uuid;

/// Database row for a registered user. Carries the password hash, so this
/// type never serializes directly into a response body.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
}
