use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Vocabulary word joined with its creator's username.
#[derive(Debug, Clone, FromRow)]
pub struct WordWithCreator {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub creator_id: Uuid,
    pub creator_username: Option<String>,
}
