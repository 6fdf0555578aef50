use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for an uploaded photo. The blob itself lives in the object
/// store under `object_key`; this row is metadata only.
#[derive(Debug, Clone, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub object_key: String,
    pub uploaded_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

/// Photo row joined with its owner's username for response shaping.
/// The username is optional because the join is best effort.
#[derive(Debug, Clone, FromRow)]
pub struct PhotoWithOwner {
    pub id: Uuid,
    pub object_key: String,
    pub uploaded_at: DateTime<Utc>,
    pub owner_id: Uuid,
    pub owner_username: Option<String>,
}
