use sqlx::PgPool;

use crate::auth::Tokens;
use crate::storage::ObjectStorage;

/// Shared application state, constructed once in `main` and injected into
/// handlers. Everything here is internally synchronized or immutable after
/// startup, so requests run fully concurrently without in-process locks.
pub struct AppState {
    pub pool: PgPool,
    pub storage: ObjectStorage,
    pub tokens: Tokens,
}
