use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod state;
mod storage;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting gallery-api");

    // Both stores must be reachable before the listener binds; a failure
    // here is fatal, unlike per-request storage errors
    let pool = database::connect(&config).await?;
    let object_storage = storage::ObjectStorage::connect(&config.storage).await?;
    let tokens = auth::Tokens::new(&config.security);

    let state = Arc::new(AppState {
        pool,
        storage: object_storage,
        tokens,
    });

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("gallery-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .merge(auth_routes(state.clone()))
        // Bearer-protected resources
        .merge(protected_routes(state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes(state: Arc<AppState>) -> Router {
    use handlers::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state)
}

fn protected_routes(state: Arc<AppState>) -> Router {
    use handlers::{photos, users, words};

    Router::new()
        // Users
        .route("/users/me", get(users::me))
        .route("/users", get(users::list_users))
        .route(
            "/users/:user_id",
            get(users::get_user).delete(users::delete_user),
        )
        // Photos
        .route("/photos/upload", post(photos::upload_photo))
        .route("/photos", get(photos::list_photos))
        .route(
            "/photos/:photo_id",
            get(photos::get_photo).delete(photos::delete_photo),
        )
        // Vocabulary words
        .route("/words", post(words::create_word).get(words::list_words))
        .route(
            "/words/:word_id",
            put(words::update_word).delete(words::delete_word),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::jwt_auth_middleware,
        ))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Photo Gallery API!" }))
}
