//! Lingo Backend
//!
//! REST backend for a language-learning site: accounts, learning activities,
//! progress tracking and a leaderboard, persisted in a SQLite-backed key-value store.

mod activity;
mod api;
mod catalog;
mod config;
mod errors;
mod leaderboard;
mod models;
mod progress;
mod scoring;
mod session;
mod store;
mod users;
mod validation;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use activity::{ActivityRuns, ActivitySettings, CompletionRecorder};
use config::Config;
use leaderboard::Leaderboard;
use progress::ProgressStore;
use session::SessionState;
use store::{KeyValueStore, SqliteStore};
use users::UserDirectory;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
    pub users: UserDirectory,
    pub session: SessionState,
    pub progress: ProgressStore,
    pub leaderboard: Leaderboard,
    pub runs: ActivityRuns,
}

impl AppState {
    /// Wire every service onto one store.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        let progress = ProgressStore::new(store.clone());
        let leaderboard = Leaderboard::new(store.clone(), config.leaderboard_size);
        let recorder = CompletionRecorder::new(progress.clone(), leaderboard.clone());
        let runs = ActivityRuns::new(
            recorder,
            ActivitySettings {
                time_limit: config.timed_challenge,
                reveal_delay: config.reveal_delay,
            },
        );

        Self {
            users: UserDirectory::new(store.clone()),
            session: SessionState::new(store.clone()),
            progress,
            leaderboard,
            runs,
            store,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Lingo Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize the store and seed empty tables
    let pool = store::init_database(&config.db_path).await?;
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(pool));
    store::seed_defaults(store.as_ref()).await?;

    let state = AppState::new(store, &config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Accounts
        .route("/auth/signup", post(api::signup))
        .route("/auth/login", post(api::login))
        .route("/auth/logout", post(api::logout))
        .route("/auth/session", get(api::current_session))
        // Catalog
        .route("/modules", get(api::list_modules))
        .route("/modules/{id}", get(api::get_module))
        .route("/modules/{id}/runs", post(api::start_run))
        // Activity runs
        .route("/runs/{id}", get(api::get_run).delete(api::abandon_run))
        .route("/runs/{id}/actions", post(api::run_action))
        // Progress
        .route("/profile", get(api::get_profile))
        .route("/leaderboard", get(api::get_leaderboard))
        // Contact
        .route("/contact", post(api::submit_contact));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
