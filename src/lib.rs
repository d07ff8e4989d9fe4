//! Forum backend
//!
//! Topic listings and tag partials over SQLite persistence.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use api::TagController;
use config::Config;
use db::{TagRepository, TopicRepository, UnitOfWorkManager};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub uow: Arc<UnitOfWorkManager>,
    pub topics: TopicRepository,
    pub tag_controller: Arc<TagController>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the repositories and controllers over one connection pool.
    pub fn new(pool: sqlx::SqlitePool, config: Config) -> Self {
        let uow = Arc::new(UnitOfWorkManager::new(pool));
        let tag_controller = Arc::new(TagController::new(
            uow.clone(),
            Arc::new(TagRepository::new()),
            config.popular_tag_count,
        ));

        Self {
            uow,
            topics: TopicRepository::new(),
            tag_controller,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Topics
        .route("/topics", get(api::list_topics))
        .route("/topics/recent", get(api::recent_topics))
        .route("/topics/popular", get(api::popular_topics))
        .route("/topics/count", get(api::topic_count))
        .route("/topics/slug/{slug}", get(api::get_topic_by_slug))
        .route("/topics/{id}", get(api::get_topic))
        .route("/categories/{id}/topics", get(api::category_topics))
        .route("/tags/{tag}/topics", get(api::tag_topics))
        .route("/members/{id}/topics", get(api::member_topics))
        .route("/members/{id}/solved", get(api::member_solved_topics))
        // Partials
        .route("/partials/popular-tags", get(api::popular_tags_partial));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
