//! # eventide_api
//!
//! HTTP API library for Eventide.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use eventide_core::chat::ChatService;
use eventide_core::events::EventStore;
use sqlx::PgPool;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::handlers::{chat, events, status};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Event persistence.
    pub events: Arc<dyn EventStore>,
    /// Conversations, rate limiting, and the model.
    pub chat: Arc<ChatService>,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `eventide_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    eventide_core::migrate::migrate(pool).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentialed CORS forbids wildcards, so methods and headers are mirrored.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Builds the Axum router with all routes and shared state.
///
/// `/static` is mounted only if the configured directory exists now.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let static_dir = state.config.static_dir.clone();

    let mut app = Router::new()
        .route("/", get(status::root))
        .route("/chat", post(chat::chat_handler))
        .route(
            "/events",
            get(events::list_events_handler).post(events::save_event_handler),
        )
        .route("/events/{id}/images", post(events::create_image_handler));

    if static_dir.is_dir() {
        info!(path = %static_dir.display(), "serving static files at /static");
        app = app.nest_service("/static", ServeDir::new(static_dir));
    } else {
        warn!(
            path = %static_dir.display(),
            "static folder not found, images will not load"
        );
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
