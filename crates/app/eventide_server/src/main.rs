//! Eventide API server binary.
//!
//! Loads configuration from the environment (and `.env`), runs migrations,
//! and serves the chat and event API until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use eventide_api::config::{ApiConfig, load_system_prompt};
use eventide_core::chat::ChatService;
use eventide_core::chat::gemini::{GeminiClient, GeminiConfig};
use eventide_core::events::queries::PgEventStore;
use eventide_core::rate_limit::RateLimiter;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// CLI arguments for the API server. Anything not set here comes from the
/// environment via `ApiConfig::from_env`.
#[derive(Parser, Debug)]
#[command(name = "eventide_server", about = "Eventide chat and event API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/eventide"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,eventide_api=debug,eventide_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    // A missing API key stops startup here.
    let mut config = ApiConfig::from_env()?;
    config.bind_addr = args.bind_addr;
    config.pg_connection_url = args.database_url;

    info!(
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        "starting eventide_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.pg_connection_url)
        .await?;

    info!("running database migrations");
    eventide_api::migrate(&pool).await?;
    info!("database ready");

    let mut gemini = GeminiConfig::new(config.gemini_api_key.clone());
    gemini.model = config.gemini_model.clone();
    gemini.system_prompt = load_system_prompt(&config.system_prompt_path);
    let model = GeminiClient::new(gemini)?;

    let chat = Arc::new(ChatService::new(
        Arc::new(model),
        RateLimiter::new(config.rate_limit_max_requests, config.rate_limit_window),
    ));
    chat.spawn_cleanup_task();

    let state = eventide_api::AppState {
        events: Arc::new(PgEventStore::new(pool)),
        chat,
        config: config.clone(),
    };

    let app = eventide_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
