//! API server configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use eventide_core::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors. Any of these stops the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// Gemini API key.
    pub gemini_api_key: String,
    /// Gemini model name.
    pub gemini_model: String,
    /// System prompt file; a missing file means no system prompt.
    pub system_prompt_path: PathBuf,
    /// Directory served under `/static` when it exists.
    pub static_dir: PathBuf,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Chat requests allowed per caller per window.
    pub rate_limit_max_requests: u32,
    /// Rate limit window.
    pub rate_limit_window: Duration,
    /// Key callers on `x-user-id` / `x-forwarded-for` instead of the peer
    /// address. Only safe behind a proxy that sets those headers itself.
    pub trust_identity_headers: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("pg_connection_url", &self.pg_connection_url)
            .field("gemini_api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("system_prompt_path", &self.system_prompt_path)
            .field("static_dir", &self.static_dir)
            .field("cors_origins", &self.cors_origins)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("trust_identity_headers", &self.trust_identity_headers)
            .finish()
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                  | Default                                      |
    /// |---------------------------|----------------------------------------------|
    /// | `BIND_ADDR`               | `127.0.0.1:8000`                             |
    /// | `DATABASE_URL`            | `postgres://localhost:5432/eventide`         |
    /// | `GEMINI_API_KEY`          | required                                     |
    /// | `GEMINI_MODEL`            | `gemini-2.5-flash`                           |
    /// | `SYSTEM_PROMPT_PATH`      | `prompts/system_prompt.md`                   |
    /// | `STATIC_DIR`              | `static`                                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173,http://127.0.0.1:5173`|
    /// | `RATE_LIMIT_MAX_REQUESTS` | `10`                                         |
    /// | `RATE_LIMIT_WINDOW_SECS`  | `60`                                         |
    /// | `TRUST_IDENTITY_HEADERS`  | `false`                                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let gemini_api_key = lookup("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let cors_origins = var(
            "CORS_ORIGINS",
            "http://localhost:5173,http://127.0.0.1:5173",
        )
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

        let rate_limit_max_requests = match lookup("RATE_LIMIT_MAX_REQUESTS") {
            None => DEFAULT_MAX_REQUESTS,
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    key: "RATE_LIMIT_MAX_REQUESTS",
                    value: v,
                })?,
        };

        let rate_limit_window = match lookup("RATE_LIMIT_WINDOW_SECS") {
            None => DEFAULT_WINDOW,
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    key: "RATE_LIMIT_WINDOW_SECS",
                    value: v,
                })?,
        };

        let trust_identity_headers = match lookup("TRUST_IDENTITY_HEADERS") {
            None => false,
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid {
                key: "TRUST_IDENTITY_HEADERS",
                value: v,
            })?,
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR", "127.0.0.1:8000"),
            pg_connection_url: var("DATABASE_URL", "postgres://localhost:5432/eventide"),
            gemini_api_key,
            gemini_model: var("GEMINI_MODEL", eventide_core::chat::gemini::DEFAULT_MODEL),
            system_prompt_path: var("SYSTEM_PROMPT_PATH", "prompts/system_prompt.md").into(),
            static_dir: var("STATIC_DIR", "static").into(),
            cors_origins,
            rate_limit_max_requests,
            rate_limit_window,
            trust_identity_headers,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Read the system prompt, or `None` if the file is missing or unreadable.
pub fn load_system_prompt(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(prompt) => {
            info!(path = %path.display(), bytes = prompt.len(), "loaded system prompt");
            Some(prompt)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "system prompt file not found");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read system prompt");
            None
        }
    }
}
