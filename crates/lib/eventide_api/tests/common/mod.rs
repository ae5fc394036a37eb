//! Shared fixtures for router tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use eventide_api::{AppState, config::ApiConfig};
use eventide_core::chat::{ChatError, ChatModel, ChatService, Turn};
use eventide_core::events::memory::MemoryEventStore;
use eventide_core::rate_limit::RateLimiter;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Model double that replays canned replies, then echoes.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate(&self, history: &[Turn]) -> Result<Option<String>, ChatError> {
        if let Some(reply) = self.replies.lock().await.pop_front() {
            return Ok(reply);
        }
        let last = history.last().map(|t| t.text.as_str()).unwrap_or_default();
        Ok(Some(format!("echo: {last}")))
    }
}

pub struct TestApp {
    pub router: Router,
    pub chat: Arc<ChatService>,
    pub events: Arc<MemoryEventStore>,
}

pub fn test_config(static_dir: &Path) -> ApiConfig {
    let mut config = ApiConfig::from_lookup(|key| match key {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .expect("test config");
    config.bind_addr = "127.0.0.1:0".into();
    config.static_dir = static_dir.to_path_buf();
    config
}

/// App that trusts `x-user-id`, as it would behind the frontend proxy.
pub fn build(model: ScriptedModel, max_requests: u32, static_dir: &Path) -> TestApp {
    build_with_trust(model, max_requests, static_dir, true)
}

/// App with the default config: callers are keyed on their peer address.
pub fn build_untrusted(model: ScriptedModel, max_requests: u32, static_dir: &Path) -> TestApp {
    build_with_trust(model, max_requests, static_dir, false)
}

fn build_with_trust(
    model: ScriptedModel,
    max_requests: u32,
    static_dir: &Path,
    trust_identity_headers: bool,
) -> TestApp {
    let mut config = test_config(static_dir);
    config.trust_identity_headers = trust_identity_headers;
    let chat = Arc::new(ChatService::new(
        Arc::new(model),
        RateLimiter::new(max_requests, Duration::from_secs(60)),
    ));
    let events = Arc::new(MemoryEventStore::new());
    let state = AppState {
        events: events.clone(),
        chat: chat.clone(),
        config,
    };
    TestApp {
        router: eventide_api::router(state),
        chat,
        events,
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &TestApp, req: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(req).await.expect("request")
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}
