//! One prompt → reply exchange.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::history::{ConversationHistory, ConversationStore, Turn};
use super::{ChatModel, TOOL_FALLBACK_REPLY, UNAVAILABLE_REPLY};
use crate::rate_limit::{RateLimitExceeded, RateLimiter};

/// Reasons a turn is refused before anything is recorded.
#[derive(Debug, Error)]
pub enum ChatTurnError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error(transparent)]
    RateLimited(#[from] RateLimitExceeded),
}

/// Append the prompt, ask the model, append the reply, return the reply.
///
/// Both turns are always recorded, in order. A model that answers without
/// text or fails outright yields a fixed fallback reply instead of an error.
pub async fn run_turn(
    history: &mut ConversationHistory,
    model: &dyn ChatModel,
    prompt: &str,
) -> String {
    history.push(Turn::user(prompt));

    let reply = match model.generate(history.turns()).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            warn!("model attempted a tool call but returned no text");
            TOOL_FALLBACK_REPLY.to_string()
        }
        Err(e) => {
            warn!(error = %e, "model call failed");
            UNAVAILABLE_REPLY.to_string()
        }
    };

    history.push(Turn::model(reply.clone()));
    reply
}

/// Conversations, rate limiting, and the model, wired together.
pub struct ChatService {
    conversations: ConversationStore,
    limiter: RateLimiter,
    model: Arc<dyn ChatModel>,
}

impl ChatService {
    pub fn new(model: Arc<dyn ChatModel>, limiter: RateLimiter) -> Self {
        Self {
            conversations: ConversationStore::new(),
            limiter,
            model,
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Spawn a task that evicts expired rate-limit windows once per window.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(service.limiter.window());
            loop {
                interval.tick().await;
                service.limiter.cleanup();
                debug!(tracked = service.limiter.len(), "rate limit windows cleaned");
            }
        })
    }

    /// Handle one prompt from `caller`.
    ///
    /// Refusals (empty prompt, rate limit) leave the caller's history
    /// untouched. The caller's history stays locked for the whole exchange,
    /// so concurrent prompts from one caller are recorded one pair at a time.
    pub async fn handle_turn(&self, caller: &str, prompt: &str) -> Result<String, ChatTurnError> {
        if prompt.trim().is_empty() {
            return Err(ChatTurnError::EmptyPrompt);
        }
        self.limiter.check(caller)?;

        let session = self.conversations.session(caller);
        let mut history = session.lock().await;
        let reply = run_turn(&mut history, self.model.as_ref(), prompt).await;
        debug!(caller, turns = history.len(), "chat turn complete");
        Ok(reply)
    }
}
