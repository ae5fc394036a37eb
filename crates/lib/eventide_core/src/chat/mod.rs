//! Chat turns against the hosted model.
//!
//! # Public API
//!
//! - [`ChatService::handle_turn`] — rate-limit, record the prompt, ask the
//!   model, record the reply
//! - [`ConversationStore`] — per-caller conversation histories
//! - [`ChatModel`] — the model seam; [`gemini::GeminiClient`] implements it

pub mod gemini;
pub mod history;
pub mod turn;

use async_trait::async_trait;
use thiserror::Error;

pub use history::{ConversationHistory, ConversationStore, Role, Turn};
pub use turn::{ChatService, ChatTurnError};

/// Reply recorded when the model answers with a tool call and no text.
pub const TOOL_FALLBACK_REPLY: &str =
    "I am attempting to use a tool, but was unable to get confirmation.";

/// Reply recorded when the model cannot be reached or answers with an error.
pub const UNAVAILABLE_REPLY: &str = "The model is unavailable right now. Please try again later.";

/// Errors from the model provider.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Provider response parse error: {0}")]
    Parse(String),
}

/// A generative model that continues a conversation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the next model turn for `history`.
    ///
    /// `Ok(None)` means the model answered without any text (for example a
    /// bare function call it expects the caller to resolve).
    async fn generate(&self, history: &[Turn]) -> Result<Option<String>, ChatError>;
}
