//! Conversation history, one per caller.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Author of a turn, using the model provider's role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Ordered turns of a single conversation. Grows without bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Shared handle to one caller's history.
pub type SharedHistory = Arc<Mutex<ConversationHistory>>;

/// Conversation histories keyed by caller identity.
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: DashMap<String, SharedHistory>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The caller's history, created empty on first use.
    pub fn session(&self, caller: &str) -> SharedHistory {
        // Clone the handle so the map shard is not held across an await.
        self.sessions
            .entry(caller.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Copy of the caller's turns; empty if the caller has none.
    pub async fn snapshot(&self, caller: &str) -> Vec<Turn> {
        let Some(history) = self.sessions.get(caller).map(|h| h.value().clone()) else {
            return Vec::new();
        };
        let guard = history.lock().await;
        guard.turns().to_vec()
    }

    /// Number of callers with a conversation.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
