//! # eventide_core
//!
//! Core domain logic for Eventide: event persistence, conversation history,
//! the chat turn workflow, and the Gemini model client.

pub mod chat;
pub mod events;
pub mod migrate;
pub mod rate_limit;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
