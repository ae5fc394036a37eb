//! AI-observed event persistence.
//!
//! Provides the [`EventStore`] seam, its PostgreSQL implementation
//! ([`queries::PgEventStore`]), a volatile in-process implementation
//! ([`memory::MemoryEventStore`]), and the upsert workflow in [`upsert`].

pub mod memory;
pub mod queries;
pub mod upsert;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use upsert::{read_all_events, save_event, save_event_image};

/// Event persistence errors.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Event not found: {0}")]
    NotFound(i64),

    #[error("Event has no identifier")]
    MissingId,

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Digits of sub-second precision kept for timestamps (PostgreSQL
/// `TIMESTAMPTZ` resolution).
pub const TIMESTAMP_PRECISION: u16 = 6;

/// One occurrence observed by the AI.
///
/// `id` is `None` until the store assigns one; its presence alone decides
/// whether [`save_event`] inserts or updates. `occurred_at` is kept to
/// microseconds; [`Event::new`] and [`save_event`] truncate anything finer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: Option<i64>,
    pub kind: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl Event {
    /// Build a new, not yet persisted event.
    pub fn new(
        kind: impl Into<String>,
        occurred_at: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            occurred_at: occurred_at.trunc_subsecs(TIMESTAMP_PRECISION),
            description: description.into(),
        }
    }

    /// Drop sub-microsecond digits from `occurred_at`.
    pub fn normalized(self) -> Self {
        Self {
            occurred_at: self.occurred_at.trunc_subsecs(TIMESTAMP_PRECISION),
            ..self
        }
    }

    /// Reject events the store would accept but nobody could use.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.kind.trim().is_empty() {
            return Err(EventError::Validation("event kind must not be empty".into()));
        }
        Ok(())
    }
}

/// Image attached to a stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventImage {
    pub id: i64,
    pub event_id: i64,
    pub image_url: String,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`EventStore::create_image`]. The parent event is always named
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventImage {
    pub event_id: i64,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Storage operations for events and their images.
///
/// Implementations open a session per call and release it on every exit path.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event row and return it with its assigned id.
    async fn create_event(&self, event: &Event) -> Result<Event, EventError>;

    /// All stored events, ordered by id.
    async fn get_all_events(&self) -> Result<Vec<Event>, EventError>;

    /// Insert an image row for an existing event.
    async fn create_image(&self, image: &NewEventImage) -> Result<EventImage, EventError>;

    /// Overwrite the row matching `event.id`.
    async fn update_event(&self, event: &Event) -> Result<Event, EventError>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn new_event_has_no_id() {
        let event = Event::new("arrival", Utc::now(), "a ship docked");
        assert!(event.id.is_none());
    }

    #[test]
    fn new_truncates_to_microseconds() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let event = Event::new("tick", at, "");
        assert_eq!(event.occurred_at.timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn normalized_truncates_struct_literal_timestamps() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::nanoseconds(999);
        let event = Event {
            id: None,
            kind: "tick".into(),
            occurred_at: at,
            description: String::new(),
        }
        .normalized();
        assert_eq!(event.occurred_at.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn blank_kind_is_rejected() {
        let event = Event::new("  ", Utc::now(), "");
        assert!(matches!(event.validate(), Err(EventError::Validation(_))));
    }

    #[test]
    fn event_deserializes_without_id() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "kind": "storm",
            "occurredAt": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(event.id, None);
        assert_eq!(event.kind, "storm");
        assert_eq!(event.description, "");
    }

    #[test]
    fn event_serializes_camel_case() {
        let mut event = Event::new("storm", Utc::now(), "rain");
        event.id = Some(7);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json.get("occurredAt").is_some());
    }
}
