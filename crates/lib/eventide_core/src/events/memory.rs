//! Volatile in-process event store.
//!
//! Mirrors the PostgreSQL store's semantics (sequential ids, not-found on
//! unknown ids, images must reference an existing event) without a database.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Event, EventError, EventImage, EventStore, NewEventImage};

#[derive(Debug, Default)]
struct Tables {
    events: Vec<Event>,
    images: Vec<EventImage>,
    next_event_id: i64,
    next_image_id: i64,
}

/// [`EventStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    tables: Mutex<Tables>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images stored for the given event, in insertion order.
    pub async fn images_for(&self, event_id: i64) -> Vec<EventImage> {
        let tables = self.tables.lock().await;
        tables
            .images
            .iter()
            .filter(|img| img.event_id == event_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn create_event(&self, event: &Event) -> Result<Event, EventError> {
        let mut tables = self.tables.lock().await;
        tables.next_event_id += 1;
        let stored = Event {
            id: Some(tables.next_event_id),
            ..event.clone()
        };
        tables.events.push(stored.clone());
        Ok(stored)
    }

    async fn get_all_events(&self) -> Result<Vec<Event>, EventError> {
        Ok(self.tables.lock().await.events.clone())
    }

    async fn create_image(&self, image: &NewEventImage) -> Result<EventImage, EventError> {
        let mut tables = self.tables.lock().await;
        if !tables.events.iter().any(|e| e.id == Some(image.event_id)) {
            return Err(EventError::NotFound(image.event_id));
        }
        tables.next_image_id += 1;
        let stored = EventImage {
            id: tables.next_image_id,
            event_id: image.event_id,
            image_url: image.image_url.clone(),
            caption: image.caption.clone(),
            created_at: Utc::now(),
        };
        tables.images.push(stored.clone());
        Ok(stored)
    }

    async fn update_event(&self, event: &Event) -> Result<Event, EventError> {
        let id = event.id.ok_or(EventError::MissingId)?;
        let mut tables = self.tables.lock().await;
        let slot = tables
            .events
            .iter_mut()
            .find(|e| e.id == Some(id))
            .ok_or(EventError::NotFound(id))?;
        *slot = event.clone();
        Ok(slot.clone())
    }
}
