//! Event upsert workflow.
//!
//! Insert-if-new, update-otherwise, keyed solely by the presence of
//! [`Event::id`].

use tracing::{debug, info};

use super::{Event, EventError, EventImage, EventStore, NewEventImage};

/// Persist an AI-generated event.
///
/// An event without an id is inserted and returned with the id the store
/// assigned; an event with an id overwrites the matching row. There is no
/// deduplication: saving two id-less events creates two rows.
///
/// `occurred_at` is truncated to microseconds first, so the returned event
/// matches what a later read yields.
pub async fn save_event(store: &dyn EventStore, event: Event) -> Result<Event, EventError> {
    event.validate()?;
    let event = event.normalized();

    match event.id {
        None => {
            let stored = store.create_event(&event).await?;
            info!(event_id = ?stored.id, kind = %stored.kind, "event created");
            Ok(stored)
        }
        Some(id) => {
            let stored = store.update_event(&event).await?;
            info!(event_id = id, kind = %stored.kind, "event updated");
            Ok(stored)
        }
    }
}

/// Persist an image for an existing event.
pub async fn save_event_image(
    store: &dyn EventStore,
    image: NewEventImage,
) -> Result<EventImage, EventError> {
    if image.image_url.trim().is_empty() {
        return Err(EventError::Validation("image url must not be empty".into()));
    }
    let stored = store.create_image(&image).await?;
    info!(event_id = stored.event_id, image_id = stored.id, "event image saved");
    Ok(stored)
}

/// Every stored event. Diagnostic use only.
pub async fn read_all_events(store: &dyn EventStore) -> Result<Vec<Event>, EventError> {
    let events = store.get_all_events().await?;
    debug!(count = events.len(), "read all events");
    Ok(events)
}
