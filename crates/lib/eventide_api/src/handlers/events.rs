//! Event persistence handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use eventide_core::events::{self, Event, EventImage, NewEventImage};

use crate::AppState;
use crate::error::AppResult;
use crate::models::CreateImageRequest;

/// `GET /events` — every stored event (diagnostic listing, unpaginated).
pub async fn list_events_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let all = events::read_all_events(state.events.as_ref()).await?;
    Ok(Json(all))
}

/// `POST /events` — create the event if it has no id, otherwise update it.
pub async fn save_event_handler(
    State(state): State<AppState>,
    Json(event): Json<Event>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let status = if event.id.is_none() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let stored = events::save_event(state.events.as_ref(), event).await?;
    Ok((status, Json(stored)))
}

/// `POST /events/{id}/images` — attach an image to an existing event.
pub async fn create_image_handler(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(body): Json<CreateImageRequest>,
) -> AppResult<(StatusCode, Json<EventImage>)> {
    let image = events::save_event_image(
        state.events.as_ref(),
        NewEventImage {
            event_id,
            image_url: body.image_url,
            caption: body.caption,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(image)))
}
