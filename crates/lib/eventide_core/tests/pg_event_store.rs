//! PostgreSQL event store tests.
//!
//! Each test gets a fresh database from `DATABASE_URL` with the embedded
//! migrations applied. Run with `cargo test -- --ignored` against a live server.

use chrono::{TimeZone, Utc};
use eventide_core::events::queries::PgEventStore;
use eventide_core::events::{
    Event, EventError, EventStore, NewEventImage, read_all_events, save_event, save_event_image,
};
use sqlx::PgPool;

fn sample(kind: &str) -> Event {
    Event::new(
        kind,
        Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
        format!("{kind} happened"),
    )
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_assigns_id_and_round_trips(pool: PgPool) {
    let store = PgEventStore::new(pool);

    let stored = save_event(&store, sample("arrival")).await.unwrap();

    assert!(stored.id.is_some());
    assert_eq!(read_all_events(&store).await.unwrap(), vec![stored]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_overwrites_matching_row(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let stored = save_event(&store, sample("arrival")).await.unwrap();

    let updated = save_event(
        &store,
        Event {
            description: "revised".into(),
            ..stored.clone()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.description, "revised");
    assert_eq!(read_all_events(&store).await.unwrap(), vec![updated]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_of_unknown_id_is_not_found(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let kept = save_event(&store, sample("kept")).await.unwrap();

    let err = store
        .update_event(&Event {
            id: Some(kept.id.unwrap() + 100),
            ..sample("ghost")
        })
        .await
        .unwrap_err();

    assert!(matches!(err, EventError::NotFound(_)));
    assert_eq!(read_all_events(&store).await.unwrap(), vec![kept]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn two_creates_are_two_rows(pool: PgPool) {
    let store = PgEventStore::new(pool);

    let a = save_event(&store, sample("twin")).await.unwrap();
    let b = save_event(&store, sample("twin")).await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(read_all_events(&store).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn image_links_to_event(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let event = save_event(&store, sample("sighting")).await.unwrap();
    let event_id = event.id.unwrap();

    let image = save_event_image(
        &store,
        NewEventImage {
            event_id,
            image_url: "/static/sighting.png".into(),
            caption: Some("blurry".into()),
        },
    )
    .await
    .unwrap();

    assert_eq!(image.event_id, event_id);
    assert_eq!(image.caption.as_deref(), Some("blurry"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn image_for_unknown_event_is_not_found(pool: PgPool) {
    let store = PgEventStore::new(pool);

    let err = save_event_image(
        &store,
        NewEventImage {
            event_id: 12345,
            image_url: "/static/none.png".into(),
            caption: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EventError::NotFound(12345)));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn nanosecond_timestamp_matches_stored_row(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let event = Event {
        occurred_at: Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
            + chrono::Duration::nanoseconds(987_654_321),
        ..sample("tick")
    };

    let stored = save_event(&store, event).await.unwrap();

    assert_eq!(stored.occurred_at.timestamp_subsec_nanos(), 987_654_000);
    assert_eq!(read_all_events(&store).await.unwrap(), vec![stored]);
}
