//! PostgreSQL-backed event store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{Event, EventError, EventImage, EventStore, NewEventImage};

/// [`EventStore`] over a PostgreSQL pool.
///
/// Each call checks out its own connection or transaction. Dropping an
/// uncommitted transaction rolls it back and returns the connection.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create_event(&self, event: &Event) -> Result<Event, EventError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (kind, occurred_at, description)
            VALUES ($1, $2, $3)
            RETURNING id, kind, occurred_at, description
            "#,
        )
        .bind(&event.kind)
        .bind(event.occurred_at)
        .bind(&event.description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn get_all_events(&self) -> Result<Vec<Event>, EventError> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, kind, occurred_at, description
            FROM events
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows)
    }

    async fn create_image(&self, image: &NewEventImage) -> Result<EventImage, EventError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, EventImage>(
            r#"
            INSERT INTO event_images (event_id, image_url, caption)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, image_url, caption, created_at
            "#,
        )
        .bind(image.event_id)
        .bind(&image.image_url)
        .bind(&image.caption)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                EventError::NotFound(image.event_id)
            }
            other => EventError::Storage(other),
        })?;

        tx.commit().await?;
        Ok(row)
    }

    async fn update_event(&self, event: &Event) -> Result<Event, EventError> {
        let id = event.id.ok_or(EventError::MissingId)?;
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET kind = $1, occurred_at = $2, description = $3, updated_at = now()
            WHERE id = $4
            RETURNING id, kind, occurred_at, description
            "#,
        )
        .bind(&event.kind)
        .bind(event.occurred_at)
        .bind(&event.description)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(EventError::NotFound(id))?;

        tx.commit().await?;
        Ok(row)
    }
}
