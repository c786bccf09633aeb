//! Event repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::event::{CreateEventRequest, Event};
use crate::utils::errors::HackConfError;

#[derive(Clone)]
#[derive(Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, HackConfError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, starts_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, starts_at, created_at, updated_at
            "#
        )
        .bind(request.name)
        .bind(request.starts_at)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, HackConfError> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, name, starts_at, created_at, updated_at FROM events WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Events a user has checked into
    pub async fn get_attended_events(&self, user_id: i64) -> Result<Vec<Event>, HackConfError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.id, e.name, e.starts_at, e.created_at, e.updated_at
            FROM events e
            INNER JOIN check_ins c ON e.id = c.event_id
            WHERE c.user_id = $1
            ORDER BY c.created_at ASC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
