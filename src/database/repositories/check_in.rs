//! Check-in repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::check_in::CheckIn;
use crate::utils::errors::HackConfError;

/// PostgreSQL SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
#[derive(Debug)]
pub struct CheckInRepository {
    pool: PgPool,
}

impl CheckInRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the check-in for an (event, user) pair
    pub async fn find(&self, event_id: i64, user_id: i64) -> Result<Option<CheckIn>, HackConfError> {
        let check_in = sqlx::query_as::<_, CheckIn>(
            "SELECT id, event_id, user_id, created_at FROM check_ins WHERE event_id = $1 AND user_id = $2"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(check_in)
    }

    /// Insert a check-in inside a transaction
    pub async fn create(conn: &mut PgConnection, event_id: i64, user_id: i64) -> Result<CheckIn, HackConfError> {
        sqlx::query_as::<_, CheckIn>(
            r#"
            INSERT INTO check_ins (event_id, user_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, user_id, created_at
            "#
        )
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                HackConfError::DuplicateCheckIn { event_id, user_id }
            }
            other => HackConfError::Database(other),
        })
    }

    /// Check-ins for an event, oldest first
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<CheckIn>, HackConfError> {
        let check_ins = sqlx::query_as::<_, CheckIn>(
            "SELECT id, event_id, user_id, created_at FROM check_ins WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(check_ins)
    }

    /// Number of check-ins recorded for a pair; at most one
    pub async fn count_for_pair(&self, event_id: i64, user_id: i64) -> Result<i64, HackConfError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM check_ins WHERE event_id = $1 AND user_id = $2"
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
