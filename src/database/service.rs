//! Database service layer
//!
//! PostgreSQL implementation of the storage interfaces, composed from the
//! per-table repositories.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::warn;

use crate::database::store::{ConferenceStore, StoreTransaction};
use crate::database::{CheckInRepository, DatabasePool, EventRepository, UserRepository};
use crate::models::*;
use crate::utils::errors::HackConfError;
use crate::utils::helpers::elapsed_ms;
use crate::utils::logging::log_database_operation;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DatabasePool,
    pub users: UserRepository,
    pub events: EventRepository,
    pub check_ins: CheckInRepository,
}

impl PgStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            check_ins: CheckInRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl ConferenceStore for PgStore {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, HackConfError> {
        let tx = self.pool.begin().await?;
        Ok(PgTransaction { tx })
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, HackConfError> {
        self.users.find_by_id(user_id).await
    }

    async fn find_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, HackConfError> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Ok(None);
        };

        let (tokens, application, talks, teams, events) = futures::try_join!(
            self.users.get_tokens(user_id),
            self.users.get_application(user_id),
            self.users.get_talks(user_id),
            self.users.get_team_memberships(user_id),
            self.events.get_attended_events(user_id),
        )?;

        let application = match application {
            Some(application) => {
                let skills = self.users.get_skills(application.id).await?;
                Some(ApplicationWithSkills { application, skills })
            }
            None => None,
        };

        Ok(Some(UserProfile {
            user,
            tokens,
            application,
            talks,
            teams,
            events,
        }))
    }

    async fn find_event_by_id(&self, event_id: i64) -> Result<Option<Event>, HackConfError> {
        self.events.find_by_id(event_id).await
    }

    async fn find_check_in(&self, event_id: i64, user_id: i64) -> Result<Option<CheckIn>, HackConfError> {
        self.check_ins.find(event_id, user_id).await
    }

    async fn list_check_ins(&self, event_id: i64) -> Result<Vec<CheckIn>, HackConfError> {
        self.check_ins.list_for_event(event_id).await
    }
}

/// An open PostgreSQL transaction.
///
/// Dropping it without `commit` makes sqlx roll back, but callers are
/// expected to close it explicitly.
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgTransaction {
    async fn create_check_in(&mut self, event_id: i64, user_id: i64) -> Result<CheckIn, HackConfError> {
        let started = Instant::now();
        let result = CheckInRepository::create(&mut self.tx, event_id, user_id).await;
        match &result {
            // the unique constraint doing its job is not a database failure
            Err(HackConfError::DuplicateCheckIn { .. }) => warn!(
                event_id = event_id,
                user_id = user_id,
                duration_ms = elapsed_ms(started),
                "Check-in insert hit unique constraint"
            ),
            _ => log_database_operation("insert", "check_ins", elapsed_ms(started), result.is_ok()),
        }
        result
    }

    async fn delete_user(&mut self, user_id: i64) -> Result<(), HackConfError> {
        let started = Instant::now();
        let result = UserRepository::delete(&mut self.tx, user_id).await;
        log_database_operation("delete", "users", elapsed_ms(started), result.is_ok());

        match result? {
            0 => Err(HackConfError::user_not_found()),
            _ => Ok(()),
        }
    }

    async fn commit(self) -> Result<(), HackConfError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), HackConfError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
