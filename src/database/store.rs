//! Storage interfaces consumed by the services
//!
//! Services never touch a pool directly. They are generic over a
//! [`ConferenceStore`], which answers lookups and opens a
//! [`StoreTransaction`] for writes. Production uses the PostgreSQL-backed
//! [`PgStore`](super::PgStore); tests swap in [`MemoryStore`](super::MemoryStore).

use async_trait::async_trait;

use crate::models::{CheckIn, Event, User, UserProfile};
use crate::utils::errors::Result;

#[async_trait]
pub trait ConferenceStore: Send + Sync {
    type Transaction: StoreTransaction;

    /// Open a new transaction scope
    async fn begin(&self) -> Result<Self::Transaction>;

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>>;

    /// Load a user with tokens, application and skills, talks, teams and attended events
    async fn find_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>>;

    async fn find_event_by_id(&self, event_id: i64) -> Result<Option<Event>>;

    async fn find_check_in(&self, event_id: i64, user_id: i64) -> Result<Option<CheckIn>>;

    /// Check-ins of an event, oldest first
    async fn list_check_ins(&self, event_id: i64) -> Result<Vec<CheckIn>>;
}

/// Writes performed inside one transaction scope.
///
/// Every transaction must end in exactly one call to `commit` or `rollback`.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Insert a check-in.
    ///
    /// Fails with `HackConfError::DuplicateCheckIn` when the (event, user)
    /// pair already exists; the transaction must then be rolled back.
    async fn create_check_in(&mut self, event_id: i64, user_id: i64) -> Result<CheckIn>;

    /// Delete a user and every row that depends on it
    async fn delete_user(&mut self, user_id: i64) -> Result<()>;

    /// Make the writes durable.
    ///
    /// A check-in that a concurrent transaction committed first fails here
    /// with `HackConfError::DuplicateCheckIn`; nothing is applied.
    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}
