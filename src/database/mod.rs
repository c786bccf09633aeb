//! Database module
//!
//! This module handles database connections, the storage interfaces the
//! services depend on, and their PostgreSQL and in-memory implementations

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, run_migrations, health_check};
pub use memory::{MemoryStore, MemoryTransaction, TransactionStats};
pub use repositories::{UserRepository, EventRepository, CheckInRepository};
pub use service::{PgStore, PgTransaction};
pub use store::{ConferenceStore, StoreTransaction};
