//! HackConf backend core
//!
//! Event check-ins and user removal for the HackConf conference backend.
//! Services are generic over a storage interface, with a PostgreSQL
//! implementation for production and an in-memory one for tests.

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{HackConfError, Result};

// Re-export main components for easy access
pub use database::{ConferenceStore, MemoryStore, PgStore, StoreTransaction};
pub use services::{CheckInCoordinator, ServiceFactory, UserDeleter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
