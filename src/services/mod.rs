//! Services module
//!
//! This module contains the business logic services

pub mod check_in;
pub mod user;

// Re-export commonly used services
pub use check_in::CheckInCoordinator;
pub use user::UserDeleter;

use tracing::warn;

use crate::database::store::{ConferenceStore, StoreTransaction};
use crate::utils::logging::log_transaction_closed;

/// Service factory wiring every service to one store
#[derive(Clone)]
pub struct ServiceFactory<S> {
    pub check_ins: CheckInCoordinator<S>,
    pub users: UserDeleter<S>,
}

impl<S: ConferenceStore + Clone> ServiceFactory<S> {
    pub fn new(store: S) -> Self {
        Self {
            check_ins: CheckInCoordinator::new(store.clone()),
            users: UserDeleter::new(store),
        }
    }
}

/// Roll back after a failure; a rollback error is logged, never returned
pub(crate) async fn rollback_quietly<T: StoreTransaction>(tx: T, operation: &str) {
    match tx.rollback().await {
        Ok(()) => log_transaction_closed(operation, false),
        Err(e) => warn!(operation = operation, error = %e, "Rollback failed"),
    }
}
