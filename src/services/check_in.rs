//! Check-in service
//!
//! Records event attendance. A user can check into an event once; repeated
//! attempts are answered with `success: false` and write nothing.

use tracing::{debug, warn};

use crate::database::store::{ConferenceStore, StoreTransaction};
use crate::models::{ActionResponse, CheckIn};
use crate::services::rollback_quietly;
use crate::utils::errors::{HackConfError, Result};
use crate::utils::helpers::validate_id;
use crate::utils::logging::{log_check_in, log_transaction_closed};

enum CheckInOutcome {
    CheckedIn(CheckIn),
    AlreadyCheckedIn,
}

/// Coordinates the lookups and the transactional insert behind a check-in
#[derive(Clone)]
pub struct CheckInCoordinator<S> {
    store: S,
}

impl<S: ConferenceStore> CheckInCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Check a user into an event.
    ///
    /// Lookups run on the pool before any transaction is opened, so a
    /// check-in never waits on a second connection while holding one. The
    /// transaction only wraps the insert and is always committed or rolled
    /// back before this returns.
    pub async fn check_in(&self, event_id: i64, user_id: i64) -> Result<ActionResponse> {
        validate_id("event_id", event_id)?;
        validate_id("user_id", user_id)?;
        debug!(event_id = event_id, user_id = user_id, "Attempting check-in");

        let (user, event, existing) = futures::try_join!(
            self.store.find_user_by_id(user_id),
            self.store.find_event_by_id(event_id),
            self.store.find_check_in(event_id, user_id),
        )?;

        let user = user.ok_or_else(HackConfError::user_not_found)?;
        let event = event.ok_or_else(HackConfError::event_not_found)?;

        let outcome = match existing {
            Some(_) => CheckInOutcome::AlreadyCheckedIn,
            None => self.insert_check_in(event_id, user_id).await?,
        };

        match outcome {
            CheckInOutcome::CheckedIn(check_in) => {
                log_check_in(check_in.event_id, check_in.user_id, true);
                Ok(ActionResponse::succeeded(format!(
                    "{} checked into {}!",
                    user.email, event.name
                )))
            }
            CheckInOutcome::AlreadyCheckedIn => {
                log_check_in(event_id, user_id, false);
                Ok(ActionResponse::rejected(format!(
                    "{} has already checked into {}",
                    user.email, event.name
                )))
            }
        }
    }

    async fn insert_check_in(&self, event_id: i64, user_id: i64) -> Result<CheckInOutcome> {
        let mut tx = self.store.begin().await?;

        match tx.create_check_in(event_id, user_id).await {
            Ok(check_in) => {
                // a commit that loses to a concurrent insert surfaces as a duplicate too
                match tx.commit().await {
                    Ok(()) => {
                        log_transaction_closed("check_in", true);
                        Ok(CheckInOutcome::CheckedIn(check_in))
                    }
                    Err(HackConfError::DuplicateCheckIn { .. }) => {
                        warn!(event_id = event_id, user_id = user_id, "Check-in lost race to a concurrent insert");
                        Ok(CheckInOutcome::AlreadyCheckedIn)
                    }
                    Err(e) => Err(e),
                }
            }
            Err(HackConfError::DuplicateCheckIn { .. }) => {
                // a concurrent request inserted the pair after our lookup
                warn!(event_id = event_id, user_id = user_id, "Check-in lost race to a concurrent insert");
                rollback_quietly(tx, "check_in").await;
                Ok(CheckInOutcome::AlreadyCheckedIn)
            }
            Err(e) => {
                rollback_quietly(tx, "check_in").await;
                Err(e)
            }
        }
    }

    /// Check-ins recorded for an event, oldest first
    pub async fn attendees(&self, event_id: i64) -> Result<Vec<CheckIn>> {
        validate_id("event_id", event_id)?;

        if self.store.find_event_by_id(event_id).await?.is_none() {
            return Err(HackConfError::event_not_found());
        }
        self.store.list_check_ins(event_id).await
    }

    pub async fn has_checked_in(&self, event_id: i64, user_id: i64) -> Result<bool> {
        validate_id("event_id", event_id)?;
        validate_id("user_id", user_id)?;

        Ok(self.store.find_check_in(event_id, user_id).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use assert_matches::assert_matches;

    fn setup() -> (MemoryStore, CheckInCoordinator<MemoryStore>) {
        let store = MemoryStore::new();
        (store.clone(), CheckInCoordinator::new(store))
    }

    #[tokio::test]
    async fn test_first_check_in_succeeds() {
        let (store, coordinator) = setup();
        let user = store.insert_user("a@b.com");
        let event = store.insert_event("Hackathon");

        let response = coordinator.check_in(event.id, user.id).await.unwrap();

        assert_eq!(response, ActionResponse::succeeded("a@b.com checked into Hackathon!"));
        assert_eq!(store.count("check_ins"), 1);
        assert!(coordinator.has_checked_in(event.id, user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_check_in_is_rejected_without_opening_a_transaction() {
        let (store, coordinator) = setup();
        let user = store.insert_user("a@b.com");
        let event = store.insert_event("Hackathon");

        coordinator.check_in(event.id, user.id).await.unwrap();
        let response = coordinator.check_in(event.id, user.id).await.unwrap();

        assert_eq!(response, ActionResponse::rejected("a@b.com has already checked into Hackathon"));
        assert_eq!(store.count("check_ins"), 1);

        let stats = store.transaction_stats();
        assert_eq!(stats.begun, 1);
        assert_eq!(stats.committed, 1);
        assert_eq!(stats.rolled_back, 0);
        assert_eq!(stats.abandoned, 0);
        assert_eq!(stats.open(), 0);
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let (store, coordinator) = setup();
        let event = store.insert_event("Hackathon");

        let err = coordinator.check_in(event.id, 999).await.unwrap_err();

        assert_matches!(err, HackConfError::NotFound(ref msg) if msg == "user does not exist");
        assert_eq!(store.count("check_ins"), 0);
        assert_eq!(store.transaction_stats().begun, 0);
    }

    #[tokio::test]
    async fn test_missing_event_is_not_found() {
        let (store, coordinator) = setup();
        let user = store.insert_user("a@b.com");

        let err = coordinator.check_in(999, user.id).await.unwrap_err();

        assert_matches!(err, HackConfError::NotFound(ref msg) if msg == "event does not exist");
        assert_eq!(store.count("check_ins"), 0);
        assert_eq!(store.transaction_stats().begun, 0);
    }

    #[tokio::test]
    async fn test_missing_user_reported_before_missing_event() {
        let (_store, coordinator) = setup();

        let err = coordinator.check_in(500, 600).await.unwrap_err();

        assert_eq!(err.to_string(), "user does not exist");
    }

    #[tokio::test]
    async fn test_non_positive_ids_are_rejected_without_a_transaction() {
        let (store, coordinator) = setup();

        assert_matches!(coordinator.check_in(0, 1).await, Err(HackConfError::BadRequest(_)));
        assert_matches!(coordinator.check_in(1, -1).await, Err(HackConfError::BadRequest(_)));
        assert_eq!(store.transaction_stats().begun, 0);
    }

    #[tokio::test]
    async fn test_failed_commit_propagates_and_writes_nothing() {
        let (store, coordinator) = setup();
        let user = store.insert_user("a@b.com");
        let event = store.insert_event("Hackathon");
        store.fail_commits(true);

        let err = coordinator.check_in(event.id, user.id).await.unwrap_err();

        assert_matches!(err, HackConfError::Storage(_));
        assert_eq!(store.count("check_ins"), 0);
        assert_eq!(store.transaction_stats().open(), 0);
    }

    #[tokio::test]
    async fn test_attendees_lists_check_ins_for_event() {
        let (store, coordinator) = setup();
        let first = store.insert_user("first@example.com");
        let second = store.insert_user("second@example.com");
        let event = store.insert_event("Workshop");
        let other = store.insert_event("Keynote");

        coordinator.check_in(event.id, first.id).await.unwrap();
        coordinator.check_in(other.id, first.id).await.unwrap();
        coordinator.check_in(event.id, second.id).await.unwrap();

        let attendees: Vec<i64> = coordinator
            .attendees(event.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.user_id)
            .collect();
        assert_eq!(attendees, vec![first.id, second.id]);

        assert_matches!(coordinator.attendees(4242).await, Err(HackConfError::NotFound(_)));
    }
}
