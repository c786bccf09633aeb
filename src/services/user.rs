//! User service implementation
//!
//! Removal of a user account together with everything the account owns.

use tracing::debug;

use crate::database::store::{ConferenceStore, StoreTransaction};
use crate::models::ActionResponse;
use crate::services::rollback_quietly;
use crate::utils::errors::{HackConfError, Result};
use crate::utils::helpers::validate_id;
use crate::utils::logging::{log_transaction_closed, log_user_deletion};

/// Deletes users under a transaction
#[derive(Clone)]
pub struct UserDeleter<S> {
    store: S,
}

impl<S: ConferenceStore> UserDeleter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Force-delete a user; tokens, application and skills, talks, team
    /// memberships and check-ins go with it.
    ///
    /// Success is reported only once the delete and the commit have both
    /// completed. A missing user fails before any transaction is opened.
    pub async fn delete_by_id(&self, user_id: i64) -> Result<ActionResponse> {
        validate_id("user_id", user_id)?;
        debug!(user_id = user_id, "Deleting user");

        let profile = self
            .store
            .find_user_profile(user_id)
            .await?
            .ok_or_else(HackConfError::user_not_found)?;

        let mut tx = self.store.begin().await?;
        if let Err(e) = tx.delete_user(user_id).await {
            rollback_quietly(tx, "delete_user").await;
            return Err(e);
        }
        tx.commit().await?;
        log_transaction_closed("delete_user", true);

        log_user_deletion(
            profile.user.id,
            profile.tokens.len(),
            profile.talks.len(),
            profile.events.len(),
        );
        Ok(ActionResponse::done())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::services::CheckInCoordinator;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_delete_removes_user_and_dependents() {
        let store = MemoryStore::new();
        let deleter = UserDeleter::new(store.clone());
        let coordinator = CheckInCoordinator::new(store.clone());

        let user = store.insert_user("speaker@example.com");
        let event = store.insert_event("Hackathon");
        store.insert_token(user.id, "tok-1");
        store.insert_application(user.id, &["rust"]);
        store.insert_talk(user.id, "Zero-cost abstractions");
        store.insert_team_membership(7, user.id);
        coordinator.check_in(event.id, user.id).await.unwrap();

        let response = deleter.delete_by_id(user.id).await.unwrap();

        assert_eq!(response, ActionResponse { success: true, message: None });
        for table in ["users", "tokens", "applications", "skills", "talks", "team_members", "check_ins"] {
            assert_eq!(store.count(table), 0, "{} should be empty", table);
        }
        assert_eq!(store.count("events"), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_user_mutates_nothing() {
        let store = MemoryStore::new();
        let deleter = UserDeleter::new(store.clone());
        store.insert_user("bystander@example.com");

        let err = deleter.delete_by_id(404).await.unwrap_err();

        assert_matches!(err, HackConfError::NotFound(ref msg) if msg == "user does not exist");
        assert_eq!(store.count("users"), 1);
        assert_eq!(store.transaction_stats().begun, 0);
    }

    #[tokio::test]
    async fn test_failed_delete_rolls_back() {
        let store = MemoryStore::new();
        let deleter = UserDeleter::new(store.clone());
        let user = store.insert_user("a@b.com");
        store.insert_token(user.id, "tok-1");
        store.fail_deletes(true);

        let err = deleter.delete_by_id(user.id).await.unwrap_err();

        assert_matches!(err, HackConfError::Storage(_));
        assert_eq!(store.count("users"), 1);
        assert_eq!(store.count("tokens"), 1);

        let stats = store.transaction_stats();
        assert_eq!(stats.rolled_back, 1);
        assert_eq!(stats.open(), 0);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_user() {
        let store = MemoryStore::new();
        let deleter = UserDeleter::new(store.clone());
        let user = store.insert_user("a@b.com");
        store.fail_commits(true);

        assert_matches!(deleter.delete_by_id(user.id).await, Err(HackConfError::Storage(_)));
        assert_eq!(store.count("users"), 1);
    }
}
