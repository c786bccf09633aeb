//! Check-in and user removal against the in-memory store

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use hackconf::models::ActionResponse;
use hackconf::{ConferenceStore, HackConfError, MemoryStore, ServiceFactory, StoreTransaction};

#[tokio::test]
async fn test_check_in_twice_keeps_one_row() {
    let store = MemoryStore::new();
    let services = ServiceFactory::new(store.clone());
    let (user, event) = seed_attendee(&store);

    let first = services.check_ins.check_in(event.id, user.id).await.unwrap();
    let second = services.check_ins.check_in(event.id, user.id).await.unwrap();

    assert_eq!(first, ActionResponse::succeeded(format!("{} checked into Hackathon!", user.email)));
    assert_eq!(second, ActionResponse::rejected(format!("{} has already checked into Hackathon", user.email)));
    assert_eq!(store.count("check_ins"), 1);
    assert_eq!(store.transaction_stats().open(), 0);
    assert_eq!(store.transaction_stats().abandoned, 0);
}

#[tokio::test]
async fn test_transaction_staged_before_check_in_cannot_commit_second_row() {
    let store = MemoryStore::new();
    let services = ServiceFactory::new(store.clone());
    let (user, event) = seed_attendee(&store);

    let mut racing = store.begin().await.unwrap();
    racing.create_check_in(event.id, user.id).await.unwrap();

    let response = services.check_ins.check_in(event.id, user.id).await.unwrap();
    assert!(response.success);

    assert_matches!(racing.commit().await, Err(HackConfError::DuplicateCheckIn { .. }));
    assert_eq!(store.count("check_ins"), 1);
    assert_eq!(store.transaction_stats().open(), 0);

    let again = services.check_ins.check_in(event.id, user.id).await.unwrap();
    assert!(!again.success);
}

#[tokio::test]
async fn test_check_in_with_unknown_ids_creates_nothing() {
    let store = MemoryStore::new();
    let services = ServiceFactory::new(store.clone());
    let (user, event) = seed_attendee(&store);

    assert_matches!(
        services.check_ins.check_in(event.id, user.id + 1000).await,
        Err(HackConfError::NotFound(_))
    );
    assert_matches!(
        services.check_ins.check_in(event.id + 1000, user.id).await,
        Err(HackConfError::NotFound(_))
    );
    assert_eq!(store.count("check_ins"), 0);
    assert_eq!(store.transaction_stats().open(), 0);
}

#[tokio::test]
async fn test_delete_after_check_in_removes_everything_owned() {
    let store = MemoryStore::new();
    let services = ServiceFactory::new(store.clone());
    let (user, event) = seed_attendee(&store);
    let (other, _) = seed_attendee(&store);
    services.check_ins.check_in(event.id, user.id).await.unwrap();
    services.check_ins.check_in(event.id, other.id).await.unwrap();

    let response = services.users.delete_by_id(user.id).await.unwrap();

    assert!(response.success);
    assert!(response.message.is_none());
    assert_eq!(store.count("users"), 1);
    assert_eq!(store.count("tokens"), 1);
    assert_eq!(store.count("applications"), 1);
    assert_eq!(store.count("skills"), 2);
    assert_eq!(store.count("talks"), 1);
    assert_eq!(store.count("team_members"), 1);
    assert_eq!(store.count("check_ins"), 1);

    let remaining = services.check_ins.attendees(event.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, other.id);
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    let store = MemoryStore::new();
    let services = ServiceFactory::new(store.clone());
    let (user, _) = seed_attendee(&store);

    services.users.delete_by_id(user.id).await.unwrap();
    let err = services.users.delete_by_id(user.id).await.unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "user does not exist");
}
