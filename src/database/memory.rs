//! In-memory storage
//!
//! A [`ConferenceStore`] that keeps every table in process memory. Writes
//! are buffered in the transaction and applied on commit, the (event, user)
//! uniqueness of check-ins is enforced like the database constraint (checked
//! again at commit, so interleaved transactions cannot both land), and
//! user removal walks an explicit cascade list since there are no foreign
//! keys to do it.
//!
//! The store also records how transactions were closed so callers can
//! assert that none was left open.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::database::store::{ConferenceStore, StoreTransaction};
use crate::models::*;
use crate::utils::errors::{HackConfError, Result};

/// Tables cleared when a user is deleted, dependents first
pub const USER_CASCADE_ORDER: [&str; 7] = [
    "check_ins",
    "team_members",
    "talks",
    "skills",
    "applications",
    "tokens",
    "users",
];

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tokens: Vec<Token>,
    applications: Vec<Application>,
    skills: Vec<Skill>,
    talks: Vec<Talk>,
    team_members: Vec<TeamMembership>,
    events: Vec<Event>,
    check_ins: Vec<CheckIn>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn delete_user_cascade(&mut self, user_id: i64) {
        for table in USER_CASCADE_ORDER {
            match table {
                "check_ins" => self.check_ins.retain(|c| c.user_id != user_id),
                "team_members" => self.team_members.retain(|m| m.user_id != user_id),
                "talks" => self.talks.retain(|t| t.user_id != user_id),
                "skills" => {
                    let owned: Vec<i64> = self
                        .applications
                        .iter()
                        .filter(|a| a.user_id == user_id)
                        .map(|a| a.id)
                        .collect();
                    self.skills.retain(|s| !owned.contains(&s.application_id));
                }
                "applications" => self.applications.retain(|a| a.user_id != user_id),
                "tokens" => self.tokens.retain(|t| t.user_id != user_id),
                "users" => self.users.retain(|u| u.id != user_id),
                _ => {}
            }
        }
    }
}

/// Counters describing how transactions ended
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransactionStats {
    pub begun: usize,
    pub committed: usize,
    pub rolled_back: usize,
    /// Dropped without commit or rollback
    pub abandoned: usize,
}

impl TransactionStats {
    pub fn open(&self) -> usize {
        self.begun - self.committed - self.rolled_back - self.abandoned
    }
}

#[derive(Debug, Default)]
struct Faults {
    fail_commit: bool,
    fail_delete: bool,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    stats: TransactionStats,
    faults: Faults,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    pub fn insert_user(&self, email: &str) -> User {
        let mut inner = self.lock();
        let now = Utc::now();
        let user = User {
            id: inner.tables.allocate_id(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            created_at: now,
            updated_at: now,
        };
        inner.tables.users.push(user.clone());
        user
    }

    pub fn insert_event(&self, name: &str) -> Event {
        let mut inner = self.lock();
        let now = Utc::now();
        let event = Event {
            id: inner.tables.allocate_id(),
            name: name.to_string(),
            starts_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.tables.events.push(event.clone());
        event
    }

    pub fn insert_token(&self, user_id: i64, value: &str) -> Token {
        let mut inner = self.lock();
        let token = Token {
            id: inner.tables.allocate_id(),
            user_id,
            value: value.to_string(),
            kind: "session".to_string(),
            expires_at: None,
        };
        inner.tables.tokens.push(token.clone());
        token
    }

    pub fn insert_application(&self, user_id: i64, skills: &[&str]) -> ApplicationWithSkills {
        let mut inner = self.lock();
        let application = Application {
            id: inner.tables.allocate_id(),
            user_id,
            school: None,
            status: "pending".to_string(),
            created_at: Utc::now(),
        };
        let mut created = Vec::with_capacity(skills.len());
        for name in skills {
            let skill = Skill {
                id: inner.tables.allocate_id(),
                application_id: application.id,
                name: name.to_string(),
            };
            created.push(skill);
        }
        inner.tables.applications.push(application.clone());
        inner.tables.skills.extend(created.iter().cloned());
        ApplicationWithSkills { application, skills: created }
    }

    pub fn insert_talk(&self, user_id: i64, title: &str) -> Talk {
        let mut inner = self.lock();
        let talk = Talk {
            id: inner.tables.allocate_id(),
            user_id,
            title: title.to_string(),
            description: None,
        };
        inner.tables.talks.push(talk.clone());
        talk
    }

    pub fn insert_team_membership(&self, team_id: i64, user_id: i64) -> TeamMembership {
        let membership = TeamMembership { team_id, user_id };
        self.lock().tables.team_members.push(membership.clone());
        membership
    }

    /// Row count of one table, by its SQL name
    pub fn count(&self, table: &str) -> usize {
        let inner = self.lock();
        let t = &inner.tables;
        match table {
            "users" => t.users.len(),
            "tokens" => t.tokens.len(),
            "applications" => t.applications.len(),
            "skills" => t.skills.len(),
            "talks" => t.talks.len(),
            "team_members" => t.team_members.len(),
            "events" => t.events.len(),
            "check_ins" => t.check_ins.len(),
            _ => 0,
        }
    }

    pub fn transaction_stats(&self) -> TransactionStats {
        self.lock().stats
    }

    /// Make every following commit fail
    pub fn fail_commits(&self, fail: bool) {
        self.lock().faults.fail_commit = fail;
    }

    /// Make every following user deletion fail
    pub fn fail_deletes(&self, fail: bool) {
        self.lock().faults.fail_delete = fail;
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ConferenceStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction> {
        self.lock().stats.begun += 1;
        Ok(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            pending: Vec::new(),
            closed: false,
        })
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.lock().tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let inner = self.lock();
        let t = &inner.tables;
        let Some(user) = t.users.iter().find(|u| u.id == user_id).cloned() else {
            return Ok(None);
        };

        let application = t
            .applications
            .iter()
            .find(|a| a.user_id == user_id)
            .map(|a| ApplicationWithSkills {
                application: a.clone(),
                skills: t.skills.iter().filter(|s| s.application_id == a.id).cloned().collect(),
            });
        let events = t
            .check_ins
            .iter()
            .filter(|c| c.user_id == user_id)
            .filter_map(|c| t.events.iter().find(|e| e.id == c.event_id).cloned())
            .collect();

        Ok(Some(UserProfile {
            user,
            tokens: t.tokens.iter().filter(|x| x.user_id == user_id).cloned().collect(),
            application,
            talks: t.talks.iter().filter(|x| x.user_id == user_id).cloned().collect(),
            teams: t.team_members.iter().filter(|x| x.user_id == user_id).cloned().collect(),
            events,
        }))
    }

    async fn find_event_by_id(&self, event_id: i64) -> Result<Option<Event>> {
        Ok(self.lock().tables.events.iter().find(|e| e.id == event_id).cloned())
    }

    async fn find_check_in(&self, event_id: i64, user_id: i64) -> Result<Option<CheckIn>> {
        Ok(self
            .lock()
            .tables
            .check_ins
            .iter()
            .find(|c| c.event_id == event_id && c.user_id == user_id)
            .cloned())
    }

    async fn list_check_ins(&self, event_id: i64) -> Result<Vec<CheckIn>> {
        Ok(self
            .lock()
            .tables
            .check_ins
            .iter()
            .filter(|c| c.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug)]
enum PendingWrite {
    InsertCheckIn(CheckIn),
    DeleteUser(i64),
}

#[derive(Debug)]
pub struct MemoryTransaction {
    inner: Arc<Mutex<Inner>>,
    pending: Vec<PendingWrite>,
    closed: bool,
}

impl MemoryTransaction {
    fn close(mut self, committed: bool) {
        self.closed = true;
        let mut inner = lock(&self.inner);
        if committed {
            inner.stats.committed += 1;
        } else {
            inner.stats.rolled_back += 1;
        }
    }
}

fn first_conflict(tables: &Tables, pending: &[PendingWrite]) -> Option<(i64, i64)> {
    pending.iter().find_map(|write| match write {
        PendingWrite::InsertCheckIn(staged)
            if tables
                .check_ins
                .iter()
                .any(|c| c.event_id == staged.event_id && c.user_id == staged.user_id) =>
        {
            Some((staged.event_id, staged.user_id))
        }
        _ => None,
    })
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn create_check_in(&mut self, event_id: i64, user_id: i64) -> Result<CheckIn> {
        let mut inner = lock(&self.inner);

        let committed = inner
            .tables
            .check_ins
            .iter()
            .any(|c| c.event_id == event_id && c.user_id == user_id);
        let staged = self.pending.iter().any(|w| {
            matches!(w, PendingWrite::InsertCheckIn(c) if c.event_id == event_id && c.user_id == user_id)
        });
        if committed || staged {
            return Err(HackConfError::DuplicateCheckIn { event_id, user_id });
        }

        let check_in = CheckIn {
            id: inner.tables.allocate_id(),
            event_id,
            user_id,
            created_at: Utc::now(),
        };
        drop(inner);

        self.pending.push(PendingWrite::InsertCheckIn(check_in.clone()));
        Ok(check_in)
    }

    async fn delete_user(&mut self, user_id: i64) -> Result<()> {
        let inner = lock(&self.inner);
        if inner.faults.fail_delete {
            return Err(HackConfError::Storage("user deletion failed".to_string()));
        }
        if !inner.tables.users.iter().any(|u| u.id == user_id) {
            return Err(HackConfError::user_not_found());
        }
        drop(inner);

        self.pending.push(PendingWrite::DeleteUser(user_id));
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        let outcome = {
            let mut inner = lock(&self.inner);
            if inner.faults.fail_commit {
                Err(HackConfError::Storage("commit failed".to_string()))
            } else if let Some((event_id, user_id)) = first_conflict(&inner.tables, &pending) {
                // another transaction committed the same pair after our insert was staged
                Err(HackConfError::DuplicateCheckIn { event_id, user_id })
            } else {
                for write in pending {
                    match write {
                        PendingWrite::InsertCheckIn(check_in) => inner.tables.check_ins.push(check_in),
                        PendingWrite::DeleteUser(user_id) => inner.tables.delete_user_cascade(user_id),
                    }
                }
                Ok(())
            }
        };

        // like the database, a failed commit ends the transaction as rolled back
        self.close(outcome.is_ok());
        outcome
    }

    async fn rollback(mut self) -> Result<()> {
        self.pending.clear();
        self.close(false);
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if !self.closed {
            lock(&self.inner).stats.abandoned += 1;
        }
    }
}
