//! Fixture builders for users, events and the records users own

use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use sqlx::PgPool;

use hackconf::models::{Event, User};
use hackconf::MemoryStore;

pub fn fake_email() -> String {
    SafeEmail().fake()
}

/// A user with a token, an application with skills, a talk and a team,
/// plus one event, in the in-memory store
pub fn seed_attendee(store: &MemoryStore) -> (User, Event) {
    let user = store.insert_user(&fake_email());
    let event = store.insert_event("Hackathon");
    store.insert_token(user.id, &format!("token-{}", user.id));
    store.insert_application(user.id, &["rust", "postgres"]);
    let title: String = Sentence(2..5).fake();
    store.insert_talk(user.id, &title);
    store.insert_team_membership(1, user.id);
    (user, event)
}

pub async fn insert_user(pool: &PgPool, id: i64, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
        .bind(id)
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_event(pool: &PgPool, id: i64, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO events (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

/// Token, application with two skills, talk and team membership for a user
pub async fn insert_dependents(pool: &PgPool, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tokens (user_id, value, kind) VALUES ($1, $2, 'session')")
        .bind(user_id)
        .bind(format!("token-{}", user_id))
        .execute(pool)
        .await?;

    let (application_id,): (i64,) = sqlx::query_as(
        "INSERT INTO applications (user_id, school) VALUES ($1, 'State University') RETURNING id"
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO skills (application_id, name) VALUES ($1, 'rust'), ($1, 'sql')")
        .bind(application_id)
        .execute(pool)
        .await?;

    sqlx::query("INSERT INTO talks (user_id, title) VALUES ($1, 'Fearless concurrency')")
        .bind(user_id)
        .execute(pool)
        .await?;

    let (team_id,): (i64,) = sqlx::query_as(
        "INSERT INTO teams (name) VALUES ($1) RETURNING id"
    )
    .bind(format!("team-{}", user_id))
    .fetch_one(pool)
    .await?;

    sqlx::query("INSERT INTO team_members (team_id, user_id) VALUES ($1, $2)")
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
