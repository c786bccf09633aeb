//! User repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::user::{Application, CreateUserRequest, Skill, Talk, TeamMembership, Token, User};
use crate::utils::errors::HackConfError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, HackConfError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, last_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, first_name, last_name, created_at, updated_at
            "#
        )
        .bind(request.email)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, HackConfError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, first_name, last_name, created_at, updated_at FROM users WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Tokens issued to a user
    pub async fn get_tokens(&self, user_id: i64) -> Result<Vec<Token>, HackConfError> {
        let tokens = sqlx::query_as::<_, Token>(
            "SELECT id, user_id, value, kind, expires_at FROM tokens WHERE user_id = $1 ORDER BY id ASC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    /// The user's application, if one was submitted
    pub async fn get_application(&self, user_id: i64) -> Result<Option<Application>, HackConfError> {
        let application = sqlx::query_as::<_, Application>(
            "SELECT id, user_id, school, status, created_at FROM applications WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    /// Skills listed on an application
    pub async fn get_skills(&self, application_id: i64) -> Result<Vec<Skill>, HackConfError> {
        let skills = sqlx::query_as::<_, Skill>(
            "SELECT id, application_id, name FROM skills WHERE application_id = $1 ORDER BY id ASC"
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(skills)
    }

    /// Talks submitted by a user
    pub async fn get_talks(&self, user_id: i64) -> Result<Vec<Talk>, HackConfError> {
        let talks = sqlx::query_as::<_, Talk>(
            "SELECT id, user_id, title, description FROM talks WHERE user_id = $1 ORDER BY id ASC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(talks)
    }

    /// Teams the user belongs to
    pub async fn get_team_memberships(&self, user_id: i64) -> Result<Vec<TeamMembership>, HackConfError> {
        let teams = sqlx::query_as::<_, TeamMembership>(
            "SELECT team_id, user_id FROM team_members WHERE user_id = $1 ORDER BY team_id ASC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teams)
    }

    /// Delete user inside a transaction; dependents go through ON DELETE CASCADE
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, HackConfError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}
