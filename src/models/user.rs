//! User model and the records a user owns

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub id: i64,
    pub user_id: i64,
    pub value: String,
    pub kind: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub school: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: i64,
    pub application_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Talk {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TeamMembership {
    pub team_id: i64,
    pub user_id: i64,
}

/// A user together with everything that is removed when the user is deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub tokens: Vec<Token>,
    pub application: Option<ApplicationWithSkills>,
    pub talks: Vec<Talk>,
    pub teams: Vec<TeamMembership>,
    pub events: Vec<super::event::Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWithSkills {
    #[serde(flatten)]
    pub application: Application,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
