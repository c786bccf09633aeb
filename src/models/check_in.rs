//! Check-in model and the response shape returned to callers

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Record that a user attended an event; unique per (event, user)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CheckIn {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Plain `{success, message}` record handed to the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl ActionResponse {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn done() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}
