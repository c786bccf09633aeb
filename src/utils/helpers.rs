//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the crate.

use std::time::Instant;

use crate::utils::errors::{HackConfError, Result};

/// Ensure a record identifier is a positive database id
pub fn validate_id(field: &str, id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(HackConfError::BadRequest(format!(
            "{} must be a positive integer, got {}",
            field, id
        )));
    }
    Ok(id)
}

/// Milliseconds elapsed since `started`, saturating at `u64::MAX`
pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
