//! Test helpers module
//!
//! Utilities shared by the integration tests: a PostgreSQL test database
//! and fixture builders for both storage backends.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_data;

pub use database_helper::*;
pub use test_data::*;
