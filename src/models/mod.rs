//! Data models module
//!
//! This module contains all data structures used throughout the crate

pub mod user;
pub mod event;
pub mod check_in;

// Re-export commonly used models
pub use user::{User, Token, Application, ApplicationWithSkills, Skill, Talk, TeamMembership, UserProfile, CreateUserRequest};
pub use event::{Event, CreateEventRequest};
pub use check_in::{CheckIn, ActionResponse};
