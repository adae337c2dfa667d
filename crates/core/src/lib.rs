//! `taskforge-core`: shared identifiers and the error taxonomy.
//!
//! This crate has no I/O and no knowledge of transport or storage.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{AppError, AppResult, ErrorKind, StoreError};
pub use id::{ProjectId, TaskId, TeamId, UserId};
