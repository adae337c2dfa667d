//! In-memory storage for tests/dev.
//!
//! Ids are assigned per entity kind starting at 1. Lock poisoning surfaces as
//! `StoreError::Unavailable`.

pub mod projects;
pub mod users;

pub use projects::InMemoryProjectStore;
pub use users::InMemoryUserStore;

use taskforge_core::StoreError;

pub(crate) fn poisoned<T>(_: T) -> StoreError {
    StoreError::unavailable("in-memory store lock poisoned")
}
