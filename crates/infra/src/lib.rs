//! Infrastructure layer: storage adapters for accounts and project data.

pub mod memory;


pub use memory::{InMemoryProjectStore, InMemoryUserStore};
