pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::CareLinkError;
pub use crate::core::services::CareLinkService;
pub use crate::infrastructure::storage::{in_memory::InMemoryStorage, sqlite::SqliteStorage};

#[cfg(test)]
mod tests; // Include integration tests
