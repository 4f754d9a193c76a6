//! Database adapters for the post store.

mod connections;
pub mod entity;
mod memory;
mod post_repo;

pub use connections::{DatabaseConfig, connect};
pub use memory::InMemoryPostRepository;
pub use post_repo::SqlitePostRepository;
