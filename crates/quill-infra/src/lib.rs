//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! the SeaORM/SQLite post repository (plus an in-memory fallback),
//! the filesystem attachment store, and the broadcast update bus.

pub mod attachments;
pub mod database;
pub mod updates;

pub use attachments::FsAttachmentStore;
pub use database::{DatabaseConfig, InMemoryPostRepository, SqlitePostRepository};
pub use updates::{Changed, UpdateBus};
