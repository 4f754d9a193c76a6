//! Attachment storage implementations.

mod fs;

pub use fs::FsAttachmentStore;
