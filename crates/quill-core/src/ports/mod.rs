//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod attachments;
mod notifier;
mod repository;

pub use attachments::AttachmentStore;
pub use notifier::ChangeNotifier;
pub use repository::PostRepository;
