use async_trait::async_trait;

use crate::domain::Upload;
use crate::error::StorageError;

/// Attachment store - the on-disk lifecycle of post images.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persist an upload under a generated, collision-resistant name and
    /// return the relative path to record on the post.
    async fn store(&self, upload: Upload) -> Result<String, StorageError>;

    /// Best-effort delete. Removing an already-missing file is a no-op,
    /// not an error.
    async fn remove(&self, path: &str) -> Result<(), StorageError>;
}
