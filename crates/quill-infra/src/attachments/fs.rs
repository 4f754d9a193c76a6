//! Filesystem attachment store.
//!
//! Files live flat under a root directory and are referenced by the
//! relative paths recorded on posts (`/uploads/<name>`).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use quill_core::domain::Upload;
use quill_core::error::StorageError;
use quill_core::ports::AttachmentStore;

/// Public path prefix under which stored files are served back.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Attachment store rooted at an uploads directory.
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    /// Create the store, ensuring the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::Write(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    /// Generated name: millisecond timestamp, short random suffix, and the
    /// upload's original extension.
    fn generate_name(original: &str) -> String {
        let ext = Path::new(original)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}{ext}", Utc::now().timestamp_millis(), &suffix[..8])
    }

    /// Map a recorded reference back to a file inside the root.
    ///
    /// Anything that does not look like a flat `/uploads/<name>` path is
    /// refused so a stored reference can never escape the root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let name = path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(self.root.join(name))
    }
}

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn store(&self, upload: Upload) -> Result<String, StorageError> {
        let name = Self::generate_name(&upload.filename);
        let full = self.root.join(&name);

        tokio::fs::write(&full, &upload.bytes)
            .await
            .map_err(|e| StorageError::Write(format!("write {}: {e}", full.display())))?;

        tracing::debug!(file = %name, bytes = upload.bytes.len(), "Attachment stored");
        Ok(format!("{PUBLIC_PREFIX}/{name}"))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let Some(full) = self.resolve(path) else {
            tracing::warn!(path = %path, "Refusing to remove attachment outside the store");
            return Ok(());
        };

        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(path = %path, "Attachment removed");
                Ok(())
            }
            // Already gone: removal is idempotent.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Remove(format!(
                "remove {}: {e}",
                full.display()
            ))),
        }
    }
}
