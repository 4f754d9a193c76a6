use async_trait::async_trait;

use crate::domain::{Post, PostDraft};
use crate::error::RepoError;

/// Post repository - the durable table keyed by id.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new row; the store assigns `id` and `created_at`.
    async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError>;

    /// Find a post by its id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Update the mutable fields of an existing row.
    ///
    /// Fails with [`RepoError::NotFound`] when no row matches, never a
    /// silent no-op. `id` and `created_at` are left untouched.
    async fn update(&self, id: i64, draft: PostDraft) -> Result<(), RepoError>;

    /// Delete a row by id; [`RepoError::NotFound`] when no row matches.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    /// All posts, newest first.
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError>;

    /// Distinct non-empty category values.
    async fn categories(&self) -> Result<Vec<String>, RepoError>;

    /// Substring search across title/content/category, optionally narrowed
    /// to an exact category. Both filters empty behaves as `list_recent`.
    async fn search(&self, term: &str, category: &str) -> Result<Vec<Post>, RepoError>;
}
