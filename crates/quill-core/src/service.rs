//! Query and mutation services over the post store.
//!
//! Each mutation is a single atomic step from the caller's perspective:
//! validate, write through the store (coordinating file side effects), then
//! broadcast. Validation failures are rejected before any side effect.

use std::sync::Arc;

use crate::domain::{ImageChange, Post, PostDraft, Upload};
use crate::error::{DomainError, RepoError};
use crate::ports::{AttachmentStore, ChangeNotifier, PostRepository};

/// Application service for posts.
///
/// Owns the ordering rules that tie the attachment lifecycle to the row
/// lifecycle: a row never references a file that was not persisted first,
/// and a replaced or deleted row's file is removed only after the row
/// mutation commits.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    attachments: Arc<dyn AttachmentStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        attachments: Arc<dyn AttachmentStore>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            posts,
            attachments,
            notifier,
        }
    }

    /// All posts, newest first.
    pub async fn list(&self) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.list_recent().await?)
    }

    /// Fetch one post by id.
    pub async fn get(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { id })
    }

    /// Distinct non-empty categories.
    pub async fn categories(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.posts.categories().await?)
    }

    /// Filtered search; both filters empty behaves as [`list`](Self::list).
    pub async fn search(&self, term: &str, category: &str) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.search(term, category).await?)
    }

    /// Create a post, storing the upload (if any) before the row insert.
    ///
    /// An insert failure after a successful store leaves an orphaned file;
    /// that is logged and not cleaned up here, because the opposite ordering
    /// could commit a row referencing a file that was never persisted.
    pub async fn create(
        &self,
        mut draft: PostDraft,
        upload: Option<Upload>,
    ) -> Result<Post, DomainError> {
        draft.validate()?;

        draft.image = match upload {
            Some(upload) => Some(self.attachments.store(upload).await?),
            None => None,
        };

        let stored_image = draft.image.clone();
        let post = match self.posts.insert(draft).await {
            Ok(post) => post,
            Err(e) => {
                if let Some(path) = stored_image {
                    tracing::warn!(path = %path, "Insert failed after upload; file orphaned");
                }
                return Err(e.into());
            }
        };

        tracing::info!(id = post.id, "Post created");
        self.notifier.notify_changed();
        Ok(post)
    }

    /// Update a post's fields and resolve its image from the tagged
    /// three-way input.
    ///
    /// A replaced file is removed only after the row update commits, so the
    /// row can never point at a deleted file if the commit fails.
    pub async fn update(
        &self,
        id: i64,
        mut draft: PostDraft,
        image: ImageChange,
    ) -> Result<(), DomainError> {
        draft.validate()?;

        let existing = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { id })?;

        let mut uploaded = false;
        draft.image = match image {
            ImageChange::Replace(upload) => {
                let path = self.attachments.store(upload).await?;
                uploaded = true;
                Some(path)
            }
            ImageChange::Keep(path) => Some(path),
            ImageChange::Clear => None,
        };

        let new_image = draft.image.clone();
        if let Err(e) = self.posts.update(id, draft).await {
            if uploaded {
                if let Some(path) = &new_image {
                    tracing::warn!(path = %path, "Update failed after upload; file orphaned");
                }
            }
            return Err(match e {
                RepoError::NotFound => DomainError::NotFound { id },
                other => other.into(),
            });
        }

        // The old file goes away only once the new reference is committed.
        if uploaded {
            if let Some(old) = existing.image {
                if Some(&old) != new_image.as_ref() {
                    self.remove_best_effort(&old).await;
                }
            }
        }

        tracing::info!(id, "Post updated");
        self.notifier.notify_changed();
        Ok(())
    }

    /// Delete a post: row first, then best-effort attachment removal.
    ///
    /// Once the row delete succeeds the mutation succeeds; a failure to
    /// remove the file is logged, never surfaced.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        let existing = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { id })?;

        match self.posts.delete(id).await {
            Ok(()) => {}
            Err(RepoError::NotFound) => return Err(DomainError::NotFound { id }),
            Err(e) => return Err(e.into()),
        }

        if let Some(path) = existing.image {
            self.remove_best_effort(&path).await;
        }

        tracing::info!(id, "Post deleted");
        self.notifier.notify_changed();
        Ok(())
    }

    async fn remove_best_effort(&self, path: &str) {
        if let Err(e) = self.attachments.remove(path).await {
            tracing::warn!(path = %path, error = %e, "Attachment removal failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;
    use crate::error::StorageError;

    #[derive(Default)]
    struct MemoryPosts {
        rows: Mutex<Vec<Post>>,
        next_id: AtomicI64,
    }

    #[async_trait]
    impl PostRepository for MemoryPosts {
        async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError> {
            let post = Post {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                title: draft.title,
                category: draft.category,
                content: draft.content,
                image: draft.image,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(post.clone());
            Ok(post)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned())
        }

        async fn update(&self, id: i64, draft: PostDraft) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|p| p.id == id).ok_or(RepoError::NotFound)?;
            row.title = draft.title;
            row.category = draft.category;
            row.content = draft.content;
            row.image = draft.image;
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|p| p.id != id);
            if rows.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }

        async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            Ok(rows)
        }

        async fn categories(&self) -> Result<Vec<String>, RepoError> {
            let mut seen = Vec::new();
            for row in self.rows.lock().unwrap().iter() {
                if !row.category.is_empty() && !seen.contains(&row.category) {
                    seen.push(row.category.clone());
                }
            }
            Ok(seen)
        }

        async fn search(&self, term: &str, category: &str) -> Result<Vec<Post>, RepoError> {
            let rows = self.list_recent().await?;
            Ok(rows
                .into_iter()
                .filter(|p| {
                    term.is_empty()
                        || p.title.contains(term)
                        || p.content.contains(term)
                        || p.category.contains(term)
                })
                .filter(|p| category.is_empty() || p.category == category)
                .collect())
        }
    }

    #[derive(Default)]
    struct MemoryFiles {
        files: Mutex<HashMap<String, Vec<u8>>>,
        stored: AtomicUsize,
    }

    #[async_trait]
    impl AttachmentStore for MemoryFiles {
        async fn store(&self, upload: Upload) -> Result<String, StorageError> {
            let n = self.stored.fetch_add(1, Ordering::SeqCst);
            let path = format!("/uploads/{n}-{}", upload.filename);
            self.files.lock().unwrap().insert(path.clone(), upload.bytes);
            Ok(path)
        }

        async fn remove(&self, path: &str) -> Result<(), StorageError> {
            self.files.lock().unwrap().remove(path);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        signals: AtomicUsize,
    }

    impl ChangeNotifier for CountingNotifier {
        fn notify_changed(&self) {
            self.signals.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        service: PostService,
        files: Arc<MemoryFiles>,
        notifier: Arc<CountingNotifier>,
    }

    fn harness() -> Harness {
        let files = Arc::new(MemoryFiles::default());
        let notifier = Arc::new(CountingNotifier::default());
        let service = PostService::new(
            Arc::new(MemoryPosts::default()),
            files.clone(),
            notifier.clone(),
        );
        Harness {
            service,
            files,
            notifier,
        }
    }

    fn draft(title: &str, category: &str, content: &str) -> PostDraft {
        PostDraft::new(title.into(), category.into(), content.into())
    }

    #[tokio::test]
    async fn create_assigns_ids_and_lists_newest_first() {
        let h = harness();
        for i in 1..=3 {
            h.service
                .create(draft(&format!("post {i}"), "tech", "body"), None)
                .await
                .unwrap();
        }

        let posts = h.service.list().await.unwrap();
        assert_eq!(posts.len(), 3);
        for pair in posts.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        assert_eq!(posts.last().unwrap().title, "post 1");
    }

    #[tokio::test]
    async fn create_with_upload_round_trips_bytes() {
        let h = harness();
        let bytes = vec![0x89, 0x50, 0x4e, 0x47];
        let post = h
            .service
            .create(
                draft("hello", "tech", "body"),
                Some(Upload::new("pic.png", bytes.clone())),
            )
            .await
            .unwrap();

        let fetched = h.service.get(post.id).await.unwrap();
        let path = fetched.image.expect("image recorded");
        let stored = h.files.files.lock().unwrap().get(&path).cloned();
        assert_eq!(stored, Some(bytes));
    }

    #[tokio::test]
    async fn validation_failure_has_no_side_effects() {
        let h = harness();
        let err = h
            .service
            .create(
                draft("", "tech", "body"),
                Some(Upload::new("pic.png", vec![1])),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(h.files.files.lock().unwrap().is_empty());
        assert_eq!(h.notifier.signals.load(Ordering::SeqCst), 0);
        assert!(h.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_keep_preserves_prior_image() {
        let h = harness();
        let post = h
            .service
            .create(
                draft("hello", "tech", "body"),
                Some(Upload::new("pic.png", vec![1])),
            )
            .await
            .unwrap();
        let prior = post.image.clone().unwrap();

        h.service
            .update(
                post.id,
                draft("hello v2", "tech", "body v2"),
                ImageChange::Keep(prior.clone()),
            )
            .await
            .unwrap();

        let fetched = h.service.get(post.id).await.unwrap();
        assert_eq!(fetched.image.as_deref(), Some(prior.as_str()));
        assert_eq!(fetched.title, "hello v2");
        assert!(h.files.files.lock().unwrap().contains_key(&prior));
    }

    #[tokio::test]
    async fn update_clear_nulls_image_without_touching_store() {
        let h = harness();
        let post = h
            .service
            .create(
                draft("hello", "tech", "body"),
                Some(Upload::new("pic.png", vec![1])),
            )
            .await
            .unwrap();
        let prior = post.image.clone().unwrap();

        h.service
            .update(post.id, draft("hello", "tech", "body"), ImageChange::Clear)
            .await
            .unwrap();

        let fetched = h.service.get(post.id).await.unwrap();
        assert_eq!(fetched.image, None);
        // No upload means the attachment store is left alone.
        assert!(h.files.files.lock().unwrap().contains_key(&prior));
    }

    #[tokio::test]
    async fn update_replace_swaps_file_after_commit() {
        let h = harness();
        let post = h
            .service
            .create(
                draft("hello", "tech", "body"),
                Some(Upload::new("old.png", vec![1])),
            )
            .await
            .unwrap();
        let old = post.image.clone().unwrap();

        h.service
            .update(
                post.id,
                draft("hello", "tech", "body"),
                ImageChange::Replace(Upload::new("new.png", vec![2])),
            )
            .await
            .unwrap();

        let fetched = h.service.get(post.id).await.unwrap();
        let new = fetched.image.unwrap();
        assert_ne!(new, old);
        let files = h.files.files.lock().unwrap();
        assert!(files.contains_key(&new));
        assert!(!files.contains_key(&old), "replaced file must be removed");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let h = harness();
        let err = h
            .service
            .update(42, draft("a", "b", "c"), ImageChange::Clear)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { id: 42 }));
        assert_eq!(h.notifier.signals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_removes_row_and_attachment() {
        let h = harness();
        let post = h
            .service
            .create(
                draft("hello", "tech", "body"),
                Some(Upload::new("pic.png", vec![1])),
            )
            .await
            .unwrap();
        let path = post.image.clone().unwrap();

        h.service.delete(post.id).await.unwrap();

        assert!(matches!(
            h.service.get(post.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(!h.files.files.lock().unwrap().contains_key(&path));
        assert!(matches!(
            h.service.delete(post.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn search_filters_by_term_and_category() {
        let h = harness();
        h.service
            .create(draft("hello rust", "tech", "systems"), None)
            .await
            .unwrap();
        h.service
            .create(draft("world news", "life", "hello from home"), None)
            .await
            .unwrap();
        h.service
            .create(draft("world cup", "life", "sports"), None)
            .await
            .unwrap();

        let hits = h.service.search("hello", "").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|p| {
            p.title.contains("hello") || p.content.contains("hello") || p.category.contains("hello")
        }));

        let tech = h.service.search("", "tech").await.unwrap();
        assert_eq!(tech.len(), 1);
        assert!(tech.iter().all(|p| p.category == "tech"));

        let narrowed = h.service.search("hello", "life").await.unwrap();
        assert_eq!(narrowed.len(), 1);

        let all = h.service.search("", "").await.unwrap();
        assert_eq!(all.len(), h.service.list().await.unwrap().len());
    }

    #[tokio::test]
    async fn categories_are_distinct() {
        let h = harness();
        for category in ["tech", "life", "tech"] {
            h.service
                .create(draft("t", category, "c"), None)
                .await
                .unwrap();
        }
        let mut categories = h.service.categories().await.unwrap();
        categories.sort();
        assert_eq!(categories, vec!["life".to_string(), "tech".to_string()]);
    }

    #[tokio::test]
    async fn every_successful_mutation_broadcasts_once() {
        let h = harness();
        let post = h
            .service
            .create(draft("a", "b", "c"), None)
            .await
            .unwrap();
        h.service
            .update(post.id, draft("a2", "b", "c"), ImageChange::Clear)
            .await
            .unwrap();
        h.service.delete(post.id).await.unwrap();
        assert_eq!(h.notifier.signals.load(Ordering::SeqCst), 3);

        let _ = h.service.create(draft("", "", ""), None).await;
        assert_eq!(h.notifier.signals.load(Ordering::SeqCst), 3);
    }
}
