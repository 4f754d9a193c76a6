//! In-memory post repository - used as fallback when no database is
//! configured. Data is lost on process restart.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use quill_core::domain::{Post, PostDraft};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

/// In-memory post table with auto-increment ids.
#[derive(Default)]
pub struct InMemoryPostRepository {
    rows: RwLock<Vec<Post>>,
    next_id: AtomicI64,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut rows: Vec<Post>) -> Vec<Post> {
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError> {
        let post = Post {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            title: draft.title,
            category: draft.category,
            content: draft.content,
            image: draft.image,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.rows.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        row.title = draft.title;
        row.category = draft.category;
        row.content = draft.content;
        row.image = draft.image;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        Ok(Self::sorted_desc(self.rows.read().await.clone()))
    }

    async fn categories(&self) -> Result<Vec<String>, RepoError> {
        let rows = self.rows.read().await;
        let mut seen = Vec::new();
        for row in rows.iter() {
            if !row.category.is_empty() && !seen.contains(&row.category) {
                seen.push(row.category.clone());
            }
        }
        Ok(seen)
    }

    async fn search(&self, term: &str, category: &str) -> Result<Vec<Post>, RepoError> {
        let rows = self.rows.read().await.clone();
        let hits = rows
            .into_iter()
            .filter(|p| {
                term.is_empty()
                    || p.title.contains(term)
                    || p.content.contains(term)
                    || p.category.contains(term)
            })
            .filter(|p| category.is_empty() || p.category == category)
            .collect();
        Ok(Self::sorted_desc(hits))
    }
}
