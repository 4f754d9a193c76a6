use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Post entity - a single blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// Free-form tag; distinct values are derived by projection, not stored
    /// as their own entity.
    pub category: String,
    pub content: String,
    /// Relative path of the attached image, `None` when there is no image.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The caller-supplied fields of a post, before the store assigns
/// `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub category: String,
    pub content: String,
    /// Resolved image reference to record on the row.
    pub image: Option<String>,
}

impl PostDraft {
    pub fn new(title: String, category: String, content: String) -> Self {
        Self {
            title,
            category,
            content,
            image: None,
        }
    }

    /// Check the required fields. Runs before any store or file side effect.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("title", &self.title),
            ("category", &self.category),
            ("content", &self.content),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "field '{field}' is required"
                )));
            }
        }
        Ok(())
    }
}
