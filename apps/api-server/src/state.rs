//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::PostService;
use quill_core::error::StorageError;
use quill_core::ports::PostRepository;
use quill_infra::database::{InMemoryPostRepository, SqlitePostRepository, connect};
use quill_infra::{FsAttachmentStore, UpdateBus};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: PostService,
    pub updates: Arc<UpdateBus>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StorageError> {
        let posts: Arc<dyn PostRepository> = match &config.database {
            Some(db_config) => match connect(db_config).await {
                Ok(conn) => Arc::new(SqlitePostRepository::new(conn)),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Arc::new(InMemoryPostRepository::new())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Arc::new(InMemoryPostRepository::new())
            }
        };

        let attachments = Arc::new(FsAttachmentStore::new(&config.upload_dir).await?);
        let updates = Arc::new(UpdateBus::default());
        let service = PostService::new(posts, attachments, updates.clone());

        tracing::info!("Application state initialized");

        Ok(Self { service, updates })
    }
}
