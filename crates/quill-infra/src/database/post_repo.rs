//! SQLite repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use quill_core::domain::{Post, PostDraft};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::entity::post::{self, Entity as PostEntity};

/// SQLite post repository backed by SeaORM.
pub struct SqlitePostRepository {
    db: DbConn,
}

impl SqlitePostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// The mutable columns of a row, as an active model. `id` and `created_at`
/// stay untouched.
fn draft_fields(draft: PostDraft) -> post::ActiveModel {
    post::ActiveModel {
        title: Set(draft.title),
        category: Set(draft.category),
        content: Set(draft.content),
        image: Set(draft.image),
        ..Default::default()
    }
}

fn query_err(e: sea_orm::DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn insert(&self, draft: PostDraft) -> Result<Post, RepoError> {
        let mut row = draft_fields(draft);
        row.created_at = Set(Utc::now());

        let model = PostEntity::insert(row)
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<(), RepoError> {
        let result = PostEntity::update_many()
            .set(draft_fields(draft))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn categories(&self) -> Result<Vec<String>, RepoError> {
        let values: Vec<String> = PostEntity::find()
            .select_only()
            .column(post::Column::Category)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(values.into_iter().filter(|c| !c.is_empty()).collect())
    }

    async fn search(&self, term: &str, category: &str) -> Result<Vec<Post>, RepoError> {
        let mut condition = Condition::all();

        if !term.is_empty() {
            condition = condition.add(
                Condition::any()
                    .add(post::Column::Title.contains(term))
                    .add(post::Column::Content.contains(term))
                    .add(post::Column::Category.contains(term)),
            );
        }

        if !category.is_empty() {
            condition = condition.add(post::Column::Category.eq(category));
        }

        let rows = PostEntity::find()
            .filter(condition)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
