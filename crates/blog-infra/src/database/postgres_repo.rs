//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, NullOrdering, OnConflict, Query};
use sea_orm::{
    ColumnTrait, Condition, DbConn, DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{BlogSettings, Post};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, HandleFilter, HandleIndex, PostQuery, PostRepository, SettingsRepository,
};

use super::entity::blog_settings::{self, Entity as SettingsEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_hashtag::{self, Entity as HashtagEntity};

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn write_err(e: DbErr) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
        return RepoError::Constraint(detail);
    }
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint(err_str)
    } else {
        RepoError::Query(err_str)
    }
}

/// Escape `%`, `_` and `\` so user text is matched literally by LIKE.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Hashtags of the given posts, keyed by post id, in display order.
    async fn hashtags_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = HashtagEntity::find()
            .filter(post_hashtag::Column::PostId.is_in(ids.iter().copied()))
            .order_by_asc(post_hashtag::Column::Position)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let mut by_post: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(row.tag_id);
        }
        Ok(by_post)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
        else {
            return Ok(None);
        };

        let hashtags = self
            .hashtags_for(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();
        Ok(Some(model.into_domain(hashtags)))
    }

    /// Upsert the post row and replace its hashtags in one transaction.
    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(write_err)?;

        PostEntity::insert(post::ActiveModel::from(&entity))
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Title,
                        post::Column::PageTitle,
                        post::Column::Keywords,
                        post::Column::MetaDescription,
                        post::Column::Annotation,
                        post::Column::Body,
                        post::Column::Handle,
                        post::Column::IsVisible,
                        post::Column::IsRecommended,
                        post::Column::UpdatedAt,
                        post::Column::PublishedAt,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await
            .map_err(write_err)?;

        HashtagEntity::delete_many()
            .filter(post_hashtag::Column::PostId.eq(entity.id))
            .exec(&txn)
            .await
            .map_err(write_err)?;

        if !entity.hashtags.is_empty() {
            let rows = entity
                .hashtags
                .iter()
                .enumerate()
                .map(|(position, tag_id)| post_hashtag::ActiveModel {
                    post_id: sea_orm::Set(entity.id),
                    tag_id: sea_orm::Set(*tag_id),
                    position: sea_orm::Set(position as i32),
                });
            HashtagEntity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(write_err)?;
        }

        txn.commit().await.map_err(write_err)?;
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl HandleIndex for PostgresPostRepository {
    async fn count_matches(&self, filter: &HandleFilter) -> Result<u64, RepoError> {
        let mut select = PostEntity::find().filter(post::Column::Handle.eq(filter.handle.as_str()));
        if let Some(excluded) = filter.exclude {
            select = select.filter(post::Column::Id.is_not_in([excluded]));
        }

        select.count(&self.db).await.map_err(query_err)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }

    async fn find(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find().filter(post::Column::ShopId.eq(query.shop_id));

        if let Some(visible) = query.visible {
            select = select.filter(post::Column::IsVisible.eq(visible));
        }
        if let Some(recommended) = query.recommended {
            select = select.filter(post::Column::IsRecommended.eq(recommended));
        }
        if let Some(text) = &query.text {
            let pattern = like_pattern(text);
            let any_field = [
                post::Column::Title,
                post::Column::PageTitle,
                post::Column::Keywords,
                post::Column::Body,
            ]
            .into_iter()
            .fold(Condition::any(), |cond, column| {
                cond.add(
                    Expr::expr(Func::lower(Expr::col((PostEntity, column))))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
            });
            select = select.filter(any_field);
        }
        if !query.tags.is_empty() {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_hashtag::Column::PostId)
                        .from(HashtagEntity)
                        .and_where(post_hashtag::Column::TagId.is_in(query.tags.iter().copied()))
                        .to_owned(),
                ),
            );
        }

        let models = select
            .order_by_with_nulls(post::Column::PublishedAt, Order::Desc, NullOrdering::Last)
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut hashtags = self.hashtags_for(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let tags = hashtags.remove(&m.id).unwrap_or_default();
                m.into_domain(tags)
            })
            .collect())
    }
}

/// PostgreSQL blog settings repository.
pub struct PostgresSettingsRepository {
    db: DbConn,
}

impl PostgresSettingsRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    async fn find_by_shop(&self, shop_id: Uuid) -> Result<Option<BlogSettings>, RepoError> {
        let result = SettingsEntity::find_by_id(shop_id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, settings: BlogSettings) -> Result<BlogSettings, RepoError> {
        SettingsEntity::insert(blog_settings::ActiveModel::from(settings.clone()))
            .on_conflict(
                OnConflict::column(blog_settings::Column::ShopId)
                    .update_columns([
                        blog_settings::Column::DefaultTag,
                        blog_settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_Off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
