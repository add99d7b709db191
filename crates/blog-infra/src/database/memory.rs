//! In-memory repositories - used when no database is configured and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{BlogSettings, Post};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, HandleFilter, HandleIndex, PostQuery, PostRepository, SettingsRepository,
};
use blog_core::services::publication::sort_newest_first;

/// In-memory post store. Rejects a save whose handle belongs to another
/// post, like the unique index of the SQL schema.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;

        if posts
            .values()
            .any(|p| p.id != entity.id && p.handle == entity.handle)
        {
            return Err(RepoError::Constraint(format!(
                "duplicate handle '{}'",
                entity.handle
            )));
        }

        posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl HandleIndex for InMemoryPostRepository {
    async fn count_matches(&self, filter: &HandleFilter) -> Result<u64, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.values().filter(|p| filter.matches(p)).count() as u64)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(ids.iter().filter(|id| posts.remove(*id).is_some()).count() as u64)
    }

    async fn find(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let mut found: Vec<Post> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();

        sort_newest_first(&mut found);
        Ok(found)
    }
}

/// In-memory blog settings store.
#[derive(Default)]
pub struct InMemorySettingsRepository {
    settings: RwLock<HashMap<Uuid, BlogSettings>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn find_by_shop(&self, shop_id: Uuid) -> Result<Option<BlogSettings>, RepoError> {
        Ok(self.settings.read().await.get(&shop_id).cloned())
    }

    async fn save(&self, settings: BlogSettings) -> Result<BlogSettings, RepoError> {
        self.settings
            .write()
            .await
            .insert(settings.shop_id, settings.clone());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_handle(handle: &str) -> Post {
        let mut post = Post::new(Uuid::nil());
        post.handle = handle.to_string();
        post
    }

    #[tokio::test]
    async fn test_save_rejects_foreign_handle() {
        let repo = InMemoryPostRepository::new();
        repo.save(post_with_handle("hello")).await.unwrap();

        let err = repo.save(post_with_handle("hello")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_resave_keeps_own_handle() {
        let repo = InMemoryPostRepository::new();
        let mut post = repo.save(post_with_handle("hello")).await.unwrap();
        post.title = "Hello".into();

        assert!(repo.save(post).await.is_ok());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_count_matches_honours_exclusion() {
        let repo = InMemoryPostRepository::new();
        let post = repo.save(post_with_handle("hello")).await.unwrap();

        assert_eq!(repo.count_matches(&HandleFilter::all("hello")).await.unwrap(), 1);
        assert_eq!(
            repo.count_matches(&HandleFilter::others("hello", post.id))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_delete_many_counts_existing_only() {
        let repo = InMemoryPostRepository::new();
        let post = repo.save(post_with_handle("a")).await.unwrap();

        let deleted = repo.delete_many(&[post.id, Uuid::new_v4()]).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_missing_post() {
        let repo = InMemoryPostRepository::new();
        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }
}
