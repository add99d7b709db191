use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{BlogSettings, Post};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Selects posts by exact handle, optionally leaving one post out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleFilter {
    pub handle: String,
    pub exclude: Option<Uuid>,
}

impl HandleFilter {
    /// Posts other than `post_id` carrying `handle`.
    pub fn others(handle: impl Into<String>, post_id: Uuid) -> Self {
        Self {
            handle: handle.into(),
            exclude: Some(post_id),
        }
    }

    /// Every post carrying `handle`.
    pub fn all(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            exclude: None,
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        post.handle == self.handle && self.exclude != Some(post.id)
    }
}

/// Read access used by the handle resolver.
#[async_trait]
pub trait HandleIndex: Send + Sync {
    /// Count posts matching the filter.
    async fn count_matches(&self, filter: &HandleFilter) -> Result<u64, RepoError>;
}

/// Criteria for listing posts of a shop.
#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    pub shop_id: Uuid,
    /// `None` returns visible and hidden posts.
    pub visible: Option<bool>,
    pub recommended: Option<bool>,
    /// Case-insensitive text searched in title, page title, keywords and body.
    pub text: Option<String>,
    /// A post matches when it carries any of these tags. Empty means no filter.
    pub tags: Vec<Uuid>,
}

impl PostQuery {
    pub fn for_shop(shop_id: Uuid) -> Self {
        Self {
            shop_id,
            visible: None,
            recommended: None,
            text: None,
            tags: Vec::new(),
        }
    }

    /// Evaluate the query against a single post.
    pub fn matches(&self, post: &Post) -> bool {
        if post.shop_id != self.shop_id {
            return false;
        }
        if self.visible.is_some_and(|v| post.is_visible != v) {
            return false;
        }
        if self.recommended.is_some_and(|r| post.is_recommended != r) {
            return false;
        }
        if !self.tags.is_empty() && !post.hashtags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        match &self.text {
            Some(text) => {
                let needle = text.to_lowercase();
                [
                    Some(post.title.as_str()),
                    post.page_title.as_deref(),
                    post.keywords.as_deref(),
                    Some(post.body.as_str()),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> + HandleIndex {
    /// Delete all listed posts, returning how many existed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, RepoError>;

    /// Posts matching the query, newest publication first.
    async fn find(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError>;
}

/// Blog settings storage, one record per shop.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn find_by_shop(&self, shop_id: Uuid) -> Result<Option<BlogSettings>, RepoError>;

    async fn save(&self, settings: BlogSettings) -> Result<BlogSettings, RepoError>;
}
