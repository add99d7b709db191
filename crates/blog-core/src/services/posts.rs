//! Post lifecycle operations.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Actor, BlogSettings, BlogSettingsUpdate, Permission, Post, PostChanges};
use crate::error::{DomainError, RepoError};
use crate::ports::{BaseRepository, MediaStore, PostRepository, SettingsRepository};

use super::handle::{HandleResolver, slugify_title};
use super::publication::{self, PostsFilter};

/// Writes attempted before a handle conflict is reported to the caller.
pub const HANDLE_WRITE_ATTEMPTS: usize = 3;

fn authorize(actor: Option<&Actor>, permission: Permission) -> Result<&Actor, DomainError> {
    match actor {
        Some(actor) if actor.can(permission) => Ok(actor),
        Some(actor) => {
            tracing::warn!(
                user_id = %actor.user_id,
                permission = permission.as_str(),
                "Permission denied"
            );
            Err(DomainError::AccessDenied)
        }
        None => Err(DomainError::AccessDenied),
    }
}

/// Handle a post would get from its title, falling back to its id.
fn derived_handle(post: &Post) -> String {
    let slug = slugify_title(&post.title);
    if slug.is_empty() {
        post.fallback_handle()
    } else {
        slug
    }
}

/// Blog operations over the post, settings and media stores.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    settings: Arc<dyn SettingsRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        settings: Arc<dyn SettingsRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            posts,
            settings,
            media,
        }
    }

    async fn load(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Resolve `desired` and save. A unique-handle violation from storage
    /// means another writer took the handle after we resolved it, so resolve
    /// again. `resolved` is used as is for the first write when the caller
    /// already resolved `desired`.
    async fn save_with_handle(
        &self,
        mut post: Post,
        desired: &str,
        mut resolved: Option<String>,
    ) -> Result<Post, DomainError> {
        let resolver = HandleResolver::new(&*self.posts);
        let mut attempt = 1;

        loop {
            post.handle = match resolved.take() {
                Some(handle) => handle,
                None => resolver.resolve(desired, post.id).await?,
            };

            match self.posts.save(post.clone()).await {
                Ok(saved) => return Ok(saved),
                Err(RepoError::Constraint(msg)) if attempt < HANDLE_WRITE_ATTEMPTS => {
                    tracing::warn!(
                        post_id = %post.id,
                        handle = %post.handle,
                        attempt,
                        error = %msg,
                        "Handle claimed concurrently, resolving again"
                    );
                    attempt += 1;
                }
                Err(RepoError::Constraint(msg)) => {
                    return Err(DomainError::Duplicate(format!(
                        "handle '{}' is taken: {msg}",
                        post.handle
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Create an empty post and return its id.
    pub async fn create_post(
        &self,
        actor: Option<&Actor>,
        shop_id: Uuid,
    ) -> Result<Uuid, DomainError> {
        authorize(actor, Permission::ManageBlog)?;

        let post = Post::new(shop_id);
        let desired = derived_handle(&post);
        let post = self.save_with_handle(post, &desired, None).await?;

        tracing::info!(post_id = %post.id, handle = %post.handle, "Post created");
        Ok(post.id)
    }

    /// Apply field changes to a post. An explicit handle is slugified and
    /// made unique.
    pub async fn update_post(
        &self,
        actor: Option<&Actor>,
        id: Uuid,
        mut changes: PostChanges,
    ) -> Result<Post, DomainError> {
        authorize(actor, Permission::ManageBlog)?;

        let mut post = self.load(id).await?;
        let handle = changes.handle.take();
        post.apply(changes, Utc::now());

        let post = match handle {
            Some(handle) => {
                let slug = slugify_title(&handle);
                let desired = if slug.is_empty() {
                    post.fallback_handle()
                } else {
                    slug
                };
                self.save_with_handle(post, &desired, None).await?
            }
            None => self.posts.save(post).await?,
        };

        tracing::debug!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Show or hide a post, returning the new visibility.
    pub async fn toggle_visibility(
        &self,
        actor: Option<&Actor>,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        authorize(actor, Permission::ManageBlog)?;

        let mut post = self.load(id).await?;
        let visible = post.toggle_visibility(Utc::now());
        tracing::info!(post_id = %id, visible, "Toggle post visibility");

        self.posts.save(post).await?;
        Ok(visible)
    }

    /// Flip the recommended flag, returning the new value.
    pub async fn toggle_recommendation(
        &self,
        actor: Option<&Actor>,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        authorize(actor, Permission::ManageBlog)?;

        let mut post = self.load(id).await?;
        let recommended = post.toggle_recommendation(Utc::now());
        self.posts.save(post).await?;

        Ok(recommended)
    }

    /// Recompute the handle from the post title. Storage is only written
    /// when the handle changes.
    pub async fn update_handle(
        &self,
        actor: Option<&Actor>,
        id: Uuid,
    ) -> Result<String, DomainError> {
        authorize(actor, Permission::ManageBlog)?;

        let post = self.load(id).await?;
        let desired = derived_handle(&post);
        let resolved = HandleResolver::new(&*self.posts)
            .resolve(&desired, id)
            .await?;

        if resolved == post.handle {
            return Ok(resolved);
        }

        let previous = post.handle.clone();
        let mut post = post;
        post.updated_at = Utc::now();
        let saved = self.save_with_handle(post, &desired, Some(resolved)).await?;

        tracing::info!(post_id = %id, from = %previous, to = %saved.handle, "Post handle updated");
        Ok(saved.handle)
    }

    /// Delete posts and their media. Fails when none of the posts existed.
    pub async fn delete_posts(
        &self,
        actor: Option<&Actor>,
        ids: &[Uuid],
    ) -> Result<u64, DomainError> {
        authorize(actor, Permission::ManageBlog)?;

        if ids.is_empty() {
            return Err(DomainError::Validation("no posts given".into()));
        }
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let deleted = self.posts.delete_many(&ids).await?;
        if deleted == 0 {
            tracing::warn!(requested = ids.len(), "Nothing was deleted while removing posts");
            return Err(DomainError::NothingDeleted);
        }

        match self.media.delete_for_posts(&ids).await {
            Ok(files) => tracing::debug!(files, "Removed media of deleted posts"),
            Err(e) => tracing::warn!(error = %e, "Failed to remove media of deleted posts"),
        }

        tracing::info!(deleted, "Posts deleted");
        Ok(deleted)
    }

    pub async fn settings(&self, shop_id: Uuid) -> Result<Option<BlogSettings>, DomainError> {
        Ok(self.settings.find_by_shop(shop_id).await?)
    }

    pub async fn update_settings(
        &self,
        actor: Option<&Actor>,
        shop_id: Uuid,
        update: BlogSettingsUpdate,
    ) -> Result<BlogSettings, DomainError> {
        authorize(actor, Permission::BlogSettings)?;

        let default_tag = update.default_tag.trim();
        if default_tag.is_empty() {
            return Err(DomainError::Validation("defaultTag must not be empty".into()));
        }

        let settings = BlogSettings {
            shop_id,
            default_tag: default_tag.to_string(),
            updated_at: Utc::now(),
        };
        Ok(self.settings.save(settings).await?)
    }

    /// A single post, if it exists and `actor` may see it. Without a shop
    /// there is nothing to read.
    pub async fn get_post(
        &self,
        actor: Option<&Actor>,
        shop_id: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<Post>, DomainError> {
        if shop_id.is_none() {
            return Ok(None);
        }

        let post = self.posts.find_by_id(id).await?;
        Ok(post.filter(|p| publication::can_view(actor, p)))
    }

    /// Posts of a shop visible to `actor`. Without a shop there is nothing to list.
    pub async fn list_posts(
        &self,
        actor: Option<&Actor>,
        shop_id: Option<Uuid>,
        filter: PostsFilter,
    ) -> Result<Vec<Post>, DomainError> {
        let Some(shop_id) = shop_id else {
            return Ok(Vec::new());
        };

        let query = publication::posts_query(actor, shop_id, filter);
        Ok(self.posts.find(&query).await?)
    }
}
