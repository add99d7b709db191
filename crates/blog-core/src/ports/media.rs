//! Media storage port - files attached to posts live outside the post store.

use async_trait::async_trait;
use uuid::Uuid;

/// Storage of media files attached to posts.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Remove every media file of the given posts, returning how many were removed.
    async fn delete_for_posts(&self, post_ids: &[Uuid]) -> Result<u64, MediaError>;
}

/// Media storage errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media backend error: {0}")]
    Backend(String),
}
