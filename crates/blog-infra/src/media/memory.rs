//! In-memory media store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::ports::{MediaError, MediaStore};

/// Media file names per post, kept in process memory.
#[derive(Default)]
pub struct InMemoryMediaStore {
    files: RwLock<HashMap<Uuid, Vec<String>>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a media file to a post.
    pub async fn attach(&self, post_id: Uuid, file_name: impl Into<String>) {
        self.files
            .write()
            .await
            .entry(post_id)
            .or_default()
            .push(file_name.into());
    }

    pub async fn files_for(&self, post_id: Uuid) -> Vec<String> {
        self.files
            .read()
            .await
            .get(&post_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn delete_for_posts(&self, post_ids: &[Uuid]) -> Result<u64, MediaError> {
        let mut files = self.files.write().await;
        let removed = post_ids
            .iter()
            .filter_map(|id| files.remove(id))
            .map(|f| f.len() as u64)
            .sum();

        tracing::debug!(posts = post_ids.len(), removed, "Media removed");
        Ok(removed)
    }
}
