//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response to a post creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub id: Uuid,
}

/// Partial post update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub page_title: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
    pub annotation: Option<String>,
    pub body: Option<String>,
    pub hashtags: Option<Vec<Uuid>>,
    /// Desired handle; the server slugifies it and keeps it unique.
    pub handle: Option<String>,
}

/// A blog post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub page_title: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
    pub annotation: Option<String>,
    pub body: String,
    pub handle: String,
    pub hashtags: Vec<Uuid>,
    pub is_visible: bool,
    pub is_recommended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Query string of the post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostsQueryParams {
    pub query: Option<String>,
    /// Comma separated tag ids.
    pub tags: Option<String>,
    pub visibility: Option<bool>,
    pub recommendation: Option<bool>,
}

impl PostsQueryParams {
    /// Parse the `tags` list. `None` when absent or empty.
    pub fn tag_ids(&self) -> Result<Option<Vec<Uuid>>, uuid::Error> {
        let Some(tags) = self.tags.as_deref() else {
            return Ok(None);
        };

        let ids = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Uuid::parse_str)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((!ids.is_empty()).then_some(ids))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePostsRequest {
    pub post_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePostsResponse {
    pub deleted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleResponse {
    pub handle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityResponse {
    pub is_visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub is_recommended: bool,
}

/// Blog settings update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsRequest {
    pub default_tag: String,
}

/// Blog settings of the shop. `default_tag` is `None` until set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub shop_id: Uuid,
    pub default_tag: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
