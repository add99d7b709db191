use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog post belonging to a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub title: String,
    pub page_title: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
    pub annotation: Option<String>,
    pub body: String,
    /// URL-safe slug, unique across all posts.
    pub handle: String,
    /// Ids of tags attached to the post.
    pub hashtags: Vec<Uuid>,
    pub is_visible: bool,
    pub is_recommended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last time the post was made visible.
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create an empty, hidden post. The handle is left empty until resolved.
    pub fn new(shop_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            shop_id,
            title: String::new(),
            page_title: None,
            keywords: None,
            meta_description: None,
            annotation: None,
            body: String::new(),
            handle: String::new(),
            hashtags: Vec::new(),
            is_visible: false,
            is_recommended: false,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }

    /// Handle used when the title produces no slug.
    pub fn fallback_handle(&self) -> String {
        self.id.to_string()
    }

    /// Flip visibility. Becoming visible stamps `published_at`.
    pub fn toggle_visibility(&mut self, now: DateTime<Utc>) -> bool {
        self.is_visible = !self.is_visible;
        if self.is_visible {
            self.published_at = Some(now);
        }
        self.updated_at = now;
        self.is_visible
    }

    pub fn toggle_recommendation(&mut self, now: DateTime<Utc>) -> bool {
        self.is_recommended = !self.is_recommended;
        self.updated_at = now;
        self.is_recommended
    }

    /// Apply field changes. The handle is not touched here; it has to go
    /// through the resolver.
    pub fn apply(&mut self, changes: PostChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(page_title) = changes.page_title {
            self.page_title = Some(page_title);
        }
        if let Some(keywords) = changes.keywords {
            self.keywords = Some(keywords);
        }
        if let Some(meta_description) = changes.meta_description {
            self.meta_description = Some(meta_description);
        }
        if let Some(annotation) = changes.annotation {
            self.annotation = Some(annotation);
        }
        if let Some(body) = changes.body {
            self.body = body;
        }
        if let Some(mut hashtags) = changes.hashtags {
            let mut seen = std::collections::HashSet::new();
            hashtags.retain(|tag| seen.insert(*tag));
            self.hashtags = hashtags;
        }
        self.updated_at = now;
    }
}

/// Partial update of a post's editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub page_title: Option<String>,
    pub keywords: Option<String>,
    pub meta_description: Option<String>,
    pub annotation: Option<String>,
    pub body: Option<String>,
    pub hashtags: Option<Vec<Uuid>>,
    /// Explicit handle override, slugified and made unique before saving.
    pub handle: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_is_hidden_and_empty() {
        let post = Post::new(Uuid::new_v4());
        assert!(!post.is_visible);
        assert!(!post.is_recommended);
        assert!(post.title.is_empty());
        assert!(post.published_at.is_none());
        assert_eq!(post.fallback_handle(), post.id.to_string());
    }

    #[test]
    fn test_toggle_visibility_stamps_published_at_only_when_shown() {
        let mut post = Post::new(Uuid::new_v4());
        let shown_at = Utc::now();

        assert!(post.toggle_visibility(shown_at));
        assert_eq!(post.published_at, Some(shown_at));

        let hidden_at = shown_at + chrono::Duration::seconds(30);
        assert!(!post.toggle_visibility(hidden_at));
        assert_eq!(post.published_at, Some(shown_at));
        assert_eq!(post.updated_at, hidden_at);
    }

    #[test]
    fn test_apply_dedups_hashtags_and_keeps_unset_fields() {
        let mut post = Post::new(Uuid::new_v4());
        post.body = "old body".into();
        let tag = Uuid::new_v4();

        post.apply(
            PostChanges {
                title: Some("Hello".into()),
                hashtags: Some(vec![tag, tag]),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(post.title, "Hello");
        assert_eq!(post.body, "old body");
        assert_eq!(post.hashtags, vec![tag]);
    }
}
