//! Permission-aware reads of posts ("publications").

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Actor, Post};
use crate::ports::PostQuery;

/// Filter a client may send when listing posts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostsFilter {
    /// Free text searched in title, page title, keywords and body.
    pub query: Option<String>,
    pub tags: Option<Vec<Uuid>>,
    /// Honoured for blog admins only.
    pub visibility: Option<bool>,
    pub recommendation: Option<bool>,
}

fn is_admin(actor: Option<&Actor>) -> bool {
    actor.is_some_and(Actor::is_blog_admin)
}

/// Whether `actor` may read `post`. Hidden posts are for blog admins.
pub fn can_view(actor: Option<&Actor>, post: &Post) -> bool {
    post.is_visible || is_admin(actor)
}

/// Build the repository query for a post listing.
pub fn posts_query(actor: Option<&Actor>, shop_id: Uuid, filter: PostsFilter) -> PostQuery {
    let mut query = PostQuery::for_shop(shop_id);

    query.visible = if is_admin(actor) {
        filter.visibility
    } else {
        Some(true)
    };
    query.recommended = filter.recommendation;
    query.text = filter
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty());
    query.tags = filter.tags.unwrap_or_default();

    query
}

/// Publication order: most recently published first, unpublished posts last,
/// ties broken by creation time.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), vec!["manageBlog".into()])
    }

    fn reader() -> Actor {
        Actor::new(Uuid::new_v4(), vec!["user".into()])
    }

    #[test]
    fn test_readers_only_get_visible_posts() {
        let filter = PostsFilter {
            visibility: Some(false),
            ..Default::default()
        };

        let q = posts_query(Some(&reader()), Uuid::nil(), filter.clone());
        assert_eq!(q.visible, Some(true));

        let q = posts_query(None, Uuid::nil(), filter);
        assert_eq!(q.visible, Some(true));
    }

    #[test]
    fn test_admins_see_everything_unless_filtered() {
        let q = posts_query(Some(&admin()), Uuid::nil(), PostsFilter::default());
        assert_eq!(q.visible, None);

        let q = posts_query(
            Some(&admin()),
            Uuid::nil(),
            PostsFilter {
                visibility: Some(false),
                ..Default::default()
            },
        );
        assert_eq!(q.visible, Some(false));
    }

    #[test]
    fn test_blank_query_is_dropped() {
        let q = posts_query(
            None,
            Uuid::nil(),
            PostsFilter {
                query: Some("   ".into()),
                ..Default::default()
            },
        );
        assert_eq!(q.text, None);
    }

    #[test]
    fn test_can_view_hidden_post() {
        let post = Post::new(Uuid::nil());
        assert!(!can_view(None, &post));
        assert!(!can_view(Some(&reader()), &post));
        assert!(can_view(Some(&admin()), &post));
    }

    #[test]
    fn test_sort_puts_unpublished_last() {
        let now = Utc::now();
        let mut old = Post::new(Uuid::nil());
        old.published_at = Some(now - Duration::days(2));
        let mut fresh = Post::new(Uuid::nil());
        fresh.published_at = Some(now);
        let draft = Post::new(Uuid::nil());

        let mut posts = vec![draft.clone(), old.clone(), fresh.clone()];
        sort_newest_first(&mut posts);

        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![fresh.id, old.id, draft.id]);
    }
}
