//! Handle (slug) generation and uniqueness.
//!
//! A colliding handle is disambiguated with a readable copy suffix:
//! `post`, `post-copy`, `post-copy-2`, ... A handle that already carries a
//! suffix has its number bumped by the collision count instead.

use uuid::Uuid;

use crate::error::RepoError;
use crate::ports::{HandleFilter, HandleIndex};

const COPY_MARKER: &str = "-copy";

/// Slug for a post title: transliterated to ASCII, lowercased, words joined by `-`.
pub fn slugify_title(title: &str) -> String {
    slug::slugify(title)
}

/// A `-copy` or `-copy-<n>` suffix at the end of a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopySuffix<'a> {
    /// The handle without its trailing number (`post-copy` for `post-copy-3`).
    pub base: &'a str,
    /// Copy number; a bare `-copy` (or `-copy-0`) counts as 1.
    pub number: u64,
}

impl<'a> CopySuffix<'a> {
    /// Parse the suffix. `-copy-<digits>` takes precedence over a bare `-copy`;
    /// trailing digits without the marker (`post4`) are not a suffix.
    pub fn parse(handle: &'a str) -> Option<Self> {
        let head = handle.trim_end_matches(|c: char| c.is_ascii_digit());
        let digits = &handle[head.len()..];

        if !digits.is_empty() {
            let base = head.strip_suffix('-')?;
            if !base.ends_with(COPY_MARKER) {
                return None;
            }
            // A number too large for u64 is treated as plain text.
            let number = digits.parse::<u64>().ok()?.max(1);
            return Some(Self { base, number });
        }

        handle.ends_with(COPY_MARKER).then_some(Self {
            base: handle,
            number: 1,
        })
    }
}

/// The handle to try after `candidate` collided with `collisions` other posts.
///
/// Always differs from `candidate`: a copy number that cannot be raised
/// without overflowing starts a new `-copy` suffix instead.
fn next_candidate(candidate: &str, collisions: u64) -> String {
    let renumbered = CopySuffix::parse(candidate).and_then(|suffix| {
        let number = suffix.number.checked_add(collisions)?;
        Some(format!("{}-{number}", suffix.base))
    });

    match renumbered {
        Some(next) => next,
        None if collisions == 1 => format!("{candidate}{COPY_MARKER}"),
        None => format!("{candidate}{COPY_MARKER}-{collisions}"),
    }
}

/// Finds a handle no other post uses.
///
/// The resolver only reads. Two resolutions racing for the same handle can
/// both succeed, so callers must write through storage that rejects duplicate
/// handles and resolve again on rejection (see [`crate::services::PostService`]).
pub struct HandleResolver<'a, I: HandleIndex + ?Sized> {
    index: &'a I,
}

impl<'a, I: HandleIndex + ?Sized> HandleResolver<'a, I> {
    pub fn new(index: &'a I) -> Self {
        Self { index }
    }

    /// Resolve `desired` into a handle unique among posts other than `post_id`.
    ///
    /// The post's own current handle never counts as a collision, so
    /// re-saving a post keeps its handle.
    pub async fn resolve(&self, desired: &str, post_id: Uuid) -> Result<String, RepoError> {
        let mut candidate = desired.to_string();

        loop {
            let collisions = self
                .index
                .count_matches(&HandleFilter::others(&candidate, post_id))
                .await?;
            if collisions == 0 {
                return Ok(candidate);
            }

            let next = next_candidate(&candidate, collisions);
            tracing::debug!(
                post_id = %post_id,
                taken = %candidate,
                next = %next,
                collisions,
                "Handle taken, renumbering"
            );
            candidate = next;

            if self
                .index
                .count_matches(&HandleFilter::all(&candidate))
                .await?
                == 0
            {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed set of `(post id, handle)` pairs.
    struct Handles {
        rows: Vec<(Uuid, String)>,
        lookups: AtomicUsize,
    }

    impl Handles {
        fn new(handles: &[&str]) -> Self {
            Self {
                rows: handles
                    .iter()
                    .map(|h| (Uuid::new_v4(), h.to_string()))
                    .collect(),
                lookups: AtomicUsize::new(0),
            }
        }

        fn owned_by(mut self, id: Uuid, handle: &str) -> Self {
            self.rows.push((id, handle.to_string()));
            self
        }
    }

    #[async_trait]
    impl HandleIndex for Handles {
        async fn count_matches(&self, filter: &HandleFilter) -> Result<u64, RepoError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .iter()
                .filter(|(id, h)| *h == filter.handle && filter.exclude != Some(*id))
                .count() as u64)
        }
    }

    async fn resolve(index: &Handles, desired: &str) -> String {
        HandleResolver::new(index)
            .resolve(desired, Uuid::new_v4())
            .await
            .unwrap()
    }

    #[test]
    fn test_parse_numbered_copy_suffix() {
        let s = CopySuffix::parse("post-copy-3").unwrap();
        assert_eq!(s.base, "post-copy");
        assert_eq!(s.number, 3);
    }

    #[test]
    fn test_parse_bare_copy_suffix_counts_as_one() {
        let s = CopySuffix::parse("post-copy").unwrap();
        assert_eq!(s.base, "post-copy");
        assert_eq!(s.number, 1);
    }

    #[test]
    fn test_parse_zero_counts_as_one() {
        assert_eq!(CopySuffix::parse("post-copy-0").unwrap().number, 1);
    }

    #[test]
    fn test_parse_ignores_plain_trailing_digits() {
        assert_eq!(CopySuffix::parse("post4"), None);
        assert_eq!(CopySuffix::parse("post-4"), None);
        assert_eq!(CopySuffix::parse("post-copy4"), None);
        assert_eq!(CopySuffix::parse("copy"), None);
        assert_eq!(CopySuffix::parse(""), None);
    }

    #[test]
    fn test_slugify_title() {
        assert_eq!(slugify_title("Hello, World!"), "hello-world");
        assert_eq!(slugify_title(""), "");
    }

    #[tokio::test]
    async fn test_free_handle_is_kept() {
        let index = Handles::new(&["other"]);
        assert_eq!(resolve(&index, "post").await, "post");
    }

    #[tokio::test]
    async fn test_empty_handle_is_kept_when_free() {
        let index = Handles::new(&[]);
        assert_eq!(resolve(&index, "").await, "");
    }

    #[tokio::test]
    async fn test_first_collision_gets_copy() {
        let index = Handles::new(&["post"]);
        assert_eq!(resolve(&index, "post").await, "post-copy");
    }

    #[tokio::test]
    async fn test_taken_copy_moves_to_copy_2() {
        let index = Handles::new(&["post", "post-copy"]);
        assert_eq!(resolve(&index, "post").await, "post-copy-2");
    }

    #[tokio::test]
    async fn test_chain_of_copies() {
        let index = Handles::new(&["post", "post-copy", "post-copy-2"]);
        assert_eq!(resolve(&index, "post").await, "post-copy-3");
    }

    #[tokio::test]
    async fn test_many_duplicates_number_by_count() {
        let index = Handles::new(&["post", "post", "post"]);
        assert_eq!(resolve(&index, "post").await, "post-copy-3");
    }

    #[tokio::test]
    async fn test_numbered_copy_is_incremented() {
        let index = Handles::new(&["post-copy-3"]);
        assert_eq!(resolve(&index, "post-copy-3").await, "post-copy-4");
    }

    #[tokio::test]
    async fn test_plain_digits_get_copy_suffix() {
        let index = Handles::new(&["post4"]);
        assert_eq!(resolve(&index, "post4").await, "post4-copy");
    }

    #[tokio::test]
    async fn test_own_handle_is_not_a_collision() {
        let id = Uuid::new_v4();
        let index = Handles::new(&[]).owned_by(id, "post");

        let handle = HandleResolver::new(&index)
            .resolve("post", id)
            .await
            .unwrap();

        assert_eq!(handle, "post");
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent_for_owner() {
        let id = Uuid::new_v4();
        let index = Handles::new(&["post"]);
        let first = HandleResolver::new(&index).resolve("post", id).await.unwrap();

        let index = index.owned_by(id, &first);
        let second = HandleResolver::new(&index).resolve(&first, id).await.unwrap();

        assert_eq!(first, "post-copy");
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_renumbered_handle_owned_by_self_is_accepted() {
        let id = Uuid::new_v4();
        let index = Handles::new(&["post"]).owned_by(id, "post-copy");

        let handle = HandleResolver::new(&index)
            .resolve("post", id)
            .await
            .unwrap();

        assert_eq!(handle, "post-copy");
    }

    #[test]
    fn test_parse_treats_oversized_number_as_text() {
        assert_eq!(CopySuffix::parse("post-copy-99999999999999999999"), None);
        let top = format!("post-copy-{}", u64::MAX);
        assert_eq!(CopySuffix::parse(&top).unwrap().number, u64::MAX);
    }

    #[test]
    fn test_next_candidate_never_repeats_at_number_limit() {
        let top = format!("post-copy-{}", u64::MAX);
        assert_eq!(next_candidate(&top, 1), format!("{top}-copy"));
        assert_eq!(next_candidate(&top, 2), format!("{top}-copy-2"));
    }

    #[tokio::test]
    async fn test_taken_handle_at_number_limit_terminates() {
        let top = format!("post-copy-{}", u64::MAX);
        let index = Handles::new(&[top.as_str()]);

        assert_eq!(resolve(&index, &top).await, format!("{top}-copy"));
        assert!(index.lookups.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_taken_oversized_number_terminates() {
        let long = "post-copy-123456789012345678901234567890";
        let copy = format!("{long}-copy");
        let index = Handles::new(&[long, copy.as_str()]);

        assert_eq!(resolve(&index, long).await, format!("{long}-copy-2"));
    }

    #[tokio::test]
    async fn test_lookups_bounded_by_collision_chain() {
        let taken = ["post", "post-copy", "post-copy-2", "post-copy-3"];
        let index = Handles::new(&taken);

        assert_eq!(resolve(&index, "post").await, "post-copy-4");
        // Two lookups per renumbering step.
        assert!(index.lookups.load(Ordering::SeqCst) <= 2 * (taken.len() + 1));
    }
}
