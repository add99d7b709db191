//! Domain services - the blog operations built on top of the ports.

pub mod handle;
pub mod posts;
pub mod publication;

pub use handle::{CopySuffix, HandleResolver, slugify_title};
pub use posts::{HANDLE_WRITE_ATTEMPTS, PostService};
pub use publication::PostsFilter;
