//! SeaORM entities of the blog schema.

pub mod blog_settings;
pub mod post;
pub mod post_hashtag;
