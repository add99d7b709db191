//! Domain entities - the core business objects.

mod actor;
mod post;
mod settings;

pub use actor::{Actor, Permission};
pub use post::{Post, PostChanges};
pub use settings::{BlogSettings, BlogSettingsUpdate};
