use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-shop blog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogSettings {
    pub shop_id: Uuid,
    /// Tag applied to posts by default.
    pub default_tag: String,
    pub updated_at: DateTime<Utc>,
}

/// Settings values submitted by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSettingsUpdate {
    pub default_tag: String,
}
