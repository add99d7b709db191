//! Application configuration loaded from environment variables.

use std::env;

use uuid::Uuid;

use blog_infra::database::DatabaseConfig;
use blog_infra::{JwtConfig, RateLimitConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Shop whose blog this server hosts. Writes are refused without one.
    pub shop_id: Option<Uuid>,
    pub rate_limit: RateLimitConfig,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            shop_id: Self::parse_shop_id(env::var("BLOG_SHOP_ID").ok().as_deref()),
            rate_limit: RateLimitConfig::from_env(),
            jwt: JwtConfig::from_env(),
        }
    }

    fn parse_shop_id(raw: Option<&str>) -> Option<Uuid> {
        let raw = raw?.trim();
        match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::error!(value = raw, error = %e, "BLOG_SHOP_ID is not a valid UUID, ignoring it");
                None
            }
        }
    }
}
