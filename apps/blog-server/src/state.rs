//! Application state - shared across all handlers.

use std::sync::Arc;

use uuid::Uuid;

use blog_core::ports::{PostRepository, RateLimiter, SettingsRepository, TokenService};
use blog_core::services::PostService;
use blog_infra::database::DatabaseConfig;
use blog_infra::{
    InMemoryMediaStore, InMemoryPostRepository, InMemoryRateLimiter, InMemorySettingsRepository,
    JwtTokenService,
};

#[cfg(feature = "postgres")]
use blog_infra::{DatabaseConnections, PostgresPostRepository, PostgresSettingsRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    /// Shop served by this instance, if configured.
    pub shop_id: Option<Uuid>,
    pub token_service: Arc<dyn TokenService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
}

type Stores = (Arc<dyn PostRepository>, Arc<dyn SettingsRepository>);

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryPostRepository::new()),
        Arc::new(InMemorySettingsRepository::new()),
    )
}

#[cfg(feature = "postgres")]
async fn stores(db_config: Option<&DatabaseConfig>) -> Stores {
    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_stores();
    };

    match DatabaseConnections::init(config).await {
        Ok(connections) => (
            Arc::new(PostgresPostRepository::new(connections.main.clone())),
            Arc::new(PostgresSettingsRepository::new(connections.main)),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            in_memory_stores()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn stores(_db_config: Option<&DatabaseConfig>) -> Stores {
    tracing::info!("Running without postgres feature - using in-memory repositories");
    in_memory_stores()
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> std::io::Result<Self> {
        let (posts, settings) = stores(config.database.as_ref()).await;
        let media = Arc::new(InMemoryMediaStore::new());

        let rate_limiter = InMemoryRateLimiter::new(config.rate_limit.clone())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let token_service = JwtTokenService::new(config.jwt.clone());

        if config.shop_id.is_none() {
            tracing::warn!("BLOG_SHOP_ID not set. Listings are empty and writes are refused.");
        }

        tracing::info!(
            token_lifetime_secs = token_service.expiration_seconds(),
            "Application state initialized"
        );

        Ok(Self {
            posts: PostService::new(posts, settings, media),
            shop_id: config.shop_id,
            token_service: Arc::new(token_service),
            rate_limiter: Arc::new(rate_limiter),
        })
    }

    /// In-memory state for handler tests.
    #[cfg(test)]
    pub fn in_memory(shop_id: Option<Uuid>, rate_limit: blog_infra::RateLimitConfig) -> Self {
        let (posts, settings) = in_memory_stores();
        Self {
            posts: PostService::new(posts, settings, Arc::new(InMemoryMediaStore::new())),
            shop_id,
            token_service: Arc::new(JwtTokenService::new(blog_infra::JwtConfig::default())),
            rate_limiter: Arc::new(
                InMemoryRateLimiter::new(rate_limit).expect("valid rate limit"),
            ),
        }
    }
}
