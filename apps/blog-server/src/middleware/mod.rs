//! Middleware and extractors.

pub mod auth;
pub mod error;
pub mod rate_limit;
pub mod request_id;

pub use rate_limit::RateLimitMiddleware;
pub use request_id::RequestIdMiddleware;
