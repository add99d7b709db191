//! HTTP handlers and route configuration.

mod health;
mod posts;
mod settings;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use actix_web::{guard, web};

use blog_core::ports::RateLimiter;

use crate::middleware::RateLimitMiddleware;

/// Configure all application routes. Writes go through `limiter`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, limiter: Arc<dyn RateLimiter>) {
    let limited = |path: &str| {
        web::resource(path)
            .guard(guard::Any(guard::Post()).or(guard::Put()).or(guard::Patch()))
            .wrap(RateLimitMiddleware::new(limiter.clone()))
    };

    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/blog")
                    // Writes
                    .service(limited("/posts").route(web::post().to(posts::create_post)))
                    .service(limited("/posts/delete").route(web::post().to(posts::delete_posts)))
                    .service(limited("/posts/{id}").route(web::patch().to(posts::update_post)))
                    .service(
                        limited("/posts/{id}/visibility")
                            .route(web::post().to(posts::toggle_visibility)),
                    )
                    .service(
                        limited("/posts/{id}/recommendation")
                            .route(web::post().to(posts::toggle_recommendation)),
                    )
                    .service(
                        limited("/posts/{id}/handle").route(web::post().to(posts::update_handle)),
                    )
                    .service(limited("/settings").route(web::put().to(settings::update_settings)))
                    // Reads
                    .route("/posts", web::get().to(posts::list_posts))
                    .route("/posts/{id}", web::get().to(posts::get_post))
                    .route("/settings", web::get().to(settings::get_settings)),
            ),
    );
}
