//! Blog settings handlers.

use actix_web::{HttpResponse, web};

use blog_core::domain::BlogSettingsUpdate;
use blog_shared::dto::{SettingsRequest, SettingsResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/blog/settings
pub async fn get_settings(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let shop_id = state.shop_id.ok_or(AppError::ShopUnavailable)?;
    let settings = state.posts.settings(shop_id).await?;

    Ok(HttpResponse::Ok().json(SettingsResponse {
        shop_id,
        default_tag: settings.as_ref().map(|s| s.default_tag.clone()),
        updated_at: settings.map(|s| s.updated_at),
    }))
}

/// PUT /api/blog/settings
pub async fn update_settings(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<SettingsRequest>,
) -> AppResult<HttpResponse> {
    let shop_id = state.shop_id.ok_or(AppError::ShopUnavailable)?;
    let update = BlogSettingsUpdate {
        default_tag: body.into_inner().default_tag,
    };

    let saved = state
        .posts
        .update_settings(Some(&identity.0), shop_id, update)
        .await?;
    tracing::info!(shop_id = %shop_id, "Blog settings updated");

    Ok(HttpResponse::Ok().json(SettingsResponse {
        shop_id,
        default_tag: Some(saved.default_tag),
        updated_at: Some(saved.updated_at),
    }))
}
