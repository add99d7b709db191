//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{Post, PostChanges};
use blog_core::services::PostsFilter;
use blog_shared::dto::{
    CreatePostResponse, DeletePostsRequest, DeletePostsResponse, HandleResponse, PostResponse,
    PostsQueryParams, RecommendationResponse, UpdatePostRequest, VisibilityResponse,
};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        page_title: post.page_title,
        keywords: post.keywords,
        meta_description: post.meta_description,
        annotation: post.annotation,
        body: post.body,
        handle: post.handle,
        hashtags: post.hashtags,
        is_visible: post.is_visible,
        is_recommended: post.is_recommended,
        created_at: post.created_at,
        updated_at: post.updated_at,
        published_at: post.published_at,
    }
}

fn require_shop(state: &AppState) -> AppResult<Uuid> {
    state.shop_id.ok_or(AppError::ShopUnavailable)
}

/// GET /api/blog/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    params: web::Query<PostsQueryParams>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let tags = params
        .tag_ids()
        .map_err(|e| AppError::BadRequest(format!("Invalid tag id: {e}")))?;

    let filter = PostsFilter {
        query: params.query,
        tags,
        visibility: params.visibility,
        recommendation: params.recommendation,
    };

    let posts = state
        .posts
        .list_posts(identity.actor(), state.shop_id, filter)
        .await?;

    Ok(HttpResponse::Ok().json(posts.into_iter().map(post_response).collect::<Vec<_>>()))
}

/// GET /api/blog/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = state
        .posts
        .get_post(identity.actor(), state.shop_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {id} not found")))?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/blog/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let shop_id = require_shop(&state)?;
    let id = state.posts.create_post(Some(&identity.0), shop_id).await?;

    Ok(HttpResponse::Created().json(CreatePostResponse { id }))
}

/// PATCH /api/blog/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    require_shop(&state)?;
    let req = body.into_inner();
    let changes = PostChanges {
        title: req.title,
        page_title: req.page_title,
        keywords: req.keywords,
        meta_description: req.meta_description,
        annotation: req.annotation,
        body: req.body,
        hashtags: req.hashtags,
        handle: req.handle,
    };

    let post = state
        .posts
        .update_post(Some(&identity.0), path.into_inner(), changes)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/blog/posts/{id}/visibility
pub async fn toggle_visibility(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_shop(&state)?;
    let is_visible = state
        .posts
        .toggle_visibility(Some(&identity.0), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(VisibilityResponse { is_visible }))
}

/// POST /api/blog/posts/{id}/recommendation
pub async fn toggle_recommendation(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_shop(&state)?;
    let is_recommended = state
        .posts
        .toggle_recommendation(Some(&identity.0), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(RecommendationResponse { is_recommended }))
}

/// POST /api/blog/posts/{id}/handle
pub async fn update_handle(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_shop(&state)?;
    let handle = state
        .posts
        .update_handle(Some(&identity.0), path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(HandleResponse { handle }))
}

/// POST /api/blog/posts/delete
pub async fn delete_posts(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<DeletePostsRequest>,
) -> AppResult<HttpResponse> {
    require_shop(&state)?;
    let deleted = state
        .posts
        .delete_posts(Some(&identity.0), &body.post_ids)
        .await?;

    Ok(HttpResponse::Ok().json(DeletePostsResponse { deleted }))
}
