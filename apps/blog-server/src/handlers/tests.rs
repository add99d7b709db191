use std::time::Duration;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use blog_infra::RateLimitConfig;

use crate::state::AppState;

fn generous() -> RateLimitConfig {
    RateLimitConfig {
        max_requests: 1000,
        window: Duration::from_secs(1),
    }
}

fn state() -> AppState {
    AppState::in_memory(Some(Uuid::new_v4()), generous())
}

fn bearer(state: &AppState, roles: &[&str]) -> (&'static str, String) {
    let token = state
        .token_service
        .generate_token(
            Uuid::new_v4(),
            roles.iter().map(|r| r.to_string()).collect(),
        )
        .unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($state:expr) => {{
        let state: AppState = $state;
        let limiter = state.rate_limiter.clone();
        test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| super::configure_routes(cfg, limiter)),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_health() {
    let app = app!(state());
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["shop_configured"], true);
}

#[actix_web::test]
async fn test_create_then_rename_post() {
    let state = state();
    let auth = bearer(&state, &["manageBlog"]);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/blog/posts")
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/blog/posts/{id}"))
        .insert_header(auth.clone())
        .set_json(json!({ "title": "Spring Collection" }))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["title"], "Spring Collection");
    assert_eq!(post["handle"], id);

    let req = test::TestRequest::post()
        .uri(&format!("/api/blog/posts/{id}/handle"))
        .insert_header(auth)
        .to_request();
    let handle: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(handle["handle"], "spring-collection");
}

#[actix_web::test]
async fn test_hidden_post_is_not_found_for_anonymous_readers() {
    let state = state();
    let auth = bearer(&state, &["owner"]);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/blog/posts")
        .insert_header(auth.clone())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/blog/posts/{}", created["id"].as_str().unwrap());

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&uri).insert_header(auth.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("{uri}/visibility"))
        .insert_header(auth)
        .to_request();
    let toggled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(toggled["is_visible"], true);

    let listed: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/blog/posts").to_request())
            .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_writes_need_a_token_and_the_right_role() {
    let state = state();
    let reader = bearer(&state, &["user"]);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/blog/posts").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/blog/posts")
            .insert_header(reader)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Access Denied");
}

#[actix_web::test]
async fn test_delete_unknown_posts_conflicts() {
    let state = state();
    let auth = bearer(&state, &["manageBlog"]);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/blog/posts/delete")
        .insert_header(auth)
        .set_json(json!({ "post_ids": [Uuid::new_v4()] }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_invalid_tag_filter_is_rejected() {
    let app = app!(state());
    let req = test::TestRequest::get()
        .uri("/api/blog/posts?tags=nope")
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_settings_round_trip() {
    let state = state();
    let owner = bearer(&state, &["owner"]);
    let manager = bearer(&state, &["manageBlog"]);
    let app = app!(state);

    let before: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/blog/settings").to_request(),
    )
    .await;
    assert!(before["default_tag"].is_null());

    let req = test::TestRequest::put()
        .uri("/api/blog/settings")
        .insert_header(manager)
        .set_json(json!({ "default_tag": "news" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri("/api/blog/settings")
        .insert_header(owner)
        .set_json(json!({ "default_tag": "news" }))
        .to_request();
    let saved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved["default_tag"], "news");
}

#[actix_web::test]
async fn test_writes_without_shop_are_unavailable() {
    let state = AppState::in_memory(None, generous());
    let auth = bearer(&state, &["manageBlog"]);
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/blog/posts")
        .insert_header(auth)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );

    let listed: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/blog/posts").to_request())
            .await;
    assert_eq!(listed, json!([]));

    let req = test::TestRequest::get()
        .uri(&format!("/api/blog/posts/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_writes_are_rate_limited_reads_are_not() {
    let state = AppState::in_memory(Some(Uuid::new_v4()), RateLimitConfig::default());
    let auth = bearer(&state, &["manageBlog"]);
    let app = app!(state);

    let create = || {
        test::TestRequest::post()
            .uri("/api/blog/posts")
            .insert_header(auth.clone())
            .to_request()
    };

    assert_eq!(test::call_service(&app, create()).await.status(), StatusCode::CREATED);
    assert_eq!(test::call_service(&app, create()).await.status(), StatusCode::CREATED);

    let resp = test::call_service(&app, create()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));

    for _ in 0..3 {
        let req = test::TestRequest::get().uri("/api/blog/posts").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
