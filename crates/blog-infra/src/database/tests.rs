use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use blog_core::ports::{
    BaseRepository, HandleFilter, HandleIndex, PostQuery, PostRepository, SettingsRepository,
};

use super::entity::{blog_settings, post, post_hashtag};
use super::postgres_repo::{PostgresPostRepository, PostgresSettingsRepository};

fn post_model(id: Uuid, handle: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id,
        shop_id: Uuid::nil(),
        title: "Test Post".to_owned(),
        page_title: None,
        keywords: Some("shoes".to_owned()),
        meta_description: None,
        annotation: None,
        body: "Content".to_owned(),
        handle: handle.to_owned(),
        is_visible: true,
        is_recommended: false,
        created_at: now.into(),
        updated_at: now.into(),
        published_at: Some(now.into()),
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

#[tokio::test]
async fn test_find_post_by_id_loads_hashtags() {
    let post_id = Uuid::new_v4();
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, "test-post")]])
        .append_query_results([vec![
            post_hashtag::Model {
                post_id,
                tag_id: first,
                position: 0,
            },
            post_hashtag::Model {
                post_id,
                tag_id: second,
                position: 1,
            },
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.handle, "test-post");
    assert_eq!(post.hashtags, vec![first, second]);
}

#[tokio::test]
async fn test_find_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_count_matches_reads_count() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[count_row(2)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let count = repo
        .count_matches(&HandleFilter::others("post", Uuid::new_v4()))
        .await
        .unwrap();

    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_delete_many_reports_rows_affected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 2,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let deleted = repo
        .delete_many(&[Uuid::new_v4(), Uuid::new_v4()])
        .await
        .unwrap();

    assert_eq!(deleted, 2);
}

#[tokio::test]
async fn test_find_attaches_hashtags_per_post() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let tag = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(a, "a"), post_model(b, "b")]])
        .append_query_results([vec![post_hashtag::Model {
            post_id: b,
            tag_id: tag,
            position: 0,
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let mut query = PostQuery::for_shop(Uuid::nil());
    query.text = Some("shoes".into());
    let posts = repo.find(&query).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts[0].hashtags.is_empty());
    assert_eq!(posts[1].hashtags, vec![tag]);
}

#[tokio::test]
async fn test_find_settings_by_shop() {
    let shop_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![blog_settings::Model {
            shop_id,
            default_tag: "news".to_owned(),
            updated_at: chrono::Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresSettingsRepository::new(db);
    let settings = repo.find_by_shop(shop_id).await.unwrap().unwrap();

    assert_eq!(settings.shop_id, shop_id);
    assert_eq!(settings.default_tag, "news");
}
