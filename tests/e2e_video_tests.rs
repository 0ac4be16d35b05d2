//! End-to-end tests for the video catalog endpoints

mod common;

use common::{
    TestClient, TestServer, CREATOR_EMAIL, RUST_VIDEO_TITLE, SAMPLE_EMBED_LINK, SQL_VIDEO_TITLE,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_video_returns_stored_video() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;

    let video = creator
        .create_sample_video(RUST_VIDEO_TITLE, &["rust", "basics"], "Beginner")
        .await;

    assert_eq!(video["title"], RUST_VIDEO_TITLE);
    assert_eq!(video["embedLink"], SAMPLE_EMBED_LINK);
    assert_eq!(video["difficulty"], "Beginner");
    assert_eq!(video["tags"], json!(["rust", "basics"]));
    assert_eq!(video["views"], 0);
    assert_eq!(video["likes"], 0);
    assert_eq!(video["dislikes"], 0);
    assert_eq!(video["avgWatchDuration"], 0.0);
    assert!(video["creator"].is_number());

    let response = creator.get_video(video["id"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched["id"], video["id"]);
}

#[tokio::test]
async fn test_create_video_validation() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;

    let response = creator
        .create_video(&json!({ "title": "", "embedLink": SAMPLE_EMBED_LINK }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = creator
        .create_video(&json!({
            "title": "Bad",
            "embedLink": SAMPLE_EMBED_LINK,
            "difficulty": "Expert",
        }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_video_returns_null() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_video("does-not-exist").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn test_list_videos_resolves_creator() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    creator
        .create_sample_video(RUST_VIDEO_TITLE, &["rust"], "Beginner")
        .await;

    let response = TestClient::new(server.base_url.clone())
        .list_videos("")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 1);
    assert_eq!(body["videos"][0]["creator"]["email"], CREATOR_EMAIL);
}

#[tokio::test]
async fn test_trailing_slash_reaches_same_route() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    creator
        .create_sample_video(RUST_VIDEO_TITLE, &["rust"], "Beginner")
        .await;

    let response = creator
        .client
        .get(format!("{}/api/videos/", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_search_ignores_unicode_case() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    creator
        .create_sample_video("ÉCOLE basics", &[], "Beginner")
        .await;

    let body: Value = creator
        .list_videos("search=%C3%A9cole")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_page_far_beyond_range_is_empty() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    creator
        .create_sample_video(RUST_VIDEO_TITLE, &[], "Beginner")
        .await;

    let response = creator
        .list_videos("page=4294967295&limit=4294967295")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert!(body["videos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_videos_pagination() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    for i in 0..5 {
        creator
            .create_sample_video(&format!("Video {}", i), &[], "Beginner")
            .await;
    }
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client
        .list_videos("page=1&limit=2")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 5);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["videos"].as_array().unwrap().len(), 2);
    // Newest first
    assert_eq!(body["videos"][0]["title"], "Video 4");

    let body: Value = client
        .list_videos("page=3&limit=2")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["videos"].as_array().unwrap().len(), 1);
    assert_eq!(body["videos"][0]["title"], "Video 0");

    let body: Value = client
        .list_videos("page=10&limit=2")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 10);
    assert!(body["videos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_videos_rejects_bad_paging() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(
        client.list_videos("page=0").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        client.list_videos("limit=abc").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        client.list_videos("difficulty=Expert").await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_list_videos_filters() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    creator
        .create_sample_video(RUST_VIDEO_TITLE, &["rust", "basics"], "Beginner")
        .await;
    creator
        .create_sample_video(SQL_VIDEO_TITLE, &["sql"], "Advanced")
        .await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.list_videos("tag=sql").await.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["videos"][0]["title"], SQL_VIDEO_TITLE);

    let body: Value = client
        .list_videos("difficulty=Beginner")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["videos"][0]["title"], RUST_VIDEO_TITLE);

    let body: Value = client
        .list_videos("search=joins")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["videos"][0]["title"], SQL_VIDEO_TITLE);

    let body: Value = client
        .list_videos("category=Programming")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 2);

    let body: Value = client
        .list_videos("tag=python")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["total"], 0);
    assert_eq!(body["pages"], 0);
}

#[tokio::test]
async fn test_tags_and_categories_are_distinct() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    creator
        .create_sample_video(RUST_VIDEO_TITLE, &["rust", "basics"], "Beginner")
        .await;
    creator
        .create_sample_video(SQL_VIDEO_TITLE, &["sql", "basics"], "Advanced")
        .await;
    let client = TestClient::new(server.base_url.clone());

    let tags: Value = client.tags().await.json().await.unwrap();
    assert_eq!(tags, json!(["basics", "rust", "sql"]));

    let categories: Value = client.categories().await.json().await.unwrap();
    assert_eq!(categories, json!(["Programming"]));
}

#[tokio::test]
async fn test_creator_videos_lists_only_own() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    let other =
        TestClient::registered(server.base_url.clone(), "other@example.com", "creator").await;
    creator
        .create_sample_video(RUST_VIDEO_TITLE, &[], "Beginner")
        .await;
    other
        .create_sample_video(SQL_VIDEO_TITLE, &[], "Advanced")
        .await;

    let response = creator.creator_videos().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["title"], RUST_VIDEO_TITLE);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    let video = creator
        .create_sample_video(RUST_VIDEO_TITLE, &["rust"], "Beginner")
        .await;

    let response = creator
        .update_video(
            video["id"].as_str().unwrap(),
            &json!({ "difficulty": "Intermediate", "tags": ["rust", "traits"] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["title"], RUST_VIDEO_TITLE);
    assert_eq!(updated["difficulty"], "Intermediate");
    assert_eq!(updated["tags"], json!(["rust", "traits"]));
}

#[tokio::test]
async fn test_owner_can_delete_video() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    let video = creator
        .create_sample_video(RUST_VIDEO_TITLE, &[], "Beginner")
        .await;

    let response = creator.delete_video(video["id"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = creator.list_videos("").await.json().await.unwrap();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_reactions_and_views_count() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    let viewer = TestClient::viewer(server.base_url.clone()).await;
    let video = creator
        .create_sample_video(RUST_VIDEO_TITLE, &[], "Beginner")
        .await;
    let video_id = video["id"].as_str().unwrap();

    viewer.like_video(video_id).await;
    let response = viewer.dislike_video(video_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["likes"], 1);
    assert_eq!(body["dislikes"], 1);

    viewer.view_video(video_id, Some(30.0)).await;
    let response = viewer.view_video(video_id, Some(60.0)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["views"], 2);
    assert_eq!(body["avgWatchDuration"], 45.0);

    let response = viewer.view_video(video_id, None).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["views"], 3);
    assert_eq!(body["avgWatchDuration"], 45.0);
}

#[tokio::test]
async fn test_view_rejects_negative_duration() {
    let server = TestServer::spawn().await;
    let creator = TestClient::creator(server.base_url.clone()).await;
    let viewer = TestClient::viewer(server.base_url.clone()).await;
    let video = creator
        .create_sample_video(RUST_VIDEO_TITLE, &[], "Beginner")
        .await;

    let response = viewer
        .view_video(video["id"].as_str().unwrap(), Some(-5.0))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
