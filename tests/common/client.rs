//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides methods for all vidshare-server endpoints.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client carrying an optional bearer token
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when set
    pub token: Option<String>,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    pub fn with_token(base_url: String, token: String) -> Self {
        let mut client = Self::new(base_url);
        client.token = Some(token);
        client
    }

    /// Registers a new user with the given role and returns a client holding
    /// the issued token.
    ///
    /// # Panics
    ///
    /// Panics if registration fails (indicates test infrastructure problem).
    pub async fn registered(base_url: String, email: &str, role: &str) -> Self {
        let mut client = Self::new(base_url);

        let response = client.register(email, TEST_PASS, Some(role)).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Registration of {} failed",
            email
        );
        let body: Value = response.json().await.expect("Invalid register response");
        client.token = Some(
            body["token"]
                .as_str()
                .expect("Register response has no token")
                .to_string(),
        );

        client
    }

    pub async fn creator(base_url: String) -> Self {
        Self::registered(base_url, CREATOR_EMAIL, "creator").await
    }

    pub async fn viewer(base_url: String) -> Self {
        Self::registered(base_url, VIEWER_EMAIL, "viewer").await
    }

    pub async fn admin(base_url: String) -> Self {
        Self::registered(base_url, ADMIN_EMAIL, "admin").await
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Response {
        builder.send().await.expect("Request failed")
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /api/auth/register
    pub async fn register(&self, email: &str, password: &str, role: Option<&str>) -> Response {
        let mut body = json!({ "email": email, "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        self.send(self.request(reqwest::Method::POST, "/api/auth/register").json(&body))
            .await
    }

    /// POST /api/auth/login
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.send(
            self.request(reqwest::Method::POST, "/api/auth/login")
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    /// GET /api/auth/me
    pub async fn me(&self) -> Response {
        self.send(self.request(reqwest::Method::GET, "/api/auth/me"))
            .await
    }

    // ========================================================================
    // Video Endpoints
    // ========================================================================

    /// POST /api/videos
    pub async fn create_video(&self, body: &Value) -> Response {
        self.send(self.request(reqwest::Method::POST, "/api/videos").json(body))
            .await
    }

    /// Creates a video and returns its JSON, panicking on failure.
    pub async fn create_sample_video(&self, title: &str, tags: &[&str], difficulty: &str) -> Value {
        let response = self
            .create_video(&json!({
                "title": title,
                "description": format!("About {}", title),
                "embedLink": SAMPLE_EMBED_LINK,
                "tags": tags,
                "difficulty": difficulty,
                "category": "Programming",
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Invalid video response")
    }

    /// GET /api/videos?{query}
    pub async fn list_videos(&self, query: &str) -> Response {
        let path = if query.is_empty() {
            "/api/videos".to_string()
        } else {
            format!("/api/videos?{}", query)
        };
        self.send(self.request(reqwest::Method::GET, &path)).await
    }

    /// GET /api/videos/creator
    pub async fn creator_videos(&self) -> Response {
        self.send(self.request(reqwest::Method::GET, "/api/videos/creator"))
            .await
    }

    /// GET /api/videos/tags
    pub async fn tags(&self) -> Response {
        self.send(self.request(reqwest::Method::GET, "/api/videos/tags"))
            .await
    }

    /// GET /api/videos/categories
    pub async fn categories(&self) -> Response {
        self.send(self.request(reqwest::Method::GET, "/api/videos/categories"))
            .await
    }

    /// GET /api/videos/{id}
    pub async fn get_video(&self, id: &str) -> Response {
        self.send(self.request(reqwest::Method::GET, &format!("/api/videos/{}", id)))
            .await
    }

    /// PUT /api/videos/{id}
    pub async fn update_video(&self, id: &str, body: &Value) -> Response {
        self.send(
            self.request(reqwest::Method::PUT, &format!("/api/videos/{}", id))
                .json(body),
        )
        .await
    }

    /// DELETE /api/videos/{id}
    pub async fn delete_video(&self, id: &str) -> Response {
        self.send(self.request(reqwest::Method::DELETE, &format!("/api/videos/{}", id)))
            .await
    }

    /// POST /api/videos/{id}/like
    pub async fn like_video(&self, id: &str) -> Response {
        self.send(self.request(reqwest::Method::POST, &format!("/api/videos/{}/like", id)))
            .await
    }

    /// POST /api/videos/{id}/dislike
    pub async fn dislike_video(&self, id: &str) -> Response {
        self.send(self.request(
            reqwest::Method::POST,
            &format!("/api/videos/{}/dislike", id),
        ))
        .await
    }

    /// POST /api/videos/{id}/view, optionally reporting the watch duration
    pub async fn view_video(&self, id: &str, duration: Option<f64>) -> Response {
        let path = match duration {
            Some(duration) => format!("/api/videos/{}/view?duration={}", id, duration),
            None => format!("/api/videos/{}/view", id),
        };
        self.send(self.request(reqwest::Method::POST, &path)).await
    }

    // ========================================================================
    // Comment Endpoints
    // ========================================================================

    /// POST /api/comments
    pub async fn post_comment(&self, video_id: &str, content: &str) -> Response {
        self.send(
            self.request(reqwest::Method::POST, "/api/comments")
                .json(&json!({ "video": video_id, "content": content })),
        )
        .await
    }

    /// GET /api/comments/{video_id}
    pub async fn comments(&self, video_id: &str) -> Response {
        self.send(self.request(
            reqwest::Method::GET,
            &format!("/api/comments/{}", video_id),
        ))
        .await
    }

    // ========================================================================
    // Watch Later / History Endpoints
    // ========================================================================

    /// POST /api/watch-later/{video_id}
    pub async fn add_to_watch_later(&self, video_id: &str) -> Response {
        self.send(self.request(
            reqwest::Method::POST,
            &format!("/api/watch-later/{}", video_id),
        ))
        .await
    }

    /// DELETE /api/watch-later/{video_id}
    pub async fn remove_from_watch_later(&self, video_id: &str) -> Response {
        self.send(self.request(
            reqwest::Method::DELETE,
            &format!("/api/watch-later/{}", video_id),
        ))
        .await
    }

    /// GET /api/watch-later
    pub async fn watch_later(&self) -> Response {
        self.send(self.request(reqwest::Method::GET, "/api/watch-later"))
            .await
    }

    /// GET /api/watch-history
    pub async fn watch_history(&self) -> Response {
        self.send(self.request(reqwest::Method::GET, "/api/watch-history"))
            .await
    }
}
