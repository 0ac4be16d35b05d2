use anyhow::{Context, Result};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, info};

use crate::error::ServiceError;
use crate::user::{
    LoginRequest, RegisterRequest, TokenService, User, UserManager, UserStore, ANY_ROLE,
};
use crate::video::{FullVideoStore, VideoManager};

use axum::{
    extract::{Request, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router, ServiceExt,
};
use serde::Serialize;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use super::access::AccessPolicy;
use super::comment_routes::comment_routes;
use super::metrics::record_auth_attempt;
use super::session::Session;
use super::video_routes::video_routes;
use super::watch_later_routes::{watch_history_routes, watch_later_routes};
use super::{cors_layer, log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Serialize)]
struct RegisterResponse {
    message: &'static str,
    token: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn register(
    State(users): State<GuardedUserManager>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ServiceError> {
    let result = users.register(&body);
    record_auth_attempt("register", result.is_ok());
    Ok(Json(RegisterResponse {
        message: "User Created Successfully",
        token: result?,
    }))
}

async fn login(
    State(users): State<GuardedUserManager>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    debug!("login() called for {}", body.email);
    let result = users.login(&body);
    record_auth_attempt("login", result.is_ok());
    Ok(Json(LoginResponse { token: result? }))
}

async fn me(
    session: Session,
    State(users): State<GuardedUserManager>,
) -> Result<Json<User>, ServiceError> {
    Ok(Json(users.get_user(session.user_id)?))
}

fn auth_routes(state: &ServerState) -> Router<ServerState> {
    let authenticated = AccessPolicy::new(state.tokens.clone(), ANY_ROLE)
        .guard(Router::new().route("/me", get(me)));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(authenticated)
}

/// The router behind trailing-slash trimming, which has to run before
/// routing.
pub type App = NormalizePath<Router>;

pub fn make_app(
    config: ServerConfig,
    user_store: Arc<dyn UserStore>,
    video_store: Arc<dyn FullVideoStore>,
    tokens: TokenService,
) -> Result<App> {
    let user_manager = UserManager::new(user_store.clone(), tokens.clone());
    let video_manager = VideoManager::new(video_store, user_store);
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        user_manager: Arc::new(user_manager),
        video_manager: Arc::new(video_manager),
        tokens,
    };

    let app: Router = Router::new()
        .route("/", get(home))
        .nest("/api/auth", auth_routes(&state))
        .nest("/api/videos", video_routes(&state))
        .nest("/api/comments", comment_routes(&state))
        .nest("/api/watch-later", watch_later_routes(&state))
        .nest("/api/watch-history", watch_history_routes(&state))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(cors_layer(&config.frontend_url)?)
        .with_state(state);

    Ok(NormalizePathLayer::trim_trailing_slash().layer(app))
}

pub async fn run_server(
    config: ServerConfig,
    user_store: Arc<dyn UserStore>,
    video_store: Arc<dyn FullVideoStore>,
    tokens: TokenService,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, user_store, video_store, tokens)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Server running on port {}", port);

    Ok(axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?)
}
