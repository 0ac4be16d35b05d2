use super::access::AccessPolicy;
use super::state::{GuardedVideoManager, ServerState};
use crate::error::ServiceError;
use crate::user::VIEWER_ONLY;
use crate::video::{Comment, NewComment};

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

async fn post_comment(
    State(videos): State<GuardedVideoManager>,
    Json(body): Json<NewComment>,
) -> Result<Json<Comment>, ServiceError> {
    Ok(Json(videos.add_comment(body)?))
}

async fn get_comments(
    State(videos): State<GuardedVideoManager>,
    Path(video_id): Path<String>,
) -> Result<Json<Vec<Comment>>, ServiceError> {
    Ok(Json(videos.comments(&video_id)?))
}

pub fn comment_routes(state: &ServerState) -> Router<ServerState> {
    let viewer_only = AccessPolicy::new(state.tokens.clone(), VIEWER_ONLY)
        .guard(Router::new().route("/", post(post_comment)));

    Router::new()
        .route("/{video_id}", get(get_comments))
        .merge(viewer_only)
}
