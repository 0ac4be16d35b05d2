use super::access::AccessPolicy;
use super::session::Session;
use super::state::{GuardedVideoManager, ServerState};
use crate::error::ServiceError;
use crate::user::VIEWER_ONLY;
use crate::video::ResolvedVideo;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

async fn add_to_watch_later(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Path(video_id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    videos.add_to_watch_later(&session.subject(), &video_id)?;
    Ok(Json(json!({ "msg": "Video added to Watch Later" })))
}

async fn remove_from_watch_later(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Path(video_id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    videos.remove_from_watch_later(&session.subject(), &video_id)?;
    Ok(Json(json!({ "msg": "Video removed from Watch Later" })))
}

async fn get_watch_later(
    session: Session,
    State(videos): State<GuardedVideoManager>,
) -> Result<Json<Vec<ResolvedVideo>>, ServiceError> {
    Ok(Json(videos.watch_later(&session.subject())?))
}

async fn get_watch_history(
    session: Session,
    State(videos): State<GuardedVideoManager>,
) -> Result<Json<Vec<ResolvedVideo>>, ServiceError> {
    Ok(Json(videos.watch_history(&session.subject())?))
}

pub fn watch_later_routes(state: &ServerState) -> Router<ServerState> {
    AccessPolicy::new(state.tokens.clone(), VIEWER_ONLY).guard(
        Router::new().route("/", get(get_watch_later)).route(
            "/{video_id}",
            axum::routing::post(add_to_watch_later).delete(remove_from_watch_later),
        ),
    )
}

pub fn watch_history_routes(state: &ServerState) -> Router<ServerState> {
    AccessPolicy::new(state.tokens.clone(), VIEWER_ONLY)
        .guard(Router::new().route("/", get(get_watch_history)))
}
