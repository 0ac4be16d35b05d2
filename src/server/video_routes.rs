use super::access::AccessPolicy;
use super::metrics::record_video_engagement;
use super::session::Session;
use super::state::{GuardedVideoManager, ServerState};
use crate::error::ServiceError;
use crate::user::{CREATOR_ONLY, CREATOR_OR_ADMIN, VIEWER_ONLY};
use crate::video::{
    CreatorVideos, ListQuery, NewVideo, Reaction, Video, VideoPage, VideoUpdate, ViewQuery,
};

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

async fn create_video(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Json(body): Json<NewVideo>,
) -> Result<Json<Video>, ServiceError> {
    Ok(Json(videos.create_video(&session.subject(), body)?))
}

async fn list_videos(
    State(videos): State<GuardedVideoManager>,
    Query(query): Query<ListQuery>,
) -> Result<Json<VideoPage>, ServiceError> {
    Ok(Json(videos.list_videos(&query)?))
}

async fn get_creator_videos(
    session: Session,
    State(videos): State<GuardedVideoManager>,
) -> Result<Json<CreatorVideos>, ServiceError> {
    Ok(Json(videos.creator_videos(&session.subject())?))
}

async fn get_tags(
    State(videos): State<GuardedVideoManager>,
) -> Result<Json<Vec<String>>, ServiceError> {
    Ok(Json(videos.tags()?))
}

async fn get_categories(
    State(videos): State<GuardedVideoManager>,
) -> Result<Json<Vec<String>>, ServiceError> {
    Ok(Json(videos.categories()?))
}

/// Responds with `null` for unknown ids.
async fn get_video(
    State(videos): State<GuardedVideoManager>,
    Path(id): Path<String>,
) -> Result<Json<Option<Video>>, ServiceError> {
    Ok(Json(videos.get_video(&id)?))
}

async fn update_video(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Path(id): Path<String>,
    Json(body): Json<VideoUpdate>,
) -> Result<Json<Video>, ServiceError> {
    Ok(Json(videos.update_video(&session.subject(), &id, body)?))
}

async fn delete_video(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    videos.delete_video(&session.subject(), &id)?;
    Ok(Json(json!({ "msg": "Video deleted" })))
}

fn react(
    session: Session,
    videos: &GuardedVideoManager,
    id: &str,
    reaction: Reaction,
) -> Result<Json<Video>, ServiceError> {
    let video = videos.react(&session.subject(), id, reaction)?;
    record_video_engagement(reaction.as_str());
    Ok(Json(video))
}

async fn like_video(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Path(id): Path<String>,
) -> Result<Json<Video>, ServiceError> {
    react(session, &videos, &id, Reaction::Like)
}

async fn dislike_video(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Path(id): Path<String>,
) -> Result<Json<Video>, ServiceError> {
    react(session, &videos, &id, Reaction::Dislike)
}

async fn view_video(
    session: Session,
    State(videos): State<GuardedVideoManager>,
    Path(id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Video>, ServiceError> {
    let video = videos.view(&session.subject(), &id, query.duration)?;
    record_video_engagement("view");
    Ok(Json(video))
}

pub fn video_routes(state: &ServerState) -> Router<ServerState> {
    let public = Router::new()
        .route("/", get(list_videos))
        .route("/tags", get(get_tags))
        .route("/categories", get(get_categories))
        .route("/{id}", get(get_video));

    let creator_only = AccessPolicy::new(state.tokens.clone(), CREATOR_ONLY).guard(
        Router::new()
            .route("/", post(create_video))
            .route("/creator", get(get_creator_videos))
            .route("/{id}", put(update_video)),
    );

    let creator_or_admin = AccessPolicy::new(state.tokens.clone(), CREATOR_OR_ADMIN)
        .guard(Router::new().route("/{id}", delete(delete_video)));

    let viewer_only = AccessPolicy::new(state.tokens.clone(), VIEWER_ONLY).guard(
        Router::new()
            .route("/{id}/like", post(like_video))
            .route("/{id}/dislike", post(dislike_video))
            .route("/{id}/view", post(view_video)),
    );

    public
        .merge(creator_only)
        .merge(creator_or_admin)
        .merge(viewer_only)
}
