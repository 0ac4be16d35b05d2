use super::{
    ownership::{self, VideoAction},
    video_models::{
        Comment, CreatorVideos, Difficulty, ListQuery, NewComment, NewVideo, Reaction,
        ResolvedVideo, Video, VideoChanges, VideoDraft, VideoFilter, VideoPage, VideoUpdate,
    },
    FullVideoStore,
};
use crate::error::{ServiceError, ServiceResult};
use crate::user::{Subject, UserStore, UserSummary};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

pub const VIDEO_NOT_FOUND: &str = "Video not found";
pub const USER_NOT_FOUND: &str = "User not found";

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_positive(value: &Option<String>, name: &str, default: u64) -> ServiceResult<u64> {
    match non_empty(value) {
        None => Ok(default),
        Some(value) => value
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .map(u64::from)
            .ok_or_else(|| ServiceError::Validation(format!("{} must be a positive integer", name))),
    }
}

fn parse_difficulty(value: &Option<String>) -> ServiceResult<Option<Difficulty>> {
    match non_empty(value) {
        None => Ok(None),
        Some(value) => Difficulty::from_str(&value)
            .map(Some)
            .ok_or_else(|| ServiceError::Validation(format!("Invalid difficulty {}", value))),
    }
}

/// Trims tags, drops empty ones and collapses duplicates keeping the first
/// occurrence.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

fn required(value: &str, what: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", what)));
    }
    Ok(value.to_string())
}

pub struct VideoManager {
    video_store: Arc<dyn FullVideoStore>,
    user_store: Arc<dyn UserStore>,
}

impl VideoManager {
    pub fn new(video_store: Arc<dyn FullVideoStore>, user_store: Arc<dyn UserStore>) -> Self {
        Self {
            video_store,
            user_store,
        }
    }

    fn load_video(&self, video_id: &str) -> ServiceResult<Video> {
        self.video_store
            .get_video(video_id)?
            .ok_or(ServiceError::NotFound(VIDEO_NOT_FOUND))
    }

    fn ensure_user(&self, user_id: usize) -> ServiceResult<()> {
        match self.user_store.get_user(user_id)? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(USER_NOT_FOUND)),
        }
    }

    /// Joins each video's creator id with the creator's email.
    fn resolve(&self, videos: Vec<Video>) -> ServiceResult<Vec<ResolvedVideo>> {
        let mut creator_ids: Vec<usize> = videos.iter().map(|v| v.creator).collect();
        creator_ids.sort_unstable();
        creator_ids.dedup();
        let emails = self.user_store.get_user_emails(&creator_ids)?;

        Ok(videos
            .into_iter()
            .map(|video| {
                let creator = emails.get(&video.creator).map(|email| UserSummary {
                    id: video.creator,
                    email: email.clone(),
                });
                video.with_creator(creator)
            })
            .collect())
    }

    /// Resolves videos by id keeping the order of `video_ids`, ids of videos
    /// that no longer exist are skipped.
    fn resolve_ids(&self, video_ids: Vec<String>) -> ServiceResult<Vec<ResolvedVideo>> {
        let mut by_id: HashMap<String, Video> = self
            .video_store
            .get_videos(&video_ids)?
            .into_iter()
            .map(|video| (video.id.clone(), video))
            .collect();
        let ordered = video_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        self.resolve(ordered)
    }

    pub fn create_video(&self, actor: &Subject, new_video: NewVideo) -> ServiceResult<Video> {
        let draft = VideoDraft {
            title: required(&new_video.title, "Title")?,
            description: new_video.description,
            embed_link: required(&new_video.embed_link, "Embed link")?,
            tags: normalize_tags(new_video.tags),
            difficulty: parse_difficulty(&new_video.difficulty)?,
            category: non_empty(&new_video.category),
        };
        self.ensure_user(actor.user_id)?;

        let video = self.video_store.create_video(actor.user_id, &draft)?;
        info!("User {} created video {}", actor.user_id, video.id);
        Ok(video)
    }

    pub fn list_videos(&self, query: &ListQuery) -> ServiceResult<VideoPage> {
        let page = parse_positive(&query.page, "page", DEFAULT_PAGE)?;
        let limit = parse_positive(&query.limit, "limit", DEFAULT_LIMIT)?;
        let filter = VideoFilter {
            tag: non_empty(&query.tag),
            category: non_empty(&query.category),
            difficulty: parse_difficulty(&query.difficulty)?,
            search: non_empty(&query.search),
        };

        let offset = (page - 1).checked_mul(limit).unwrap_or(u64::MAX);
        let (videos, total) = self.video_store.list_videos(&filter, offset, limit)?;
        Ok(VideoPage {
            videos: self.resolve(videos)?,
            total,
            page,
            pages: total.div_ceil(limit),
        })
    }

    pub fn creator_videos(&self, actor: &Subject) -> ServiceResult<CreatorVideos> {
        let videos = self.video_store.get_creator_videos(actor.user_id)?;
        Ok(CreatorVideos {
            videos: self.resolve(videos)?,
        })
    }

    pub fn tags(&self) -> ServiceResult<Vec<String>> {
        Ok(self.video_store.get_tags()?)
    }

    pub fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.video_store.get_categories()?)
    }

    pub fn get_video(&self, video_id: &str) -> ServiceResult<Option<Video>> {
        Ok(self.video_store.get_video(video_id)?)
    }

    pub fn update_video(
        &self,
        actor: &Subject,
        video_id: &str,
        update: VideoUpdate,
    ) -> ServiceResult<Video> {
        let video = self.load_video(video_id)?;
        ownership::check(VideoAction::Update, actor, video.creator)?;

        let changes = VideoChanges {
            title: update.title.as_deref().map(|t| required(t, "Title")).transpose()?,
            description: update.description,
            embed_link: update
                .embed_link
                .as_deref()
                .map(|l| required(l, "Embed link"))
                .transpose()?,
            tags: update.tags.map(normalize_tags),
            difficulty: parse_difficulty(&update.difficulty)?,
            category: non_empty(&update.category),
        };
        let updated = self
            .video_store
            .update_video(video_id, &changes)?
            .ok_or(ServiceError::NotFound(VIDEO_NOT_FOUND))?;
        debug!("User {} updated video {}", actor.user_id, video_id);
        Ok(updated)
    }

    pub fn delete_video(&self, actor: &Subject, video_id: &str) -> ServiceResult<()> {
        let video = self.load_video(video_id)?;
        ownership::check(VideoAction::Delete, actor, video.creator)?;

        if !self.video_store.delete_video(video_id)? {
            return Err(ServiceError::NotFound(VIDEO_NOT_FOUND));
        }
        info!(
            "User {} ({}) deleted video {}",
            actor.user_id, actor.role, video_id
        );
        Ok(())
    }

    pub fn react(&self, actor: &Subject, video_id: &str, reaction: Reaction) -> ServiceResult<Video> {
        let video = self.load_video(video_id)?;
        ownership::check(VideoAction::React, actor, video.creator)?;

        self.video_store
            .add_reaction(video_id, reaction)?
            .ok_or(ServiceError::NotFound(VIDEO_NOT_FOUND))
    }

    /// Counts a view and moves the video to the end of the viewer's history.
    pub fn view(
        &self,
        actor: &Subject,
        video_id: &str,
        duration: Option<f64>,
    ) -> ServiceResult<Video> {
        if let Some(duration) = duration {
            if !duration.is_finite() || duration < 0.0 {
                return Err(ServiceError::Validation(
                    "duration must be a non-negative number".to_string(),
                ));
            }
        }
        let video = self.load_video(video_id)?;
        ownership::check(VideoAction::React, actor, video.creator)?;
        self.ensure_user(actor.user_id)?;

        let video = self
            .video_store
            .record_view(video_id, duration)?
            .ok_or(ServiceError::NotFound(VIDEO_NOT_FOUND))?;
        self.user_store.record_watch(actor.user_id, video_id)?;
        Ok(video)
    }

    pub fn add_comment(&self, new_comment: NewComment) -> ServiceResult<Comment> {
        let video_id = required(&new_comment.video, "Video")?;
        let content = required(&new_comment.content, "Content")?;

        self.video_store
            .add_comment(&video_id, &content)?
            .ok_or(ServiceError::NotFound(VIDEO_NOT_FOUND))
    }

    pub fn comments(&self, video_id: &str) -> ServiceResult<Vec<Comment>> {
        Ok(self.video_store.get_comments(video_id)?)
    }

    pub fn add_to_watch_later(&self, actor: &Subject, video_id: &str) -> ServiceResult<()> {
        self.load_video(video_id)?;
        self.ensure_user(actor.user_id)?;

        if !self.user_store.add_to_watch_later(actor.user_id, video_id)? {
            debug!(
                "Video {} already in watch later of user {}",
                video_id, actor.user_id
            );
        }
        Ok(())
    }

    pub fn remove_from_watch_later(&self, actor: &Subject, video_id: &str) -> ServiceResult<()> {
        self.ensure_user(actor.user_id)?;
        self.user_store
            .remove_from_watch_later(actor.user_id, video_id)?;
        Ok(())
    }

    pub fn watch_later(&self, actor: &Subject) -> ServiceResult<Vec<ResolvedVideo>> {
        self.ensure_user(actor.user_id)?;
        let video_ids = self.user_store.get_watch_later(actor.user_id)?;
        self.resolve_ids(video_ids)
    }

    pub fn watch_history(&self, actor: &Subject) -> ServiceResult<Vec<ResolvedVideo>> {
        self.ensure_user(actor.user_id)?;
        let video_ids = self.user_store.get_watch_history(actor.user_id)?;
        self.resolve_ids(video_ids)
    }
}
