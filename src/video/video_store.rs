use super::video_models::{Comment, Reaction, Video, VideoChanges, VideoDraft, VideoFilter};
use anyhow::Result;

pub trait VideoStore: Send + Sync {
    /// Persists a new video owned by `creator` with zeroed counters.
    fn create_video(&self, creator: usize, draft: &VideoDraft) -> Result<Video>;

    /// Returns Ok(None) if the video does not exist.
    fn get_video(&self, video_id: &str) -> Result<Option<Video>>;

    /// Returns the videos with the given ids that exist, in no particular order.
    fn get_videos(&self, video_ids: &[String]) -> Result<Vec<Video>>;

    /// Returns one page of the videos matching `filter`, newest first,
    /// together with the total number of matching videos.
    fn list_videos(
        &self,
        filter: &VideoFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Video>, u64)>;

    /// Returns all videos of a creator, newest first.
    fn get_creator_videos(&self, creator: usize) -> Result<Vec<Video>>;

    /// Applies the given changes, returns Ok(None) if the video does not exist.
    fn update_video(&self, video_id: &str, changes: &VideoChanges) -> Result<Option<Video>>;

    /// Deletes a video and its comments. Returns false if it did not exist.
    fn delete_video(&self, video_id: &str) -> Result<bool>;

    /// Increments the reaction counter in a single statement and returns the
    /// updated video, or Ok(None) if it does not exist.
    fn add_reaction(&self, video_id: &str, reaction: Reaction) -> Result<Option<Video>>;

    /// Increments the view counter, folding the optional watch duration into
    /// the average, and returns the updated video.
    fn record_view(&self, video_id: &str, duration: Option<f64>) -> Result<Option<Video>>;

    /// Distinct tags across all videos, sorted.
    fn get_tags(&self) -> Result<Vec<String>>;

    /// Distinct categories across all videos, sorted.
    fn get_categories(&self) -> Result<Vec<String>>;
}

pub trait CommentStore: Send + Sync {
    /// Adds a comment to a video.
    /// Returns Ok(None) if the video does not exist.
    fn add_comment(&self, video_id: &str, content: &str) -> Result<Option<Comment>>;

    /// Returns the comments of a video, most recent first.
    fn get_comments(&self, video_id: &str) -> Result<Vec<Comment>>;
}

/// Combined trait for the catalog storage
pub trait FullVideoStore: VideoStore + CommentStore {}

impl<T: VideoStore + CommentStore> FullVideoStore for T {}
