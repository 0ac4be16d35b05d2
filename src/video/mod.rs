pub mod ownership;
mod sqlite_video_store;
mod video_manager;
pub mod video_models;
mod video_store;

pub use sqlite_video_store::SqliteVideoStore;
pub use video_manager::{VideoManager, USER_NOT_FOUND, VIDEO_NOT_FOUND};
pub use video_models::{
    Comment, CreatorVideos, Difficulty, ListQuery, NewComment, NewVideo, Reaction, ResolvedVideo,
    Video, VideoPage, VideoUpdate, ViewQuery,
};
pub use video_store::{CommentStore, FullVideoStore, VideoStore};
