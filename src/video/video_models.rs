//! Video catalog models

use crate::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Beginner" => Some(Difficulty::Beginner),
            "Intermediate" => Some(Difficulty::Intermediate),
            "Advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

/// A catalog entry. `C` is the creator reference: the creator's user id
/// as stored, or a summary of the creator once resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video<C = usize> {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub embed_link: String,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
    pub creator: C,
    pub views: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub avg_watch_duration: f64,
    pub created_at: DateTime<Utc>,
}

/// Creator is `None` when the account no longer resolves.
pub type ResolvedVideo = Video<Option<UserSummary>>;

impl Video {
    pub fn with_creator<D>(self, creator: D) -> Video<D> {
        Video {
            id: self.id,
            title: self.title,
            description: self.description,
            embed_link: self.embed_link,
            tags: self.tags,
            difficulty: self.difficulty,
            category: self.category,
            creator,
            views: self.views,
            likes: self.likes,
            dislikes: self.dislikes,
            avg_watch_duration: self.avg_watch_duration,
            created_at: self.created_at,
        }
    }
}

/// Body of a video creation request, checked by the manager before it
/// becomes a [VideoDraft].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub embed_link: String,
    pub tags: Vec<String>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

/// Partial update body; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub embed_link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoDraft {
    pub title: String,
    pub description: Option<String>,
    pub embed_link: String,
    pub tags: Vec<String>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub embed_link: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<Difficulty>,
    pub category: Option<String>,
}

/// Raw listing query string. Values are parsed by the manager so that bad
/// input is reported like any other validation error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoFilter {
    pub tag: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive title substring.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoPage {
    pub videos: Vec<ResolvedVideo>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatorVideos {
    pub videos: Vec<ResolvedVideo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    pub fn as_str(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    /// Seconds watched, folded into the video's average watch duration.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub video: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewComment {
    pub video: String,
    pub content: String,
}
