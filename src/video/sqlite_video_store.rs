use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP_MS,
};
use crate::video::video_models::{
    Comment, Difficulty, Reaction, Video, VideoChanges, VideoDraft, VideoFilter,
};
use crate::video::{CommentStore, VideoStore};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{
    functions::FunctionFlags,
    params, params_from_iter,
    types::{Type, Value},
    Connection, OptionalExtension, Row,
};
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::debug;
use uuid::Uuid;

const VIDEO_FK: ForeignKey = ForeignKey {
    foreign_table: "video",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// V 0
const VIDEO_TABLE_V_0: Table = Table {
    name: "video",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("embed_link", &SqlType::Text, non_null = true),
        sqlite_column!("difficulty", &SqlType::Text),
        sqlite_column!("category", &SqlType::Text),
        sqlite_column!("creator_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "views",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "likes",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "dislikes",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "avg_watch_duration",
            &SqlType::Real,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "watch_samples",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP_MS)
        ),
    ],
    unique_constraints: &[],
    indices: &[
        ("idx_video_creator", "creator_id"),
        ("idx_video_created", "created"),
    ],
};
const VIDEO_TAG_TABLE_V_0: Table = Table {
    name: "video_tag",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "video_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&VIDEO_FK)
        ),
        sqlite_column!("tag", &SqlType::Text, non_null = true),
    ],
    unique_constraints: &[&["video_id", "tag"]],
    indices: &[("idx_video_tag_tag", "tag")],
};
const COMMENT_TABLE_V_0: Table = Table {
    name: "comment",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "video_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&VIDEO_FK)
        ),
        sqlite_column!("content", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP_MS)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_comment_video", "video_id")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[VIDEO_TABLE_V_0, VIDEO_TAG_TABLE_V_0, COMMENT_TABLE_V_0],
    migration: None,
}];

const VIDEO_COLUMNS: &str = "id, title, description, embed_link, difficulty, category, creator_id, views, likes, dislikes, avg_watch_duration, created";

fn timestamp(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn video_from_row(row: &Row) -> rusqlite::Result<Video> {
    let difficulty = match row.get::<_, Option<String>>(4)? {
        None => None,
        Some(value) => Some(Difficulty::from_str(&value).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("Unknown difficulty {}", value).into(),
            )
        })?),
    };
    Ok(Video {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        embed_link: row.get(3)?,
        tags: Vec::new(),
        difficulty,
        category: row.get(5)?,
        creator: row.get::<_, i64>(6)? as usize,
        views: row.get::<_, i64>(7)? as u64,
        likes: row.get::<_, i64>(8)? as u64,
        dislikes: row.get::<_, i64>(9)? as u64,
        avg_watch_duration: row.get(10)?,
        created_at: timestamp(row.get(11)?),
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        video: row.get(1)?,
        content: row.get(2)?,
        created_at: timestamp(row.get(3)?),
    })
}

fn load_tags(conn: &Connection, videos: &mut [Video]) -> Result<()> {
    if videos.is_empty() {
        return Ok(());
    }
    let placeholders = vec!["?"; videos.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT video_id, tag FROM {} WHERE video_id IN ({}) ORDER BY id",
        VIDEO_TAG_TABLE_V_0.name, placeholders
    ))?;
    let mut tags: HashMap<String, Vec<String>> = HashMap::new();
    let rows = stmt.query_map(
        params_from_iter(videos.iter().map(|video| video.id.as_str())),
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
    )?;
    for row in rows {
        let (video_id, tag) = row?;
        tags.entry(video_id).or_default().push(tag);
    }
    for video in videos.iter_mut() {
        video.tags = tags.remove(&video.id).unwrap_or_default();
    }
    Ok(())
}

fn query_videos<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Video>> {
    let mut stmt = conn.prepare(sql)?;
    let mut videos = stmt
        .query_map(params, video_from_row)?
        .collect::<Result<Vec<Video>, _>>()?;
    load_tags(conn, &mut videos)?;
    Ok(videos)
}

fn query_video(conn: &Connection, video_id: &str) -> Result<Option<Video>> {
    let videos = query_videos(
        conn,
        &format!(
            "SELECT {} FROM {} WHERE id = ?1",
            VIDEO_COLUMNS, VIDEO_TABLE_V_0.name
        ),
        params![video_id],
    )?;
    Ok(videos.into_iter().next())
}

fn insert_tags(conn: &Connection, video_id: &str, tags: &[String]) -> Result<()> {
    let mut stmt = conn.prepare(&format!(
        "INSERT OR IGNORE INTO {} (video_id, tag) VALUES (?1, ?2)",
        VIDEO_TAG_TABLE_V_0.name
    ))?;
    for tag in tags {
        stmt.execute(params![video_id, tag])?;
    }
    Ok(())
}

/// SQLite's `lower()` only folds ASCII, title search needs full Unicode
/// case folding.
fn register_unicode_lower(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )
    .context("Failed to register unicode_lower")
}

pub struct SqliteVideoStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteVideoStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        register_unicode_lower(&conn)?;
        Ok(SqliteVideoStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Video db connection lock poisoned"))
    }
}

impl VideoStore for SqliteVideoStore {
    fn create_video(&self, creator: usize, draft: &VideoDraft) -> Result<Video> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let id = Uuid::new_v4().to_string();
        let created = Utc::now().timestamp_millis();
        tx.execute(
            &format!(
                "INSERT INTO {} (id, title, description, embed_link, difficulty, category, creator_id, created) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                VIDEO_TABLE_V_0.name
            ),
            params![
                id,
                draft.title,
                draft.description,
                draft.embed_link,
                draft.difficulty.map(Difficulty::as_str),
                draft.category,
                creator as i64,
                created
            ],
        )?;
        insert_tags(&tx, &id, &draft.tags)?;
        tx.commit()
            .with_context(|| format!("Failed to create video {}", draft.title))?;
        debug!("Created video {} for creator {}", id, creator);

        Ok(Video {
            id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            embed_link: draft.embed_link.clone(),
            tags: draft.tags.clone(),
            difficulty: draft.difficulty,
            category: draft.category.clone(),
            creator,
            views: 0,
            likes: 0,
            dislikes: 0,
            avg_watch_duration: 0.0,
            created_at: timestamp(created),
        })
    }

    fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let conn = self.lock()?;
        query_video(&conn, video_id)
    }

    fn get_videos(&self, video_ids: &[String]) -> Result<Vec<Video>> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        let placeholders = vec!["?"; video_ids.len()].join(", ");
        query_videos(
            &conn,
            &format!(
                "SELECT {} FROM {} WHERE id IN ({})",
                VIDEO_COLUMNS, VIDEO_TABLE_V_0.name, placeholders
            ),
            params_from_iter(video_ids.iter()),
        )
    }

    fn list_videos(
        &self,
        filter: &VideoFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<Video>, u64)> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(tag) = &filter.tag {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM {} t WHERE t.video_id = {}.id AND t.tag = ?)",
                VIDEO_TAG_TABLE_V_0.name, VIDEO_TABLE_V_0.name
            ));
            values.push(Value::Text(tag.clone()));
        }
        if let Some(category) = &filter.category {
            clauses.push("category = ?".to_string());
            values.push(Value::Text(category.clone()));
        }
        if let Some(difficulty) = filter.difficulty {
            clauses.push("difficulty = ?".to_string());
            values.push(Value::Text(difficulty.as_str().to_string()));
        }
        if let Some(search) = &filter.search {
            clauses.push("instr(unicode_lower(title), ?) > 0".to_string());
            values.push(Value::Text(search.to_lowercase()));
        }
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let conn = self.lock()?;
        let total = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}{}", VIDEO_TABLE_V_0.name, where_sql),
            params_from_iter(values.iter()),
            |row| row.get::<_, i64>(0),
        )? as u64;

        let (offset, limit) = match (i64::try_from(offset), i64::try_from(limit)) {
            (Ok(offset), Ok(limit)) if (offset as u64) < total => (offset, limit),
            _ => return Ok((vec![], total)),
        };
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));
        let videos = query_videos(
            &conn,
            &format!(
                "SELECT {} FROM {}{} ORDER BY created DESC, rowid DESC LIMIT ? OFFSET ?",
                VIDEO_COLUMNS, VIDEO_TABLE_V_0.name, where_sql
            ),
            params_from_iter(values.iter()),
        )?;

        Ok((videos, total))
    }

    fn get_creator_videos(&self, creator: usize) -> Result<Vec<Video>> {
        let conn = self.lock()?;
        query_videos(
            &conn,
            &format!(
                "SELECT {} FROM {} WHERE creator_id = ?1 ORDER BY created DESC, rowid DESC",
                VIDEO_COLUMNS, VIDEO_TABLE_V_0.name
            ),
            params![creator as i64],
        )
    }

    fn update_video(&self, video_id: &str, changes: &VideoChanges) -> Result<Option<Video>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let updated = tx.execute(
            &format!(
                "UPDATE {} SET title = COALESCE(?1, title), description = COALESCE(?2, description), embed_link = COALESCE(?3, embed_link), difficulty = COALESCE(?4, difficulty), category = COALESCE(?5, category) WHERE id = ?6",
                VIDEO_TABLE_V_0.name
            ),
            params![
                changes.title,
                changes.description,
                changes.embed_link,
                changes.difficulty.map(Difficulty::as_str),
                changes.category,
                video_id
            ],
        )?;
        if updated == 0 {
            return Ok(None);
        }

        if let Some(tags) = &changes.tags {
            tx.execute(
                &format!(
                    "DELETE FROM {} WHERE video_id = ?1",
                    VIDEO_TAG_TABLE_V_0.name
                ),
                params![video_id],
            )?;
            insert_tags(&tx, video_id, tags)?;
        }

        let video = query_video(&tx, video_id)?;
        tx.commit()
            .with_context(|| format!("Failed to update video {}", video_id))?;
        Ok(video)
    }

    fn delete_video(&self, video_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", VIDEO_TABLE_V_0.name),
            params![video_id],
        )?;
        Ok(deleted > 0)
    }

    fn add_reaction(&self, video_id: &str, reaction: Reaction) -> Result<Option<Video>> {
        let column = match reaction {
            Reaction::Like => "likes",
            Reaction::Dislike => "dislikes",
        };
        let conn = self.lock()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET {} = {} + 1 WHERE id = ?1",
                VIDEO_TABLE_V_0.name, column, column
            ),
            params![video_id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        query_video(&conn, video_id)
    }

    fn record_view(&self, video_id: &str, duration: Option<f64>) -> Result<Option<Video>> {
        let conn = self.lock()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET views = views + 1, \
                 avg_watch_duration = CASE WHEN ?2 IS NULL THEN avg_watch_duration \
                 ELSE (avg_watch_duration * watch_samples + ?2) / (watch_samples + 1) END, \
                 watch_samples = CASE WHEN ?2 IS NULL THEN watch_samples ELSE watch_samples + 1 END \
                 WHERE id = ?1",
                VIDEO_TABLE_V_0.name
            ),
            params![video_id, duration],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        query_video(&conn, video_id)
    }

    fn get_tags(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT tag FROM {} ORDER BY tag",
            VIDEO_TAG_TABLE_V_0.name
        ))?;
        let tags = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }

    fn get_categories(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT category FROM {} WHERE category IS NOT NULL ORDER BY category",
            VIDEO_TABLE_V_0.name
        ))?;
        let categories = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(categories)
    }
}

impl CommentStore for SqliteVideoStore {
    fn add_comment(&self, video_id: &str, content: &str) -> Result<Option<Comment>> {
        let conn = self.lock()?;
        let video_exists = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", VIDEO_TABLE_V_0.name),
                params![video_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !video_exists {
            return Ok(None);
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            video: video_id.to_string(),
            content: content.to_string(),
            created_at: timestamp(Utc::now().timestamp_millis()),
        };
        conn.execute(
            &format!(
                "INSERT INTO {} (id, video_id, content, created) VALUES (?1, ?2, ?3, ?4)",
                COMMENT_TABLE_V_0.name
            ),
            params![
                comment.id,
                comment.video,
                comment.content,
                comment.created_at.timestamp_millis()
            ],
        )?;
        Ok(Some(comment))
    }

    fn get_comments(&self, video_id: &str) -> Result<Vec<Comment>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, video_id, content, created FROM {} WHERE video_id = ?1 ORDER BY created DESC, rowid DESC",
            COMMENT_TABLE_V_0.name
        ))?;
        let comments = stmt
            .query_map(params![video_id], comment_from_row)?
            .collect::<Result<Vec<Comment>, _>>()?;
        Ok(comments)
    }
}
