use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP_MS,
};
use crate::user::auth::{PasswordCredentials, VidshareHasher};
use crate::user::user_models::User;
use crate::user::{Role, UserAuthCredentialsStore, UserStore};
use anyhow::{anyhow, Context, Result};
use chrono::DateTime;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::{
    collections::HashMap,
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::debug;

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP_MS)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_email", "email")],
};
const USER_PASSWORD_CREDENTIALS_TABLE_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP_MS)
        ),
    ],
    unique_constraints: &[],
    indices: &[],
};
const WATCH_LATER_TABLE_V_0: Table = Table {
    name: "watch_later",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("video_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP_MS)
        ),
    ],
    unique_constraints: &[&["user_id", "video_id"]],
    indices: &[("idx_watch_later_user", "user_id")],
};

/// V 1
const WATCH_HISTORY_TABLE_V_1: Table = Table {
    name: "watch_history",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("video_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "watched",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP_MS)
        ),
    ],
    unique_constraints: &[&["user_id", "video_id"]],
    indices: &[("idx_watch_history_user", "user_id")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[
            USER_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_TABLE_V_0,
            WATCH_LATER_TABLE_V_0,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            USER_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_TABLE_V_0,
            WATCH_LATER_TABLE_V_0,
            WATCH_HISTORY_TABLE_V_1,
        ],
        migration: Some(|conn: &Connection| {
            WATCH_HISTORY_TABLE_V_1.create(conn)?;
            Ok(())
        }),
    },
];

pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("User db connection lock poisoned"))
    }
}

fn parse_role(value: String) -> rusqlite::Result<Role> {
    Role::from_str(&value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("Unknown role {}", value).into(),
        )
    })
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_user_credentials(&self, email: &str) -> Result<Option<(usize, PasswordCredentials)>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT u.id, c.salt, c.hash, c.hasher FROM {} u JOIN {} c ON c.user_id = u.id WHERE u.email = ?1",
                    USER_TABLE_V_0.name, USER_PASSWORD_CREDENTIALS_TABLE_V_0.name
                ),
                params![email],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((user_id, salt, hash, hasher)) => {
                let hasher = VidshareHasher::from_str(&hasher)
                    .with_context(|| format!("Bad hasher for user {}", user_id))?;
                Ok(Some((user_id as usize, PasswordCredentials { salt, hash, hasher })))
            }
        }
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(
        &self,
        email: &str,
        role: Role,
        credentials: &PasswordCredentials,
    ) -> Result<Option<usize>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (email, role) VALUES (?1, ?2)",
                USER_TABLE_V_0.name
            ),
            params![email, role.as_str()],
        )?;
        if inserted == 0 {
            debug!("Email {} is already registered", email);
            return Ok(None);
        }
        let user_id = tx.last_insert_rowid();

        tx.execute(
            &format!(
                "INSERT INTO {} (user_id, salt, hash, hasher) VALUES (?1, ?2, ?3, ?4)",
                USER_PASSWORD_CREDENTIALS_TABLE_V_0.name
            ),
            params![
                user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string()
            ],
        )?;
        tx.commit()
            .with_context(|| format!("Failed to create user {}", email))?;

        Ok(Some(user_id as usize))
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!(
                    "SELECT id, email, role, created FROM {} WHERE id = ?1",
                    USER_TABLE_V_0.name
                ),
                params![user_id as i64],
                |row| {
                    Ok(User {
                        id: row.get::<_, i64>(0)? as usize,
                        email: row.get(1)?,
                        role: parse_role(row.get(2)?)?,
                        created_at: DateTime::from_timestamp_millis(row.get(3)?)
                            .unwrap_or_default(),
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_id(&self, email: &str) -> Result<Option<usize>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                &format!("SELECT id FROM {} WHERE email = ?1", USER_TABLE_V_0.name),
                params![email],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as usize))
    }

    fn get_user_emails(&self, user_ids: &[usize]) -> Result<HashMap<usize, String>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.lock()?;
        let placeholders = vec!["?"; user_ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT id, email FROM {} WHERE id IN ({})",
            USER_TABLE_V_0.name, placeholders
        ))?;
        let emails = stmt
            .query_map(params_from_iter(user_ids.iter().map(|id| *id as i64)), |row| {
                Ok((row.get::<_, i64>(0)? as usize, row.get::<_, String>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(emails)
    }

    fn add_to_watch_later(&self, user_id: usize, video_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (user_id, video_id) VALUES (?1, ?2)",
                WATCH_LATER_TABLE_V_0.name
            ),
            params![user_id as i64, video_id],
        )?;
        Ok(inserted > 0)
    }

    fn remove_from_watch_later(&self, user_id: usize, video_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND video_id = ?2",
                WATCH_LATER_TABLE_V_0.name
            ),
            params![user_id as i64, video_id],
        )?;
        Ok(deleted > 0)
    }

    fn get_watch_later(&self, user_id: usize) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT video_id FROM {} WHERE user_id = ?1 ORDER BY id",
            WATCH_LATER_TABLE_V_0.name
        ))?;
        let ids = stmt
            .query_map(params![user_id as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn record_watch(&self, user_id: usize, video_id: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "DELETE FROM {} WHERE user_id = ?1 AND video_id = ?2",
                WATCH_HISTORY_TABLE_V_1.name
            ),
            params![user_id as i64, video_id],
        )?;
        tx.execute(
            &format!(
                "INSERT INTO {} (user_id, video_id) VALUES (?1, ?2)",
                WATCH_HISTORY_TABLE_V_1.name
            ),
            params![user_id as i64, video_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_watch_history(&self, user_id: usize) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT video_id FROM {} WHERE user_id = ?1 ORDER BY id",
            WATCH_HISTORY_TABLE_V_1.name
        ))?;
        let ids = stmt
            .query_map(params![user_id as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
