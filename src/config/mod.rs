mod file_config;

pub use file_config::FileConfig;

use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_METRICS_PORT: u16 = 9091;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub port: u16,
    pub metrics_port: u16,
    pub frontend_url: String,
    pub token_ttl_secs: u64,
    pub logging_level: RequestsLoggingLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_dir: None,
            jwt_secret: None,
            port: DEFAULT_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            logging_level: RequestsLoggingLevel::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub jwt_secret: String,
    pub port: u16,
    pub metrics_port: u16,
    pub frontend_url: String,
    pub token_ttl: Duration,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| anyhow!("db_dir must be specified via --db-dir or in config file"))?;
        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let jwt_secret = file
            .jwt_secret
            .or_else(|| cli.jwt_secret.clone())
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                anyhow!("jwt_secret must be specified via --jwt-secret or in config file")
            })?;

        let token_ttl_secs = file.token_ttl_secs.unwrap_or(cli.token_ttl_secs);
        if token_ttl_secs == 0 {
            bail!("token_ttl_secs must be greater than zero");
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(AppConfig {
            db_dir,
            jwt_secret,
            port: file.port.unwrap_or(cli.port),
            metrics_port: file.metrics_port.unwrap_or(cli.metrics_port),
            frontend_url: file
                .frontend_url
                .unwrap_or_else(|| cli.frontend_url.clone()),
            token_ttl: Duration::from_secs(token_ttl_secs),
            logging_level,
        })
    }

    pub fn user_db_path(&self) -> PathBuf {
        self.db_dir.join("user.db")
    }

    pub fn video_db_path(&self) -> PathBuf {
        self.db_dir.join("video.db")
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            frontend_url: self.frontend_url.clone(),
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
