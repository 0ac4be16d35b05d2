use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vidshare_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_FRONTEND_URL, DEFAULT_METRICS_PORT, DEFAULT_PORT,
    DEFAULT_TOKEN_TTL_SECS,
};
use vidshare_server::server::metrics::{init_metrics, run_metrics_server};
use vidshare_server::{run_server, RequestsLoggingLevel, SqliteUserStore, SqliteVideoStore};
use vidshare_server::TokenService;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding user.db and video.db.
    #[clap(long, env = "DB_DIR", value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Secret used to sign and verify access tokens.
    #[clap(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, env = "METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// The only origin allowed to make cross-origin requests.
    #[clap(long, env = "FRONTEND_URL", default_value = DEFAULT_FRONTEND_URL)]
    pub frontend_url: String,

    /// Lifetime of issued tokens, in seconds.
    #[clap(long, env = "TOKEN_TTL_SECS", default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    pub token_ttl_secs: u64,

    /// The level of logging to perform on each request.
    #[clap(long, env = "LOGGING_LEVEL", default_value = "path")]
    pub logging_level: RequestsLoggingLevel,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            jwt_secret: self.jwt_secret.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            frontend_url: self.frontend_url.clone(),
            token_ttl_secs: self.token_ttl_secs,
            logging_level: self.logging_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening user database at {:?}...", config.user_db_path());
    let user_store = Arc::new(SqliteUserStore::new(config.user_db_path())?);
    info!("Opening video database at {:?}...", config.video_db_path());
    let video_store = Arc::new(SqliteVideoStore::new(config.video_db_path())?);

    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);

    info!("Initializing metrics...");
    init_metrics();
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(err) = run_metrics_server(metrics_port).await {
            error!("Metrics server stopped: {:?}", err);
        }
    });

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);
    run_server(config.server_config(), user_store, video_store, tokens).await
}
