//! jobhunt server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `JOBHUNT_*` environment variables, opens the SQLite database, and serves
//! the dashboard over HTTP.
//!
//! # Salary reference data
//!
//! ```
//! cargo run -p jobhunt-web -- --seed-salaries salaries.json
//! ```
//!
//! loads a JSON array of `{"metro", "job_title", "avg_salary"}` objects before
//! the server starts.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use jobhunt_core::{model::NewSalary, store::TrackerStore};
use jobhunt_store_sqlite::SqliteStore;
use jobhunt_web::{AppState, ServerConfig, auth::session_key};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Shorter secrets are refused at startup.
const MIN_SECRET_LEN: usize = 16;

#[derive(Parser)]
#[command(author, version, about = "jobhunt job-search tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Insert the salary reference rows from this JSON file before serving.
  #[arg(long)]
  seed_salaries: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 5000)?
    .set_default("database_path", "jobhunt.db")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("JOBHUNT"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig (is session_secret set?)")?;

  if server_cfg.session_secret.len() < MIN_SECRET_LEN {
    anyhow::bail!("session_secret must be at least {MIN_SECRET_LEN} bytes");
  }

  let database_path = expand_tilde(&server_cfg.database_path);
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open database at {database_path:?}"))?;

  if let Some(path) = cli.seed_salaries {
    let seeded = seed_salaries(&store, &path)
      .await
      .with_context(|| format!("failed to seed salaries from {path:?}"))?;
    tracing::info!(rows = seeded, "seeded salary reference data");
  }

  let state = AppState {
    store: Arc::new(store),
    key:   session_key(&server_cfg.session_secret),
  };

  let app = jobhunt_web::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn seed_salaries(store: &SqliteStore, path: &Path) -> anyhow::Result<usize> {
  let raw = tokio::fs::read(path).await?;
  let rows: Vec<NewSalary> = serde_json::from_slice(&raw)?;
  Ok(store.add_salaries(rows).await?)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
