//! Marquee server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `MARQUEE_*` environment variables over it, opens the SQLite store, ensures
//! the rating indexes exist and serves the JSON API over HTTP.
//!
//! ```sh
//! MARQUEE_STORE_PATH=/tmp/marquee.db cargo run -p marquee-server --bin server
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use marquee_engine::EngagementService;
use marquee_server::{ServerConfig, expand_tilde};
use marquee_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Marquee engagement analytics server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Ensure storage indexes exist, then exit without serving.
  #[arg(long)]
  bootstrap_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
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
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MARQUEE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let service = Arc::new(EngagementService::new(Arc::new(store)));

  // A failure here is not fatal: the first rating request retries it.
  if let Err(e) = service.bootstrap().await {
    if cli.bootstrap_only {
      return Err(e).context("failed to ensure rating indexes");
    }
    tracing::warn!(error = %e, "rating index bootstrap failed; will retry on demand");
  }
  if cli.bootstrap_only {
    tracing::info!(path = ?store_path, "bootstrap complete");
    return Ok(());
  }

  let app = marquee_server::app(service);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
