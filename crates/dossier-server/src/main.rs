//! dossier-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! case store, optionally imports a parser bundle, and serves the JSON API.
//!
//! # Importing
//!
//! ```
//! cargo run -p dossier-server -- --import extraction.json
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use dossier_core::store::{CaseStore, RecordBundle};
use dossier_server::ServerConfig;
use dossier_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Dossier extraction review server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Ingest a record bundle (JSON) before serving.
  #[arg(long, value_name = "FILE")]
  import: Option<PathBuf>,
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

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = server_cfg.store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if let Some(path) = cli.import {
    let raw = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read {path:?}"))?;
    let bundle: RecordBundle =
      serde_json::from_str(&raw).with_context(|| format!("{path:?} is not a record bundle"))?;
    let stats = store.ingest(bundle).await.context("import failed")?;
    tracing::info!(
      contacts = stats.contacts,
      passwords = stats.passwords,
      user_accounts = stats.user_accounts,
      suspect_profiles = stats.suspect_profiles,
      "imported {path:?}"
    );
  }

  let app = dossier_server::app(Arc::new(store));
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
