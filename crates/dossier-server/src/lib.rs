//! HTTP server for Dossier.
//!
//! Mounts the JSON API under `/api` over any [`CaseStore`] and carries the
//! server's runtime configuration.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use dossier_core::store::CaseStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, read from `config.toml` and `DOSSIER_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

type Builder = config::ConfigBuilder<DefaultState>;

impl ServerConfig {
  /// Load from `path` (optional) layered under the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::build(Config::builder().add_source(File::from(path).required(false)))
  }

  fn build(builder: Builder) -> Result<Self, ConfigError> {
    builder
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8001)?
      .set_default("store_path", "dossier.db")?
      .add_source(Environment::with_prefix("DOSSIER"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The store path with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the API under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: CaseStore + 'static,
{
  Router::new()
    .nest("/api", dossier_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::FileFormat;
  use dossier_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  fn from_toml(toml: &str) -> ServerConfig {
    ServerConfig::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
      .unwrap()
  }

  #[test]
  fn defaults_apply_without_a_file() {
    let cfg = ServerConfig::load(Path::new("definitely-missing.toml")).unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8001);
    assert_eq!(cfg.store_path, PathBuf::from("dossier.db"));
    assert_eq!(cfg.address(), "127.0.0.1:8001");
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml("port = 9000\nstore_path = \"/var/lib/dossier.db\"\n");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path(), PathBuf::from("/var/lib/dossier.db"));
  }

  #[test]
  fn tilde_expands_to_home() {
    let expanded = expand_tilde(Path::new("~/cases/dossier.db"));
    if std::env::var("HOME").is_ok() {
      assert!(!expanded.starts_with("~"));
    }
    assert!(expanded.ends_with("cases/dossier.db"));
    assert_eq!(expand_tilde(Path::new("rel.db")), PathBuf::from("rel.db"));
  }

  #[tokio::test]
  async fn api_is_nested() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());

    let req = Request::get("/api/stats").body(Body::empty()).unwrap();
    let resp = app(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::get("/stats").body(Body::empty()).unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
