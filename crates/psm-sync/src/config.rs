//! Build configuration, deserialised from an optional TOML file layered with
//! `PSM_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Runtime configuration for one build.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
  /// Root of the BVL PSM REST API; endpoint names are appended to it.
  pub api_base_url:         String,
  pub page_size:            usize,
  pub request_timeout_secs: u64,
  pub output_dir:           PathBuf,
  pub db_file_name:         String,
  /// Public location the artifacts are served from; used for manifest URLs.
  pub download_base_url:    String,
  pub api_version:          String,
  /// Label of the machine running the build (e.g. `local`, `github-actions`).
  pub runner:               String,
  pub environment:          String,
  pub compress:             bool,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      api_base_url:         "https://psm-api.bvl.bund.de/ords/psm/api-v1".into(),
      page_size:            1000,
      request_timeout_secs: 60,
      output_dir:           PathBuf::from("dist"),
      db_file_name:         "pflanzenschutz.sqlite".into(),
      download_base_url:    "https://abbas-hoseiny.github.io/pflanzenschutz-db".into(),
      api_version:          "v1".into(),
      runner:               "local".into(),
      environment:          format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
      compress:             true,
    }
  }
}

impl SyncConfig {
  /// Load from `path` (optional; a missing file means defaults) and the
  /// environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("PSM"))
      .build()?
      .try_deserialize()
  }

  pub fn db_path(&self) -> PathBuf { self.output_dir.join(&self.db_file_name) }
}
