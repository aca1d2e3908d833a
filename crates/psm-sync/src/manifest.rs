//! `manifest.json`, the descriptor published next to the database artifacts.
//!
//! Lists every downloadable file with its size and SHA-256, the per-table row
//! counts, and build timing.

use std::{
  collections::BTreeMap,
  fs::File,
  io::Read as _,
  path::{Path, PathBuf},
};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{
  Result,
  compress::{CompressedArtifact, Encoding},
};

pub const MANIFEST_FILE: &str = "manifest.json";
const SCHEMA_URL: &str = "https://json-schema.org/draft/2020-12/schema";
const MANIFEST_VERSION: &str = "1.0.0";

// ─── Checksums ───────────────────────────────────────────────────────────────

/// Hex SHA-256 of the file at `path`, read in chunks.
pub fn file_sha256(path: &Path) -> Result<String> {
  let mut file = File::open(path)?;
  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let n = file.read(&mut buffer)?;
    if n == 0 {
      break;
    }
    hasher.update(&buffer[..n]);
  }
  Ok(hex::encode(hasher.finalize()))
}

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
  pub name:     String,
  pub url:      String,
  pub size:     u64,
  pub sha256:   String,
  pub encoding: Encoding,
  #[serde(rename = "type")]
  pub kind:     &'static str,
}

impl FileEntry {
  /// Describe the file at `path`, published under `base_url`.
  pub fn describe(path: &Path, encoding: Encoding, base_url: &str) -> Result<Self> {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    Ok(Self {
      url: format!("{}/{}", base_url.trim_end_matches('/'), name),
      name,
      size: std::fs::metadata(path)?.len(),
      sha256: file_sha256(path)?,
      encoding,
      kind: "sqlite",
    })
  }
}

/// Timing and environment of one build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
  pub start_time:       String,
  pub end_time:         String,
  pub duration_seconds: f64,
  pub environment:      String,
  pub runner:           String,
  pub tool_version:     &'static str,
}

impl BuildInfo {
  pub fn new(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    environment: impl Into<String>,
    runner: impl Into<String>,
  ) -> Self {
    let millis = (end - start).num_milliseconds().max(0);
    Self {
      start_time:       rfc3339(start),
      end_time:         rfc3339(end),
      duration_seconds: millis as f64 / 1000.0,
      environment:      environment.into(),
      runner:           runner.into(),
      tool_version:     env!("CARGO_PKG_VERSION"),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
  #[serde(rename = "$schema")]
  pub schema:       &'static str,
  pub version:      &'static str,
  pub api_version:  String,
  pub generated_at: String,
  pub files:        Vec<FileEntry>,
  pub tables:       BTreeMap<String, i64>,
  pub build:        BuildInfo,
}

impl Manifest {
  /// Describe the database file followed by each compressed artifact.
  pub fn build(
    db_path: &Path,
    artifacts: &[CompressedArtifact],
    tables: BTreeMap<String, i64>,
    build: BuildInfo,
    api_version: &str,
    base_url: &str,
  ) -> Result<Self> {
    let mut files = vec![FileEntry::describe(db_path, Encoding::None, base_url)?];
    for artifact in artifacts {
      files.push(FileEntry::describe(&artifact.path, artifact.encoding, base_url)?);
    }

    Ok(Self {
      schema: SCHEMA_URL,
      version: MANIFEST_VERSION,
      api_version: api_version.to_owned(),
      generated_at: rfc3339(Utc::now()),
      files,
      tables,
      build,
    })
  }

  /// Write as pretty-printed `manifest.json` in `dir`.
  pub fn write(&self, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(self)?;
    std::fs::write(&path, json)?;
    tracing::info!(path = %path.display(), files = self.files.len(), "manifest written");
    Ok(path)
  }
}

fn rfc3339(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Secs, true) }

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;
  use serde_json::Value;

  use super::*;

  #[test]
  fn sha256_of_known_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.txt");
    std::fs::write(&path, b"hello world").unwrap();
    assert_eq!(
      file_sha256(&path).unwrap(),
      "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
  }

  #[test]
  fn build_info_duration() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 3, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 1, 3, 1, 30).unwrap();
    let info = BuildInfo::new(start, end, "linux-x86_64", "local");
    assert_eq!(info.duration_seconds, 90.0);
    assert_eq!(info.start_time, "2026-01-01T03:00:00Z");
    assert_eq!(info.end_time, "2026-01-01T03:01:30Z");
  }

  #[test]
  fn manifest_document_shape() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("pflanzenschutz.sqlite");
    let gz = dir.path().join("pflanzenschutz.sqlite.gz");
    std::fs::write(&db, b"db bytes").unwrap();
    std::fs::write(&gz, b"gz").unwrap();

    let now = Utc::now();
    let manifest = Manifest::build(
      &db,
      &[CompressedArtifact { path: gz, encoding: Encoding::Gzip }],
      BTreeMap::from([("bvl_mittel".to_owned(), 3)]),
      BuildInfo::new(now, now, "test", "ci"),
      "v1",
      "https://example.org/dl/",
    )
    .unwrap();
    let path = manifest.write(dir.path()).unwrap();

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(doc["$schema"], SCHEMA_URL);
    assert_eq!(doc["version"], "1.0.0");
    assert_eq!(doc["api_version"], "v1");
    assert_eq!(doc["tables"]["bvl_mittel"], 3);
    assert_eq!(doc["build"]["runner"], "ci");

    let files = doc["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], "pflanzenschutz.sqlite");
    assert_eq!(files[0]["url"], "https://example.org/dl/pflanzenschutz.sqlite");
    assert_eq!(files[0]["size"], 8);
    assert_eq!(files[0]["encoding"], "none");
    assert_eq!(files[0]["type"], "sqlite");
    assert_eq!(files[0]["sha256"].as_str().unwrap().len(), 64);
    assert_eq!(files[1]["encoding"], "gzip");
  }
}
