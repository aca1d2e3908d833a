//! Sources of raw API records.
//!
//! The pipeline only needs "all raw records of this entity type"; how they
//! are paged or where they come from is the fetcher's business.

use std::{path::PathBuf, time::Duration};

use psm_core::EntityType;
use reqwest::StatusCode;
use serde_json::Value;

use crate::{Error, Result, SyncConfig};

/// Supplies the raw JSON records of one entity type.
pub trait Fetcher {
  fn fetch(&self, entity: EntityType) -> Result<Vec<Value>>;
}

// ─── HTTP ────────────────────────────────────────────────────────────────────

/// Pages through the BVL PSM REST API with `limit`/`offset`.
///
/// Each page is `{ "items": [...], "hasMore": bool, ... }`. Failures are
/// returned as-is, except a 404 from an optional endpoint; there is no retry.
pub struct HttpFetcher {
  client:    reqwest::blocking::Client,
  base_url:  String,
  page_size: usize,
}

impl HttpFetcher {
  pub fn new(config: &SyncConfig) -> Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .user_agent(concat!("psm-sync/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self {
      client,
      base_url: config.api_base_url.trim_end_matches('/').to_owned(),
      page_size: config.page_size.max(1),
    })
  }

  fn url(&self, entity: EntityType) -> String {
    format!("{}/{}/", self.base_url, entity.name())
  }
}

impl Fetcher for HttpFetcher {
  fn fetch(&self, entity: EntityType) -> Result<Vec<Value>> {
    let url = self.url(entity);
    let mut records = Vec::new();
    let mut offset = 0;

    loop {
      tracing::debug!(%entity, offset, "fetching page");
      let response = self
        .client
        .get(&url)
        .query(&[("limit", self.page_size), ("offset", offset)])
        .send()?;
      if response.status() == StatusCode::NOT_FOUND && endpoint_optional(entity) {
        tracing::warn!(%entity, %url, "endpoint not served; no records");
        break;
      }
      let page: Value = response.error_for_status()?.json()?;

      let (items, has_more) = split_page(entity, offset, page)?;
      let received = items.len();
      records.extend(items);

      if !has_more || received == 0 {
        break;
      }
      offset += received;
    }

    tracing::info!(%entity, records = records.len(), "fetched");
    Ok(records)
  }
}

/// Reference and link endpoints that not every API deployment serves. A 404
/// from one of them yields no records instead of failing the build.
fn endpoint_optional(entity: EntityType) -> bool {
  matches!(
    entity,
    EntityType::GhsHinweis | EntityType::Hersteller | EntityType::MittelGhs
  )
}

/// Take a page apart into its items and the `hasMore` flag.
fn split_page(entity: EntityType, offset: usize, page: Value) -> Result<(Vec<Value>, bool)> {
  let Value::Object(mut page) = page else {
    return Err(Error::MalformedPage { entity, offset });
  };
  let has_more = page.get("hasMore").and_then(Value::as_bool).unwrap_or(false);
  match page.remove("items") {
    Some(Value::Array(items)) => Ok((items, has_more)),
    _ => Err(Error::MalformedPage { entity, offset }),
  }
}

// ─── Local dumps ─────────────────────────────────────────────────────────────

/// Reads `<dir>/<entity>.json` files holding either a bare array of records
/// or a single API page. Entities without a file yield no records.
pub struct DirFetcher {
  dir: PathBuf,
}

impl DirFetcher {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }
}

impl Fetcher for DirFetcher {
  fn fetch(&self, entity: EntityType) -> Result<Vec<Value>> {
    let path = self.dir.join(format!("{}.json", entity.name()));
    if !path.exists() {
      tracing::warn!(%entity, path = %path.display(), "no dump file; skipping");
      return Ok(Vec::new());
    }

    let raw: Value = serde_json::from_slice(&std::fs::read(&path)?)?;
    match raw {
      Value::Array(items) => Ok(items),
      page => Ok(split_page(entity, 0, page)?.0),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
  };

  use super::*;

  #[test]
  fn split_page_reads_items_and_flag() {
    let page = json!({"items": [{"kennr": "a"}, {"kennr": "b"}], "hasMore": true, "offset": 0});
    let (items, more) = split_page(EntityType::Mittel, 0, page).unwrap();
    assert_eq!(items.len(), 2);
    assert!(more);

    let (_, more) = split_page(EntityType::Mittel, 0, json!({"items": []})).unwrap();
    assert!(!more);
  }

  #[test]
  fn split_page_rejects_other_shapes() {
    for page in [json!([]), json!({"rows": []}), json!({"items": {}})] {
      assert!(matches!(
        split_page(EntityType::Awg, 40, page),
        Err(Error::MalformedPage { entity: EntityType::Awg, offset: 40 })
      ));
    }
  }

  #[test]
  fn dir_fetcher_reads_arrays_pages_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mittel.json"), r#"[{"kennr": "024123-00"}]"#).unwrap();
    std::fs::write(
      dir.path().join("awg.json"),
      r#"{"items": [{"awgId": "AWG-001"}, {"awgId": "AWG-002"}], "hasMore": false}"#,
    )
    .unwrap();

    let fetcher = DirFetcher::new(dir.path());
    assert_eq!(fetcher.fetch(EntityType::Mittel).unwrap().len(), 1);
    assert_eq!(fetcher.fetch(EntityType::Awg).unwrap().len(), 2);
    assert!(fetcher.fetch(EntityType::Wirkstoff).unwrap().is_empty());
  }

  // ─── HTTP ──────────────────────────────────────────────────────────────

  async fn fetch_from(
    server: &MockServer,
    entity: EntityType,
    page_size: usize,
  ) -> Result<Vec<Value>> {
    let config = SyncConfig {
      api_base_url: server.uri(),
      page_size,
      ..SyncConfig::default()
    };
    tokio::task::spawn_blocking(move || HttpFetcher::new(&config)?.fetch(entity))
      .await
      .expect("fetch task")
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn http_fetcher_pages_until_has_more_is_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/mittel/"))
      .and(query_param("offset", "0"))
      .and(query_param("limit", "2"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [{"kennr": "024123-00"}, {"kennr": "024123-01"}],
        "hasMore": true,
      })))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(path("/mittel/"))
      .and(query_param("offset", "2"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({
        "items": [{"kennr": "024123-02"}],
        "hasMore": false,
      })))
      .mount(&server)
      .await;

    let records = fetch_from(&server, EntityType::Mittel, 2).await.unwrap();
    let kennr: Vec<_> = records.iter().map(|r| r["kennr"].as_str().unwrap()).collect();
    assert_eq!(kennr, ["024123-00", "024123-01", "024123-02"]);
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn missing_reference_endpoint_yields_no_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/ghs_hinweis/"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let records = fetch_from(&server, EntityType::GhsHinweis, 100).await.unwrap();
    assert!(records.is_empty());
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn missing_core_endpoint_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/awg/"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let err = fetch_from(&server, EntityType::Awg, 100).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)), "{err}");
  }

  #[test]
  fn only_reference_endpoints_are_optional() {
    assert!(endpoint_optional(EntityType::GhsHinweis));
    assert!(endpoint_optional(EntityType::Hersteller));
    assert!(endpoint_optional(EntityType::MittelGhs));
    assert!(!endpoint_optional(EntityType::Mittel));
    assert!(!endpoint_optional(EntityType::MittelWirkstoff));
  }

  #[test]
  fn http_url_joins_endpoint_name() {
    let config = SyncConfig {
      api_base_url: "https://api.example/psm/".into(),
      ..SyncConfig::default()
    };
    let fetcher = HttpFetcher::new(&config).unwrap();
    assert_eq!(fetcher.url(EntityType::AwgKultur), "https://api.example/psm/awg_kultur/");
  }
}
