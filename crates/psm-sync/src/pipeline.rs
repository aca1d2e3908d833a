//! One build run: fetch → map → insert → enrich → count → compress → manifest.

use std::{collections::BTreeMap, path::PathBuf};

use chrono::{SecondsFormat, Utc};
use psm_core::{EntityType, MappedRecord, map_record};
use psm_store_sqlite::{DatabaseManager, EnrichmentReport};

use crate::{
  Result, SyncConfig,
  compress::compress,
  fetch::Fetcher,
  manifest::{BuildInfo, Manifest},
};

/// What a finished run produced.
#[derive(Debug)]
pub struct BuildSummary {
  pub db_path:       PathBuf,
  pub manifest_path: PathBuf,
  pub artifacts:     Vec<PathBuf>,
  pub tables:        BTreeMap<String, i64>,
  pub enrichment:    Vec<EnrichmentReport>,
  /// Rows that were fetched but rejected on insert, per entity.
  pub rejected:      BTreeMap<EntityType, usize>,
}

/// Run a complete build into `config.output_dir`.
///
/// A malformed raw record or a failed schema init aborts the run; rows
/// rejected by the database are only reflected in the counts.
pub fn run(config: &SyncConfig, fetcher: &impl Fetcher) -> Result<BuildSummary> {
  let started = Utc::now();
  let span = tracing::info_span!("build", runner = %config.runner);
  let _entered = span.enter();
  std::fs::create_dir_all(&config.output_dir)?;

  let db_path = config.db_path();
  if db_path.exists() {
    tracing::info!(path = %db_path.display(), "removing previous database");
    std::fs::remove_file(&db_path)?;
  }

  let (tables, enrichment, rejected) = DatabaseManager::scoped(&db_path, |db| {
    db.init_schema()?;
    db.set_meta("build_started_at", &started.to_rfc3339_opts(SecondsFormat::Secs, true))?;
    db.set_meta("api_version", &config.api_version)?;

    let mut rejected = BTreeMap::new();
    let mut total = 0;
    for entity in EntityType::all() {
      let (fetched, inserted) = load_entity(db, fetcher, entity)?;
      total += inserted;
      if fetched > inserted {
        rejected.insert(entity, fetched - inserted);
      }
    }

    let enrichment = db.enrich()?;

    if let Some(stand) = db
      .execute_query("SELECT stand FROM bvl_stand WHERE id = 1", [])?
      .first()
      .and_then(|r| r.get_str("stand"))
    {
      db.set_meta("stand", stand)?;
    }
    db.set_meta("record_total", &total.to_string())?;
    db.set_meta(
      "build_finished_at",
      &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    )?;

    Ok::<_, crate::Error>((db.table_counts()?, enrichment, rejected))
  })?;

  let compressed = if config.compress { compress(&db_path)? } else { Vec::new() };

  let build = BuildInfo::new(started, Utc::now(), &config.environment, &config.runner);
  let manifest = Manifest::build(
    &db_path,
    &compressed,
    tables.clone(),
    build,
    &config.api_version,
    &config.download_base_url,
  )?;
  let manifest_path = manifest.write(&config.output_dir)?;

  tracing::info!(
    tables = tables.len(),
    rows = tables.values().sum::<i64>(),
    artifacts = compressed.len(),
    "build finished"
  );

  Ok(BuildSummary {
    db_path,
    manifest_path,
    artifacts: compressed.into_iter().map(|a| a.path).collect(),
    tables,
    enrichment,
    rejected,
  })
}

/// Fetch, map and insert one entity type. Returns `(fetched, inserted)`.
fn load_entity(
  db: &DatabaseManager,
  fetcher: &impl Fetcher,
  entity: EntityType,
) -> Result<(usize, usize)> {
  let raw = fetcher.fetch(entity)?;
  let rows = raw
    .iter()
    .map(|r| map_record(entity, r))
    .collect::<psm_core::Result<Vec<MappedRecord>>>()?;

  let inserted = db.insert_records(&rows)?;
  tracing::info!(%entity, table = entity.table(), fetched = rows.len(), inserted, "loaded");
  Ok((rows.len(), inserted))
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use serde_json::{Value, json};

  use super::*;
  use crate::Error;

  struct StaticFetcher(HashMap<EntityType, Vec<Value>>);

  impl Fetcher for StaticFetcher {
    fn fetch(&self, entity: EntityType) -> Result<Vec<Value>> {
      Ok(self.0.get(&entity).cloned().unwrap_or_default())
    }
  }

  fn sample() -> StaticFetcher {
    StaticFetcher(HashMap::from([
      (EntityType::Stand, vec![json!({"datum": "2026-10-01", "hinweis": "Monatsstand"})]),
      (EntityType::Mittel, vec![
        json!({"kennr": "024123-00", "mittelname": "Roundup"}),
        json!({"kennr": "024123-01", "mittelname": "Duaxo"}),
        json!({"kennr": "024123-00", "mittelname": "duplicate"}),
      ]),
      (EntityType::Awg, vec![json!({"awgId": "AWG-001", "kennr": "024123-00"})]),
      (EntityType::Wirkstoff, vec![json!({"wirkstoffKode": "WS001", "wirkstoffName": "Glyphosate"})]),
      (EntityType::MittelWirkstoff, vec![
        json!({"kennr": "024123-00", "wirkstoffKode": "WS001", "gehalt": 360, "gehaltEinheit": "g/l"}),
      ]),
      (EntityType::MittelGhs, vec![json!({"kennr": "024123-00", "hinweisKode": "H411"})]),
    ]))
  }

  fn config(dir: &std::path::Path) -> SyncConfig {
    SyncConfig {
      output_dir: dir.to_path_buf(),
      runner: "test".into(),
      ..SyncConfig::default()
    }
  }

  #[test]
  fn full_run_produces_database_artifacts_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());

    let summary = run(&config, &sample()).unwrap();

    assert_eq!(summary.tables["bvl_mittel"], 2);
    assert_eq!(summary.tables["bvl_stand"], 1);
    assert_eq!(summary.tables["bvl_ghs_hinweis"], 0);
    assert_eq!(summary.rejected.get(&EntityType::Mittel), Some(&1));
    assert_eq!(summary.artifacts.len(), 3);
    assert!(summary.artifacts.iter().all(|p| p.exists()));

    let ghs = summary
      .enrichment
      .iter()
      .find(|r| r.pass == psm_store_sqlite::EnrichmentPass::GhsText)
      .unwrap();
    assert!(ghs.skipped);

    let doc: Value =
      serde_json::from_str(&std::fs::read_to_string(&summary.manifest_path).unwrap()).unwrap();
    let files = doc["files"].as_array().unwrap();
    assert_eq!(files.len(), 4);
    assert_eq!(files[1]["encoding"], "brotli");
    assert!(files[1]["name"].as_str().unwrap().ends_with(".sqlite.br"));
    assert_eq!(doc["tables"]["bvl_mittel"], 2);
    assert_eq!(doc["build"]["runner"], "test");

    let db = DatabaseManager::open(&summary.db_path).unwrap();
    assert_eq!(db.get_meta("stand").unwrap().as_deref(), Some("2026-10-01"));
    assert_eq!(db.get_meta("record_total").unwrap().as_deref(), Some("7"));
    assert!(db.get_meta("build_finished_at").unwrap().is_some());
    let names = db
      .execute_query("SELECT wirkstoff_name FROM bvl_mittel_wirkstoff", [])
      .unwrap();
    assert_eq!(names[0].get_str("wirkstoff_name"), Some("Glyphosate"));
  }

  #[test]
  fn rerun_replaces_previous_database() {
    let dir = tempfile::tempdir().unwrap();
    let config = SyncConfig { compress: false, ..config(dir.path()) };

    run(&config, &sample()).unwrap();
    let summary = run(&config, &sample()).unwrap();

    assert_eq!(summary.tables["bvl_mittel"], 2);
    assert!(summary.artifacts.is_empty());
  }

  #[test]
  fn malformed_record_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = StaticFetcher(HashMap::from([(
      EntityType::Awg,
      vec![json!({"awgId": "AWG-001"}), json!("not an object")],
    )]));

    let err = run(&config(dir.path()), &fetcher).unwrap_err();
    assert!(matches!(err, Error::Core(psm_core::Error::NotAnObject { .. })));
    assert!(!dir.path().join(crate::manifest::MANIFEST_FILE).exists());
  }
}
