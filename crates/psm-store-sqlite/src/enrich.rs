//! The enrichment pass: backfills display columns of link tables by joining
//! against reference tables loaded earlier in the run.
//!
//! Each pass is a single bulk `UPDATE` that only touches rows whose target
//! column is still `NULL`, so re-running it never blanks or rewrites a value.
//! An empty reference table is not an error; the pass is skipped with a
//! warning and the column stays `NULL`.

use psm_core::EntityType;

use crate::{DatabaseManager, Result};

/// One link-table column filled from a reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentPass {
  /// `bvl_mittel_wirkstoff.wirkstoff_name` from `bvl_wirkstoff` by code.
  WirkstoffName,
  /// `bvl_mittel_ghs.hinweis_text` from `bvl_ghs_hinweis` by code.
  GhsText,
  /// `bvl_mittel_vertrieb.website` from `bvl_hersteller` by name.
  VertriebWebsite,
}

/// (link entity, link column, link key, reference entity, reference key)
type Join = (EntityType, &'static str, &'static str, EntityType, &'static str);

impl EnrichmentPass {
  pub const ALL: [Self; 3] = [Self::WirkstoffName, Self::GhsText, Self::VertriebWebsite];

  fn join(self) -> Join {
    match self {
      Self::WirkstoffName => (
        EntityType::MittelWirkstoff,
        "wirkstoff_name",
        "wirkstoff_kode",
        EntityType::Wirkstoff,
        "wirkstoff_kode",
      ),
      Self::GhsText => (
        EntityType::MittelGhs,
        "hinweis_text",
        "hinweis_kode",
        EntityType::GhsHinweis,
        "hinweis_kode",
      ),
      Self::VertriebWebsite => (
        EntityType::MittelVertrieb,
        "website",
        "hersteller_name",
        EntityType::Hersteller,
        "hersteller_name",
      ),
    }
  }

  pub fn target_table(self) -> &'static str { self.join().0.table() }

  pub fn target_column(self) -> &'static str { self.join().1 }

  pub fn reference_table(self) -> &'static str { self.join().3.table() }

  /// The reference column shares its name with the target column.
  fn update_sql(self) -> String {
    let (link, column, link_key, reference, ref_key) = self.join();
    let (link, reference) = (link.table(), reference.table());
    format!(
      "UPDATE {link} SET {column} = (
         SELECT r.{column} FROM {reference} r
         WHERE r.{ref_key} = {link}.{link_key} AND r.{column} IS NOT NULL
         LIMIT 1
       )
       WHERE {column} IS NULL
         AND EXISTS (
           SELECT 1 FROM {reference} r
           WHERE r.{ref_key} = {link}.{link_key} AND r.{column} IS NOT NULL
         )"
    )
  }
}

/// Outcome of one [`EnrichmentPass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentReport {
  pub pass:       EnrichmentPass,
  /// Rows whose column was filled by this run of the pass.
  pub updated:    usize,
  /// Rows whose column is still `NULL` afterwards.
  pub unresolved: i64,
  /// The reference table was empty, so nothing was attempted.
  pub skipped:    bool,
}

impl DatabaseManager {
  /// Run every enrichment pass once, in order.
  pub fn enrich(&self) -> Result<Vec<EnrichmentReport>> {
    EnrichmentPass::ALL
      .into_iter()
      .map(|pass| self.enrich_pass(pass))
      .collect()
  }

  pub fn enrich_pass(&self, pass: EnrichmentPass) -> Result<EnrichmentReport> {
    let _entered = self.span().enter();
    let conn = self.connection()?;
    let (table, column) = (pass.target_table(), pass.target_column());

    let reference_rows = self.get_table_count(pass.reference_table())?;
    let updated = if reference_rows == 0 {
      tracing::warn!(
        reference = pass.reference_table(),
        table,
        column,
        "reference table is empty; enrichment skipped"
      );
      0
    } else {
      conn.execute(&pass.update_sql(), [])?
    };

    let unresolved: i64 = conn.query_row(
      &format!("SELECT COUNT(*) FROM {table} WHERE {column} IS NULL"),
      [],
      |r| r.get(0),
    )?;

    tracing::info!(table, column, updated, unresolved, "enrichment pass done");
    Ok(EnrichmentReport { pass, updated, unresolved, skipped: reference_rows == 0 })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn update_only_touches_null_columns() {
    let sql = EnrichmentPass::GhsText.update_sql();
    assert!(sql.starts_with("UPDATE bvl_mittel_ghs SET hinweis_text"));
    assert!(sql.contains("WHERE hinweis_text IS NULL"));
    assert!(sql.contains("FROM bvl_ghs_hinweis r"));
  }

  #[test]
  fn passes_target_link_tables() {
    assert_eq!(EnrichmentPass::WirkstoffName.target_table(), "bvl_mittel_wirkstoff");
    assert_eq!(EnrichmentPass::VertriebWebsite.reference_table(), "bvl_hersteller");
  }
}
