//! Entity types: the closed set of record kinds the BVL feed delivers.
//!
//! Each variant knows its registry name, its target table, and the ordered
//! column list its rows are written with. Declaration order is also the
//! ingestion order: reference tables come before the link tables that are
//! enriched from them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, IntoEnumIterator as _};

/// How rows of an entity are written when the key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPolicy {
  /// Plain `INSERT`; a duplicate key is a per-row failure.
  Insert,
  /// `INSERT OR REPLACE`; the newest row wins.
  Replace,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
  Serialize,
  Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
  Stand,
  Mittel,
  Awg,
  AwgKultur,
  AwgSchadorg,
  AwgAufwand,
  AwgWartezeit,
  Wirkstoff,
  GhsHinweis,
  Hersteller,
  MittelWirkstoff,
  MittelGhs,
  MittelVertrieb,
}

impl EntityType {
  /// Resolve a registry name. Unknown names are logged and yield `None`;
  /// callers skip that record type.
  pub fn lookup(name: &str) -> Option<Self> {
    match name.parse() {
      Ok(entity) => Some(entity),
      Err(_) => {
        tracing::warn!(name, "no mapper registered for entity type");
        None
      }
    }
  }

  /// All entity types in ingestion order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// Registry name, also used as the API endpoint name.
  pub fn name(self) -> &'static str { self.into() }

  pub fn table(self) -> &'static str {
    match self {
      Self::Stand => "bvl_stand",
      Self::Mittel => "bvl_mittel",
      Self::Awg => "bvl_awg",
      Self::AwgKultur => "bvl_awg_kultur",
      Self::AwgSchadorg => "bvl_awg_schadorg",
      Self::AwgAufwand => "bvl_awg_aufwand",
      Self::AwgWartezeit => "bvl_awg_wartezeit",
      Self::Wirkstoff => "bvl_wirkstoff",
      Self::GhsHinweis => "bvl_ghs_hinweis",
      Self::Hersteller => "bvl_hersteller",
      Self::MittelWirkstoff => "bvl_mittel_wirkstoff",
      Self::MittelGhs => "bvl_mittel_ghs",
      Self::MittelVertrieb => "bvl_mittel_vertrieb",
    }
  }

  /// Column names in the order [`Row::values`](crate::Row::values) yields
  /// them.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Self::Stand => &["id", "stand", "hinweis", "payload_json"],
      Self::Mittel => &[
        "kennr",
        "mittelname",
        "zulassungsnummer",
        "zulassungsende",
        "zulassungsinhaber",
        "parallelimporteur",
        "formulierung",
        "antragssteller",
        "stand",
        "zusatzinfo",
        "auflage",
        "payload_json",
      ],
      Self::Awg => {
        &["awg_id", "kennr", "awg_titel", "awg_nr", "gueltig_bis", "payload_json"]
      }
      Self::AwgKultur => &["awg_id", "kultur_kode", "kultur_text"],
      Self::AwgSchadorg => &["awg_id", "schadorg_kode", "schadorg_text"],
      Self::AwgAufwand => &[
        "awg_id",
        "aufwandmenge",
        "aufwandmenge_einheit",
        "aufwandmenge_min",
        "aufwandmenge_max",
        "wassermenge",
        "wassermenge_einheit",
      ],
      Self::AwgWartezeit => {
        &["awg_id", "kultur_kode", "wartezeit_tage", "wartezeit_text"]
      }
      Self::Wirkstoff => {
        &["wirkstoff_kode", "wirkstoff_name", "cas_nr", "beschreibung", "payload_json"]
      }
      Self::GhsHinweis => &["hinweis_kode", "hinweis_text"],
      Self::Hersteller => &["hersteller_name", "website", "ort", "land"],
      Self::MittelWirkstoff => {
        &["kennr", "wirkstoff_kode", "wirkstoff_name", "gehalt", "gehalt_einheit"]
      }
      Self::MittelGhs => &["kennr", "hinweis_kode", "hinweis_text"],
      Self::MittelVertrieb => &["kennr", "hersteller_name", "rolle", "website"],
    }
  }

  /// Whether rows of this entity keep the full upstream record.
  pub fn has_payload(self) -> bool {
    matches!(self, Self::Stand | Self::Mittel | Self::Awg | Self::Wirkstoff)
  }

  pub fn insert_policy(self) -> InsertPolicy {
    match self {
      Self::Stand | Self::GhsHinweis | Self::Hersteller => InsertPolicy::Replace,
      _ => InsertPolicy::Insert,
    }
  }
}
