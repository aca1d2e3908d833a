//! Typed row records, one per [`EntityType`].
//!
//! Every nullable column is an `Option`. Columns documented as *enriched* are
//! always `None` when produced by a mapper; they are populated only by the
//! store's enrichment pass once the referenced table is loaded.

use crate::{EntityType, Row, SqlValue};

/// Declares a record struct plus its [`Row`] impl. Field order is column
/// order.
macro_rules! record {
  (
    $(#[$meta:meta])*
    $name:ident => $entity:ident {
      $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
    }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct $name {
      $( $(#[$fmeta])* pub $field: $ty, )*
    }

    impl $name {
      /// Field names in declaration order.
      pub const FIELDS: &'static [&'static str] = &[$( stringify!($field) ),*];
    }

    impl Row for $name {
      fn entity(&self) -> EntityType { EntityType::$entity }

      fn values(&self) -> Vec<SqlValue> {
        vec![$( SqlValue::from(self.$field.clone()) ),*]
      }
    }

    impl From<$name> for MappedRecord {
      fn from(r: $name) -> Self { Self::$entity(r) }
    }
  };
}

// ─── Products ────────────────────────────────────────────────────────────────

record! {
  /// The dataset's as-of snapshot. Exactly one row exists (`id == 1`).
  StandRecord => Stand {
    id:           i64,
    stand:        Option<String>,
    hinweis:      Option<String>,
    payload_json: Option<String>,
  }
}

record! {
  /// A registered plant-protection product, keyed by `kennr`.
  MittelRecord => Mittel {
    kennr:             Option<String>,
    mittelname:        Option<String>,
    zulassungsnummer:  Option<String>,
    zulassungsende:    Option<String>,
    zulassungsinhaber: Option<String>,
    parallelimporteur: Option<String>,
    formulierung:      Option<String>,
    antragssteller:    Option<String>,
    stand:             Option<String>,
    zusatzinfo:        Option<String>,
    auflage:           Option<String>,
    payload_json:      Option<String>,
  }
}

// ─── Application areas ───────────────────────────────────────────────────────

record! {
  /// An authorized application area of a product.
  AwgRecord => Awg {
    awg_id:       Option<String>,
    kennr:        Option<String>,
    awg_titel:    Option<String>,
    awg_nr:       Option<String>,
    gueltig_bis:  Option<String>,
    payload_json: Option<String>,
  }
}

record! {
  AwgKulturRecord => AwgKultur {
    awg_id:      Option<String>,
    kultur_kode: Option<String>,
    kultur_text: Option<String>,
  }
}

record! {
  AwgSchadorgRecord => AwgSchadorg {
    awg_id:        Option<String>,
    schadorg_kode: Option<String>,
    schadorg_text: Option<String>,
  }
}

record! {
  /// Application rate and water volume for an application area.
  AwgAufwandRecord => AwgAufwand {
    awg_id:               Option<String>,
    aufwandmenge:         Option<f64>,
    aufwandmenge_einheit: Option<String>,
    aufwandmenge_min:     Option<f64>,
    aufwandmenge_max:     Option<f64>,
    wassermenge:          Option<f64>,
    wassermenge_einheit:  Option<String>,
  }
}

record! {
  AwgWartezeitRecord => AwgWartezeit {
    awg_id:         Option<String>,
    kultur_kode:    Option<String>,
    wartezeit_tage: Option<i64>,
    wartezeit_text: Option<String>,
  }
}

// ─── Substances and reference tables ─────────────────────────────────────────

record! {
  /// An active substance, keyed by `wirkstoff_kode`.
  WirkstoffRecord => Wirkstoff {
    wirkstoff_kode: Option<String>,
    wirkstoff_name: Option<String>,
    cas_nr:         Option<String>,
    beschreibung:   Option<String>,
    payload_json:   Option<String>,
  }
}

record! {
  /// Hazard-statement code → display text.
  GhsHinweisRecord => GhsHinweis {
    hinweis_kode: Option<String>,
    hinweis_text: Option<String>,
  }
}

record! {
  /// Manufacturer/distributor reference data.
  HerstellerRecord => Hersteller {
    hersteller_name: Option<String>,
    website:         Option<String>,
    ort:             Option<String>,
    land:            Option<String>,
  }
}

// ─── Product links ───────────────────────────────────────────────────────────

record! {
  /// Product ↔ active substance link with concentration.
  MittelWirkstoffRecord => MittelWirkstoff {
    kennr:          Option<String>,
    wirkstoff_kode: Option<String>,
    /// Enriched from `bvl_wirkstoff` by code.
    wirkstoff_name: Option<String>,
    gehalt:         Option<f64>,
    gehalt_einheit: Option<String>,
  }
}

record! {
  /// Product ↔ hazard statement link.
  MittelGhsRecord => MittelGhs {
    kennr:        Option<String>,
    hinweis_kode: Option<String>,
    /// Enriched from `bvl_ghs_hinweis` by code.
    hinweis_text: Option<String>,
  }
}

record! {
  /// Product ↔ distributor link.
  MittelVertriebRecord => MittelVertrieb {
    kennr:           Option<String>,
    hersteller_name: Option<String>,
    rolle:           Option<String>,
    /// Enriched from `bvl_hersteller` by name.
    website:         Option<String>,
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Output of [`map_record`](crate::map_record): one variant per entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedRecord {
  Stand(StandRecord),
  Mittel(MittelRecord),
  Awg(AwgRecord),
  AwgKultur(AwgKulturRecord),
  AwgSchadorg(AwgSchadorgRecord),
  AwgAufwand(AwgAufwandRecord),
  AwgWartezeit(AwgWartezeitRecord),
  Wirkstoff(WirkstoffRecord),
  GhsHinweis(GhsHinweisRecord),
  Hersteller(HerstellerRecord),
  MittelWirkstoff(MittelWirkstoffRecord),
  MittelGhs(MittelGhsRecord),
  MittelVertrieb(MittelVertriebRecord),
}

impl MappedRecord {
  /// The stored copy of the upstream record, for entities that keep one.
  pub fn payload_json(&self) -> Option<&str> {
    match self {
      Self::Stand(r) => r.payload_json.as_deref(),
      Self::Mittel(r) => r.payload_json.as_deref(),
      Self::Awg(r) => r.payload_json.as_deref(),
      Self::Wirkstoff(r) => r.payload_json.as_deref(),
      _ => None,
    }
  }

  fn as_row(&self) -> &dyn Row {
    match self {
      Self::Stand(r) => r,
      Self::Mittel(r) => r,
      Self::Awg(r) => r,
      Self::AwgKultur(r) => r,
      Self::AwgSchadorg(r) => r,
      Self::AwgAufwand(r) => r,
      Self::AwgWartezeit(r) => r,
      Self::Wirkstoff(r) => r,
      Self::GhsHinweis(r) => r,
      Self::Hersteller(r) => r,
      Self::MittelWirkstoff(r) => r,
      Self::MittelGhs(r) => r,
      Self::MittelVertrieb(r) => r,
    }
  }
}

impl Row for MappedRecord {
  fn entity(&self) -> EntityType { self.as_row().entity() }

  fn values(&self) -> Vec<SqlValue> { self.as_row().values() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn field_names(entity: EntityType) -> &'static [&'static str] {
    match entity {
      EntityType::Stand => StandRecord::FIELDS,
      EntityType::Mittel => MittelRecord::FIELDS,
      EntityType::Awg => AwgRecord::FIELDS,
      EntityType::AwgKultur => AwgKulturRecord::FIELDS,
      EntityType::AwgSchadorg => AwgSchadorgRecord::FIELDS,
      EntityType::AwgAufwand => AwgAufwandRecord::FIELDS,
      EntityType::AwgWartezeit => AwgWartezeitRecord::FIELDS,
      EntityType::Wirkstoff => WirkstoffRecord::FIELDS,
      EntityType::GhsHinweis => GhsHinweisRecord::FIELDS,
      EntityType::Hersteller => HerstellerRecord::FIELDS,
      EntityType::MittelWirkstoff => MittelWirkstoffRecord::FIELDS,
      EntityType::MittelGhs => MittelGhsRecord::FIELDS,
      EntityType::MittelVertrieb => MittelVertriebRecord::FIELDS,
    }
  }

  #[test]
  fn struct_fields_match_table_columns() {
    for entity in EntityType::all() {
      assert_eq!(field_names(entity), entity.columns(), "{entity}");
    }
  }

  #[test]
  fn values_follow_column_order() {
    let row = MittelWirkstoffRecord {
      kennr: Some("024123-00".into()),
      wirkstoff_kode: Some("WS001".into()),
      gehalt: Some(10.5),
      ..Default::default()
    };
    assert_eq!(row.values(), vec![
      SqlValue::Text("024123-00".into()),
      SqlValue::Text("WS001".into()),
      SqlValue::Null,
      SqlValue::Real(10.5),
      SqlValue::Null,
    ]);
  }

  #[test]
  fn mapped_record_delegates_to_inner_row() {
    let inner = AwgKulturRecord {
      awg_id: Some("AWG-001".into()),
      kultur_kode: Some("TRZAW".into()),
      kultur_text: None,
    };
    let mapped = MappedRecord::from(inner.clone());
    assert_eq!(mapped.entity(), EntityType::AwgKultur);
    assert_eq!(mapped.values(), inner.values());
    assert_eq!(mapped.payload_json(), None);
  }
}
