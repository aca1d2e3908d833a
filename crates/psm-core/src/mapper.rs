//! Mapping functions from raw BVL API records to typed rows.
//!
//! Mappers are pure: they never look anything up, never mutate their input,
//! and never fail on a missing or wrong-typed key (that column becomes
//! `None`; a number in a text column is kept as its decimal text). The one
//! hard failure is a raw record that is not a JSON object at all, which
//! [`map_record`] surfaces to the caller.

use serde_json::{Map, Value};

use crate::{
  EntityType, Error, MappedRecord, Result,
  record::{
    AwgAufwandRecord, AwgKulturRecord, AwgRecord, AwgSchadorgRecord,
    AwgWartezeitRecord, GhsHinweisRecord, HerstellerRecord, MittelGhsRecord,
    MittelRecord, MittelVertriebRecord, MittelWirkstoffRecord, StandRecord,
    WirkstoffRecord,
  },
};

type Object = Map<String, Value>;

/// The fixed identity of the single stand row.
pub const STAND_ID: i64 = 1;

// ─── Field access ────────────────────────────────────────────────────────────

/// Strings pass through; numbers are kept in their JSON rendering.
fn text(raw: &Object, key: &str) -> Option<String> {
  match raw.get(key)? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn real(raw: &Object, key: &str) -> Option<f64> {
  raw.get(key).and_then(Value::as_f64)
}

fn integer(raw: &Object, key: &str) -> Option<i64> {
  raw.get(key).and_then(Value::as_i64)
}

fn payload(raw: &Object) -> Result<Option<String>> {
  Ok(Some(serde_json::to_string(raw)?))
}

fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Map one raw record of the given entity type.
pub fn map_record(entity: EntityType, raw: &Value) -> Result<MappedRecord> {
  let Value::Object(obj) = raw else {
    return Err(Error::NotAnObject { entity, found: json_type(raw) });
  };

  Ok(match entity {
    EntityType::Stand => map_stand(obj)?.into(),
    EntityType::Mittel => map_mittel(obj)?.into(),
    EntityType::Awg => map_awg(obj)?.into(),
    EntityType::AwgKultur => map_awg_kultur(obj).into(),
    EntityType::AwgSchadorg => map_awg_schadorg(obj).into(),
    EntityType::AwgAufwand => map_awg_aufwand(obj).into(),
    EntityType::AwgWartezeit => map_awg_wartezeit(obj).into(),
    EntityType::Wirkstoff => map_wirkstoff(obj)?.into(),
    EntityType::GhsHinweis => map_ghs_hinweis(obj).into(),
    EntityType::Hersteller => map_hersteller(obj).into(),
    EntityType::MittelWirkstoff => map_mittel_wirkstoff(obj).into(),
    EntityType::MittelGhs => map_mittel_ghs(obj).into(),
    EntityType::MittelVertrieb => map_mittel_vertrieb(obj).into(),
  })
}

// ─── Per-entity mappers ──────────────────────────────────────────────────────

pub fn map_stand(raw: &Object) -> Result<StandRecord> {
  Ok(StandRecord {
    id:           STAND_ID,
    stand:        text(raw, "datum"),
    hinweis:      text(raw, "hinweis"),
    payload_json: payload(raw)?,
  })
}

pub fn map_mittel(raw: &Object) -> Result<MittelRecord> {
  Ok(MittelRecord {
    kennr:             text(raw, "kennr"),
    mittelname:        text(raw, "mittelname"),
    zulassungsnummer:  text(raw, "zulnr"),
    zulassungsende:    text(raw, "zulende"),
    zulassungsinhaber: text(raw, "inhaber"),
    parallelimporteur: text(raw, "parallelimporteur"),
    formulierung:      text(raw, "formulierung"),
    antragssteller:    text(raw, "antragsteller"),
    stand:             text(raw, "stand"),
    zusatzinfo:        text(raw, "zusatzinfo"),
    auflage:           text(raw, "auflage"),
    payload_json:      payload(raw)?,
  })
}

pub fn map_awg(raw: &Object) -> Result<AwgRecord> {
  Ok(AwgRecord {
    awg_id:       text(raw, "awgId"),
    kennr:        text(raw, "kennr"),
    awg_titel:    text(raw, "awgTitel"),
    awg_nr:       text(raw, "awgnr"),
    gueltig_bis:  text(raw, "gueltigBis"),
    payload_json: payload(raw)?,
  })
}

pub fn map_awg_kultur(raw: &Object) -> AwgKulturRecord {
  AwgKulturRecord {
    awg_id:      text(raw, "awgId"),
    kultur_kode: text(raw, "kulturKode"),
    kultur_text: text(raw, "kulturText"),
  }
}

pub fn map_awg_schadorg(raw: &Object) -> AwgSchadorgRecord {
  AwgSchadorgRecord {
    awg_id:        text(raw, "awgId"),
    schadorg_kode: text(raw, "schadorgKode"),
    schadorg_text: text(raw, "schadorgText"),
  }
}

pub fn map_awg_aufwand(raw: &Object) -> AwgAufwandRecord {
  AwgAufwandRecord {
    awg_id:               text(raw, "awgId"),
    aufwandmenge:         real(raw, "aufwandmenge"),
    aufwandmenge_einheit: text(raw, "aufwandmengeEinheit"),
    aufwandmenge_min:     real(raw, "aufwandmengeMin"),
    aufwandmenge_max:     real(raw, "aufwandmengeMax"),
    wassermenge:          real(raw, "wassermenge"),
    wassermenge_einheit:  text(raw, "wassermengeEinheit"),
  }
}

pub fn map_awg_wartezeit(raw: &Object) -> AwgWartezeitRecord {
  AwgWartezeitRecord {
    awg_id:         text(raw, "awgId"),
    kultur_kode:    text(raw, "kulturKode"),
    wartezeit_tage: integer(raw, "wartezeitTage"),
    wartezeit_text: text(raw, "wartezeitText"),
  }
}

pub fn map_wirkstoff(raw: &Object) -> Result<WirkstoffRecord> {
  Ok(WirkstoffRecord {
    wirkstoff_kode: text(raw, "wirkstoffKode"),
    wirkstoff_name: text(raw, "wirkstoffName"),
    cas_nr:         text(raw, "casNr"),
    beschreibung:   text(raw, "beschreibung"),
    payload_json:   payload(raw)?,
  })
}

pub fn map_ghs_hinweis(raw: &Object) -> GhsHinweisRecord {
  GhsHinweisRecord {
    hinweis_kode: text(raw, "hinweisKode"),
    hinweis_text: text(raw, "hinweisText"),
  }
}

pub fn map_hersteller(raw: &Object) -> HerstellerRecord {
  HerstellerRecord {
    hersteller_name: text(raw, "herstellerName"),
    website:         text(raw, "website"),
    ort:             text(raw, "ort"),
    land:            text(raw, "land"),
  }
}

pub fn map_mittel_wirkstoff(raw: &Object) -> MittelWirkstoffRecord {
  MittelWirkstoffRecord {
    kennr:          text(raw, "kennr"),
    wirkstoff_kode: text(raw, "wirkstoffKode"),
    wirkstoff_name: None,
    gehalt:         real(raw, "gehalt"),
    gehalt_einheit: text(raw, "gehaltEinheit"),
  }
}

pub fn map_mittel_ghs(raw: &Object) -> MittelGhsRecord {
  MittelGhsRecord {
    kennr:        text(raw, "kennr"),
    hinweis_kode: text(raw, "hinweisKode"),
    hinweis_text: None,
  }
}

pub fn map_mittel_vertrieb(raw: &Object) -> MittelVertriebRecord {
  MittelVertriebRecord {
    kennr:           text(raw, "kennr"),
    hersteller_name: text(raw, "herstellerName"),
    rolle:           text(raw, "rolle"),
    website:         None,
  }
}
