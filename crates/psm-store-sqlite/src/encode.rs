//! Conversions between [`SqlValue`] and rusqlite's value types, plus the
//! statement text generated from an entity's static column list.

use psm_core::{EntityType, InsertPolicy, SqlValue};
use rusqlite::types::{Value, ValueRef};

pub fn encode_value(v: SqlValue) -> Value {
  match v {
    SqlValue::Null => Value::Null,
    SqlValue::Integer(i) => Value::Integer(i),
    SqlValue::Real(f) => Value::Real(f),
    SqlValue::Text(s) => Value::Text(s),
    SqlValue::Blob(b) => Value::Blob(b),
  }
}

pub fn decode_value(v: ValueRef<'_>) -> SqlValue {
  match v {
    ValueRef::Null => SqlValue::Null,
    ValueRef::Integer(i) => SqlValue::Integer(i),
    ValueRef::Real(f) => SqlValue::Real(f),
    ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
  }
}

/// `INSERT [OR REPLACE] INTO <table> (<cols>) VALUES (?1, …)` for `entity`.
///
/// Table and column names come from [`EntityType`], never from input data.
pub fn insert_sql(entity: EntityType) -> String {
  let verb = match entity.insert_policy() {
    InsertPolicy::Insert => "INSERT",
    InsertPolicy::Replace => "INSERT OR REPLACE",
  };
  let columns = entity.columns();
  let placeholders: Vec<String> =
    (1..=columns.len()).map(|i| format!("?{i}")).collect();

  format!(
    "{verb} INTO {} ({}) VALUES ({})",
    entity.table(),
    columns.join(", "),
    placeholders.join(", "),
  )
}

/// Quote an identifier for interpolation into SQL text.
pub fn quote_ident(name: &str) -> String {
  format!("\"{}\"", name.replace('"', "\"\""))
}
