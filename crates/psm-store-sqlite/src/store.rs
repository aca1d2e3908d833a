//! [`DatabaseManager`]: the single point of access to the SQLite artifact.

use std::{path::Path, sync::Arc};

use psm_core::{EntityType, Row, SqlValue};
use rusqlite::{Connection, ErrorCode, OptionalExtension as _, Params};
use tracing::Span;

use crate::{
  Error, Result,
  encode::{decode_value, encode_value, insert_sql, quote_ident},
  schema::SCHEMA,
};

// ─── Query rows ──────────────────────────────────────────────────────────────

/// One result row of [`DatabaseManager::execute_query`], addressable by
/// column name.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRow {
  columns: Arc<[String]>,
  values:  Vec<SqlValue>,
}

impl QueryRow {
  pub fn columns(&self) -> &[String] { &self.columns }

  pub fn values(&self) -> &[SqlValue] { &self.values }

  /// Value of `column`, or `None` if the row has no such column.
  pub fn get(&self, column: &str) -> Option<&SqlValue> {
    let idx = self.columns.iter().position(|c| c == column)?;
    self.values.get(idx)
  }

  pub fn get_str(&self, column: &str) -> Option<&str> {
    self.get(column).and_then(SqlValue::as_str)
  }

  pub fn get_i64(&self, column: &str) -> Option<i64> {
    self.get(column).and_then(SqlValue::as_i64)
  }

  pub fn get_f64(&self, column: &str) -> Option<f64> {
    self.get(column).and_then(SqlValue::as_f64)
  }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

/// Owns the run's one SQLite connection.
///
/// Once [`close`](Self::close) has been called every operation returns
/// [`Error::Closed`]; the manager never reconnects on its own. Dropping the
/// manager also releases the connection.
pub struct DatabaseManager {
  conn: Option<Connection>,
  span: Span,
}

impl DatabaseManager {
  /// Open (or create) the database file at `path`. The schema is not applied
  /// until [`init_schema`](Self::init_schema) is called.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    let span = tracing::info_span!("database", path = %path.display());
    Ok(Self { conn: Some(conn), span })
  }

  /// Open an in-memory database, useful for testing.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    let span = tracing::info_span!("database", path = ":memory:");
    Ok(Self { conn: Some(conn), span })
  }

  /// Replace the span this manager records its events under.
  pub fn with_span(mut self, span: Span) -> Self {
    self.span = span;
    self
  }

  /// Open the database at `path`, hand it to `f`, and release the connection
  /// afterwards regardless of how `f` returned. `f` may close the manager
  /// itself.
  pub fn scoped<T, E, F>(path: impl AsRef<Path>, f: F) -> Result<T, E>
  where
    F: FnOnce(&mut Self) -> Result<T, E>,
    E: From<Error>,
  {
    let mut db = Self::open(path)?;
    let outcome = f(&mut db);
    let closed = if db.is_open() { db.close() } else { Ok(()) };
    let value = outcome?;
    closed?;
    Ok(value)
  }

  pub fn is_open(&self) -> bool { self.conn.is_some() }

  /// Release the connection. Calling this twice is an error.
  pub fn close(&mut self) -> Result<()> {
    let _entered = self.span.enter();
    let conn = self.conn.take().ok_or(Error::Closed)?;
    match conn.close() {
      Ok(()) => {
        tracing::debug!("connection closed");
        Ok(())
      }
      Err((conn, e)) => {
        self.conn = Some(conn);
        Err(e.into())
      }
    }
  }

  fn conn(&self) -> Result<&Connection> { self.conn.as_ref().ok_or(Error::Closed) }

  // ── Schema ──────────────────────────────────────────────────────────────

  /// Apply the embedded [`SCHEMA`].
  pub fn init_schema(&self) -> Result<()> { self.init_schema_from(SCHEMA) }

  /// Apply the DDL script stored at `path`.
  pub fn init_schema_file(&self, path: impl AsRef<Path>) -> Result<()> {
    let sql = std::fs::read_to_string(path)?;
    self.init_schema_from(&sql)
  }

  /// Apply an arbitrary DDL script. A malformed script is fatal.
  pub fn init_schema_from(&self, sql: &str) -> Result<()> {
    let _entered = self.span.enter();
    self.conn()?.execute_batch(sql).map_err(Error::Schema)?;
    tracing::info!("schema applied");
    Ok(())
  }

  pub fn table_exists(&self, name: &str) -> Result<bool> {
    self.object_exists("table", name)
  }

  pub fn view_exists(&self, name: &str) -> Result<bool> {
    self.object_exists("view", name)
  }

  fn object_exists(&self, kind: &str, name: &str) -> Result<bool> {
    let found = self
      .conn()?
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2",
        rusqlite::params![kind, name],
        |_| Ok(true),
      )
      .optional()?;
    Ok(found.unwrap_or(false))
  }

  // ── Writes ──────────────────────────────────────────────────────────────

  /// Insert one row into its entity's table.
  ///
  /// Returns `Ok(false)` when the row is rejected by a constraint (duplicate
  /// key, `NOT NULL`, type mismatch); other failures are errors.
  pub fn insert_record(&self, record: &impl Row) -> Result<bool> {
    let _entered = self.span.enter();
    self.insert_row(self.conn()?, record)
  }

  /// Insert `records` in order inside one transaction and return how many
  /// were written. Rejected rows are logged and skipped; they never abort
  /// the batch.
  pub fn insert_records<R: Row>(&self, records: &[R]) -> Result<usize> {
    let _entered = self.span.enter();
    let conn = self.conn()?;
    let tx = conn.unchecked_transaction()?;

    let mut inserted = 0;
    for record in records {
      if self.insert_row(&tx, record)? {
        inserted += 1;
      }
    }
    tx.commit()?;

    let skipped = records.len() - inserted;
    if skipped > 0 {
      tracing::warn!(inserted, skipped, "batch insert skipped rejected rows");
    } else {
      tracing::debug!(inserted, "batch inserted");
    }
    Ok(inserted)
  }

  fn insert_row(&self, conn: &Connection, record: &impl Row) -> Result<bool> {
    let entity = record.entity();
    let mut stmt = conn.prepare_cached(&insert_sql(entity))?;
    let params: Vec<_> = record.values().into_iter().map(encode_value).collect();

    match stmt.execute(rusqlite::params_from_iter(params)) {
      Ok(_) => Ok(true),
      Err(e) if is_row_rejection(&e) => {
        tracing::warn!(table = entity.table(), error = %e, "row rejected");
        Ok(false)
      }
      Err(e) => Err(e.into()),
    }
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// Run a read-only, parameterised query. Statements that would modify the
  /// database are refused with [`Error::NotReadOnly`].
  pub fn execute_query(&self, sql: &str, params: impl Params) -> Result<Vec<QueryRow>> {
    let _entered = self.span.enter();
    let mut stmt = self.conn()?.prepare(sql)?;
    if !stmt.readonly() {
      return Err(Error::NotReadOnly(sql.to_owned()));
    }

    let columns: Arc<[String]> =
      stmt.column_names().into_iter().map(str::to_owned).collect();
    let width = columns.len();

    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
      let values = (0..width)
        .map(|i| row.get_ref(i).map(decode_value))
        .collect::<rusqlite::Result<Vec<_>>>()?;
      out.push(QueryRow { columns: Arc::clone(&columns), values });
    }
    Ok(out)
  }

  /// Row count of an existing table. The name is checked against the schema
  /// before it is used in SQL.
  pub fn get_table_count(&self, table: &str) -> Result<i64> {
    if !self.table_exists(table)? {
      return Err(Error::UnknownTable(table.to_owned()));
    }
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    Ok(self.conn()?.query_row(&sql, [], |r| r.get(0))?)
  }

  /// Row counts of every entity table, keyed by table name.
  pub fn table_counts(&self) -> Result<std::collections::BTreeMap<String, i64>> {
    EntityType::all()
      .map(|e| -> Result<(String, i64)> {
        Ok((e.table().to_owned(), self.get_table_count(e.table())?))
      })
      .collect()
  }

  // ── Build metadata ──────────────────────────────────────────────────────

  /// Value stored under `key`. An unset key is `None` and logged as a
  /// warning.
  pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
    let _entered = self.span.enter();
    let value = self
      .conn()?
      .query_row(
        "SELECT value FROM bvl_meta WHERE key = ?1",
        rusqlite::params![key],
        |r| r.get::<_, Option<String>>(0),
      )
      .optional()?
      .flatten();
    if value.is_none() {
      tracing::warn!(key, "meta key not set");
    }
    Ok(value)
  }

  pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
    self.conn()?.execute(
      "INSERT OR REPLACE INTO bvl_meta (key, value) VALUES (?1, ?2)",
      rusqlite::params![key, value],
    )?;
    Ok(())
  }

  pub(crate) fn span(&self) -> &Span { &self.span }

  pub(crate) fn connection(&self) -> Result<&Connection> { self.conn() }
}

fn is_row_rejection(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if matches!(f.code, ErrorCode::ConstraintViolation | ErrorCode::TypeMismatch)
  )
}
