//! Column values and the [`Row`] trait shared by every record type.
//!
//! The store crate converts [`SqlValue`] into its driver's value type; this
//! crate never sees a database handle.

use crate::EntityType;

/// A single scalar column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl SqlValue {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      _ => None,
    }
  }

  /// Integers widen to `f64`.
  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Real(f) => Some(*f),
      Self::Integer(i) => Some(*i as f64),
      _ => None,
    }
  }
}

impl From<i64> for SqlValue {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<f64> for SqlValue {
  fn from(v: f64) -> Self { Self::Real(v) }
}

impl From<String> for SqlValue {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for SqlValue {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

/// A normalized row that knows where it is stored.
pub trait Row {
  fn entity(&self) -> EntityType;

  /// Column values, positionally matching `self.entity().columns()`.
  fn values(&self) -> Vec<SqlValue>;
}

impl<R: Row + ?Sized> Row for &R {
  fn entity(&self) -> EntityType { (**self).entity() }

  fn values(&self) -> Vec<SqlValue> { (**self).values() }
}
