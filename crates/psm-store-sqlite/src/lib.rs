//! SQLite backend for the BVL plant-protection dataset.
//!
//! [`DatabaseManager`] owns the single connection of a build run: it applies
//! the schema, writes mapped rows, answers lookups, and backfills the
//! display columns of link tables once their reference tables are loaded.

mod encode;
mod enrich;
mod schema;
mod store;

pub mod error;

pub use enrich::{EnrichmentPass, EnrichmentReport};
pub use error::{Error, Result};
pub use schema::SCHEMA;
pub use store::{DatabaseManager, QueryRow};
