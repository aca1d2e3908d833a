//! Core types and mapping functions for the BVL plant-protection dataset.
//!
//! This crate has no HTTP or database dependencies. It turns
//! loosely-structured API records into typed rows; persisting them is the job
//! of `psm-store-sqlite`.

pub mod entity;
pub mod error;
pub mod mapper;
pub mod record;
pub mod value;

pub use entity::{EntityType, InsertPolicy};
pub use error::{Error, Result};
pub use mapper::map_record;
pub use record::MappedRecord;
pub use value::{Row, SqlValue};
