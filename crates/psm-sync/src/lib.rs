//! Build pipeline for the BVL plant-protection SQLite artifact.
//!
//! Pulls raw records from the BVL PSM API (or local dumps), maps them with
//! [`psm_core`], persists them with [`psm_store_sqlite`], and publishes the
//! database together with compressed copies and a `manifest.json`.

pub mod compress;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod pipeline;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use pipeline::{BuildSummary, run};
