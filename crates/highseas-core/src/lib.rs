//! Core library for High Seas data access.
//!
//! Fetches people, ships and shop orders from the tabular record API,
//! groups ships into reship lineages, and caches results:
//!
//! - `api`: `RecordSource` seam, HTTP client, filter formulas
//! - `models`: typed records and the field coercions that build them
//! - `grouping`: the ship lineage engine
//! - `cache`: in-memory TTL cache and persistent order snapshots
//! - `service`: `DataService`, the public query functions

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod grouping;
pub mod models;
pub mod service;
pub mod shop;

pub use config::Config;
pub use error::DataError;
pub use grouping::{group_ships, OrphanPolicy, ShipGroup};
pub use service::{DataService, ServiceSettings};
