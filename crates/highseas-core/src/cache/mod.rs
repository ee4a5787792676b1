//! Caching for record-source reads.
//!
//! Two independent layers:
//! - `TtlCache`: short-lived in-memory cache for ship groups and people
//! - `OrderStore`: persistent per-user snapshots of shop orders, written once
//!   and then served as-is

pub mod orders;
pub mod ttl;

pub use orders::{JsonFileOrderStore, MemoryOrderStore, OrderStore};
pub use ttl::TtlCache;
