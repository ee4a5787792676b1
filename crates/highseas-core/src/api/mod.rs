//! Record source access.
//!
//! `RecordSource` is the seam the query layer talks to; `AirtableClient` is
//! the HTTP implementation. Filter formulas are built in `formula` so user
//! identifiers are always escaped.

pub mod client;
pub mod error;
pub mod formula;
pub mod source;

pub use client::AirtableClient;
pub use error::ApiError;
pub use source::{RawRecord, RecordSource, SelectQuery};
