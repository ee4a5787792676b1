//! The record-source seam.
//!
//! Everything above this trait deals in `RawRecord`s and never knows whether
//! they came over HTTP or from a test fixture.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record as returned by the tabular API, fields untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    pub id: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Parameters for a filtered table read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub filter_formula: String,
    pub max_records: Option<usize>,
}

impl SelectQuery {
    pub fn filter(formula: impl Into<String>) -> Self {
        Self {
            filter_formula: formula.into(),
            max_records: None,
        }
    }

    pub fn max_records(mut self, max: Option<usize>) -> Self {
        self.max_records = max;
        self
    }
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Read all records of `table` matching the query.
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<RawRecord>>;

    /// Read a single record by id.
    async fn find(&self, table: &str, id: &str) -> Result<RawRecord>;
}
