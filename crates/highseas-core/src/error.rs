use thiserror::Error;

/// Errors surfaced by the query layer.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Malformed {table} record {id}: field `{field}` {reason}")]
    MalformedRecord {
        table: &'static str,
        id: String,
        field: &'static str,
        reason: String,
    },

    /// Record source call failed. Propagated without retry.
    #[error("Upstream request failed: {0:#}")]
    Upstream(#[source] anyhow::Error),

    #[error("Order store failed: {0:#}")]
    Store(#[source] anyhow::Error),

    #[error("Shop catalog unavailable: {0:#}")]
    Catalog(#[source] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataError {
    pub fn malformed(
        table: &'static str,
        id: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        DataError::MalformedRecord {
            table,
            id: id.into(),
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
