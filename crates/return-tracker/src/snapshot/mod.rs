//! Retrieval of the record snapshot that feeds the queue.
//!
//! A [`SnapshotSource`] produces raw [`Record`]s; [`retrieve_snapshot`] wraps any source so that a
//! failed retrieval is replaced by the fixed demo dataset instead of surfacing an error.

mod csv_export;
mod fallback;
mod relay;
pub mod rows;

pub use csv_export::CsvExportSource;
pub use fallback::fallback_records;
pub use relay::{RelayClient, SheetValues};

use crate::queue::Record;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Where the records of a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    Relay,
    CsvExport,
    Fallback,
}

impl SnapshotOrigin {
    pub const fn is_demo(self) -> bool {
        matches!(self, Self::Fallback)
    }
}

/// Why a retrieval attempt failed. Every variant is recovered by falling back to demo data.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("relay responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("relay payload malformed: {0}")]
    Payload(String),
    #[error("data source returned no rows")]
    Empty,
    #[error("failed to read spreadsheet export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid spreadsheet export: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet export reader stopped: {0}")]
    Interrupted(String),
}

/// Anything able to produce the current list of tracked records.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    fn origin(&self) -> SnapshotOrigin;

    async fn fetch_records(&self) -> Result<Vec<Record>, SnapshotError>;
}

/// One immutable retrieval of the full record set.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub records: Vec<Record>,
    pub origin: SnapshotOrigin,
    pub retrieved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn fallback() -> Self {
        Self {
            records: fallback_records(),
            origin: SnapshotOrigin::Fallback,
            retrieved_at: Utc::now(),
        }
    }
}

/// Fetches from `source`, substituting the demo dataset when the fetch fails.
pub async fn retrieve_snapshot(source: &dyn SnapshotSource) -> Snapshot {
    match source.fetch_records().await {
        Ok(records) => {
            info!(origin = ?source.origin(), rows = records.len(), "snapshot retrieved");
            Snapshot {
                records,
                origin: source.origin(),
                retrieved_at: Utc::now(),
            }
        }
        Err(err) => {
            warn!(
                origin = ?source.origin(),
                error = %err,
                "snapshot retrieval failed; using demo data"
            );
            Snapshot::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait]
    impl SnapshotSource for Unreachable {
        fn origin(&self) -> SnapshotOrigin {
            SnapshotOrigin::Relay
        }

        async fn fetch_records(&self) -> Result<Vec<Record>, SnapshotError> {
            Err(SnapshotError::Status {
                status: 500,
                message: "Failed to fetch data".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn failed_retrieval_is_replaced_by_demo_data() {
        let snapshot = retrieve_snapshot(&Unreachable).await;
        assert_eq!(snapshot.origin, SnapshotOrigin::Fallback);
        assert!(snapshot.origin.is_demo());
        assert_eq!(snapshot.records, fallback_records());
    }
}
