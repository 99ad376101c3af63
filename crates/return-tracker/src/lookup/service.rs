use super::query::SearchQuery;
use super::state::{ProjectedSnapshot, TrackerState};
use super::views::{QueueEntryView, StatusView};
use super::LookupError;
use crate::queue::{assign_ranks, project_records, ProjectionError, ProjectionSettings};
use crate::snapshot::{retrieve_snapshot, Snapshot, SnapshotSource};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const NOT_FOUND_MESSAGE: &str = "No record found. Please check your information and try again.";

/// Result of a well-formed search. A miss is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found { status: Box<StatusView> },
    NotFound { message: &'static str },
}

impl SearchOutcome {
    pub fn status(&self) -> Option<&StatusView> {
        match self {
            Self::Found { status } => Some(status),
            Self::NotFound { .. } => None,
        }
    }
}

/// Ranks and dates a raw snapshot.
pub fn project_snapshot(
    snapshot: Snapshot,
    today: NaiveDate,
    settings: &ProjectionSettings,
) -> Result<ProjectedSnapshot, ProjectionError> {
    let ranked = assign_ranks(&snapshot.records);
    let records = project_records(&ranked, today, settings)?;
    Ok(ProjectedSnapshot {
        records,
        origin: snapshot.origin,
        retrieved_at: snapshot.retrieved_at,
        projected_from: today,
    })
}

pub fn queue_listing(snapshot: &ProjectedSnapshot) -> Vec<QueueEntryView> {
    snapshot.records.iter().map(QueueEntryView::from).collect()
}

/// Answers status lookups against a fresh retrieval from the configured source.
#[derive(Clone)]
pub struct StatusLookup {
    source: Arc<dyn SnapshotSource>,
    settings: ProjectionSettings,
}

impl StatusLookup {
    pub fn new(source: Arc<dyn SnapshotSource>, settings: ProjectionSettings) -> Self {
        Self { source, settings }
    }

    /// Retrieves (falling back to demo data on failure), ranks, and dates a new snapshot.
    pub async fn retrieve(&self, today: NaiveDate) -> Result<ProjectedSnapshot, LookupError> {
        let snapshot = retrieve_snapshot(self.source.as_ref()).await;
        Ok(project_snapshot(snapshot, today, &self.settings)?)
    }

    /// Refreshes the snapshot held by `state`.
    pub async fn refresh(
        &self,
        state: TrackerState,
        today: NaiveDate,
    ) -> (TrackerState, Result<Arc<ProjectedSnapshot>, LookupError>) {
        let (state, ticket) = state.begin_refresh();
        let retrieved = self.retrieve(today).await.map(Arc::new);
        state.finish_refresh(ticket, retrieved)
    }

    /// Validates `raw_query`, retrieves a fresh snapshot, and searches it.
    ///
    /// Invalid queries are rejected before the source is touched. The search always runs against
    /// the snapshot this call retrieved, even if a newer refresh has meanwhile been applied to the
    /// state.
    pub async fn search(
        &self,
        state: TrackerState,
        raw_query: &str,
        today: NaiveDate,
    ) -> (TrackerState, Result<SearchOutcome, LookupError>) {
        let query = match SearchQuery::parse(raw_query) {
            Ok(query) => query,
            Err(err) => return (state, Err(err)),
        };

        let state = state.remember_search(&query);
        let (state, refreshed) = self.refresh(state, today).await;
        let outcome = refreshed.map(|snapshot| search_snapshot(&snapshot, &query));
        (state, outcome)
    }
}

pub fn search_snapshot(snapshot: &ProjectedSnapshot, query: &SearchQuery) -> SearchOutcome {
    match snapshot.find(query) {
        Some(entry) => {
            info!(origin = ?snapshot.origin, rank = entry.rank(), "status lookup matched");
            SearchOutcome::Found {
                status: Box::new(StatusView::build(entry, snapshot)),
            }
        }
        None => {
            info!(origin = ?snapshot.origin, "status lookup found no record");
            SearchOutcome::NotFound {
                message: NOT_FOUND_MESSAGE,
            }
        }
    }
}
