use super::query::SearchQuery;
use super::LookupError;
use crate::queue::ProjectedRecord;
use crate::snapshot::SnapshotOrigin;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::warn;

/// Ranked and dated records from one retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSnapshot {
    /// In display order.
    pub records: Vec<ProjectedRecord>,
    pub origin: SnapshotOrigin,
    pub retrieved_at: DateTime<Utc>,
    pub projected_from: NaiveDate,
}

impl ProjectedSnapshot {
    /// First record in display order matching the query.
    pub fn find(&self, query: &SearchQuery) -> Option<&ProjectedRecord> {
        self.records
            .iter()
            .find(|entry| query.matches(entry.record()))
    }

    pub fn is_demo(&self) -> bool {
        self.origin.is_demo()
    }

    pub fn last_updated_label(&self) -> String {
        let stamp = self.retrieved_at.format("%Y-%m-%d %H:%M:%S UTC");
        if self.is_demo() {
            format!("{stamp} (DEMO DATA)")
        } else {
            stamp.to_string()
        }
    }
}

/// Identifies one refresh attempt. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Everything the shell remembers between operations.
///
/// Operations consume the state and hand back the next one. Refreshes are sequenced: each
/// [`begin_refresh`](TrackerState::begin_refresh) issues a newer ticket, and a snapshot is only
/// applied if its ticket is newer than the one behind the snapshot already held. An old response
/// that arrives late is dropped instead of replacing fresher data.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    search_term: Option<String>,
    snapshot: Option<Arc<ProjectedSnapshot>>,
    issued: u64,
    applied: u64,
    settled: u64,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn snapshot(&self) -> Option<Arc<ProjectedSnapshot>> {
        self.snapshot.clone()
    }

    /// True while the most recently issued refresh has neither been applied nor given up.
    pub fn is_refreshing(&self) -> bool {
        self.issued > self.settled
    }

    pub fn remember_search(mut self, query: &SearchQuery) -> Self {
        self.search_term = Some(query.as_str().to_string());
        self
    }

    pub fn begin_refresh(mut self) -> (Self, RefreshTicket) {
        self.issued += 1;
        let ticket = RefreshTicket(self.issued);
        (self, ticket)
    }

    /// Installs `snapshot` unless a newer refresh has already been applied. Returns whether it was
    /// installed.
    pub fn apply_snapshot(
        mut self,
        ticket: RefreshTicket,
        snapshot: Arc<ProjectedSnapshot>,
    ) -> (Self, bool) {
        if ticket.0 <= self.applied {
            warn!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding snapshot from superseded refresh"
            );
            return (self, false);
        }

        self.applied = ticket.0;
        self.settled = self.settled.max(ticket.0);
        self.snapshot = Some(snapshot);
        (self, true)
    }

    /// Settles `ticket` with the outcome of its retrieval. A failed retrieval leaves the held
    /// snapshot untouched but still ends the refresh.
    pub fn finish_refresh(
        mut self,
        ticket: RefreshTicket,
        retrieved: Result<Arc<ProjectedSnapshot>, LookupError>,
    ) -> (Self, Result<Arc<ProjectedSnapshot>, LookupError>) {
        match retrieved {
            Ok(snapshot) => {
                let (state, _) = self.apply_snapshot(ticket, snapshot.clone());
                (state, Ok(snapshot))
            }
            Err(err) => {
                warn!(ticket = ticket.0, error = %err, "refresh failed");
                self.settled = self.settled.max(ticket.0);
                (self, Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(origin: SnapshotOrigin) -> Arc<ProjectedSnapshot> {
        Arc::new(ProjectedSnapshot {
            records: Vec::new(),
            origin,
            retrieved_at: Utc::now(),
            projected_from: NaiveDate::from_ymd_opt(2025, 5, 12).expect("valid date"),
        })
    }

    #[test]
    fn late_response_from_older_refresh_is_discarded() {
        let state = TrackerState::new();
        let (state, first) = state.begin_refresh();
        let (state, second) = state.begin_refresh();
        assert!(first < second);
        assert!(state.is_refreshing());

        let (state, applied) = state.apply_snapshot(second, snapshot(SnapshotOrigin::Relay));
        assert!(applied);
        assert!(!state.is_refreshing());

        let (state, applied) = state.apply_snapshot(first, snapshot(SnapshotOrigin::Fallback));
        assert!(!applied);
        let held = state.snapshot().expect("snapshot held");
        assert_eq!(held.origin, SnapshotOrigin::Relay);
    }

    #[test]
    fn in_order_responses_are_all_applied() {
        let (state, first) = TrackerState::new().begin_refresh();
        let (state, applied) = state.apply_snapshot(first, snapshot(SnapshotOrigin::Relay));
        assert!(applied);

        let (state, second) = state.begin_refresh();
        let (state, applied) = state.apply_snapshot(second, snapshot(SnapshotOrigin::Fallback));
        assert!(applied);
        assert!(state.snapshot().expect("snapshot held").is_demo());
    }

    #[test]
    fn demo_snapshots_are_labelled() {
        let label = snapshot(SnapshotOrigin::Fallback).last_updated_label();
        assert!(label.ends_with(" (DEMO DATA)"));
        assert!(!snapshot(SnapshotOrigin::Relay)
            .last_updated_label()
            .contains("DEMO"));
    }

    #[test]
    fn failed_refresh_still_settles() {
        let (state, ticket) = TrackerState::new().begin_refresh();
        let (state, outcome) = state.finish_refresh(
            ticket,
            Err(LookupError::Validation("no working days".to_string())),
        );
        assert!(outcome.is_err());
        assert!(!state.is_refreshing());
        assert!(state.snapshot().is_none());

        let (state, next) = state.begin_refresh();
        assert!(state.is_refreshing());
        let (state, outcome) = state.finish_refresh(next, Ok(snapshot(SnapshotOrigin::Relay)));
        assert!(outcome.is_ok());
        assert!(!state.is_refreshing());
    }
}
