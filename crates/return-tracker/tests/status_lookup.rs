use async_trait::async_trait;
use chrono::NaiveDate;
use return_tracker::lookup::{
    DataSource, LookupError, SearchOutcome, StatusLookup, TrackerState,
};
use return_tracker::queue::{ProjectionSettings, Record, ReturnStatus};
use return_tracker::snapshot::{SnapshotError, SnapshotOrigin, SnapshotSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingSource {
    records: Option<Vec<Record>>,
    fetches: AtomicUsize,
}

impl CountingSource {
    fn serving(records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self {
            records: Some(records),
            fetches: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            records: None,
            fetches: AtomicUsize::new(0),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for CountingSource {
    fn origin(&self) -> SnapshotOrigin {
        SnapshotOrigin::Relay
    }

    async fn fetch_records(&self) -> Result<Vec<Record>, SnapshotError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.records.clone().ok_or_else(|| SnapshotError::Status {
            status: 500,
            message: "Failed to fetch data".to_string(),
        })
    }
}

fn record(id: &str, name: &str, email: &str, status: ReturnStatus) -> Record {
    Record {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        status,
        manual_position: None,
        source_completion_date: None,
    }
}

fn office_records() -> Vec<Record> {
    vec![
        record("1", "Jane Doe", "Jane.Doe@Example.com", ReturnStatus::InQueue),
        record("2", "Omar Haddad", "omar@example.com", ReturnStatus::InProgress),
        record("3", "Lena Fischer", "", ReturnStatus::InQueue),
    ]
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 12).expect("valid date")
}

#[tokio::test]
async fn email_lookup_ignores_case_and_reports_queue_position() {
    let source = CountingSource::serving(office_records());
    let lookup = StatusLookup::new(source.clone(), ProjectionSettings::default());

    let (state, outcome) = lookup
        .search(TrackerState::new(), "jane.doe@EXAMPLE.com", monday())
        .await;
    let outcome = outcome.expect("lookup succeeds");
    let status = outcome.status().expect("record found");

    assert_eq!(status.name, "Jane Doe");
    assert_eq!(status.status, ReturnStatus::InQueue);
    assert_eq!(status.position.as_deref(), Some("#2"));
    assert_eq!(status.data_source, DataSource::Live);
    assert_eq!(state.search_term(), Some("jane.doe@example.com"));
    assert!(!state.is_refreshing());
    assert_eq!(source.fetches(), 1);
}

#[tokio::test]
async fn invalid_queries_never_reach_the_source() {
    let source = CountingSource::serving(office_records());
    let lookup = StatusLookup::new(source.clone(), ProjectionSettings::default());

    let (state, outcome) = lookup.search(TrackerState::new(), "jane", monday()).await;
    assert!(matches!(outcome, Err(LookupError::Validation(_))));
    assert!(state.search_term().is_none());
    assert!(state.snapshot().is_none());

    let (_, outcome) = lookup.search(state, "   ", monday()).await;
    assert!(matches!(outcome, Err(LookupError::Validation(_))));
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn every_search_retrieves_a_fresh_snapshot() {
    let source = CountingSource::serving(office_records());
    let lookup = StatusLookup::new(source.clone(), ProjectionSettings::default());

    let (state, _) = lookup.search(TrackerState::new(), "Omar Haddad", monday()).await;
    let (state, outcome) = lookup.search(state, "Lena Fischer", monday()).await;

    assert!(outcome.expect("lookup succeeds").status().is_some());
    assert_eq!(source.fetches(), 2);
    assert_eq!(state.search_term(), Some("lena fischer"));
}

#[tokio::test]
async fn unreachable_source_serves_demo_data() {
    let lookup = StatusLookup::new(CountingSource::failing(), ProjectionSettings::default());

    let (state, outcome) = lookup
        .search(TrackerState::new(), "john.smith@example.com", monday())
        .await;
    let status = outcome
        .expect("fallback never errors")
        .status()
        .cloned()
        .expect("demo record found");

    assert_eq!(status.name, "John Smith");
    assert_eq!(status.data_source, DataSource::Demo);
    assert!(status.last_updated.ends_with("(DEMO DATA)"));
    assert!(state.snapshot().expect("snapshot held").is_demo());

    let (_, outcome) = lookup
        .search(state, "Nobody Here", monday())
        .await;
    assert!(matches!(
        outcome.expect("lookup succeeds"),
        SearchOutcome::NotFound { .. }
    ));
}

#[tokio::test]
async fn blank_emails_cannot_be_matched() {
    let lookup = StatusLookup::new(
        CountingSource::serving(office_records()),
        ProjectionSettings::default(),
    );

    let (_, outcome) = lookup.search(TrackerState::new(), "@", monday()).await;
    assert!(outcome.expect("lookup succeeds").status().is_none());
}

#[tokio::test]
async fn oversized_manual_position_does_not_break_other_lookups() {
    let mut far_off = record("9", "Far Off", "far@example.com", ReturnStatus::InQueue);
    far_off.manual_position = Some(1_000_000_000);
    let mut records = vec![record(
        "1",
        "Jane Doe",
        "jane@example.com",
        ReturnStatus::InProgress,
    )];
    records.push(far_off);
    let lookup = StatusLookup::new(
        CountingSource::serving(records),
        ProjectionSettings::default(),
    );

    let (state, outcome) = lookup
        .search(TrackerState::new(), "jane@example.com", monday())
        .await;
    let status = outcome
        .expect("lookup succeeds")
        .status()
        .cloned()
        .expect("jane found");
    assert_eq!(status.name, "Jane Doe");
    assert_eq!(
        status.completion.expect("completion shown").value,
        "5/13/2025"
    );

    let snapshot = state.snapshot().expect("snapshot held");
    let pinned = snapshot
        .records
        .iter()
        .find(|entry| entry.record().id == "9")
        .expect("far-off record kept");
    assert_eq!(pinned.projected_completion_date, Some(NaiveDate::MAX));

    let (_, outcome) = lookup.search(state, "Far Off", monday()).await;
    assert!(outcome.expect("lookup succeeds").status().is_some());
}
