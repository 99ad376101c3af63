use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use return_tracker::lookup::{LookupError, ProjectedSnapshot, StatusLookup, TrackerState};
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) lookup: StatusLookup,
    pub(crate) tracker: SharedTracker,
}

/// Tracker state shared by request handlers and the background refresh.
///
/// The lock is only held to swap whole values, never across a retrieval.
#[derive(Clone, Default)]
pub(crate) struct SharedTracker {
    inner: Arc<Mutex<TrackerState>>,
}

impl SharedTracker {
    pub(crate) fn update<R>(&self, f: impl FnOnce(TrackerState) -> (TrackerState, R)) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, result) = f(std::mem::take(&mut *guard));
        *guard = next;
        result
    }

    pub(crate) fn current(&self) -> TrackerState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Retrieves a new snapshot under a fresh ticket and offers it to the shared state.
    pub(crate) async fn refresh(
        &self,
        lookup: &StatusLookup,
        today: NaiveDate,
    ) -> Result<Arc<ProjectedSnapshot>, LookupError> {
        let ticket = self.update(TrackerState::begin_refresh);
        let retrieved = lookup.retrieve(today).await.map(Arc::new);
        self.update(|state| state.finish_refresh(ticket, retrieved))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
