//! Client-facing status lookup built on top of the queue and snapshot modules.

mod query;
mod service;
mod state;
pub mod views;

use crate::queue::ProjectionError;

pub use query::SearchQuery;
pub use service::{
    project_snapshot, queue_listing, search_snapshot, SearchOutcome, StatusLookup,
};
pub use state::{ProjectedSnapshot, RefreshTicket, TrackerState};
pub use views::{CompletionView, DataSource, QueueEntryView, StatusView};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The query is malformed; shown to the user as-is.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    InvalidArgument(#[from] ProjectionError),
}
