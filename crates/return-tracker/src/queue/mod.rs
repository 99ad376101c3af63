//! Queue ranking and completion-date projection over a snapshot of tracked returns.

pub mod domain;
mod projection;
mod ranking;

pub use domain::{ProjectedRecord, RankedRecord, Record, ReturnStatus};
pub use projection::{
    project_date, project_records, ProjectionError, ProjectionSettings, WorkingWeekdays,
};
pub use ranking::assign_ranks;
