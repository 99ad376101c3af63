use super::state::ProjectedSnapshot;
use crate::queue::{ProjectedRecord, ReturnStatus};
use chrono::NaiveDate;
use serde::Serialize;

const AWAITING_DOCUMENTS_NOTE: &str =
    "Your return will be processed within 5 business days after we receive your documents.";
const PENDING_DOCUMENTS: &str = "Pending document receipt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Live,
    Demo,
}

/// The completion line shown under a status, when one is shown at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionView {
    pub label: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

/// What a client sees for their own return. The record id is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub name: String,
    pub status: ReturnStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionView>,
    pub progress_pct: f32,
    pub data_source: DataSource,
    pub last_updated: String,
}

impl StatusView {
    pub fn build(entry: &ProjectedRecord, snapshot: &ProjectedSnapshot) -> Self {
        let status = entry.status();
        Self {
            name: entry.record().name.clone(),
            status,
            status_label: status.label(),
            position: position_display(entry),
            completion: completion_display(entry),
            progress_pct: progress_pct(status, entry.rank()),
            data_source: if snapshot.is_demo() {
                DataSource::Demo
            } else {
                DataSource::Live
            },
            last_updated: snapshot.last_updated_label(),
        }
    }
}

/// One row of the full queue listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntryView {
    pub name: String,
    pub status_label: &'static str,
    pub rank: u64,
    pub manual: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_completion: Option<NaiveDate>,
}

impl From<&ProjectedRecord> for QueueEntryView {
    fn from(entry: &ProjectedRecord) -> Self {
        Self {
            name: entry.record().name.clone(),
            status_label: entry.status().label(),
            rank: entry.rank(),
            manual: entry.ranked.is_manually_positioned(),
            projected_completion: entry.projected_completion_date,
        }
    }
}

/// `#n`, preferring the spreadsheet's manual position. Hidden for Completed returns.
fn position_display(entry: &ProjectedRecord) -> Option<String> {
    if entry.status().is_completed() {
        return None;
    }
    let position = entry.record().manual_override().unwrap_or(entry.rank());
    Some(format!("#{position}"))
}

fn completion_display(entry: &ProjectedRecord) -> Option<CompletionView> {
    let source_date = entry.record().source_completion_date.clone();
    match entry.status() {
        ReturnStatus::InQueue | ReturnStatus::Completed => None,
        ReturnStatus::AwaitingDocuments => Some(CompletionView {
            label: "Timeline",
            value: source_date.unwrap_or_else(|| PENDING_DOCUMENTS.to_string()),
            note: Some(AWAITING_DOCUMENTS_NOTE),
        }),
        ReturnStatus::InProgress | ReturnStatus::Review => {
            let value = source_date.or_else(|| {
                entry
                    .projected_completion_date
                    .map(|date| date.format("%-m/%-d/%Y").to_string())
            })?;
            Some(CompletionView {
                label: "Estimated Completion",
                value,
                note: None,
            })
        }
    }
}

/// Rough progress bar fill. Queued returns fill up to 20% as they approach the front.
fn progress_pct(status: ReturnStatus, rank: u64) -> f32 {
    match status {
        ReturnStatus::Completed => 100.0,
        ReturnStatus::Review => 80.0,
        ReturnStatus::InProgress => 60.0,
        ReturnStatus::AwaitingDocuments => 30.0,
        ReturnStatus::InQueue => {
            let pct = (1.0 - rank as f32 / 100.0) * 20.0;
            pct.clamp(0.0, 20.0)
        }
    }
}
