use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Processing stage of a tracked return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    InProgress,
    Review,
    AwaitingDocuments,
    InQueue,
    Completed,
}

impl ReturnStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::InProgress,
            Self::Review,
            Self::AwaitingDocuments,
            Self::InQueue,
            Self::Completed,
        ]
    }

    /// Lower numbers are worked first.
    pub const fn priority(self) -> u8 {
        match self {
            Self::InProgress => 1,
            Self::Review => 2,
            Self::AwaitingDocuments => 3,
            Self::InQueue => 4,
            Self::Completed => 5,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::AwaitingDocuments => "Awaiting Documents",
            Self::InQueue => "In Queue",
            Self::Completed => "Completed",
        }
    }

    /// Maps a spreadsheet status label onto the closed set of stages.
    ///
    /// Matching ignores case and surrounding whitespace. Any label that is blank or not one of the
    /// five known stages is normalized to [`ReturnStatus::InQueue`]; the original text is not kept,
    /// so callers that display the status will show "In Queue" for such rows.
    pub fn from_label(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or(Self::InQueue)
    }

    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// One tracked return as it arrives from the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: ReturnStatus,
    /// Manually assigned queue slot. Only non-negative values override automatic ranking.
    pub manual_position: Option<i64>,
    pub source_completion_date: Option<String>,
}

impl Record {
    /// The manual override if it is usable, i.e. present and not negative.
    pub fn manual_override(&self) -> Option<u64> {
        self.manual_position
            .and_then(|position| u64::try_from(position).ok())
    }
}

/// A record annotated with its display rank. Rank 0 means "out of the queue" (Completed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: Record,
    pub rank: u64,
}

impl RankedRecord {
    pub fn is_manually_positioned(&self) -> bool {
        self.record.manual_override().is_some()
    }
}

/// A ranked record with the projected completion date. The date is absent only for Completed
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedRecord {
    #[serde(flatten)]
    pub ranked: RankedRecord,
    pub projected_completion_date: Option<NaiveDate>,
}

impl ProjectedRecord {
    pub fn record(&self) -> &Record {
        &self.ranked.record
    }

    pub fn rank(&self) -> u64 {
        self.ranked.rank
    }

    pub fn status(&self) -> ReturnStatus {
        self.ranked.record.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_accepts_known_labels_case_insensitively() {
        assert_eq!(ReturnStatus::from_label("In Progress"), ReturnStatus::InProgress);
        assert_eq!(ReturnStatus::from_label("  review "), ReturnStatus::Review);
        assert_eq!(
            ReturnStatus::from_label("AWAITING DOCUMENTS"),
            ReturnStatus::AwaitingDocuments
        );
        assert_eq!(ReturnStatus::from_label("completed"), ReturnStatus::Completed);
    }

    #[test]
    fn unknown_and_blank_labels_normalize_to_in_queue() {
        assert_eq!(ReturnStatus::from_label(""), ReturnStatus::InQueue);
        assert_eq!(ReturnStatus::from_label("On Hold"), ReturnStatus::InQueue);
    }

    #[test]
    fn negative_manual_position_is_not_an_override() {
        let mut record = Record {
            id: "1".to_string(),
            name: "Ana Ruiz".to_string(),
            email: "ana@example.com".to_string(),
            status: ReturnStatus::InQueue,
            manual_position: Some(-2),
            source_completion_date: None,
        };
        assert_eq!(record.manual_override(), None);

        record.manual_position = Some(0);
        assert_eq!(record.manual_override(), Some(0));
    }
}
