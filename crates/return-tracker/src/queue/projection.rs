use super::domain::{ProjectedRecord, RankedRecord};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::fmt;
use std::num::NonZeroU32;
use tracing::warn;

const DEFAULT_DAILY_THROUGHPUT: NonZeroU32 = match NonZeroU32::new(5) {
    Some(value) => value,
    None => panic!("default throughput must be non-zero"),
};

/// The set of weekdays on which returns get worked.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkingWeekdays(u8);

impl WorkingWeekdays {
    pub const fn none() -> Self {
        Self(0)
    }

    pub const fn every_day() -> Self {
        Self(0b111_1111)
    }

    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | Self::bit(day))
    }

    /// Adds the weekday with the given ISO number (Monday=1 ... Sunday=7).
    pub fn with_iso_number(self, number: u8) -> Option<Self> {
        let day = match number {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            7 => Weekday::Sun,
            _ => return None,
        };
        Some(self.with(day))
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }
}

impl Default for WorkingWeekdays {
    fn default() -> Self {
        Self::none()
            .with(Weekday::Mon)
            .with(Weekday::Tue)
            .with(Weekday::Wed)
            .with(Weekday::Thu)
            .with(Weekday::Fri)
    }
}

impl fmt::Debug for WorkingWeekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        f.debug_set()
            .entries(days.into_iter().filter(|day| self.contains(*day)))
            .finish()
    }
}

/// Throughput and calendar used to turn a rank into a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionSettings {
    pub daily_throughput: NonZeroU32,
    pub working_weekdays: WorkingWeekdays,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            daily_throughput: DEFAULT_DAILY_THROUGHPUT,
            working_weekdays: WorkingWeekdays::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("invalid argument: rank must be non-negative, got {0}")]
    NegativeRank(i64),
    #[error("invalid argument: no working weekdays configured to reach rank {rank}")]
    EmptyWorkingWeek { rank: i64 },
    #[error("projected completion for rank {rank} falls outside the supported calendar")]
    OutOfRange { rank: i64 },
}

/// Projects the date on which the return at `rank` should be finished.
///
/// `ceil(rank / daily_throughput)` working days are counted forward from `today`, exclusive, and
/// the last one is returned. Rank 0 needs no working days and returns `today` itself.
pub fn project_date(
    rank: i64,
    today: NaiveDate,
    settings: &ProjectionSettings,
) -> Result<NaiveDate, ProjectionError> {
    let rank_value = u64::try_from(rank).map_err(|_| ProjectionError::NegativeRank(rank))?;
    let mut remaining = rank_value.div_ceil(u64::from(settings.daily_throughput.get()));
    if remaining == 0 {
        return Ok(today);
    }

    let days = settings.working_weekdays;
    if days.is_empty() {
        return Err(ProjectionError::EmptyWorkingWeek { rank });
    }

    let per_week = u64::from(days.len());
    let mut current = today;

    // Any seven consecutive days hold exactly `per_week` working days.
    if remaining > per_week {
        let weeks = (remaining - 1) / per_week;
        current = weeks
            .checked_mul(7)
            .and_then(|span| current.checked_add_days(Days::new(span)))
            .ok_or(ProjectionError::OutOfRange { rank })?;
        remaining -= weeks * per_week;
    }

    while remaining > 0 {
        current = current
            .succ_opt()
            .ok_or(ProjectionError::OutOfRange { rank })?;
        if days.contains(current.weekday()) {
            remaining -= 1;
        }
    }

    Ok(current)
}

/// Attaches a projected completion date to every non-Completed record.
///
/// A rank whose projection runs past the last representable date is pinned to [`NaiveDate::MAX`]
/// so one oversized manual position cannot fail the whole snapshot.
pub fn project_records(
    ranked: &[RankedRecord],
    today: NaiveDate,
    settings: &ProjectionSettings,
) -> Result<Vec<ProjectedRecord>, ProjectionError> {
    ranked
        .iter()
        .map(|entry| {
            let projected_completion_date = if entry.record.status.is_completed() {
                None
            } else {
                let projected = i64::try_from(entry.rank)
                    .map_err(|_| ProjectionError::OutOfRange { rank: i64::MAX })
                    .and_then(|rank| project_date(rank, today, settings));
                match projected {
                    Ok(date) => Some(date),
                    Err(ProjectionError::OutOfRange { .. }) => {
                        warn!(
                            id = %entry.record.id,
                            rank = entry.rank,
                            "projection past the supported calendar; pinning to the last date"
                        );
                        Some(NaiveDate::MAX)
                    }
                    Err(err) => return Err(err),
                }
            };
            Ok::<_, ProjectionError>(ProjectedRecord {
                ranked: entry.clone(),
                projected_completion_date,
            })
        })
        .collect()
}
