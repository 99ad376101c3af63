use super::domain::{RankedRecord, Record};
use tracing::debug;

/// Assigns a display rank to every record and returns them in display order.
///
/// Records without a usable manual position are ranked automatically: sorted by status priority
/// and then by their position in `records`, non-Completed ones receive `1, 2, 3, ...` and Completed
/// ones receive 0 without consuming a slot. Records with a manual position (zero included) are
/// sorted by that value and keep it verbatim as their rank, except Completed records which get 0.
///
/// Manual ranks are not deduplicated against automatic ones, so a manual rank may collide with an
/// automatic rank. The returned order is by status priority and then rank; it only affects display.
pub fn assign_ranks(records: &[Record]) -> Vec<RankedRecord> {
    let (mut manual, mut automatic): (Vec<_>, Vec<_>) = records
        .iter()
        .enumerate()
        .partition(|(_, record)| record.manual_override().is_some());

    automatic.sort_by_key(|(index, record)| (record.status.priority(), *index));
    manual.sort_by_key(|(index, record)| (record.manual_override(), *index));

    let mut next_rank: u64 = 1;
    let mut ranked: Vec<RankedRecord> = automatic
        .into_iter()
        .map(|(_, record)| {
            let rank = if record.status.is_completed() {
                0
            } else {
                let rank = next_rank;
                next_rank += 1;
                rank
            };
            RankedRecord {
                record: record.clone(),
                rank,
            }
        })
        .collect();
    let automatic_count = ranked.len();

    ranked.extend(manual.into_iter().map(|(_, record)| {
        let rank = if record.status.is_completed() {
            0
        } else {
            record.manual_override().unwrap_or_default()
        };
        RankedRecord {
            record: record.clone(),
            rank,
        }
    }));

    // Stable, so equal (priority, rank) pairs keep automatic-before-manual order.
    ranked.sort_by_key(|entry| (entry.record.status.priority(), entry.rank));

    debug!(
        total = ranked.len(),
        automatic = automatic_count,
        manual = ranked.len() - automatic_count,
        "assigned queue ranks"
    );

    ranked
}
