//! Mapping from spreadsheet rows to [`Record`]s.
//!
//! Columns: 0 id, 1 name, 2 email, 3 status, 4 manual position, 5 completion date. Missing trailing
//! cells read as blank.

use crate::queue::{Record, ReturnStatus};

const ID: usize = 0;
const NAME: usize = 1;
const EMAIL: usize = 2;
const STATUS: usize = 3;
const POSITION: usize = 4;
const COMPLETION: usize = 5;

/// Builds a record from one row, or `None` when the row has no id or no name.
pub fn record_from_row(row: &[String]) -> Option<Record> {
    let cell = |index: usize| row.get(index).map(|value| value.trim()).unwrap_or("");

    let id = cell(ID);
    let name = cell(NAME);
    if id.is_empty() || name.is_empty() {
        return None;
    }

    let completion = cell(COMPLETION);
    Some(Record {
        id: id.to_string(),
        name: name.to_string(),
        email: cell(EMAIL).to_string(),
        status: ReturnStatus::from_label(cell(STATUS)),
        manual_position: parse_position(cell(POSITION)),
        source_completion_date: (!completion.is_empty()).then(|| completion.to_string()),
    })
}

pub fn records_from_rows(rows: impl IntoIterator<Item = Vec<String>>) -> Vec<Record> {
    rows.into_iter()
        .filter_map(|row| record_from_row(&row))
        .collect()
}

/// Blank or non-numeric cells carry no manual position. Sheets sometimes renders whole numbers as
/// `3.0`, which still counts.
fn parse_position(value: &str) -> Option<i64> {
    if value.is_empty() {
        return None;
    }
    if let Ok(position) = value.parse::<i64>() {
        return Some(position);
    }

    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite() && number.fract() == 0.0)
        .filter(|number| number.abs() <= i64::MAX as f64)
        .map(|number| number as i64)
}
