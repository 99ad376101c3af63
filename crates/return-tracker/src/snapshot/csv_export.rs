use super::rows::records_from_rows;
use super::{SnapshotError, SnapshotOrigin, SnapshotSource};
use crate::queue::Record;
use async_trait::async_trait;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads records from a CSV download of the tracking spreadsheet.
///
/// The export uses the same column layout as the relay rows. A header row is expected unless
/// [`CsvExportSource::without_headers`] is used.
#[derive(Debug, Clone)]
pub struct CsvExportSource {
    path: PathBuf,
    has_headers: bool,
}

impl CsvExportSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            has_headers: true,
        }
    }

    pub fn without_headers(mut self) -> Self {
        self.has_headers = false;
        self
    }

    pub fn read_from<R: Read>(reader: R, has_headers: bool) -> Result<Vec<Record>, SnapshotError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            rows.push(row.iter().map(str::to_string).collect::<Vec<_>>());
        }

        if rows.is_empty() {
            return Err(SnapshotError::Empty);
        }
        Ok(records_from_rows(rows))
    }
}

#[async_trait]
impl SnapshotSource for CsvExportSource {
    fn origin(&self) -> SnapshotOrigin {
        SnapshotOrigin::CsvExport
    }

    async fn fetch_records(&self) -> Result<Vec<Record>, SnapshotError> {
        let path = self.path.clone();
        let has_headers = self.has_headers;
        tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(path)?;
            Self::read_from(file, has_headers)
        })
        .await
        .map_err(|err| SnapshotError::Interrupted(err.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::ReturnStatus;
    use std::io::Cursor;

    #[test]
    fn reads_rows_after_header() {
        let csv = "ID,Name,Email,Status,Position,Estimated Completion\n\
12,Omar Haddad,omar@example.com,Review,,6/2/2025\n\
13,Mei Chen,mei@example.com,Completed,0\n";

        let records = CsvExportSource::read_from(Cursor::new(csv), true).expect("csv parses");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, ReturnStatus::Review);
        assert_eq!(records[0].manual_position, None);
        assert_eq!(records[0].source_completion_date.as_deref(), Some("6/2/2025"));
        assert_eq!(records[1].manual_position, Some(0));
        assert_eq!(records[1].source_completion_date, None);
    }

    #[test]
    fn headerless_export_keeps_first_row() {
        let csv = "1,Ana Ruiz,ana@example.com,In Queue\n";
        let records = CsvExportSource::read_from(Cursor::new(csv), false).expect("csv parses");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ana Ruiz");
    }

    #[test]
    fn export_without_rows_is_empty() {
        let csv = "ID,Name,Email,Status,Position,Estimated Completion\n";
        let err = CsvExportSource::read_from(Cursor::new(csv), true).expect_err("no rows");
        assert!(matches!(err, SnapshotError::Empty));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_failure() {
        let source = CsvExportSource::new("./does-not-exist.csv");
        let err = source.fetch_records().await.expect_err("missing file");
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
