use crate::queue::{Record, ReturnStatus};

/// Sample records served when the real data source cannot be reached. One record per status, so
/// every branch of the status page stays demonstrable.
pub fn fallback_records() -> Vec<Record> {
    const SAMPLES: &[(&str, &str, &str, ReturnStatus, Option<i64>, &str)] = &[
        (
            "001",
            "John Smith",
            "john.smith@example.com",
            ReturnStatus::InProgress,
            None,
            "5/20/2025",
        ),
        (
            "002",
            "Sarah Johnson",
            "sarah.j@example.com",
            ReturnStatus::InQueue,
            None,
            "6/5/2025",
        ),
        (
            "003",
            "Michael Davis",
            "mdavis@example.com",
            ReturnStatus::Review,
            None,
            "5/18/2025",
        ),
        (
            "004",
            "Jennifer Williams",
            "jwilliams@example.com",
            ReturnStatus::AwaitingDocuments,
            None,
            "5/25/2025",
        ),
        (
            "005",
            "Robert Garcia",
            "robert.g@example.com",
            ReturnStatus::Completed,
            Some(0),
            "5/12/2025",
        ),
    ];

    SAMPLES
        .iter()
        .map(|(id, name, email, status, manual_position, completion)| Record {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            status: *status,
            manual_position: *manual_position,
            source_completion_date: Some(completion.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_status_once() {
        let records = fallback_records();
        assert_eq!(records.len(), 5);
        for status in ReturnStatus::ordered() {
            assert_eq!(
                records.iter().filter(|record| record.status == status).count(),
                1,
                "{status:?}"
            );
        }
    }
}
