use super::rows::records_from_rows;
use super::{SnapshotError, SnapshotOrigin, SnapshotSource};
use crate::config::RelayConfig;
use crate::queue::Record;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Body returned by the relay: the spreadsheet values range, passed through unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetValues {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl SheetValues {
    /// Every cell as text. Numbers and booleans are rendered, nulls become blank.
    pub fn text_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
    #[serde(default, alias = "details")]
    message: Option<String>,
}

/// HTTP client for the spreadsheet relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(config: &RelayConfig) -> Result<Self, SnapshotError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.url.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch_values(&self) -> Result<SheetValues, SnapshotError> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SnapshotError::Status {
                status: status.as_u16(),
                message: describe_failure(&body),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| SnapshotError::Payload(err.to_string()))
    }
}

fn describe_failure(body: &str) -> String {
    match serde_json::from_str::<RelayErrorBody>(body) {
        Ok(RelayErrorBody {
            error,
            message: Some(message),
        }) => format!("{error}: {message}"),
        Ok(RelayErrorBody { error, .. }) => error,
        Err(_) => body.chars().take(200).collect(),
    }
}

#[async_trait]
impl SnapshotSource for RelayClient {
    fn origin(&self) -> SnapshotOrigin {
        SnapshotOrigin::Relay
    }

    async fn fetch_records(&self) -> Result<Vec<Record>, SnapshotError> {
        let values = self.fetch_values().await?;
        if values.values.is_empty() {
            return Err(SnapshotError::Empty);
        }
        Ok(records_from_rows(values.text_rows()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_string_cells_are_rendered_as_text() {
        let values: SheetValues = serde_json::from_value(json!({
            "range": "Sheet1!A2:F1000",
            "majorDimension": "ROWS",
            "values": [["7", "Ana Ruiz", "ana@example.com", "In Queue", 3, null]]
        }))
        .expect("payload parses");

        assert_eq!(values.range.as_deref(), Some("Sheet1!A2:F1000"));
        assert_eq!(
            values.text_rows(),
            vec![vec![
                "7".to_string(),
                "Ana Ruiz".to_string(),
                "ana@example.com".to_string(),
                "In Queue".to_string(),
                "3".to_string(),
                String::new(),
            ]]
        );
    }

    #[test]
    fn failure_description_prefers_relay_error_fields() {
        let not_found = r#"{"error":"Failed to fetch data","message":"Spreadsheet not found"}"#;
        assert_eq!(
            describe_failure(not_found),
            "Failed to fetch data: Spreadsheet not found"
        );
        let misconfigured =
            r#"{"error":"Server configuration error","details":"Missing API credentials"}"#;
        assert_eq!(
            describe_failure(misconfigured),
            "Server configuration error: Missing API credentials"
        );
        assert_eq!(describe_failure("gateway timeout"), "gateway timeout");
    }
}
