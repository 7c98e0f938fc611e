//! Spreadsheet values client
//!
//! Fetches the price list from a spreadsheet published through a
//! values-over-HTTP API: `GET {base}/{spreadsheet_id}/values/{range}?key=`.
//! The response carries the sheet as ordered rows of cells; a missing
//! `values` key means an empty sheet, not an error.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::table::ProductRow;

fn default_base_url() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

/// Sheet endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet document id
    pub spreadsheet_id: String,
    /// Cell range to fetch, e.g. `Productos!A2:H`
    pub range: String,
    /// API key authorizing read access
    pub api_key: String,
    /// Endpoint base; tests point this at a local server
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl SheetConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.is_empty() {
            return Err(CatalogError::Config(
                "sheet.spreadsheet_id must not be empty".to_string(),
            ));
        }
        if self.range.is_empty() {
            return Err(CatalogError::Config(
                "sheet.range must not be empty".to_string(),
            ));
        }
        if self.api_key.is_empty() {
            return Err(CatalogError::Config(
                "sheet.api_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Client for the sheet values endpoint
pub struct SheetClient {
    client: Client,
    config: SheetConfig,
}

impl SheetClient {
    pub fn new(client: Client, config: SheetConfig) -> Self {
        Self { client, config }
    }

    fn values_url(&self) -> String {
        format!(
            "{}/{}/values/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.spreadsheet_id,
            self.config.range
        )
    }

    /// Fetch the current price list
    ///
    /// # Errors
    /// - `CatalogError::Http` on transport failures
    /// - `CatalogError::Fetch` when the endpoint answers non-2xx
    /// - `CatalogError::InvalidResponse` when the body is not the expected shape
    pub async fn fetch_rows(&self) -> Result<Vec<ProductRow>> {
        debug!(
            spreadsheet_id = %self.config.spreadsheet_id,
            range = %self.config.range,
            "Fetching price list"
        );

        let response = self
            .client
            .get(self.values_url())
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Sheet fetch failed");
            return Err(CatalogError::Fetch {
                status: status.as_u16(),
                message,
            });
        }

        let body: ValuesResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        let rows: Vec<ProductRow> = body
            .values
            .into_iter()
            .map(|cells| ProductRow::new(cells.into_iter().map(stringify_cell).collect()))
            .collect();

        info!(rows = rows.len(), "Price list fetched");
        Ok(rows)
    }
}

/// Cells are strings in the formatted rendering, but numeric cells can leak
/// through; coerce instead of failing the whole load.
fn stringify_cell(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::columns;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> SheetConfig {
        SheetConfig {
            spreadsheet_id: "sheet-1".to_string(),
            range: "Productos!A2:H".to_string(),
            api_key: "test-key".to_string(),
            base_url: server.uri(),
        }
    }

    #[tokio::test]
    async fn test_fetch_parses_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet-1/values/Productos!A2:H"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Productos!A2:H",
                "values": [
                    ["", "a.jpg,b.jpg", "P-001", "Widget", "", "1200", "", ""],
                    ["", "", "P-002", "Gadget", "", "80", "ALT-2", "Gadget Pro"],
                ],
            })))
            .mount(&server)
            .await;

        let client = SheetClient::new(Client::new(), config_for(&server));
        let rows = client.fetch_rows().await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell(columns::CODE), Some("P-001"));
        assert_eq!(rows[0].cell(columns::NAME), Some("Widget"));
        assert_eq!(rows[1].cell(columns::ALT_CODE), Some("ALT-2"));
    }

    #[tokio::test]
    async fn test_missing_values_means_empty_sheet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"range": "Productos!A2:H"})),
            )
            .mount(&server)
            .await;

        let client = SheetClient::new(Client::new(), config_for(&server));
        let rows = client.fetch_rows().await.unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_numeric_cells_are_coerced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [["", "", "P-003", "Doohickey", "", 1500, "", ""]],
            })))
            .mount(&server)
            .await;

        let client = SheetClient::new(Client::new(), config_for(&server));
        let rows = client.fetch_rows().await.unwrap();

        assert_eq!(rows[0].cell(columns::PRICE), Some("1500"));
    }

    #[tokio::test]
    async fn test_server_error_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&server)
            .await;

        let client = SheetClient::new(Client::new(), config_for(&server));
        let err = client.fetch_rows().await.unwrap_err();

        let CatalogError::Fetch { status, message } = err else {
            panic!("expected fetch error, got {:?}", err);
        };
        assert_eq!(status, 500);
        assert_eq!(message, "backend exploded");
    }

    #[test]
    fn test_config_validation() {
        let valid = SheetConfig {
            spreadsheet_id: "id".to_string(),
            range: "A2:H".to_string(),
            api_key: "key".to_string(),
            base_url: default_base_url(),
        };
        assert!(valid.validate().is_ok());

        let mut missing_id = valid.clone();
        missing_id.spreadsheet_id.clear();
        assert!(missing_id.validate().is_err());

        let mut missing_key = valid.clone();
        missing_key.api_key.clear();
        assert!(missing_key.validate().is_err());
    }

    #[test]
    fn test_default_base_url_points_at_sheets_api() {
        let config: SheetConfig = serde_json::from_value(json!({
            "spreadsheet_id": "id",
            "range": "A2:H",
            "api_key": "key",
        }))
        .unwrap();

        assert_eq!(config.base_url, "https://sheets.googleapis.com/v4/spreadsheets");
    }
}
