//! Backing store HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Endpoints: `GET /tables`, `POST /tables/sync`, `DELETE /tables/:id`.

use std::time::Duration;

use peony_engine::{RemoteStore, SyncError};
use peony_protocol::{DeleteResponse, ErrorBody, RemoteTable, SyncRequest, SyncResponse};

/// Backing store API client (blocking).
#[derive(Clone)]
pub struct HubClient {
    http: reqwest::blocking::Client,
    api_base: String,
}

/// Error type for backing store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Server returned a validation error (400/422 with message)
    Validation(String),
    /// Record does not exist (404)
    NotFound(String),
    /// JSON parsing error
    Parse(String),
    /// Server answered `success: false`
    Rejected(String),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::Network(msg) => write!(f, "Network error: {}", msg),
            HubError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            HubError::Validation(msg) => write!(f, "{}", msg),
            HubError::NotFound(msg) => write!(f, "Not found: {}", msg),
            HubError::Parse(msg) => write!(f, "Parse error: {}", msg),
            HubError::Rejected(msg) => write!(f, "Rejected: {}", msg),
        }
    }
}

impl std::error::Error for HubError {}

impl From<HubError> for SyncError {
    fn from(e: HubError) -> Self {
        match e {
            HubError::Network(msg) => SyncError::Transport(msg),
            HubError::Http(code, msg) => SyncError::Transport(format!("HTTP {}: {}", code, msg)),
            HubError::Validation(msg) => SyncError::Validation(msg),
            HubError::NotFound(msg) => SyncError::NotFound(msg),
            HubError::Parse(msg) => SyncError::Malformed(msg),
            HubError::Rejected(msg) => SyncError::Rejected(msg),
        }
    }
}

impl HubClient {
    /// Create a client for `api_base` (e.g. `http://localhost:4000`).
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, HubError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("peony/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// All remote-canonical tables.
    pub fn list_tables(&self) -> Result<Vec<RemoteTable>, HubError> {
        let url = format!("{}/tables", self.api_base);
        let resp = self.get(&url)?;
        resp.json::<Vec<RemoteTable>>().map_err(|e| HubError::Parse(e.to_string()))
    }

    /// Batched upsert. Returns the saved records in request order.
    pub fn sync_tables(&self, tables: &[RemoteTable]) -> Result<Vec<RemoteTable>, HubError> {
        let url = format!("{}/tables/sync", self.api_base);
        let body = SyncRequest { tables: tables.to_vec() };
        let resp = self.post_json(&url, &body)?;
        let parsed: SyncResponse = resp.json().map_err(|e| HubError::Parse(e.to_string()))?;

        if !parsed.success {
            return Err(HubError::Rejected(parsed.error.unwrap_or_else(|| "sync failed".into())));
        }
        Ok(parsed.data)
    }

    pub fn delete_table(&self, id: &str) -> Result<(), HubError> {
        let url = format!("{}/tables/{}", self.api_base, id);
        let response = self
            .http
            .delete(&url)
            .send()
            .map_err(|e| HubError::Network(e.to_string()))?;
        let resp = check_status(response)?;
        let parsed: DeleteResponse = resp.json().map_err(|e| HubError::Parse(e.to_string()))?;
        if !parsed.success {
            return Err(HubError::Rejected(format!("delete of {} refused", id)));
        }
        Ok(())
    }

    // ── HTTP helpers ────────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, HubError> {
        let response = self.http.get(url)
            .send()
            .map_err(|e| HubError::Network(e.to_string()))?;
        check_status(response)
    }

    fn post_json<T: serde::Serialize>(&self, url: &str, body: &T) -> Result<reqwest::blocking::Response, HubError> {
        let response = self.http.post(url)
            .json(body)
            .send()
            .map_err(|e| HubError::Network(e.to_string()))?;
        check_status(response)
    }
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, HubError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    // Prefer the service's `{ "error": ... }` message over the raw body
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    log::debug!("HTTP {}: {}", status, message);
    match status {
        400 | 422 => Err(HubError::Validation(message)),
        404 => Err(HubError::NotFound(message)),
        _ => Err(HubError::Http(status, message)),
    }
}

impl RemoteStore for HubClient {
    fn fetch_all(&self) -> Result<Vec<RemoteTable>, SyncError> {
        Ok(self.list_tables()?)
    }

    fn sync(&self, tables: &[RemoteTable]) -> Result<Vec<RemoteTable>, SyncError> {
        Ok(self.sync_tables(tables)?)
    }

    fn delete(&self, id: &str) -> Result<(), SyncError> {
        Ok(self.delete_table(id)?)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> HubClient {
        HubClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    fn orders(id: Option<&str>) -> RemoteTable {
        RemoteTable {
            id: id.map(String::from),
            name: "Orders".into(),
            columns: vec!["ID".into(), "Item".into()],
            rows: vec![vec!["1".into(), "Pen".into()]],
        }
    }

    #[test]
    fn test_list_tables() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/tables");
            then.status(200).json_body(json!([
                { "id": "srv_1", "name": "Orders", "columns": ["ID", "Item"], "rows": [["1", "Pen"]] }
            ]));
        });

        let tables = client(&server).list_tables().unwrap();
        mock.assert();
        assert_eq!(tables, vec![orders(Some("srv_1"))]);
    }

    #[test]
    fn test_sync_sends_batch_and_returns_data() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/tables/sync").json_body(json!({
                "tables": [{ "name": "Orders", "columns": ["ID", "Item"], "rows": [["1", "Pen"]] }]
            }));
            then.status(200).json_body(json!({
                "success": true,
                "data": [{ "id": "srv_7", "name": "Orders", "columns": ["ID", "Item"], "rows": [["1", "Pen"]] }]
            }));
        });

        let saved = client(&server).sync_tables(&[orders(None)]).unwrap();
        mock.assert();
        assert_eq!(saved[0].id.as_deref(), Some("srv_7"));
    }

    #[test]
    fn test_status_mapping() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tables/sync");
            then.status(400).json_body(json!({ "error": "Invalid table payload" }));
        });
        server.mock(|when, then| {
            when.method(DELETE).path("/tables/gone");
            then.status(404).json_body(json!({ "error": "Table not found" }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/tables");
            then.status(500).body("boom");
        });

        let c = client(&server);
        assert_eq!(c.sync_tables(&[orders(None)]).unwrap_err(), HubError::Validation("Invalid table payload".into()));
        assert_eq!(c.delete_table("gone").unwrap_err(), HubError::NotFound("Table not found".into()));
        assert_eq!(c.list_tables().unwrap_err(), HubError::Http(500, "boom".into()));
    }

    #[test]
    fn test_unsuccessful_sync_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/tables/sync");
            then.status(200).json_body(json!({ "success": false, "error": "db locked" }));
        });

        let err = RemoteStore::sync(&client(&server), &[orders(None)]).unwrap_err();
        assert_eq!(err, SyncError::Rejected("db locked".into()));
    }

    #[test]
    fn test_garbage_body_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tables");
            then.status(200).body("<html>");
        });

        let err = client(&server).fetch_all().unwrap_err();
        assert!(matches!(err, SyncError::Malformed(_)));
    }

    #[test]
    fn test_network_error_is_transport() {
        let c = HubClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        assert!(matches!(c.fetch_all(), Err(SyncError::Transport(_))));
    }

    #[test]
    fn test_delete_ok() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/tables/srv_1");
            then.status(200).json_body(json!({ "success": true }));
        });
        client(&server).delete_table("srv_1").unwrap();
        mock.assert();
    }
}
