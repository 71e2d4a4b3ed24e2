//! Peony backing-store protocol: v1 wire format
//!
//! This crate defines the JSON shapes exchanged with the table service:
//!
//! - `GET  /tables`       → `Vec<RemoteTable>` (fetch-all)
//! - `POST /tables/sync`  → body `SyncRequest`, response `SyncResponse`
//! - `DELETE /tables/:id` → `DeleteResponse`
//! - real-time channel    → `ChangeNotification` (event `db_sync_needed`)
//!
//! # Usage
//!
//! ```ignore
//! use peony_protocol::{RemoteTable, SyncRequest};
//!
//! let body = SyncRequest { tables: vec![table] };
//! let json = serde_json::to_string(&body)?;
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Event name of real-time change notifications.
pub const CHANGE_EVENT: &str = "db_sync_needed";

/// Name of the reserved first column every table must carry.
pub const ID_COLUMN: &str = "ID";

// =============================================================================
// Tables
// =============================================================================

/// A table as the backing store sees it.
///
/// `id` is absent for records the store has never seen (create) and set to
/// the canonical id for updates. Responses always carry an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl RemoteTable {
    /// Client-side shape check, mirroring what the service rejects with 400.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.name.trim().is_empty() {
            return Err(PayloadError::EmptyName);
        }
        if self.columns.first().map(String::as_str) != Some(ID_COLUMN) {
            return Err(PayloadError::MissingIdColumn { name: self.name.clone() });
        }
        if let Some(row) = self.rows.iter().position(|r| r.len() != self.columns.len()) {
            return Err(PayloadError::RaggedRow {
                name: self.name.clone(),
                row,
                expected: self.columns.len(),
                found: self.rows[row].len(),
            });
        }
        Ok(())
    }
}

/// Reasons a payload would be refused by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// Table name is required.
    EmptyName,
    /// Column 0 must be `ID`.
    MissingIdColumn { name: String },
    /// Row length differs from column count.
    RaggedRow { name: String, row: usize, expected: usize, found: usize },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "table name is required"),
            Self::MissingIdColumn { name } => {
                write!(f, "table '{name}': first column must be '{ID_COLUMN}'")
            }
            Self::RaggedRow { name, row, expected, found } => {
                write!(f, "table '{name}', row {row}: expected {expected} cells, found {found}")
            }
        }
    }
}

impl std::error::Error for PayloadError {}

// =============================================================================
// Sync
// =============================================================================

/// Batched upsert request. A batch of one is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub tables: Vec<RemoteTable>,
}

/// Batched upsert response. `data` is in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RemoteTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `DELETE /tables/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "message")]
    pub error: String,
}

// =============================================================================
// Real-time channel
// =============================================================================

/// Row-level operation reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOperation {
    Insert,
    Update,
    Delete,
}

/// Server push: a remote record changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub operation: ChangeOperation,
    pub id: String,
}
