use peony_core::TableId;
use thiserror::Error;

/// Ledger navigation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history index {index} out of range (ledger has {len} entries)")]
    OutOfRange { index: usize, len: usize },
}

/// Command handler failures surfaced by the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no table with id {0}")]
    UnknownTable(TableId),
    /// Remote-canonical tables are mirrored, not owned by history.
    #[error("table {0} belongs to the backing store; clone it to edit")]
    ReadOnly(TableId),
}

/// Synchronization failures. Any of these leaves store and ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Payload failed shape validation (locally or with a 400/422).
    #[error("validation failed: {0}")]
    Validation(String),
    /// Update or delete of a record the store no longer has.
    #[error("not found: {0}")]
    NotFound(String),
    /// Network failure or unexpected HTTP status.
    #[error("transport error: {0}")]
    Transport(String),
    /// Response could not be understood or does not match the request.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Service answered `success: false`.
    #[error("rejected by backing store: {0}")]
    Rejected(String),
    #[error("no table with id {0}")]
    UnknownTable(TableId),
    #[error("nothing to synchronize")]
    Empty,
}
