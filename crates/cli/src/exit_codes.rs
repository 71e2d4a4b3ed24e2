//! CLI Exit Code Registry
//!
//! Single source of truth for every exit code `peony` returns.
//! Scripts branch on these, so treat them as part of the interface.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                  |
//! |---------|-----------|----------------------------------------------|
//! | 0       | Universal | Success                                      |
//! | 1       | Universal | General error (unspecified)                  |
//! | 2       | Universal | Usage error (bad row, column or position)    |
//! | 3-9     | tables    | Table lookup, read-only, history navigation  |
//! | 10-19   | io        | Data directory, import, export               |
//! | 20-29   | sync      | Backing store round trips                    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above

use peony_engine::{CommandError, HistoryError, SyncError};
use serde::Serialize;

// =============================================================================
// Universal (0-2)
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// General error. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error: out-of-range row, unknown column, bad jump target.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Tables (3-9)
// =============================================================================

/// No table matches the given reference.
pub const EXIT_TABLE_NOT_FOUND: u8 = 3;

/// The reference matches more than one table.
pub const EXIT_TABLE_AMBIGUOUS: u8 = 4;

/// Edit attempted on a table owned by the backing store.
pub const EXIT_TABLE_READ_ONLY: u8 = 5;

/// `jump` target outside the ledger.
pub const EXIT_HISTORY_RANGE: u8 = 6;

// =============================================================================
// I/O (10-19)
// =============================================================================

/// Data directory cannot be created or opened.
pub const EXIT_STORAGE: u8 = 10;

/// Import source unreadable or not a table.
pub const EXIT_IMPORT: u8 = 11;

/// Export destination not writable.
pub const EXIT_EXPORT: u8 = 12;

// =============================================================================
// Sync (20-29)
// =============================================================================

/// Backing store unreachable or answered with an unexpected status.
pub const EXIT_SYNC_TRANSPORT: u8 = 20;

/// Payload refused as invalid (locally or 400/422).
pub const EXIT_SYNC_VALIDATION: u8 = 21;

/// Record no longer exists on the backing store (404).
pub const EXIT_SYNC_NOT_FOUND: u8 = 22;

/// Response could not be matched to the request.
pub const EXIT_SYNC_MALFORMED: u8 = 23;

/// Backing store answered `success: false`.
pub const EXIT_SYNC_REJECTED: u8 = 24;

/// No local tables to save.
pub const EXIT_SYNC_EMPTY: u8 = 25;

// =============================================================================
// Error mapping
// =============================================================================

pub fn command_exit_code(err: &CommandError) -> u8 {
    match err {
        CommandError::UnknownTable(_) => EXIT_TABLE_NOT_FOUND,
        CommandError::ReadOnly(_) => EXIT_TABLE_READ_ONLY,
    }
}

pub fn history_exit_code(err: &HistoryError) -> u8 {
    match err {
        HistoryError::OutOfRange { .. } => EXIT_HISTORY_RANGE,
    }
}

pub fn sync_exit_code(err: &SyncError) -> u8 {
    match err {
        SyncError::Transport(_) => EXIT_SYNC_TRANSPORT,
        SyncError::Validation(_) => EXIT_SYNC_VALIDATION,
        SyncError::NotFound(_) => EXIT_SYNC_NOT_FOUND,
        SyncError::Malformed(_) => EXIT_SYNC_MALFORMED,
        SyncError::Rejected(_) => EXIT_SYNC_REJECTED,
        SyncError::UnknownTable(_) => EXIT_TABLE_NOT_FOUND,
        SyncError::Empty => EXIT_SYNC_EMPTY,
    }
}

/// Stable error kind for `--json` error output.
pub fn sync_error_kind(err: &SyncError) -> &'static str {
    match err {
        SyncError::Transport(_) => "transport",
        SyncError::Validation(_) => "validation",
        SyncError::NotFound(_) => "not_found",
        SyncError::Malformed(_) => "malformed",
        SyncError::Rejected(_) => "rejected",
        SyncError::UnknownTable(_) => "unknown_table",
        SyncError::Empty => "empty",
    }
}

/// Structured sync failure, written to stderr when `--json` is set.
#[derive(Debug, Serialize)]
pub struct SyncErrorOutput {
    pub error: &'static str,
    pub message: String,
    pub exit_code: u8,
}

impl SyncErrorOutput {
    pub fn from_sync_error(err: &SyncError) -> Self {
        Self {
            error: sync_error_kind(err),
            message: err.to_string(),
            exit_code: sync_exit_code(err),
        }
    }
}
