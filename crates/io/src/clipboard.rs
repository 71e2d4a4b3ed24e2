//! Clipboard import provider.
//!
//! Spreadsheet applications put a selection on the clipboard as
//! tab-separated text, one line per row, the first line being the header.
//! The provider turns that into a well-formed table payload; committing
//! it (and recording the history entry) is the workspace's job.

use peony_core::Table;
use peony_engine::commands::PASTED_TABLE_NAME;

use crate::csv::import_from_str;
use crate::error::ImportError;

/// Parse pasted text into a new local table named "Pasted table".
pub fn parse(text: &str) -> Result<Table, ImportError> {
    parse_named(text, PASTED_TABLE_NAME)
}

pub fn parse_named(text: &str, name: &str) -> Result<Table, ImportError> {
    import_from_str(text, b'\t', name)
}
