//! Identity policy: which tables history owns, what the backing store is
//! sent, and how the working set is rewritten once the store answers.

use peony_core::{Table, TableId, CLONE_SUFFIX};
use peony_protocol::RemoteTable;

use crate::error::SyncError;

pub fn is_local_only(id: &TableId) -> bool {
    id.is_local_only()
}

/// Build the upsert payload for `table`.
///
/// New local tables go out without an id so the store assigns one. A
/// pending clone is sent as an update of its origin record, with the
/// cosmetic copy marker dropped from its name.
pub fn prepare_for_remote(table: &Table) -> RemoteTable {
    let (id, name) = match &table.id {
        TableId::Local { .. } => (None, table.name.clone()),
        TableId::Remote { id } => (Some(id.clone()), table.name.clone()),
        TableId::PendingClone { origin, .. } => {
            let name = table.name.strip_suffix(CLONE_SUFFIX).unwrap_or(&table.name);
            (Some(origin.clone()), name.to_string())
        }
    };
    RemoteTable {
        id,
        name,
        columns: table.columns.clone(),
        rows: table.rows.clone(),
    }
}

/// Adopt a record returned by the backing store.
pub fn from_remote(remote: RemoteTable) -> Result<Table, SyncError> {
    let id = remote
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SyncError::Malformed(format!("record '{}' has no id", remote.name)))?;
    Ok(Table::new(TableId::remote(id), remote.name, remote.columns, remote.rows))
}

/// Fold one synced record into `tables`.
///
/// A pending clone is dropped: the canonical record supersedes it. A new
/// local table is replaced in place by its canonical counterpart. If the
/// canonical id is already present it is updated where it stands.
pub fn rewrite_after_sync(tables: &mut Vec<Table>, request_id: &TableId, canonical: Table) {
    let is_clone = matches!(request_id, TableId::PendingClone { .. });
    if is_clone || request_id != &canonical.id {
        if let Some(pos) = tables.iter().position(|t| &t.id == request_id) {
            if is_clone || tables.iter().any(|t| t.id == canonical.id) {
                tables.remove(pos);
            } else {
                tables[pos] = canonical;
                return;
            }
        }
    }

    match tables.iter().position(|t| t.id == canonical.id) {
        Some(pos) => tables[pos] = canonical,
        None => tables.push(canonical),
    }
}
