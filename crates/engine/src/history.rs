//! History ledger: linear undo/redo over full local-only snapshots.
//!
//! Each entry stores a deep copy of every local-only table as it stood
//! right after the change. Navigating to any index is a single apply of
//! that snapshot (or of the empty set for "before the first entry"), so
//! there is no replay and no per-table diff bookkeeping.
//!
//! Remote-canonical tables never appear in a snapshot and are never
//! touched by an apply. Ids promoted by sync are retired: older snapshots
//! still mention them, but applies skip them.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use peony_core::{Table, TableId};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::storage::{self, Storage, StorageKey};

/// Classification of a committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Cell,
    RowAdd,
    RowDelete,
    Rename,
    BulkAction,
    Sync,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Cell => "cell",
            ActionType::RowAdd => "row_add",
            ActionType::RowDelete => "row_delete",
            ActionType::Rename => "rename",
            ActionType::BulkAction => "bulk_action",
            ActionType::Sync => "sync",
        }
    }
}

/// The table an entry is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryTarget {
    Table(TableId),
    /// Bulk operations.
    Multiple,
    /// Sync checkpoints.
    Sync,
}

/// Caller-supplied part of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    pub action: ActionType,
    pub target: EntryTarget,
    pub description: String,
}

impl EntryMeta {
    pub fn new(action: ActionType, target: EntryTarget, description: impl Into<String>) -> Self {
        Self { action, target, description: description.into() }
    }
}

/// One committed change. Immutable once pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "tableId")]
    pub target: EntryTarget,
    #[serde(rename = "type")]
    pub action: ActionType,
    pub description: String,
    /// Every local-only table immediately after the change.
    pub snapshot: Vec<Table>,
}

/// Borrowed write side of the `peony_history_v3` blob.
#[derive(Serialize)]
struct PersistedLedgerRef<'a> {
    entries: &'a [HistoryEntry],
    /// -1 = before the first entry.
    cursor: i64,
    retired: &'a BTreeSet<TableId>,
}

/// On-disk shape under `peony_history_v3`.
#[derive(Deserialize)]
struct PersistedLedger {
    entries: Vec<HistoryEntry>,
    /// -1 = before the first entry.
    cursor: i64,
    #[serde(default)]
    retired: BTreeSet<TableId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerBlob {
    Full(PersistedLedger),
    /// Older layout: entries only, cursor implied at the tail.
    Bare(Vec<HistoryEntry>),
}

pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
    /// `None` = before the first entry (empty local-only set).
    cursor: Option<usize>,
    retired: BTreeSet<TableId>,
    storage: Arc<dyn Storage>,
}

impl HistoryLedger {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { entries: Vec::new(), cursor: None, retired: BTreeSet::new(), storage }
    }

    /// Restore the ledger persisted by a previous session. Corrupt data
    /// yields an empty ledger.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let mut ledger = Self::new(storage);
        match storage::load_json::<LedgerBlob>(ledger.storage.as_ref(), StorageKey::History) {
            Some(LedgerBlob::Full(p)) => {
                ledger.cursor = clamp_cursor(p.cursor, p.entries.len());
                ledger.entries = p.entries;
                ledger.retired = p.retired;
            }
            Some(LedgerBlob::Bare(entries)) => {
                ledger.cursor = entries.len().checked_sub(1);
                ledger.entries = entries;
            }
            None => {}
        }
        log::debug!("Loaded history: {} entries, cursor {:?}", ledger.entries.len(), ledger.cursor);
        ledger
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry the user is looking at.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.next_index() < self.entries.len()
    }

    pub fn is_retired(&self, id: &TableId) -> bool {
        self.retired.contains(id)
    }

    /// Commit a new entry for the state `tables`.
    ///
    /// Entries after the cursor (the redo-able future) are discarded.
    pub fn push(&mut self, meta: EntryMeta, tables: &[Table]) -> &HistoryEntry {
        let snapshot: Vec<Table> = tables.iter().filter(|t| t.is_local_only()).cloned().collect();
        let entry = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            target: meta.target,
            action: meta.action,
            description: meta.description,
            snapshot,
        };

        self.entries.truncate(self.next_index());
        log::debug!("History push [{}] {}", entry.action.as_str(), entry.description);
        self.entries.push(entry);
        let tail = self.entries.len() - 1;
        self.cursor = Some(tail);
        self.persist();
        &self.entries[tail]
    }

    /// Step back one entry. Returns false when already before the first.
    pub fn undo<A, F>(&mut self, apply: A, focus: F) -> bool
    where
        A: FnOnce(Vec<Table>),
        F: FnOnce(Option<TableId>),
    {
        let Some(current) = self.cursor else {
            return false;
        };
        self.apply_state(current.checked_sub(1), apply, focus);
        true
    }

    /// Step forward one entry. Returns false when already at the tail.
    pub fn redo<A, F>(&mut self, apply: A, focus: F) -> bool
    where
        A: FnOnce(Vec<Table>),
        F: FnOnce(Option<TableId>),
    {
        let next = self.next_index();
        if next >= self.entries.len() {
            return false;
        }
        self.apply_state(Some(next), apply, focus);
        true
    }

    /// Move to an absolute position; `None` is the state before the first entry.
    pub fn jump_to<A, F>(&mut self, target: Option<usize>, apply: A, focus: F) -> Result<(), HistoryError>
    where
        A: FnOnce(Vec<Table>),
        F: FnOnce(Option<TableId>),
    {
        if let Some(index) = target {
            if index >= self.entries.len() {
                return Err(HistoryError::OutOfRange { index, len: self.entries.len() });
            }
        }
        self.apply_state(target, apply, focus);
        Ok(())
    }

    /// Forget the whole timeline. Tables already in the store stay put.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.retired.clear();
        storage::remove_blob(self.storage.as_ref(), StorageKey::History);
        log::debug!("History cleared");
    }

    /// Mark a local id as promoted to remote-canonical.
    pub fn retire(&mut self, id: TableId) {
        if id.is_local_only() && self.retired.insert(id) {
            self.persist();
        }
    }

    fn next_index(&self) -> usize {
        self.cursor.map_or(0, |i| i + 1)
    }

    fn apply_state<A, F>(&mut self, target: Option<usize>, apply: A, focus: F)
    where
        A: FnOnce(Vec<Table>),
        F: FnOnce(Option<TableId>),
    {
        let (snapshot, focus_id) = match target.and_then(|i| self.entries.get(i)) {
            None => (Vec::new(), None),
            Some(entry) => {
                let snapshot: Vec<Table> = entry
                    .snapshot
                    .iter()
                    .filter(|t| !self.retired.contains(&t.id))
                    .cloned()
                    .collect();
                let focus_id = focus_for(&entry.target, &snapshot);
                (snapshot, focus_id)
            }
        };

        log::debug!("History move {:?} -> {:?}", self.cursor, target);
        self.cursor = target;
        self.persist();
        apply(snapshot);
        focus(focus_id);
    }

    fn persist(&self) {
        let blob = PersistedLedgerRef {
            entries: &self.entries,
            cursor: self.cursor.map_or(-1, |i| i as i64),
            retired: &self.retired,
        };
        storage::store_json(self.storage.as_ref(), StorageKey::History, &blob);
    }
}

/// Table to open after landing on an entry: the entry's own table when it
/// still exists, else the first table of the snapshot.
fn focus_for(target: &EntryTarget, snapshot: &[Table]) -> Option<TableId> {
    if let EntryTarget::Table(id) = target {
        if snapshot.iter().any(|t| &t.id == id) {
            return Some(id.clone());
        }
    }
    snapshot.first().map(|t| t.id.clone())
}

fn clamp_cursor(cursor: i64, len: usize) -> Option<usize> {
    if cursor < 0 {
        return None;
    }
    let cursor = cursor as usize;
    if cursor < len {
        Some(cursor)
    } else {
        len.checked_sub(1)
    }
}
