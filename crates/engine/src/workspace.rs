//! Workspace: one editing session.
//!
//! Owns the table store, the history ledger, the open-table selection and
//! the pending draft. Every command computes its transition with the pure
//! handlers in [`crate::commands`], replaces the store, then pushes exactly
//! one ledger entry. Undo, redo and jump apply snapshots to the local-only
//! partition only.
//!
//! Any operation other than staging flushes the pending draft first, and
//! dropping the workspace flushes it as well.

use std::sync::Arc;

use peony_core::{Table, TableId, TableTemplate};
use peony_protocol::ChangeNotification;

use crate::commands::{self, ColumnPosition, RowPosition, Selection, Transition};
use crate::draft::{Draft, DraftTarget};
use crate::error::{CommandError, HistoryError, SyncError};
use crate::history::HistoryLedger;
use crate::realtime::{self, RealtimeEffect};
use crate::storage::{MemoryStorage, Storage};
use crate::store::TableStore;
use crate::sync::{self, RemoteStore, SyncCoordinator, SyncOutcome};

/// Base name for tables created without an explicit name.
pub const DEFAULT_TABLE_NAME: &str = "New table";

pub struct Workspace {
    store: TableStore,
    history: HistoryLedger,
    current: Option<TableId>,
    draft: Option<Draft>,
    default_name: String,
}

impl Workspace {
    /// Restore the session persisted in `storage`.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let store = TableStore::load(storage.clone());
        let history = HistoryLedger::load(storage);
        let current = store.tables().first().map(|t| t.id.clone());
        Self { store, history, current, draft: None, default_name: DEFAULT_TABLE_NAME.to_string() }
    }

    /// Throwaway session.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    pub fn tables(&self) -> &[Table] {
        self.store.tables()
    }

    pub fn table(&self, id: &TableId) -> Option<&Table> {
        self.store.get(id)
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// The open table.
    pub fn current(&self) -> Option<&TableId> {
        self.current.as_ref()
    }

    pub fn current_table(&self) -> Option<&Table> {
        self.current.as_ref().and_then(|id| self.store.get(id))
    }

    pub fn select(&mut self, id: &TableId) -> Result<(), CommandError> {
        self.flush_draft();
        if !self.store.contains(id) {
            return Err(CommandError::UnknownTable(id.clone()));
        }
        self.current = Some(id.clone());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// New table from the default template.
    pub fn create_table(&mut self) -> TableId {
        let name = self.default_name.clone();
        self.create_table_with(&name, TableTemplate::default())
    }

    pub fn create_table_with(&mut self, base_name: &str, template: TableTemplate) -> TableId {
        self.flush_draft();
        let (id, transition) = commands::create_table(self.store.tables(), base_name, template);
        self.commit(transition);
        id
    }

    /// Commit a table produced by an import provider.
    pub fn import_table(&mut self, table: Table) -> TableId {
        self.flush_draft();
        let (id, transition) = commands::import_table(self.store.tables(), table);
        self.commit(transition);
        id
    }

    /// Returns `Ok(false)` when the rename is a no-op.
    pub fn rename_table(&mut self, id: &TableId, name: &str) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::rename_table(self.store.tables(), id, name)))
    }

    pub fn edit_cell(&mut self, id: &TableId, row: usize, col: usize, value: &str) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::edit_cell(self.store.tables(), id, row, col, value)))
    }

    pub fn edit_column_name(&mut self, id: &TableId, col: usize, name: &str) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::edit_column_name(self.store.tables(), id, col, name)))
    }

    pub fn add_row(&mut self, id: &TableId, selection: Option<Selection>, position: RowPosition) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::add_row(self.store.tables(), id, selection, position)))
    }

    pub fn delete_row(&mut self, id: &TableId, selection: Option<Selection>) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::delete_row(self.store.tables(), id, selection)))
    }

    pub fn add_column(&mut self, id: &TableId, selection: Option<Selection>, position: ColumnPosition) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::add_column(self.store.tables(), id, selection, position)))
    }

    pub fn delete_column(&mut self, id: &TableId, selection: Option<Selection>) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::delete_column(self.store.tables(), id, selection)))
    }

    /// Editable copy of `id`; returns the copy's id.
    ///
    /// A remote table that already has a pending clone is not cloned
    /// again: the existing clone is opened instead.
    pub fn clone_table(&mut self, id: &TableId) -> Result<TableId, CommandError> {
        self.flush_draft();
        if !self.store.contains(id) {
            return Err(CommandError::UnknownTable(id.clone()));
        }
        if let TableId::Remote { id: origin } = id {
            if let Some(existing) = commands::existing_clone(self.store.tables(), origin) {
                let existing = existing.id.clone();
                self.current = Some(existing.clone());
                return Ok(existing);
            }
        }
        let (clone_id, transition) =
            commands::clone_table(self.store.tables(), id).ok_or_else(|| CommandError::UnknownTable(id.clone()))?;
        self.commit(transition);
        Ok(clone_id)
    }

    pub fn delete_table(&mut self, id: &TableId) -> Result<bool, CommandError> {
        self.flush_draft();
        self.writable(id)?;
        Ok(self.apply(commands::delete_table(self.store.tables(), id)))
    }

    /// Delete several local tables as one ledger entry. Every id must be a
    /// known local-only table, otherwise nothing is deleted.
    pub fn delete_tables(&mut self, ids: &[TableId]) -> Result<bool, CommandError> {
        self.flush_draft();
        for id in ids {
            self.writable(id)?;
        }
        Ok(self.apply(commands::delete_tables(self.store.tables(), ids)))
    }

    /// Delete a remote-canonical record on the backing store, then drop
    /// it locally. History is not involved.
    pub fn delete_remote(&mut self, id: &TableId, remote: &dyn RemoteStore) -> Result<(), SyncError> {
        self.flush_draft();
        let TableId::Remote { id: remote_id } = id else {
            return Err(SyncError::Validation(format!("{} has not been synchronized", id)));
        };
        if !self.store.contains(id) {
            return Err(SyncError::UnknownTable(id.clone()));
        }
        remote.delete(remote_id)?;
        self.store.remove_remote(remote_id);
        self.refocus();
        log::info!("Deleted remote table {}", remote_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Draft
    // ------------------------------------------------------------------

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Record typing into a cell without touching the ledger.
    pub fn stage_cell(&mut self, id: &TableId, row: usize, col: usize, value: &str) -> Result<(), CommandError> {
        self.stage(id, DraftTarget::Cell { row, col }, value)
    }

    pub fn stage_column_name(&mut self, id: &TableId, col: usize, name: &str) -> Result<(), CommandError> {
        self.stage(id, DraftTarget::ColumnName { col }, name)
    }

    /// Turn the draft into a ledger entry. Returns whether one was recorded.
    pub fn commit_draft(&mut self) -> bool {
        match self.draft.take() {
            Some(draft) => self.apply(draft.to_transition(self.store.tables())),
            None => false,
        }
    }

    pub fn discard_draft(&mut self) {
        self.draft = None;
    }

    fn stage(&mut self, id: &TableId, target: DraftTarget, value: &str) -> Result<(), CommandError> {
        self.writable(id)?;
        let same_target = self.draft.as_ref().is_some_and(|d| d.is_for(id, target));
        if same_target {
            if let Some(draft) = self.draft.as_mut() {
                draft.value = value.to_string();
            }
        } else {
            self.flush_draft();
            self.draft = Some(Draft::new(id.clone(), target, value));
        }
        Ok(())
    }

    fn flush_draft(&mut self) {
        self.commit_draft();
    }

    // ------------------------------------------------------------------
    // History navigation
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.flush_draft();
        let store = &mut self.store;
        let mut focus = None;
        let moved = self.history.undo(|s| store.apply_local_snapshot(s), |f| focus = Some(f));
        if let Some(f) = focus {
            self.focus_after_apply(f);
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        self.flush_draft();
        let store = &mut self.store;
        let mut focus = None;
        let moved = self.history.redo(|s| store.apply_local_snapshot(s), |f| focus = Some(f));
        if let Some(f) = focus {
            self.focus_after_apply(f);
        }
        moved
    }

    /// Move to an absolute ledger position; `None` is before the first entry.
    pub fn jump_to(&mut self, index: Option<usize>) -> Result<(), HistoryError> {
        self.flush_draft();
        let store = &mut self.store;
        let mut focus = None;
        self.history.jump_to(index, |s| store.apply_local_snapshot(s), |f| focus = Some(f))?;
        if let Some(f) = focus {
            self.focus_after_apply(f);
        }
        Ok(())
    }

    /// Forget the timeline. Tables currently in the store are kept.
    pub fn clear_history(&mut self) {
        self.flush_draft();
        self.history.clear();
    }

    // ------------------------------------------------------------------
    // Synchronization
    // ------------------------------------------------------------------

    pub fn save_table(&mut self, id: &TableId, remote: &dyn RemoteStore) -> Result<SyncOutcome, SyncError> {
        self.save_tables(std::slice::from_ref(id), remote)
    }

    pub fn save_tables(&mut self, ids: &[TableId], remote: &dyn RemoteStore) -> Result<SyncOutcome, SyncError> {
        self.flush_draft();
        let outcome = SyncCoordinator::new(&mut self.store, &mut self.history, remote).save_many(ids)?;
        self.follow_sync(&outcome);
        Ok(outcome)
    }

    /// Save every local-only table in one batch.
    pub fn save_all(&mut self, remote: &dyn RemoteStore) -> Result<SyncOutcome, SyncError> {
        self.flush_draft();
        let outcome = SyncCoordinator::new(&mut self.store, &mut self.history, remote).save_all_local()?;
        self.follow_sync(&outcome);
        Ok(outcome)
    }

    /// Startup merge: fresh remote tables plus the persisted local ones.
    /// On failure the persisted view stays in place.
    pub fn load_remote(&mut self, remote: &dyn RemoteStore) -> Result<usize, SyncError> {
        self.flush_draft();
        let tables = sync::fetch_remote(remote)?;
        let count = tables.len();
        self.store.merge_remote(tables);
        self.refocus();
        log::info!("Loaded {} remote table(s)", count);
        Ok(count)
    }

    /// Apply a backing-store push. The pending draft stays pending: it can
    /// only target a local-only table, which notifications never touch.
    pub fn handle_notification(
        &mut self,
        notification: &ChangeNotification,
        remote: &dyn RemoteStore,
    ) -> Result<RealtimeEffect, SyncError> {
        let effect = realtime::apply_notification(&mut self.store, notification, remote)?;
        self.refocus();
        Ok(effect)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn writable(&self, id: &TableId) -> Result<(), CommandError> {
        match self.store.get(id) {
            None => Err(CommandError::UnknownTable(id.clone())),
            Some(t) if !t.is_local_only() => Err(CommandError::ReadOnly(id.clone())),
            Some(_) => Ok(()),
        }
    }

    fn apply(&mut self, transition: Option<Transition>) -> bool {
        match transition {
            Some(t) => {
                self.commit(t);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, transition: Transition) {
        let Transition { tables, meta, focus } = transition;
        self.store.replace(tables);
        self.history.push(meta, self.store.tables());
        if focus.is_some() {
            self.current = focus;
        }
        self.refocus();
    }

    /// Adopt the ledger's focus; with none, keep the open table if it survived.
    fn focus_after_apply(&mut self, focus: Option<TableId>) {
        if focus.is_some() {
            self.current = focus;
        }
        self.refocus();
    }

    fn follow_sync(&mut self, outcome: &SyncOutcome) {
        if let Some(current) = &self.current {
            if let Some(canonical) = outcome.canonical_for(current) {
                self.current = Some(canonical.clone());
            }
        }
        self.refocus();
    }

    /// Make sure the selection points at an existing table.
    fn refocus(&mut self) {
        let valid = self.current.as_ref().is_some_and(|id| self.store.contains(id));
        if !valid {
            self.current = self.store.tables().first().map(|t| t.id.clone());
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.flush_draft();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::FakeRemote;
    use crate::history::ActionType;
    use crate::storage::StorageKey;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    fn tiny() -> TableTemplate {
        TableTemplate::new(s(&["ID", "Name"]), vec![s(&["1", ""])])
    }

    fn local_tables(ws: &Workspace) -> Vec<Table> {
        ws.store().local_only().cloned().collect()
    }

    #[test]
    fn test_scenario_edit_delete_undo() {
        let mut ws = Workspace::in_memory();
        let t1 = ws.create_table_with("T1", tiny());
        assert!(ws.edit_cell(&t1, 0, 1, "hello").unwrap());
        assert!(ws.delete_row(&t1, Some(Selection::new(0, 1))).unwrap());
        assert!(ws.table(&t1).unwrap().rows.is_empty());

        assert!(ws.undo());
        assert_eq!(ws.table(&t1).unwrap().rows, vec![s(&["1", "hello"])]);
        assert!(ws.undo());
        assert_eq!(ws.table(&t1).unwrap().rows, vec![s(&["1", ""])]);
        assert!(ws.undo());
        assert!(local_tables(&ws).is_empty());
        assert_eq!(ws.current(), None);
        assert!(!ws.undo());
    }

    #[test]
    fn test_create_uses_default_template_and_name() {
        let mut ws = Workspace::in_memory().with_default_name("Sheet");
        let a = ws.create_table();
        let b = ws.create_table();
        assert_eq!(ws.table(&a).unwrap().name, "Sheet");
        assert_eq!(ws.table(&b).unwrap().name, "Sheet 2");
        assert_eq!(ws.table(&a).unwrap().rows[0][1], "Sample data");
        assert_eq!(ws.current(), Some(&b));
        assert_eq!(ws.history().len(), 2);
    }

    #[test]
    fn test_remote_tables_are_read_only() {
        let remote = FakeRemote::new().with_records(vec![peony_protocol::RemoteTable {
            id: Some("srv_1".into()),
            name: "Orders".into(),
            columns: s(&["ID", "Item"]),
            rows: vec![s(&["1", "Pen"])],
        }]);
        let mut ws = Workspace::in_memory();
        ws.load_remote(&remote).unwrap();
        let r = TableId::remote("srv_1");

        assert_eq!(ws.rename_table(&r, "X"), Err(CommandError::ReadOnly(r.clone())));
        assert_eq!(ws.stage_cell(&r, 0, 1, "x"), Err(CommandError::ReadOnly(r.clone())));
        let ghost = TableId::local("ghost");
        assert_eq!(ws.edit_cell(&ghost, 0, 1, "x"), Err(CommandError::UnknownTable(ghost)));

        let clone = ws.clone_table(&r).unwrap();
        assert_eq!(ws.clone_table(&r).unwrap(), clone);
        assert_eq!(ws.history().len(), 1);
        assert!(ws.edit_cell(&clone, 0, 1, "Pencil").unwrap());
    }

    #[test]
    fn test_undo_never_touches_remote() {
        let remote = FakeRemote::new().with_records(vec![peony_protocol::RemoteTable {
            id: Some("srv_1".into()),
            name: "R".into(),
            columns: s(&["ID"]),
            rows: vec![],
        }]);
        let mut ws = Workspace::in_memory();
        ws.load_remote(&remote).unwrap();
        let before = ws.table(&TableId::remote("srv_1")).cloned();

        let l = ws.create_table_with("L", tiny());
        ws.edit_cell(&l, 0, 1, "a").unwrap();
        ws.edit_cell(&l, 0, 1, "b").unwrap();
        while ws.undo() {}

        assert_eq!(ws.table(&TableId::remote("srv_1")).cloned(), before);
        assert_eq!(ws.current(), Some(&TableId::remote("srv_1")));
    }

    #[test]
    fn test_draft_last_value_wins() {
        let mut ws = Workspace::in_memory();
        let t = ws.create_table_with("T", tiny());
        for value in ["h", "he", "hel", "hello"] {
            ws.stage_cell(&t, 0, 1, value).unwrap();
        }
        assert_eq!(ws.history().len(), 1);
        assert!(ws.commit_draft());
        assert_eq!(ws.history().len(), 2);
        assert_eq!(ws.table(&t).unwrap().rows[0][1], "hello");
        assert!(!ws.commit_draft());
    }

    #[test]
    fn test_draft_flushes_before_other_operations() {
        let mut ws = Workspace::in_memory();
        let t = ws.create_table_with("T", tiny());

        ws.stage_cell(&t, 0, 1, "typed").unwrap();
        ws.stage_column_name(&t, 1, "Title").unwrap();
        assert_eq!(ws.history().len(), 2);

        assert!(ws.undo());
        // The header draft was flushed by undo, then undone.
        assert_eq!(ws.table(&t).unwrap().columns, s(&["ID", "Name"]));
        assert_eq!(ws.table(&t).unwrap().rows[0][1], "typed");

        ws.stage_cell(&t, 0, 1, "gone").unwrap();
        ws.discard_draft();
        assert!(ws.draft().is_none());
        assert_eq!(ws.table(&t).unwrap().rows[0][1], "typed");
    }

    #[test]
    fn test_drop_flushes_draft() {
        let storage = Arc::new(MemoryStorage::new());
        let t = {
            let mut ws = Workspace::open(storage.clone());
            let t = ws.create_table_with("T", tiny());
            ws.stage_cell(&t, 0, 1, "kept").unwrap();
            t
        };
        let ws = Workspace::open(storage);
        assert_eq!(ws.table(&t).unwrap().rows[0][1], "kept");
        assert_eq!(ws.history().len(), 2);
    }

    #[test]
    fn test_sync_rewrites_identity_and_selection() {
        let mut ws = Workspace::in_memory();
        let tmp = ws.create_table_with("A", tiny());
        let remote = FakeRemote::new();

        let outcome = ws.save_table(&tmp, &remote).unwrap();
        let canonical = outcome.canonical_for(&tmp).unwrap().clone();

        assert!(ws.table(&tmp).is_none());
        assert_eq!(ws.tables().iter().filter(|t| t.id == canonical).count(), 1);
        assert_eq!(ws.current(), Some(&canonical));
        assert_eq!(ws.history().current().unwrap().action, ActionType::Sync);

        // Undoing past the sync does not resurrect the local copy.
        assert!(ws.undo());
        assert!(ws.table(&tmp).is_none());
        assert!(ws.table(&canonical).is_some());
    }

    #[test]
    fn test_repeated_sync_records_identical_checkpoints() {
        let mut ws = Workspace::in_memory();
        let _ = ws.create_table_with("A", tiny());
        let _ = ws.create_table_with("B", tiny());
        let remote = FakeRemote::new();

        ws.save_all(&remote).unwrap();
        let r = ws.tables()[0].id.clone();
        ws.save_table(&r, &remote).unwrap();

        let entries = ws.history().entries();
        let last = &entries[entries.len() - 1];
        let prev = &entries[entries.len() - 2];
        assert_eq!(last.action, ActionType::Sync);
        assert_eq!(prev.action, ActionType::Sync);
        assert_eq!(last.snapshot, prev.snapshot);
    }

    #[test]
    fn test_failed_sync_is_invisible() {
        let storage = Arc::new(MemoryStorage::new());
        let mut ws = Workspace::open(storage.clone());
        let tmp = ws.create_table_with("A", tiny());
        let tables_before = storage.get(StorageKey::Tables);
        let len_before = ws.history().len();

        let remote = FakeRemote::new();
        remote.fail_next(SyncError::Transport("down".into()));
        assert!(ws.save_table(&tmp, &remote).is_err());

        assert!(ws.table(&tmp).is_some());
        assert_eq!(ws.history().len(), len_before);
        assert_eq!(storage.get(StorageKey::Tables), tables_before);
    }

    #[test]
    fn test_delete_remote_and_notifications() {
        let record = |id: &str| peony_protocol::RemoteTable {
            id: Some(id.into()),
            name: id.into(),
            columns: s(&["ID"]),
            rows: vec![],
        };
        let remote = FakeRemote::new().with_records(vec![record("srv_1"), record("srv_2")]);
        let mut ws = Workspace::in_memory();
        ws.load_remote(&remote).unwrap();
        let local = ws.create_table_with("L", tiny());

        ws.delete_remote(&TableId::remote("srv_1"), &remote).unwrap();
        assert!(ws.table(&TableId::remote("srv_1")).is_none());
        assert_eq!(remote.records().len(), 1);
        assert!(ws.delete_remote(&local, &remote).is_err());

        let note = ChangeNotification { operation: peony_protocol::ChangeOperation::Delete, id: "srv_2".into() };
        ws.handle_notification(&note, &remote).unwrap();
        assert!(ws.table(&TableId::remote("srv_2")).is_none());
        assert!(ws.table(&local).is_some());
        assert_eq!(ws.history().len(), 1);
    }

    #[test]
    fn test_jump_to_and_clear() {
        let mut ws = Workspace::in_memory();
        let t = ws.create_table_with("T", tiny());
        ws.rename_table(&t, "Renamed").unwrap();
        assert!(!ws.rename_table(&t, " Renamed ").unwrap());
        assert_eq!(ws.history().len(), 2);

        ws.jump_to(Some(0)).unwrap();
        assert_eq!(ws.table(&t).unwrap().name, "T");
        assert!(ws.jump_to(Some(5)).is_err());

        ws.clear_history();
        assert!(ws.history().is_empty());
        assert_eq!(ws.table(&t).unwrap().name, "T");
    }

    #[test]
    fn test_bulk_delete_is_one_entry() {
        let mut ws = Workspace::in_memory();
        let a = ws.create_table_with("A", tiny());
        let b = ws.create_table_with("B", tiny());
        let _c = ws.create_table_with("C", tiny());

        assert!(ws.delete_tables(&[a.clone(), b.clone()]).unwrap());
        assert_eq!(ws.tables().len(), 1);
        assert_eq!(ws.history().current().unwrap().action, ActionType::BulkAction);

        assert!(ws.undo());
        assert_eq!(ws.tables().len(), 3);
    }

    #[test]
    fn test_bulk_delete_with_unknown_id_deletes_nothing() {
        let mut ws = Workspace::in_memory();
        let a = ws.create_table_with("A", tiny());
        let ghost = TableId::local("ghost");

        let err = ws.delete_tables(&[a.clone(), ghost.clone()]).unwrap_err();
        assert_eq!(err, CommandError::UnknownTable(ghost));
        assert!(ws.table(&a).is_some());
        assert_eq!(ws.history().len(), 1);
    }

    #[test]
    fn test_notification_leaves_draft_pending() {
        let record = peony_protocol::RemoteTable {
            id: Some("srv_1".into()),
            name: "Remote".into(),
            columns: s(&["ID"]),
            rows: vec![],
        };
        let remote = FakeRemote::new().with_records(vec![record]);
        let mut ws = Workspace::in_memory();
        let t = ws.create_table_with("T", tiny());
        ws.stage_cell(&t, 0, 1, "half-typ").unwrap();
        let before = ws.history().len();

        let note = ChangeNotification { operation: peony_protocol::ChangeOperation::Update, id: "srv_1".into() };
        ws.handle_notification(&note, &remote).unwrap();

        assert!(ws.table(&TableId::remote("srv_1")).is_some());
        assert_eq!(ws.history().len(), before);
        assert!(ws.draft().is_some());
        assert_eq!(ws.table(&t).unwrap().rows[0][1], "");

        assert!(ws.commit_draft());
        assert_eq!(ws.table(&t).unwrap().rows[0][1], "half-typ");
    }
}
