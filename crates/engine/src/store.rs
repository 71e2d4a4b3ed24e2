//! Table Store: the working set of local-only and remote-canonical tables.
//!
//! Every mutation replaces the list wholesale and persists it before
//! returning.

use std::sync::Arc;

use peony_core::{Table, TableId};

use crate::storage::{self, Storage, StorageKey};

pub struct TableStore {
    tables: Vec<Table>,
    storage: Arc<dyn Storage>,
}

impl TableStore {
    /// Empty store. Nothing is read from `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { tables: Vec::new(), storage }
    }

    /// Restore the table list persisted by a previous session.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let tables: Vec<Table> = storage::load_json(storage.as_ref(), StorageKey::Tables).unwrap_or_default();
        log::debug!("Loaded {} table(s) from local storage", tables.len());
        Self { tables, storage }
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn get(&self, id: &TableId) -> Option<&Table> {
        self.tables.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TableId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables owned by history.
    pub fn local_only(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| t.is_local_only())
    }

    /// Tables mirrored from the backing store.
    pub fn remote(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| !t.is_local_only())
    }

    /// Atomic replace-all.
    pub fn replace(&mut self, next: Vec<Table>) {
        self.tables = next;
        self.persist();
    }

    /// Swap the local-only partition for `snapshot`, leaving every
    /// remote-canonical table exactly as it was.
    pub fn apply_local_snapshot(&mut self, snapshot: Vec<Table>) {
        let mut next: Vec<Table> = self.remote().cloned().collect();
        next.extend(snapshot.into_iter().filter(|t| t.is_local_only()));
        self.replace(next);
    }

    /// Load-time merge: fresh remote tables first, then every persisted
    /// local-only table that is not already present.
    pub fn merge_remote(&mut self, remote: Vec<Table>) {
        let mut next = remote;
        for table in self.local_only() {
            if !next.iter().any(|t| t.id == table.id) {
                next.push(table.clone());
            }
        }
        self.replace(next);
    }

    /// Real-time refresh: replace the remote partition, keep local tables.
    pub fn refresh_remote(&mut self, remote: Vec<Table>) {
        let mut next: Vec<Table> = remote.into_iter().filter(|t| !t.is_local_only()).collect();
        next.extend(self.local_only().cloned());
        self.replace(next);
    }

    /// Real-time delete of a remote record. Local tables are never touched.
    pub fn remove_remote(&mut self, remote_id: &str) -> bool {
        let target = TableId::remote(remote_id);
        if !self.contains(&target) {
            return false;
        }
        let next = self.tables.iter().filter(|t| t.id != target).cloned().collect();
        self.replace(next);
        true
    }

    fn persist(&self) {
        storage::store_json(self.storage.as_ref(), StorageKey::Tables, &self.tables);
    }
}
