//! Synchronization coordinator.
//!
//! One save is one batched round trip. Nothing is mutated until the
//! backing store has answered and the whole answer has been checked, so a
//! failure of any kind leaves the store and the ledger exactly as they
//! were.

use peony_core::{Table, TableId};
use peony_protocol::RemoteTable;

use crate::error::SyncError;
use crate::history::{ActionType, EntryMeta, EntryTarget, HistoryLedger};
use crate::identity;
use crate::store::TableStore;

/// The backing store, as seen by the engine.
pub trait RemoteStore {
    /// Every remote-canonical table.
    fn fetch_all(&self) -> Result<Vec<RemoteTable>, SyncError>;

    /// Batched upsert. Records come back in request order, each with its
    /// canonical id.
    fn sync(&self, tables: &[RemoteTable]) -> Result<Vec<RemoteTable>, SyncError>;

    /// Delete one remote record.
    fn delete(&self, id: &str) -> Result<(), SyncError>;
}

/// A request id and the canonical id it was saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedTable {
    pub request: TableId,
    pub canonical: TableId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub synced: Vec<SyncedTable>,
    pub description: String,
}

impl SyncOutcome {
    /// Canonical id a request id ended up under, if it took part.
    pub fn canonical_for(&self, request: &TableId) -> Option<&TableId> {
        self.synced.iter().find(|s| &s.request == request).map(|s| &s.canonical)
    }
}

pub struct SyncCoordinator<'a> {
    store: &'a mut TableStore,
    history: &'a mut HistoryLedger,
    remote: &'a dyn RemoteStore,
}

impl<'a> SyncCoordinator<'a> {
    pub fn new(store: &'a mut TableStore, history: &'a mut HistoryLedger, remote: &'a dyn RemoteStore) -> Self {
        Self { store, history, remote }
    }

    pub fn save_one(&mut self, id: &TableId) -> Result<SyncOutcome, SyncError> {
        self.save_many(std::slice::from_ref(id))
    }

    /// Every local-only table in one batch.
    pub fn save_all_local(&mut self) -> Result<SyncOutcome, SyncError> {
        let ids: Vec<TableId> = self.store.local_only().map(|t| t.id.clone()).collect();
        self.save_many(&ids)
    }

    pub fn save_many(&mut self, ids: &[TableId]) -> Result<SyncOutcome, SyncError> {
        let mut requests: Vec<&Table> = Vec::with_capacity(ids.len());
        for id in ids {
            let table = self.store.get(id).ok_or_else(|| SyncError::UnknownTable(id.clone()))?;
            if !requests.iter().any(|t| &t.id == id) {
                requests.push(table);
            }
        }
        if requests.is_empty() {
            return Err(SyncError::Empty);
        }

        let payloads: Vec<RemoteTable> = requests.iter().map(|t| identity::prepare_for_remote(t)).collect();
        for payload in &payloads {
            payload
                .validate()
                .map_err(|e| SyncError::Validation(e.to_string()))?;
        }

        log::info!("Synchronizing {} table(s)", payloads.len());
        let response = self.remote.sync(&payloads)?;
        let canonical = check_response(&payloads, response)?;

        let description = match requests.as_slice() {
            [single] => format!("Synchronized table \"{}\"", single.name),
            many => format!("Synchronized {} tables", many.len()),
        };
        let request_ids: Vec<TableId> = requests.iter().map(|t| t.id.clone()).collect();

        let mut next = self.store.tables().to_vec();
        let mut synced = Vec::with_capacity(canonical.len());
        for (request, table) in request_ids.into_iter().zip(canonical) {
            synced.push(SyncedTable { request: request.clone(), canonical: table.id.clone() });
            identity::rewrite_after_sync(&mut next, &request, table);
            self.history.retire(request);
        }

        self.store.replace(next);
        self.history.push(
            EntryMeta::new(ActionType::Sync, EntryTarget::Sync, description.clone()),
            self.store.tables(),
        );
        log::info!("{}", description);
        Ok(SyncOutcome { synced, description })
    }
}

/// Adopt the answer only if it pairs with the request one-for-one.
///
/// The endpoint is an upsert: an update whose target no longer exists comes
/// back under a fresh id, which the rewrite then adopts.
fn check_response(requests: &[RemoteTable], response: Vec<RemoteTable>) -> Result<Vec<Table>, SyncError> {
    if response.len() != requests.len() {
        return Err(SyncError::Malformed(format!(
            "sent {} record(s), got {} back",
            requests.len(),
            response.len()
        )));
    }
    response.into_iter().map(identity::from_remote).collect()
}

/// Fetch and adopt every remote-canonical table.
pub fn fetch_remote(remote: &dyn RemoteStore) -> Result<Vec<Table>, SyncError> {
    let records = remote.fetch_all()?;
    records.into_iter().map(identity::from_remote).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::harness::FakeRemote;
    use crate::storage::MemoryStorage;

    fn table(id: TableId, name: &str) -> Table {
        Table::new(id, name, vec!["ID".into(), "A".into()], vec![vec!["1".into(), "x".into()]])
    }

    fn setup(tables: Vec<Table>) -> (TableStore, HistoryLedger) {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = TableStore::new(storage.clone());
        store.replace(tables);
        (store, HistoryLedger::new(storage))
    }

    #[test]
    fn test_save_one_promotes_local() {
        let tmp = TableId::local("tmp_A");
        let (mut store, mut history) = setup(vec![table(tmp.clone(), "A")]);
        let remote = FakeRemote::new();

        let outcome = SyncCoordinator::new(&mut store, &mut history, &remote).save_one(&tmp).unwrap();

        let canonical = outcome.canonical_for(&tmp).unwrap().clone();
        assert!(matches!(canonical, TableId::Remote { .. }));
        assert!(!store.contains(&tmp));
        assert_eq!(store.tables().iter().filter(|t| t.id == canonical).count(), 1);
        assert_eq!(history.current().unwrap().action, ActionType::Sync);
        assert_eq!(outcome.description, "Synchronized table \"A\"");
        assert!(history.is_retired(&tmp));
        assert_eq!(remote.sync_calls(), 1);
    }

    #[test]
    fn test_save_many_is_one_round_trip_one_entry() {
        let a = TableId::local("a");
        let b = TableId::local("b");
        let (mut store, mut history) = setup(vec![table(a.clone(), "A"), table(b.clone(), "B")]);
        let remote = FakeRemote::new();

        let outcome = SyncCoordinator::new(&mut store, &mut history, &remote)
            .save_many(&[a.clone(), b.clone(), a.clone()])
            .unwrap();

        assert_eq!(remote.sync_calls(), 1);
        assert_eq!(outcome.synced.len(), 2);
        assert_eq!(history.len(), 1);
        assert_eq!(outcome.description, "Synchronized 2 tables");
        assert_eq!(store.local_only().count(), 0);
    }

    #[test]
    fn test_clone_saves_as_update_and_disappears() {
        let origin = TableId::remote("srv_1");
        let clone = TableId::pending_clone("c1", "srv_1");
        let mut edited = table(clone.clone(), "Orders (copy)");
        edited.rows[0][1] = "changed".into();
        let (mut store, mut history) = setup(vec![table(origin.clone(), "Orders"), edited]);
        let remote = FakeRemote::new();

        SyncCoordinator::new(&mut store, &mut history, &remote).save_one(&clone).unwrap();

        let sent = remote.last_request();
        assert_eq!(sent[0].id.as_deref(), Some("srv_1"));
        assert_eq!(sent[0].name, "Orders");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&origin).unwrap().rows[0][1], "changed");
        assert!(history.current().unwrap().snapshot.is_empty());
    }

    #[test]
    fn test_failure_leaves_everything_untouched() {
        let tmp = TableId::local("tmp");
        let (mut store, mut history) = setup(vec![table(tmp.clone(), "T")]);
        let before = store.tables().to_vec();

        let remote = FakeRemote::new();
        remote.fail_next(SyncError::Transport("connection refused".into()));
        let err = SyncCoordinator::new(&mut store, &mut history, &remote).save_one(&tmp).unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)));

        let remote = FakeRemote::new().answering_with(Vec::new());
        let err = SyncCoordinator::new(&mut store, &mut history, &remote).save_one(&tmp).unwrap_err();
        assert!(matches!(err, SyncError::Malformed(_)));

        assert_eq!(store.tables(), before.as_slice());
        assert!(history.is_empty());
        assert!(!history.is_retired(&tmp));
    }

    #[test]
    fn test_validation_happens_before_network() {
        let tmp = TableId::local("tmp");
        let mut bad = table(tmp.clone(), "");
        bad.name.clear();
        let (mut store, mut history) = setup(vec![bad]);
        let remote = FakeRemote::new();

        let err = SyncCoordinator::new(&mut store, &mut history, &remote).save_one(&tmp).unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(remote.sync_calls(), 0);
    }

    #[test]
    fn test_unknown_and_empty() {
        let (mut store, mut history) = setup(Vec::new());
        let remote = FakeRemote::new();
        let mut sync = SyncCoordinator::new(&mut store, &mut history, &remote);

        assert_eq!(sync.save_all_local().unwrap_err(), SyncError::Empty);
        let ghost = TableId::local("ghost");
        assert_eq!(sync.save_one(&ghost).unwrap_err(), SyncError::UnknownTable(ghost));
    }

    #[test]
    fn test_clone_of_vanished_origin_adopts_new_id() {
        let clone = TableId::pending_clone("c1", "srv_1");
        let mut edited = table(clone.clone(), "Orders (copy)");
        edited.rows[0][1] = "changed".into();
        let (mut store, mut history) = setup(vec![edited.clone()]);

        let mut answer = identity::prepare_for_remote(&edited);
        answer.id = Some("srv_2".into());
        let remote = FakeRemote::new().answering_with(vec![answer]);

        let outcome = SyncCoordinator::new(&mut store, &mut history, &remote).save_one(&clone).unwrap();

        let fresh = TableId::remote("srv_2");
        assert_eq!(outcome.canonical_for(&clone), Some(&fresh));
        assert!(!store.contains(&clone));
        assert_eq!(store.get(&fresh).unwrap().rows[0][1], "changed");
        assert_eq!(store.len(), 1);
        assert_eq!(history.current().unwrap().action, ActionType::Sync);
        assert!(history.is_retired(&clone));
    }

    #[test]
    fn test_answer_without_id_is_malformed() {
        let tmp = TableId::local("tmp");
        let (mut store, mut history) = setup(vec![table(tmp.clone(), "T")]);
        let remote = FakeRemote::new().answering_with(vec![identity::prepare_for_remote(&table(tmp.clone(), "T"))]);

        let err = SyncCoordinator::new(&mut store, &mut history, &remote).save_one(&tmp).unwrap_err();
        assert!(matches!(err, SyncError::Malformed(_)));
        assert!(store.contains(&tmp));
    }
}
