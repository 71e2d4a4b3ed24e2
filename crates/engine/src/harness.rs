//! Test harness: an in-memory backing store.
//!
//! `FakeRemote` behaves like the real service (upsert keyed by id, fresh
//! `srv_N` ids for new records) and records every call so tests can
//! assert on round trips and payloads. Failures can be scripted.

use parking_lot::Mutex;
use peony_protocol::RemoteTable;

use crate::error::SyncError;
use crate::sync::RemoteStore;

#[derive(Default)]
pub struct FakeRemote {
    records: Mutex<Vec<RemoteTable>>,
    next_id: Mutex<u64>,
    sync_calls: Mutex<usize>,
    fetch_calls: Mutex<usize>,
    last_request: Mutex<Vec<RemoteTable>>,
    fail_next: Mutex<Option<SyncError>>,
    canned: Option<Vec<RemoteTable>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed server-side records.
    pub fn with_records(self, records: Vec<RemoteTable>) -> Self {
        *self.records.lock() = records;
        self
    }

    /// Answer every sync with `response` instead of computing one.
    pub fn answering_with(mut self, response: Vec<RemoteTable>) -> Self {
        self.canned = Some(response);
        self
    }

    pub fn fail_next(&self, error: SyncError) {
        *self.fail_next.lock() = Some(error);
    }

    pub fn sync_calls(&self) -> usize {
        *self.sync_calls.lock()
    }

    pub fn fetch_calls(&self) -> usize {
        *self.fetch_calls.lock()
    }

    pub fn last_request(&self) -> Vec<RemoteTable> {
        self.last_request.lock().clone()
    }

    pub fn records(&self) -> Vec<RemoteTable> {
        self.records.lock().clone()
    }

    fn take_failure(&self) -> Result<(), SyncError> {
        match self.fail_next.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl RemoteStore for FakeRemote {
    fn fetch_all(&self) -> Result<Vec<RemoteTable>, SyncError> {
        *self.fetch_calls.lock() += 1;
        self.take_failure()?;
        Ok(self.records())
    }

    fn sync(&self, tables: &[RemoteTable]) -> Result<Vec<RemoteTable>, SyncError> {
        *self.sync_calls.lock() += 1;
        *self.last_request.lock() = tables.to_vec();
        self.take_failure()?;
        if let Some(canned) = &self.canned {
            return Ok(canned.clone());
        }

        let mut records = self.records.lock();
        let mut saved = Vec::with_capacity(tables.len());
        for table in tables {
            let mut record = table.clone();
            if let Some(id) = record.id.clone() {
                match records.iter_mut().find(|r| r.id.as_deref() == Some(id.as_str())) {
                    Some(existing) => *existing = record.clone(),
                    None => records.push(record.clone()),
                }
            } else {
                let mut next = self.next_id.lock();
                *next += 1;
                record.id = Some(format!("srv_{}", *next));
                records.push(record.clone());
            }
            saved.push(record);
        }
        Ok(saved)
    }

    fn delete(&self, id: &str) -> Result<(), SyncError> {
        self.take_failure()?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| r.id.as_deref() != Some(id));
        if records.len() == before {
            return Err(SyncError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
