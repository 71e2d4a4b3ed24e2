//! Peony table engine.
//!
//! The [`workspace::Workspace`] facade ties together the table store, the
//! snapshot-based history ledger, the pure command handlers, the draft
//! commit discipline and the synchronization coordinator.

pub mod commands;
pub mod draft;
pub mod error;
pub mod history;
pub mod identity;
pub mod realtime;
pub mod storage;
pub mod store;
pub mod sync;
pub mod workspace;

#[cfg(test)]
pub mod harness;

pub use commands::{ColumnPosition, RowPosition, Selection, Transition};
pub use error::{CommandError, HistoryError, SyncError};
pub use history::{ActionType, EntryMeta, EntryTarget, HistoryEntry, HistoryLedger};
pub use storage::{MemoryStorage, Storage, StorageError, StorageKey};
pub use store::TableStore;
pub use sync::{RemoteStore, SyncOutcome, SyncedTable};
pub use workspace::Workspace;
