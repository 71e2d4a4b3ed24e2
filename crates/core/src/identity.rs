//! Table identity.
//!
//! A table id lives in one of two namespaces: ids minted on this client
//! (local-only, not yet known to the backing store) and ids assigned by
//! the backing store (remote-canonical). A local table cloned from a
//! remote one also remembers where it came from so that saving it updates
//! the original record instead of creating a new one.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableId {
    /// Created, imported or copied on this client; never synced.
    Local { id: String },
    /// Assigned by the backing store.
    Remote { id: String },
    /// Editable local copy of the remote record `origin`.
    PendingClone { id: String, origin: String },
}

impl TableId {
    /// Mint a fresh local-only id.
    pub fn new_local() -> Self {
        TableId::Local { id: uuid::Uuid::new_v4().to_string() }
    }

    /// Mint a fresh pending-clone id tracking `origin`.
    pub fn new_clone(origin: impl Into<String>) -> Self {
        TableId::PendingClone {
            id: uuid::Uuid::new_v4().to_string(),
            origin: origin.into(),
        }
    }

    pub fn local(id: impl Into<String>) -> Self {
        TableId::Local { id: id.into() }
    }

    pub fn remote(id: impl Into<String>) -> Self {
        TableId::Remote { id: id.into() }
    }

    pub fn pending_clone(id: impl Into<String>, origin: impl Into<String>) -> Self {
        TableId::PendingClone { id: id.into(), origin: origin.into() }
    }

    /// True for ids the history ledger owns (local and pending clones).
    pub fn is_local_only(&self) -> bool {
        !matches!(self, TableId::Remote { .. })
    }

    /// The remote record a pending clone was copied from.
    pub fn origin(&self) -> Option<&str> {
        match self {
            TableId::PendingClone { origin, .. } => Some(origin),
            _ => None,
        }
    }

    /// The bare identifier, without namespace.
    pub fn as_str(&self) -> &str {
        match self {
            TableId::Local { id } | TableId::Remote { id } | TableId::PendingClone { id, .. } => id,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
