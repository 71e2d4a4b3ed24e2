//! Real-time change notifications.
//!
//! A notification only ever refreshes the remote-canonical partition. It
//! never touches local-only tables or the ledger.

use peony_protocol::{ChangeNotification, ChangeOperation};

use crate::error::SyncError;
use crate::store::TableStore;
use crate::sync::{self, RemoteStore};

/// What a notification asks the store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEffect {
    /// Drop one remote record locally; no round trip needed.
    Remove(String),
    /// Re-fetch every remote record.
    Refetch,
}

pub fn effect_of(notification: &ChangeNotification) -> RealtimeEffect {
    match notification.operation {
        ChangeOperation::Delete if !notification.id.is_empty() => RealtimeEffect::Remove(notification.id.clone()),
        _ => RealtimeEffect::Refetch,
    }
}

/// Reconcile the store with one notification. On fetch failure the
/// store is left as it was.
pub fn apply_notification(
    store: &mut TableStore,
    notification: &ChangeNotification,
    remote: &dyn RemoteStore,
) -> Result<RealtimeEffect, SyncError> {
    let effect = effect_of(notification);
    log::debug!("Change notification {:?} {} -> {:?}", notification.operation, notification.id, effect);
    match &effect {
        RealtimeEffect::Remove(id) => {
            store.remove_remote(id);
        }
        RealtimeEffect::Refetch => {
            let tables = sync::fetch_remote(remote)?;
            store.refresh_remote(tables);
        }
    }
    Ok(effect)
}
