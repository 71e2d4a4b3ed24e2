//! Backing store client.
//!
//! This crate is the single HTTP implementation of the engine's
//! `RemoteStore` port: fetch all tables, batched sync, delete.
//!
//! No retries. No caching. Blocking, so no async runtime is required.

mod client;

pub use client::{HubClient, HubError};
