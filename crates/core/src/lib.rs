//! Core table types shared by every Peony crate.
//!
//! No I/O, no history, no network. Just the grid and who owns it.

pub mod identity;
pub mod table;

pub use identity::TableId;
pub use table::{unique_name, Table, TableTemplate, CLONE_SUFFIX, ID_COLUMN};
