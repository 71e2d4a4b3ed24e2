// File I/O: durable storage, import providers, export

pub mod clipboard;
pub mod csv;
pub mod error;
pub mod json;
pub mod storage;

pub use error::{ExportError, ImportError};
pub use storage::FileStorage;
