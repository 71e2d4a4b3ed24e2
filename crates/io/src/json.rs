// JSON import/export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use peony_core::{Table, TableId};
use serde::{Deserialize, Serialize};

use crate::csv::read_file_as_utf8;
use crate::error::{ExportError, ImportError};

/// On-disk table document. Ids are not exported: a re-import is a new table.
#[derive(Debug, Serialize, Deserialize)]
struct TableDocument {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Document(TableDocument),
    /// Array of arrays, header row first.
    Grid(Vec<Vec<String>>),
}

/// Export a table as `{ "name", "columns", "rows" }`.
pub fn export(table: &Table, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Write { path: path.to_path_buf(), source })?;
    let writer = BufWriter::new(file);
    let doc = TableDocument { name: table.name.clone(), columns: table.columns.clone(), rows: table.rows.clone() };
    serde_json::to_writer_pretty(writer, &doc)?;
    Ok(())
}

/// Import a table document or a bare grid.
pub fn import(path: &Path) -> Result<Table, ImportError> {
    let content = read_file_as_utf8(path)?;
    let fallback_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Imported table".to_string());
    import_from_str(&content, &fallback_name)
}

pub fn import_from_str(content: &str, fallback_name: &str) -> Result<Table, ImportError> {
    let (name, columns, rows) = match serde_json::from_str::<JsonInput>(content)? {
        JsonInput::Document(doc) => (doc.name, doc.columns, doc.rows),
        JsonInput::Grid(grid) => {
            let mut grid = grid.into_iter();
            let columns = grid.next().ok_or(ImportError::Empty)?;
            (fallback_name.to_string(), columns, grid.collect())
        }
    };
    let name = if name.trim().is_empty() { fallback_name.to_string() } else { name };
    Ok(Table::new(TableId::new_local(), name, columns, rows).normalized())
}
