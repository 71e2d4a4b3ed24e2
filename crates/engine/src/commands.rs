//! Command handlers.
//!
//! Each handler is a pure function of the current table list and its
//! arguments. It returns the complete next list plus the metadata of the
//! single ledger entry describing the change, or `None` when the command
//! is a no-op (nothing to store, nothing to record).

use peony_core::{unique_name, Table, TableId, TableTemplate, CLONE_SUFFIX};

use crate::history::{ActionType, EntryMeta, EntryTarget};

/// Name given to columns inserted by `add_column`.
pub const NEW_COLUMN_NAME: &str = "New column";

/// Name given to tables built from clipboard text.
pub const PASTED_TABLE_NAME: &str = "Pasted table";

/// Outcome of a command: the next table list and how to record it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub tables: Vec<Table>,
    pub meta: EntryMeta,
    /// Table to open afterwards; `None` keeps the current selection.
    pub focus: Option<TableId>,
}

/// Selected cell in the table editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub row: usize,
    pub col: usize,
}

impl Selection {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPosition {
    Before,
    After,
}

fn names(tables: &[Table]) -> impl Iterator<Item = &str> {
    tables.iter().map(|t| t.name.as_str())
}

fn table_meta(action: ActionType, id: &TableId, description: String) -> EntryMeta {
    EntryMeta::new(action, EntryTarget::Table(id.clone()), description)
}

/// Replace table `id` with `f(table)`; `None` if it is missing or `f` declines.
fn update_table<F>(tables: &[Table], id: &TableId, f: F) -> Option<(Vec<Table>, String, ActionType)>
where
    F: FnOnce(&Table) -> Option<(Table, String, ActionType)>,
{
    let pos = tables.iter().position(|t| &t.id == id)?;
    let (updated, description, action) = f(&tables[pos])?;
    let mut next = tables.to_vec();
    next[pos] = updated;
    Some((next, description, action))
}

fn edit(tables: &[Table], id: &TableId, f: impl FnOnce(&Table) -> Option<(Table, String, ActionType)>) -> Option<Transition> {
    let (next, description, action) = update_table(tables, id, f)?;
    Some(Transition {
        tables: next,
        meta: table_meta(action, id, description),
        focus: Some(id.clone()),
    })
}

/// New local table from `template`, named `base_name` (disambiguated).
/// Returns the new table's id with the transition.
pub fn create_table(tables: &[Table], base_name: &str, template: TableTemplate) -> (TableId, Transition) {
    let name = unique_name(base_name, names(tables));
    let table = Table::new(TableId::new_local(), name, template.columns, template.rows).normalized();
    let description = format!("Created table \"{}\"", table.name);
    let id = table.id.clone();

    let mut next = Vec::with_capacity(tables.len() + 1);
    next.push(table);
    next.extend_from_slice(tables);
    let transition = Transition { tables: next, meta: table_meta(ActionType::RowAdd, &id, description), focus: Some(id.clone()) };
    (id, transition)
}

/// Commit a table produced by an import provider.
///
/// The payload is normalized (leading `ID` column, rectangular rows). A
/// payload carrying a remote id is re-keyed as a new local table.
pub fn import_table(tables: &[Table], table: Table) -> (TableId, Transition) {
    let mut table = table.normalized();
    if !table.is_local_only() || tables.iter().any(|t| t.id == table.id) {
        table.id = TableId::new_local();
    }
    let description = format!("Imported table \"{}\"", table.name);
    let id = table.id.clone();

    let mut next = Vec::with_capacity(tables.len() + 1);
    next.push(table);
    next.extend_from_slice(tables);
    let transition = Transition { tables: next, meta: table_meta(ActionType::RowAdd, &id, description), focus: Some(id.clone()) };
    (id, transition)
}

/// Rename; no-op when the trimmed name is empty or unchanged.
pub fn rename_table(tables: &[Table], id: &TableId, new_name: &str) -> Option<Transition> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return None;
    }
    edit(tables, id, |t| {
        if t.name == new_name {
            return None;
        }
        let mut updated = t.clone();
        updated.name = new_name.to_string();
        Some((updated, format!("Renamed to \"{}\"", new_name), ActionType::Rename))
    })
}

/// Set one cell. Column 0 is derived and never editable.
pub fn edit_cell(tables: &[Table], id: &TableId, row: usize, col: usize, value: &str) -> Option<Transition> {
    if col == 0 {
        return None;
    }
    edit(tables, id, |t| {
        let current = t.cell(row, col)?;
        if current == value {
            return None;
        }
        let mut updated = t.clone();
        updated.rows[row][col] = value.to_string();
        let description = format!("Edited cell [{}, {}]", updated.rows[row][0], updated.columns[col]);
        Some((updated, description, ActionType::Cell))
    })
}

/// Rename a column header. The `ID` column is fixed.
pub fn edit_column_name(tables: &[Table], id: &TableId, col: usize, name: &str) -> Option<Transition> {
    if col == 0 {
        return None;
    }
    edit(tables, id, |t| {
        if t.columns.get(col)? == name {
            return None;
        }
        let mut updated = t.clone();
        updated.columns[col] = name.to_string();
        Some((updated, format!("Edited column \"{}\"", name), ActionType::Cell))
    })
}

/// Insert an empty row above/below the selection, or at the start/end
/// when nothing is selected.
pub fn add_row(tables: &[Table], id: &TableId, selection: Option<Selection>, position: RowPosition) -> Option<Transition> {
    edit(tables, id, |t| {
        let len = t.rows.len();
        let at = match (selection, position) {
            (Some(sel), RowPosition::Above) => sel.row.min(len),
            (Some(sel), RowPosition::Below) => (sel.row + 1).min(len),
            (None, RowPosition::Above) => 0,
            (None, RowPosition::Below) => len,
        };
        let mut updated = t.clone();
        updated.rows.insert(at, t.blank_row());
        updated.renumber_rows();
        Some((updated, "Added row".to_string(), ActionType::RowAdd))
    })
}

/// Remove the selected row. Requires a selection.
pub fn delete_row(tables: &[Table], id: &TableId, selection: Option<Selection>) -> Option<Transition> {
    let sel = selection?;
    edit(tables, id, |t| {
        if sel.row >= t.rows.len() {
            return None;
        }
        let mut updated = t.clone();
        updated.rows.remove(sel.row);
        updated.renumber_rows();
        Some((updated, "Deleted row".to_string(), ActionType::RowDelete))
    })
}

/// Insert a column before/after the selected one (default: around the
/// last column). Never lands at index 0.
pub fn add_column(tables: &[Table], id: &TableId, selection: Option<Selection>, position: ColumnPosition) -> Option<Transition> {
    edit(tables, id, |t| {
        if t.columns.is_empty() {
            return None;
        }
        let last = t.columns.len() - 1;
        let anchor = selection.map_or(last, |s| s.col.min(last));
        let at = match position {
            ColumnPosition::Before => anchor,
            ColumnPosition::After => anchor + 1,
        }
        .clamp(1, t.columns.len());

        let mut updated = t.clone();
        updated.columns.insert(at, NEW_COLUMN_NAME.to_string());
        for row in &mut updated.rows {
            let at = at.min(row.len());
            row.insert(at, String::new());
        }
        updated.renumber_rows();
        Some((updated, "Added column".to_string(), ActionType::Cell))
    })
}

/// Remove the selected column; no-op for the `ID` column.
pub fn delete_column(tables: &[Table], id: &TableId, selection: Option<Selection>) -> Option<Transition> {
    let col = selection?.col;
    if col == 0 {
        return None;
    }
    edit(tables, id, |t| {
        if col >= t.columns.len() {
            return None;
        }
        let mut updated = t.clone();
        let removed = updated.columns.remove(col);
        for row in &mut updated.rows {
            if col < row.len() {
                row.remove(col);
            }
        }
        Some((updated, format!("Deleted column \"{}\"", removed), ActionType::Cell))
    })
}

/// The pending clone already tracking remote record `origin`, if any.
pub fn existing_clone<'a>(tables: &'a [Table], origin: &str) -> Option<&'a Table> {
    tables.iter().find(|t| t.id.origin() == Some(origin))
}

/// Editable local copy of `id`.
///
/// A remote source yields a pending clone that remembers its origin so
/// saving it updates that record. A local source yields a plain new
/// local table.
pub fn clone_table(tables: &[Table], id: &TableId) -> Option<(TableId, Transition)> {
    let source = tables.iter().find(|t| &t.id == id)?;
    let (clone_id, name) = match &source.id {
        TableId::Remote { id: origin } => (TableId::new_clone(origin.clone()), format!("{}{}", source.name, CLONE_SUFFIX)),
        _ => (TableId::new_local(), unique_name(&format!("{}{}", source.name, CLONE_SUFFIX), names(tables))),
    };
    let copy = Table::new(clone_id.clone(), name, source.columns.clone(), source.rows.clone()).normalized();
    let description = format!("Cloned table \"{}\"", source.name);

    let mut next = Vec::with_capacity(tables.len() + 1);
    next.push(copy);
    next.extend_from_slice(tables);
    let transition = Transition {
        tables: next,
        meta: table_meta(ActionType::RowAdd, &clone_id, description),
        focus: Some(clone_id.clone()),
    };
    Some((clone_id, transition))
}

pub fn delete_table(tables: &[Table], id: &TableId) -> Option<Transition> {
    let victim = tables.iter().find(|t| &t.id == id)?;
    let description = format!("Deleted table \"{}\"", victim.name);
    let next = tables.iter().filter(|t| &t.id != id).cloned().collect();
    Some(Transition { tables: next, meta: table_meta(ActionType::RowDelete, id, description), focus: None })
}

/// Remove several tables in one mutation and one `bulk_action` entry.
/// Ids absent from `tables` are skipped; `Workspace::delete_tables`
/// rejects them before getting here.
pub fn delete_tables(tables: &[Table], ids: &[TableId]) -> Option<Transition> {
    let present: Vec<&TableId> = ids.iter().filter(|id| tables.iter().any(|t| &t.id == *id)).collect();
    match present.as_slice() {
        [] => None,
        [single] => delete_table(tables, single),
        many => {
            let next = tables.iter().filter(|t| !ids.contains(&t.id)).cloned().collect();
            Some(Transition {
                tables: next,
                meta: EntryMeta::new(ActionType::BulkAction, EntryTarget::Multiple, format!("Deleted {} tables", many.len())),
                focus: None,
            })
        }
    }
}
