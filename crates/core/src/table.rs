//! The table: a named grid of strings with a reserved `ID` column.
//!
//! Column 0 is always `ID` and row[0] is a display sequence number
//! (1-based), recomputed whenever rows move. Neither is user-editable.

use serde::{Deserialize, Serialize};

use crate::identity::TableId;

/// Name of the reserved first column.
pub const ID_COLUMN: &str = "ID";

/// Cosmetic suffix carried by editable copies of remote tables.
pub const CLONE_SUFFIX: &str = " (copy)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(id: TableId, name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { id, name: name.into(), columns, rows }
    }

    pub fn is_local_only(&self) -> bool {
        self.id.is_local_only()
    }

    /// Restore `row[i][0] == i + 1` for every row.
    pub fn renumber_rows(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            let seq = (i + 1).to_string();
            match row.first_mut() {
                Some(first) => *first = seq,
                None => row.push(seq),
            }
        }
    }

    /// Coerce arbitrary input into a well-formed table.
    ///
    /// Prepends the `ID` column when missing (shifting existing cells one
    /// to the right), pads or truncates rows to the column count and
    /// renumbers.
    pub fn normalized(mut self) -> Self {
        let has_id = self.columns.first().map(String::as_str) == Some(ID_COLUMN);
        if !has_id {
            self.columns.insert(0, ID_COLUMN.to_string());
            for row in &mut self.rows {
                row.insert(0, String::new());
            }
        }
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
        self.renumber_rows();
        self
    }

    /// Check the structural invariants: leading `ID` column, rectangular
    /// rows and sequential row numbers.
    pub fn is_well_formed(&self) -> bool {
        self.columns.first().map(String::as_str) == Some(ID_COLUMN)
            && self.rows.iter().enumerate().all(|(i, row)| {
                row.len() == self.columns.len() && row[0] == (i + 1).to_string()
            })
    }

    /// An empty row sized to this table.
    pub fn blank_row(&self) -> Vec<String> {
        vec![String::new(); self.columns.len()]
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }
}

/// Columns and rows used to seed a newly created table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTemplate {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableTemplate {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }
}

impl Default for TableTemplate {
    fn default() -> Self {
        let s = |v: &str| v.to_string();
        Self {
            columns: vec![s(ID_COLUMN), s("Name"), s("Property 1"), s("Property 2")],
            rows: vec![
                vec![s("1"), s("Sample data"), s(""), s("")],
                vec![s("2"), s(""), s(""), s("")],
            ],
        }
    }
}

/// Pick `base`, or `base 2`, `base 3`, ... so that no existing name
/// matches case-insensitively.
pub fn unique_name<'a>(base: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<String> = existing.into_iter().map(str::to_lowercase).collect();
    let is_taken = |candidate: &str| taken.iter().any(|t| *t == candidate.to_lowercase());

    if !is_taken(base) {
        return base.to_string();
    }
    let mut i = 2;
    loop {
        let candidate = format!("{} {}", base, i);
        if !is_taken(&candidate) {
            return candidate;
        }
        i += 1;
    }
}
