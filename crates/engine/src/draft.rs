//! Pending in-progress edit held outside the ledger.
//!
//! Typing into a cell or header updates the draft only. The draft becomes
//! a ledger entry on an explicit commit (blur, enter, navigation, drop),
//! so the ledger records one entry per edit rather than per keystroke.

use peony_core::{Table, TableId};

use crate::commands::{self, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftTarget {
    Cell { row: usize, col: usize },
    ColumnName { col: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub table: TableId,
    pub target: DraftTarget,
    pub value: String,
}

impl Draft {
    pub fn new(table: TableId, target: DraftTarget, value: impl Into<String>) -> Self {
        Self { table, target, value: value.into() }
    }

    pub fn is_for(&self, table: &TableId, target: DraftTarget) -> bool {
        &self.table == table && self.target == target
    }

    /// The command this draft stands for; `None` if committing would not
    /// change anything.
    pub fn to_transition(&self, tables: &[Table]) -> Option<Transition> {
        match self.target {
            DraftTarget::Cell { row, col } => commands::edit_cell(tables, &self.table, row, col, &self.value),
            DraftTarget::ColumnName { col } => commands::edit_column_name(tables, &self.table, col, &self.value),
        }
    }
}
