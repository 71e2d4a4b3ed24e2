// Property-based tests for the history ledger driven through the workspace.
// CI: 128 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use peony_core::{Table, TableId};
use peony_engine::{
    ColumnPosition, RemoteStore, RowPosition, Selection, SyncError, Workspace,
};
use peony_protocol::RemoteTable;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Create,
    EditCell { table: usize, row: usize, col: usize, value: String },
    EditColumn { table: usize, col: usize, name: String },
    AddRow { table: usize, row: Option<usize>, above: bool },
    DeleteRow { table: usize, row: usize },
    AddColumn { table: usize, col: Option<usize>, after: bool },
    DeleteColumn { table: usize, col: usize },
    Rename { table: usize, name: String },
    Clone { table: usize },
    Delete { table: usize },
    DeleteTwo { a: usize, b: usize },
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"[a-z]{1,6}",
        1 => Just(String::new()),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    let t = 0usize..4;
    prop_oneof![
        2 => Just(Op::Create),
        4 => (t.clone(), 0usize..4, 0usize..4, arb_text())
            .prop_map(|(table, row, col, value)| Op::EditCell { table, row, col, value }),
        1 => (t.clone(), 0usize..4, arb_text()).prop_map(|(table, col, name)| Op::EditColumn { table, col, name }),
        2 => (t.clone(), proptest::option::of(0usize..4), any::<bool>())
            .prop_map(|(table, row, above)| Op::AddRow { table, row, above }),
        2 => (t.clone(), 0usize..4).prop_map(|(table, row)| Op::DeleteRow { table, row }),
        1 => (t.clone(), proptest::option::of(0usize..4), any::<bool>())
            .prop_map(|(table, col, after)| Op::AddColumn { table, col, after }),
        1 => (t.clone(), 0usize..4).prop_map(|(table, col)| Op::DeleteColumn { table, col }),
        1 => (t.clone(), arb_text()).prop_map(|(table, name)| Op::Rename { table, name }),
        1 => t.clone().prop_map(|table| Op::Clone { table }),
        1 => t.clone().prop_map(|table| Op::Delete { table }),
        1 => (t.clone(), t).prop_map(|(a, b)| Op::DeleteTwo { a, b }),
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn local_ids(ws: &Workspace) -> Vec<TableId> {
    ws.store().local_only().map(|t| t.id.clone()).collect()
}

fn local_tables(ws: &Workspace) -> Vec<Table> {
    ws.store().local_only().cloned().collect()
}

fn pick(ws: &Workspace, i: usize) -> Option<TableId> {
    let ids = local_ids(ws);
    if ids.is_empty() {
        None
    } else {
        Some(ids[i % ids.len()].clone())
    }
}

/// Apply one op; returns whether a ledger entry was recorded.
fn run(ws: &mut Workspace, op: &Op) -> bool {
    let before = ws.history().len();
    match op {
        Op::Create => {
            ws.create_table();
        }
        Op::EditCell { table, row, col, value } => {
            if let Some(id) = pick(ws, *table) {
                ws.edit_cell(&id, *row, *col, value).unwrap();
            }
        }
        Op::EditColumn { table, col, name } => {
            if let Some(id) = pick(ws, *table) {
                ws.edit_column_name(&id, *col, name).unwrap();
            }
        }
        Op::AddRow { table, row, above } => {
            if let Some(id) = pick(ws, *table) {
                let pos = if *above { RowPosition::Above } else { RowPosition::Below };
                ws.add_row(&id, row.map(|r| Selection::new(r, 1)), pos).unwrap();
            }
        }
        Op::DeleteRow { table, row } => {
            if let Some(id) = pick(ws, *table) {
                ws.delete_row(&id, Some(Selection::new(*row, 1))).unwrap();
            }
        }
        Op::AddColumn { table, col, after } => {
            if let Some(id) = pick(ws, *table) {
                let pos = if *after { ColumnPosition::After } else { ColumnPosition::Before };
                ws.add_column(&id, col.map(|c| Selection::new(0, c)), pos).unwrap();
            }
        }
        Op::DeleteColumn { table, col } => {
            if let Some(id) = pick(ws, *table) {
                ws.delete_column(&id, Some(Selection::new(0, *col))).unwrap();
            }
        }
        Op::Rename { table, name } => {
            if let Some(id) = pick(ws, *table) {
                ws.rename_table(&id, name).unwrap();
            }
        }
        Op::Clone { table } => {
            if let Some(id) = pick(ws, *table) {
                ws.clone_table(&id).unwrap();
            }
        }
        Op::Delete { table } => {
            if let Some(id) = pick(ws, *table) {
                ws.delete_table(&id).unwrap();
            }
        }
        Op::DeleteTwo { a, b } => {
            let ids: Vec<TableId> = [pick(ws, *a), pick(ws, *b)].into_iter().flatten().collect();
            ws.delete_tables(&ids).unwrap();
        }
    }
    ws.history().len() > before
}

/// Serves a fixed set of remote records.
struct FixedRemote(Vec<RemoteTable>);

impl RemoteStore for FixedRemote {
    fn fetch_all(&self) -> Result<Vec<RemoteTable>, SyncError> {
        Ok(self.0.clone())
    }

    fn sync(&self, _tables: &[RemoteTable]) -> Result<Vec<RemoteTable>, SyncError> {
        Err(SyncError::Transport("read-only fixture".into()))
    }

    fn delete(&self, id: &str) -> Result<(), SyncError> {
        Err(SyncError::NotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_128())]

    /// Undo everything, redo everything: the local partition is back.
    #[test]
    fn prop_undo_redo_round_trip(ops in proptest::collection::vec(arb_op(), 1..25)) {
        let mut ws = Workspace::in_memory();
        for op in &ops {
            run(&mut ws, op);
        }
        let after = local_tables(&ws);
        let entries = ws.history().len();

        let mut undone = 0;
        while ws.undo() {
            undone += 1;
        }
        prop_assert_eq!(undone, entries);
        prop_assert!(local_tables(&ws).is_empty());

        while ws.redo() {}
        prop_assert_eq!(local_tables(&ws), after);
    }

    /// Every table stays well formed after every command.
    #[test]
    fn prop_rows_stay_numbered(ops in proptest::collection::vec(arb_op(), 1..30)) {
        let mut ws = Workspace::in_memory();
        for op in &ops {
            run(&mut ws, op);
            for table in ws.tables() {
                prop_assert!(table.is_well_formed(), "{:?} broke {:?}", op, table);
            }
        }
    }

    /// Undo K, commit one: length is (len - K) + 1 and nothing is redoable.
    #[test]
    fn prop_push_truncates_future(
        ops in proptest::collection::vec(arb_op(), 1..20),
        k in 0usize..20,
    ) {
        let mut ws = Workspace::in_memory();
        for op in &ops {
            run(&mut ws, op);
        }
        let len = ws.history().len();
        let k = k.min(len);
        for _ in 0..k {
            ws.undo();
        }
        ws.create_table();

        prop_assert_eq!(ws.history().len(), len - k + 1);
        prop_assert!(!ws.history().can_redo());
    }

    /// History navigation never changes a remote-canonical table.
    #[test]
    fn prop_remote_partition_untouched(ops in proptest::collection::vec(arb_op(), 1..20)) {
        let remote = FixedRemote(vec![RemoteTable {
            id: Some("srv_1".into()),
            name: "Orders".into(),
            columns: vec!["ID".into(), "Item".into()],
            rows: vec![vec!["1".into(), "Pen".into()]],
        }]);
        let mut ws = Workspace::in_memory();
        ws.load_remote(&remote).unwrap();
        let pinned = ws.table(&TableId::remote("srv_1")).cloned();

        for op in &ops {
            run(&mut ws, op);
        }
        while ws.undo() {
            prop_assert_eq!(ws.table(&TableId::remote("srv_1")).cloned(), pinned.clone());
        }
        while ws.redo() {
            prop_assert_eq!(ws.table(&TableId::remote("srv_1")).cloned(), pinned.clone());
        }
    }
}
