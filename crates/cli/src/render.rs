// Output formatting: plain text for terminals, serde_json values for --json.

use peony_core::{Table, TableId};
use peony_engine::{EntryTarget, HistoryLedger, SyncOutcome};
use serde_json::{json, Value};

pub fn kind(id: &TableId) -> &'static str {
    match id {
        TableId::Local { .. } => "local",
        TableId::Remote { .. } => "remote",
        TableId::PendingClone { .. } => "clone",
    }
}

pub fn table_summary_json(table: &Table) -> Value {
    json!({
        "id": table.id.as_str(),
        "kind": kind(&table.id),
        "origin": table.id.origin(),
        "name": table.name,
        "columns": table.columns.len(),
        "rows": table.rows.len(),
    })
}

pub fn table_json(table: &Table) -> Value {
    json!({
        "id": table.id.as_str(),
        "kind": kind(&table.id),
        "origin": table.id.origin(),
        "name": table.name,
        "columns": table.columns,
        "rows": table.rows,
    })
}

pub fn print_table_list(tables: &[Table], current: Option<&TableId>) {
    if tables.is_empty() {
        println!("(no tables)");
        return;
    }
    let id_width = tables.iter().map(|t| t.id.as_str().len()).max().unwrap_or(0);
    for t in tables {
        let marker = if Some(&t.id) == current { "*" } else { " " };
        println!(
            "{} {:<id_width$}  {:<6}  {}  ({} rows x {} cols)",
            marker,
            t.id.as_str(),
            kind(&t.id),
            t.name,
            t.rows.len(),
            t.columns.len(),
            id_width = id_width
        );
    }
}

/// Aligned grid, header first.
pub fn print_grid(table: &Table) {
    println!("{} [{}]", table.name, kind(&table.id));

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(&table.columns).trim_end());
    println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
    for row in &table.rows {
        println!("{}", line(row).trim_end());
    }
}

fn target_json(target: &EntryTarget) -> Value {
    match target {
        EntryTarget::Table(id) => json!(id.as_str()),
        EntryTarget::Multiple => json!("multiple"),
        EntryTarget::Sync => json!("sync"),
    }
}

pub fn history_json(history: &HistoryLedger) -> Value {
    let entries: Vec<Value> = history
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            json!({
                "index": i,
                "id": e.id,
                "type": e.action.as_str(),
                "target": target_json(&e.target),
                "description": e.description,
                "timestamp": e.timestamp.to_rfc3339(),
                "tables": e.snapshot.len(),
            })
        })
        .collect();
    json!({
        "cursor": history.cursor(),
        "can_undo": history.can_undo(),
        "can_redo": history.can_redo(),
        "entries": entries,
    })
}

pub fn print_history(history: &HistoryLedger) {
    let marker = |at: Option<usize>| if history.cursor() == at { ">" } else { " " };
    println!("{} -  (start)", marker(None));
    for (i, e) in history.entries().iter().enumerate() {
        println!(
            "{} {}  {:<11} {}  {}",
            marker(Some(i)),
            i,
            e.action.as_str(),
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.description
        );
    }
}

pub fn outcome_json(outcome: &SyncOutcome) -> Value {
    let synced: Vec<Value> = outcome
        .synced
        .iter()
        .map(|s| json!({ "request": s.request.as_str(), "canonical": s.canonical.as_str() }))
        .collect();
    json!({ "description": outcome.description, "synced": synced })
}

pub fn print_outcome(outcome: &SyncOutcome) {
    println!("{}", outcome.description);
    for s in &outcome.synced {
        if s.request != s.canonical {
            println!("  {} -> {}", s.request.as_str(), s.canonical.as_str());
        }
    }
}
