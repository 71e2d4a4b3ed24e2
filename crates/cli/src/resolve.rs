// Table, row and column references on the command line.
//
// Tables: exact id, case-insensitive name, or an id prefix of at least
// four characters. Rows: the 1-based number shown in the ID column.
// Columns: header name, or position with ID at 0.

use peony_core::{Table, TableId};
use peony_engine::Workspace;

use crate::exit_codes::{EXIT_TABLE_AMBIGUOUS, EXIT_TABLE_NOT_FOUND};
use crate::CliError;

const MIN_PREFIX: usize = 4;

pub fn table(ws: &Workspace, reference: &str) -> Result<TableId, CliError> {
    let tables = ws.tables();

    if let Some(t) = tables.iter().find(|t| t.id.as_str() == reference) {
        return Ok(t.id.clone());
    }

    let by_name: Vec<&Table> = tables.iter().filter(|t| t.name.eq_ignore_ascii_case(reference)).collect();
    match by_name.as_slice() {
        [one] => return Ok(one.id.clone()),
        [] => {}
        many => return Err(ambiguous(reference, many)),
    }

    if reference.len() >= MIN_PREFIX {
        let by_prefix: Vec<&Table> = tables.iter().filter(|t| t.id.as_str().starts_with(reference)).collect();
        match by_prefix.as_slice() {
            [one] => return Ok(one.id.clone()),
            [] => {}
            many => return Err(ambiguous(reference, many)),
        }
    }

    Err(CliError {
        code: EXIT_TABLE_NOT_FOUND,
        message: format!("no table matches '{}'", reference),
        hint: Some("run `peony list` to see table ids and names".into()),
    })
}

pub fn tables(ws: &Workspace, references: &[String]) -> Result<Vec<TableId>, CliError> {
    references.iter().map(|r| table(ws, r)).collect()
}

fn ambiguous(reference: &str, matches: &[&Table]) -> CliError {
    let ids: Vec<&str> = matches.iter().map(|t| t.id.as_str()).collect();
    CliError {
        code: EXIT_TABLE_AMBIGUOUS,
        message: format!("'{}' matches {} tables", reference, matches.len()),
        hint: Some(format!("use one of the ids: {}", ids.join(", "))),
    }
}

/// Row number as displayed (1-based) to row index.
pub fn row(table: &Table, number: usize) -> Result<usize, CliError> {
    if number == 0 || number > table.rows.len() {
        return Err(CliError::usage(format!(
            "row {} out of range ('{}' has {} rows)",
            number,
            table.name,
            table.rows.len()
        )));
    }
    Ok(number - 1)
}

pub fn column(table: &Table, reference: &str) -> Result<usize, CliError> {
    if let Ok(index) = reference.parse::<usize>() {
        if index < table.columns.len() {
            return Ok(index);
        }
        return Err(CliError::usage(format!(
            "column {} out of range ('{}' has {} columns)",
            index,
            table.name,
            table.columns.len()
        )));
    }
    table
        .columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(reference))
        .ok_or_else(|| {
            CliError::usage(format!("no column '{}' in '{}'", reference, table.name))
                .with_hint(format!("columns: {}", table.columns.join(", ")))
        })
}
