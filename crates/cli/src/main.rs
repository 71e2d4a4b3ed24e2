// Peony CLI - edit tables locally, undo anything, sync to the backing store

mod exit_codes;
mod render;
mod resolve;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use peony_config::Settings;
use peony_core::{TableId, TableTemplate};
use peony_engine::realtime::RealtimeEffect;
use peony_engine::{ColumnPosition, CommandError, HistoryError, RowPosition, Selection, SyncError, Workspace};
use peony_hub_client::HubClient;
use peony_io::FileStorage;
use peony_protocol::{ChangeNotification, ChangeOperation, PROTOCOL_VERSION};

use exit_codes::{
    command_exit_code, history_exit_code, sync_exit_code, SyncErrorOutput, EXIT_ERROR, EXIT_EXPORT, EXIT_IMPORT,
    EXIT_STORAGE, EXIT_SUCCESS, EXIT_TABLE_READ_ONLY, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "peony")]
#[command(about = "Local-first table editor with undo history and backing-store sync")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Directory holding the table list and history ledger
    #[arg(long, global = true, env = "PEONY_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Backing store base URL
    #[arg(long, global = true, env = "PEONY_API_BASE", value_name = "URL")]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tables (local, pending clones, and mirrored remote ones)
    List {
        #[arg(long)]
        json: bool,
    },

    /// Print one table
    #[command(after_help = "\
Tables can be referenced by id, by name (case-insensitive) or by an id
prefix of at least four characters.

Examples:
  peony show Orders
  peony show 3f2a --json")]
    Show {
        table: String,
        #[arg(long)]
        json: bool,
    },

    /// Data directory, backing store and history position
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Create a local table
    #[command(after_help = "\
Examples:
  peony create
  peony create --name Orders --column Item --column Qty
  peony create --name Orders --column Item,Qty")]
    Create {
        /// Base name (made unique among existing tables)
        #[arg(long)]
        name: Option<String>,

        /// Column names after ID (default: the sample template)
        #[arg(long = "column", value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Import a CSV, TSV or JSON file, or pasted text from stdin
    #[command(after_help = "\
Without a file, stdin is read as copied spreadsheet cells (tab-separated).

Examples:
  peony import orders.csv
  peony import export.txt --format tsv --name Orders
  pbpaste | peony import")]
    Import {
        file: Option<PathBuf>,

        /// Input format (default: from the file extension)
        #[arg(long, short = 'f')]
        format: Option<FileFormat>,

        /// Table name (default: file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// Rename a table
    Rename { table: String, name: String },

    /// Set one cell
    #[command(after_help = "\
ROW is the number shown in the ID column. COLUMN is a header name or a
position (ID is 0). The ID column itself cannot be edited.

Examples:
  peony set-cell Orders 1 Item Pencil
  peony set-cell Orders 2 3 ''")]
    SetCell {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    /// Rename a column
    SetColumn { table: String, column: String, name: String },

    /// Insert a blank row
    #[command(after_help = "\
Examples:
  peony add-row Orders              # append
  peony add-row Orders --at 2       # below row 2
  peony add-row Orders --at 2 --above")]
    AddRow {
        table: String,
        /// Anchor row number
        #[arg(long)]
        at: Option<usize>,
        /// Insert above the anchor (or at the top without --at)
        #[arg(long)]
        above: bool,
    },

    DeleteRow { table: String, row: usize },

    /// Insert a column
    AddColumn {
        table: String,
        /// Anchor column (name or position)
        #[arg(long)]
        at: Option<String>,
        /// Insert before the anchor
        #[arg(long)]
        before: bool,
    },

    DeleteColumn { table: String, column: String },

    /// Make an editable local copy
    #[command(after_help = "\
Remote tables are read-only. Cloning one creates a pending copy that,
when saved, updates the original record. Cloning again opens the
existing copy.")]
    #[command(name = "clone")]
    CloneTable { table: String },

    /// Delete one or more tables
    #[command(after_help = "\
Deleting several local tables is a single undo step. Remote tables are
only deleted on the backing store with --remote, and that cannot be undone.

Examples:
  peony delete Scratch
  peony delete Draft1 Draft2 Draft3
  peony delete Orders --remote")]
    Delete {
        #[arg(required = true)]
        tables: Vec<String>,
        /// Allow deleting remote tables on the backing store
        #[arg(long)]
        remote: bool,
    },

    /// Show the history ledger
    History {
        #[arg(long)]
        json: bool,
    },

    Undo,

    Redo,

    /// Move to a history position
    #[command(after_help = "\
POSITION is an index from `peony history`, or `start` for the state
before the first entry.

Examples:
  peony jump 3
  peony jump start")]
    Jump {
        #[arg(allow_hyphen_values = true)]
        position: String,
    },

    /// Forget the history ledger (tables are kept)
    ClearHistory,

    /// Save local tables to the backing store
    #[command(after_help = "\
All named tables go out in one request. New tables receive their
canonical id; clones update their origin.

Examples:
  peony save Orders
  peony save Orders Customers --json")]
    Save {
        #[arg(required = true)]
        tables: Vec<String>,
        #[arg(long)]
        json: bool,
    },

    /// Save every local table in one request
    SaveAll {
        #[arg(long)]
        json: bool,
    },

    /// Fetch remote tables and merge them with the local ones
    Pull {
        #[arg(long)]
        json: bool,
    },

    /// Apply a change notification from the backing store
    #[command(after_help = "\
Examples:
  peony notify delete srv_42
  peony notify update srv_42")]
    Notify {
        #[arg(value_enum)]
        operation: NotifyOperation,
        id: String,
    },

    /// Write a table to a file (or stdout with -)
    #[command(after_help = "\
Examples:
  peony export Orders orders.csv
  peony export Orders orders.json
  peony export Orders - --format tsv | less")]
    Export {
        table: String,
        output: PathBuf,
        #[arg(long, short = 'f')]
        format: Option<FileFormat>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FileFormat {
    Csv,
    Tsv,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum NotifyOperation {
    Insert,
    Update,
    Delete,
}

impl From<NotifyOperation> for ChangeOperation {
    fn from(op: NotifyOperation) -> Self {
        match op {
            NotifyOperation::Insert => ChangeOperation::Insert,
            NotifyOperation::Update => ChangeOperation::Update,
            NotifyOperation::Delete => ChangeOperation::Delete,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        eprintln!("Usage: peony <command> [options]");
        eprintln!("       peony --help for more information");
        return ExitCode::from(EXIT_SUCCESS);
    };
    let ctx = Context::new(cli.data_dir, cli.api_base);

    let result = match command {
        Commands::List { json } => cmd_list(&ctx, json),
        Commands::Show { table, json } => cmd_show(&ctx, &table, json),
        Commands::Status { json } => cmd_status(&ctx, json),
        Commands::Create { name, columns } => cmd_create(&ctx, name, columns),
        Commands::Import { file, format, name } => cmd_import(&ctx, file, format, name),
        Commands::Rename { table, name } => cmd_rename(&ctx, &table, &name),
        Commands::SetCell { table, row, column, value } => cmd_set_cell(&ctx, &table, row, &column, &value),
        Commands::SetColumn { table, column, name } => cmd_set_column(&ctx, &table, &column, &name),
        Commands::AddRow { table, at, above } => cmd_add_row(&ctx, &table, at, above),
        Commands::DeleteRow { table, row } => cmd_delete_row(&ctx, &table, row),
        Commands::AddColumn { table, at, before } => cmd_add_column(&ctx, &table, at, before),
        Commands::DeleteColumn { table, column } => cmd_delete_column(&ctx, &table, &column),
        Commands::CloneTable { table } => cmd_clone(&ctx, &table),
        Commands::Delete { tables, remote } => cmd_delete(&ctx, &tables, remote),
        Commands::History { json } => cmd_history(&ctx, json),
        Commands::Undo => cmd_undo(&ctx),
        Commands::Redo => cmd_redo(&ctx),
        Commands::Jump { position } => cmd_jump(&ctx, &position),
        Commands::ClearHistory => cmd_clear_history(&ctx),
        Commands::Save { tables, json } => cmd_save(&ctx, &tables, json),
        Commands::SaveAll { json } => cmd_save_all(&ctx, json),
        Commands::Pull { json } => cmd_pull(&ctx, json),
        Commands::Notify { operation, id } => cmd_notify(&ctx, operation, id),
        Commands::Export { table, output, format } => cmd_export(&ctx, &table, &output, format),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_STORAGE, message: msg.into(), hint: None }
    }

    /// Sync failure. With `json`, the structured form goes to stderr and
    /// the plain message is suppressed.
    pub fn sync(err: SyncError, json: bool, api_base: &str) -> Self {
        let code = sync_exit_code(&err);
        if json {
            if let Ok(out) = serde_json::to_string(&SyncErrorOutput::from_sync_error(&err)) {
                eprintln!("{}", out);
            }
            return Self { code, message: String::new(), hint: None };
        }
        let hint = match &err {
            SyncError::Transport(_) => Some(format!("is the backing store reachable at {}? local edits are kept", api_base)),
            SyncError::Empty => Some("create or import a table first".to_string()),
            SyncError::NotFound(_) => Some("run `peony pull` to refresh remote tables".to_string()),
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        let hint = match &err {
            CommandError::ReadOnly(_) => Some("run `peony clone` to get an editable copy".to_string()),
            CommandError::UnknownTable(_) => None,
        };
        Self { code: command_exit_code(&err), message: err.to_string(), hint }
    }
}

impl From<HistoryError> for CliError {
    fn from(err: HistoryError) -> Self {
        Self {
            code: history_exit_code(&err),
            message: err.to_string(),
            hint: Some("run `peony history` to see valid positions".to_string()),
        }
    }
}

// ============================================================================
// Context
// ============================================================================

struct Context {
    settings: Settings,
    data_dir: PathBuf,
    api_base: String,
}

impl Context {
    fn new(data_dir: Option<PathBuf>, api_base: Option<String>) -> Self {
        let settings = Settings::load();
        let data_dir = data_dir.unwrap_or_else(|| settings.effective_data_dir());
        let api_base = api_base.unwrap_or_else(|| settings.api_base.clone());
        Self { settings, data_dir, api_base }
    }

    fn workspace(&self) -> Result<Workspace, CliError> {
        let storage = FileStorage::open(&self.data_dir).map_err(|e| {
            CliError::storage(format!("cannot open data directory {}: {}", self.data_dir.display(), e))
                .with_hint("set --data-dir or storage.dataDir in settings")
        })?;
        log::debug!("Data directory: {}", self.data_dir.display());
        Ok(Workspace::open(Arc::new(storage)).with_default_name(self.settings.default_table_name.clone()))
    }

    fn hub(&self) -> Result<HubClient, CliError> {
        HubClient::new(&self.api_base, Duration::from_secs(self.settings.timeout_secs))
            .map_err(|e| CliError::sync(e.into(), false, &self.api_base))
    }
}

/// Print what the last command recorded, or note that nothing changed.
fn report(ws: &Workspace, changed: bool) {
    match ws.history().current() {
        Some(entry) if changed => println!("{}", entry.description),
        _ => eprintln!("no change"),
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
    println!("{}", out);
    Ok(())
}

/// Reject edits of the derived ID column up front.
fn data_column(col: usize) -> Result<usize, CliError> {
    if col == 0 {
        return Err(CliError::usage("the ID column is numbered automatically and cannot be edited"));
    }
    Ok(col)
}

// ============================================================================
// Read-only commands
// ============================================================================

fn cmd_list(ctx: &Context, json: bool) -> Result<(), CliError> {
    let ws = ctx.workspace()?;
    if json {
        let tables: Vec<_> = ws.tables().iter().map(render::table_summary_json).collect();
        return print_json(&serde_json::Value::Array(tables));
    }
    render::print_table_list(ws.tables(), ws.current());
    Ok(())
}

fn cmd_show(ctx: &Context, table: &str, json: bool) -> Result<(), CliError> {
    let ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let table = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
    if json {
        return print_json(&render::table_json(table));
    }
    render::print_grid(table);
    Ok(())
}

fn cmd_status(ctx: &Context, json: bool) -> Result<(), CliError> {
    let ws = ctx.workspace()?;
    let count = |kind: &str| ws.tables().iter().filter(|t| render::kind(&t.id) == kind).count();
    let history = ws.history();

    if json {
        return print_json(&serde_json::json!({
            "data_dir": ctx.data_dir.display().to_string(),
            "settings": Settings::config_path_display(),
            "api_base": ctx.api_base,
            "protocol_version": PROTOCOL_VERSION,
            "tables": { "local": count("local"), "clone": count("clone"), "remote": count("remote") },
            "history": { "entries": history.len(), "cursor": history.cursor() },
        }));
    }

    println!("data dir:  {}", ctx.data_dir.display());
    println!("settings:  {}", Settings::config_path_display());
    println!("store:     {} (protocol v{})", ctx.api_base, PROTOCOL_VERSION);
    println!(
        "tables:    {} local, {} pending clone(s), {} remote",
        count("local"),
        count("clone"),
        count("remote")
    );
    match history.cursor() {
        Some(c) => println!("history:   {} entries, at {}", history.len(), c),
        None => println!("history:   {} entries, at start", history.len()),
    }
    Ok(())
}

fn cmd_history(ctx: &Context, json: bool) -> Result<(), CliError> {
    let ws = ctx.workspace()?;
    if json {
        return print_json(&render::history_json(ws.history()));
    }
    render::print_history(ws.history());
    Ok(())
}

// ============================================================================
// Table commands
// ============================================================================

fn cmd_create(ctx: &Context, name: Option<String>, columns: Vec<String>) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let template = if columns.is_empty() {
        TableTemplate::default()
    } else {
        TableTemplate::new(columns, vec![Vec::new()])
    };
    let base = name.as_deref().unwrap_or(&ctx.settings.default_table_name);
    let id = ws.create_table_with(base, template);
    println!("{}", id);
    Ok(())
}

fn cmd_import(ctx: &Context, file: Option<PathBuf>, format: Option<FileFormat>, name: Option<String>) -> Result<(), CliError> {
    let import_err = |e: peony_io::ImportError| CliError { code: EXIT_IMPORT, message: e.to_string(), hint: None };

    let mut table = match &file {
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| CliError { code: EXIT_IMPORT, message: format!("cannot read stdin: {}", e), hint: None })?;
            peony_io::clipboard::parse(&text).map_err(import_err)?
        }
        Some(path) => match format.or_else(|| FileFormat::from_path(path)) {
            Some(FileFormat::Json) => peony_io::json::import(path).map_err(import_err)?,
            Some(FileFormat::Tsv) => peony_io::csv::import_with_delimiter(path, b'\t').map_err(import_err)?,
            Some(FileFormat::Csv) | None => peony_io::csv::import(path).map_err(import_err)?,
        },
    };
    if let Some(name) = name {
        table.name = name;
    }

    let mut ws = ctx.workspace()?;
    let id = ws.import_table(table);
    log::info!("Imported {}", id);
    println!("{}", id);
    Ok(())
}

fn cmd_rename(ctx: &Context, table: &str, name: &str) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let changed = ws.rename_table(&id, name)?;
    report(&ws, changed);
    Ok(())
}

fn cmd_set_cell(ctx: &Context, table: &str, row: usize, column: &str, value: &str) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let (row, col) = {
        let t = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
        (resolve::row(t, row)?, data_column(resolve::column(t, column)?)?)
    };
    let changed = ws.edit_cell(&id, row, col, value)?;
    report(&ws, changed);
    Ok(())
}

fn cmd_set_column(ctx: &Context, table: &str, column: &str, name: &str) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let col = {
        let t = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
        data_column(resolve::column(t, column)?)?
    };
    let changed = ws.edit_column_name(&id, col, name)?;
    report(&ws, changed);
    Ok(())
}

fn cmd_add_row(ctx: &Context, table: &str, at: Option<usize>, above: bool) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let selection = match at {
        Some(number) => {
            let t = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
            Some(Selection::new(resolve::row(t, number)?, 0))
        }
        None => None,
    };
    let position = if above { RowPosition::Above } else { RowPosition::Below };
    let changed = ws.add_row(&id, selection, position)?;
    report(&ws, changed);
    Ok(())
}

fn cmd_delete_row(ctx: &Context, table: &str, row: usize) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let row = {
        let t = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
        resolve::row(t, row)?
    };
    let changed = ws.delete_row(&id, Some(Selection::new(row, 0)))?;
    report(&ws, changed);
    Ok(())
}

fn cmd_add_column(ctx: &Context, table: &str, at: Option<String>, before: bool) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let selection = match at.as_deref() {
        Some(reference) => {
            let t = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
            Some(Selection::new(0, resolve::column(t, reference)?))
        }
        None => None,
    };
    let position = if before { ColumnPosition::Before } else { ColumnPosition::After };
    let changed = ws.add_column(&id, selection, position)?;
    report(&ws, changed);
    Ok(())
}

fn cmd_delete_column(ctx: &Context, table: &str, column: &str) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let col = {
        let t = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
        data_column(resolve::column(t, column)?)?
    };
    let changed = ws.delete_column(&id, Some(Selection::new(0, col)))?;
    report(&ws, changed);
    Ok(())
}

fn cmd_clone(ctx: &Context, table: &str) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let clone = ws.clone_table(&id)?;
    let name = ws.table(&clone).map(|t| t.name.clone()).unwrap_or_default();
    println!("{}\t{}", clone, name);
    Ok(())
}

fn cmd_delete(ctx: &Context, tables: &[String], remote: bool) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let ids = resolve::tables(&ws, tables)?;
    let (remote_ids, local_ids): (Vec<TableId>, Vec<TableId>) =
        ids.into_iter().partition(|id| matches!(id, TableId::Remote { .. }));

    if let Some(first) = remote_ids.first() {
        if !remote {
            return Err(CliError {
                code: EXIT_TABLE_READ_ONLY,
                message: format!("table {} belongs to the backing store", first),
                hint: Some("pass --remote to delete it there (this cannot be undone)".to_string()),
            });
        }
    }

    if !local_ids.is_empty() {
        let changed = ws.delete_tables(&local_ids)?;
        report(&ws, changed);
    }
    if !remote_ids.is_empty() {
        let hub = ctx.hub()?;
        for id in &remote_ids {
            ws.delete_remote(id, &hub).map_err(|e| CliError::sync(e, false, &ctx.api_base))?;
            println!("Deleted remote table {}", id);
        }
    }
    Ok(())
}

// ============================================================================
// History
// ============================================================================

fn cmd_undo(ctx: &Context) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let undone = ws.history().current().map(|e| e.description.clone());
    match undone {
        Some(description) if ws.undo() => println!("Undid: {}", description),
        _ => eprintln!("nothing to undo"),
    }
    Ok(())
}

fn cmd_redo(ctx: &Context) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    if ws.redo() {
        if let Some(entry) = ws.history().current() {
            println!("Redid: {}", entry.description);
        }
    } else {
        eprintln!("nothing to redo");
    }
    Ok(())
}

fn parse_position(position: &str) -> Result<Option<usize>, CliError> {
    match position {
        "start" | "-1" => Ok(None),
        n => n
            .parse::<usize>()
            .map(Some)
            .map_err(|_| CliError::usage(format!("invalid history position '{}'", n)).with_hint("use an index or `start`")),
    }
}

fn cmd_jump(ctx: &Context, position: &str) -> Result<(), CliError> {
    let target = parse_position(position)?;
    let mut ws = ctx.workspace()?;
    ws.jump_to(target)?;
    match ws.history().current() {
        Some(entry) => println!("At: {}", entry.description),
        None => println!("At: start"),
    }
    Ok(())
}

fn cmd_clear_history(ctx: &Context) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let entries = ws.history().len();
    ws.clear_history();
    println!("Cleared {} history entries", entries);
    Ok(())
}

// ============================================================================
// Sync
// ============================================================================

fn cmd_save(ctx: &Context, tables: &[String], json: bool) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let ids = resolve::tables(&ws, tables)?;
    let hub = ctx.hub()?;
    let outcome = ws.save_tables(&ids, &hub).map_err(|e| CliError::sync(e, json, &ctx.api_base))?;
    if json {
        return print_json(&render::outcome_json(&outcome));
    }
    render::print_outcome(&outcome);
    Ok(())
}

fn cmd_save_all(ctx: &Context, json: bool) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let hub = ctx.hub()?;
    let outcome = ws.save_all(&hub).map_err(|e| CliError::sync(e, json, &ctx.api_base))?;
    if json {
        return print_json(&render::outcome_json(&outcome));
    }
    render::print_outcome(&outcome);
    Ok(())
}

fn cmd_pull(ctx: &Context, json: bool) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let hub = ctx.hub()?;
    let loaded = ws.load_remote(&hub).map_err(|e| CliError::sync(e, json, &ctx.api_base))?;
    if json {
        return print_json(&serde_json::json!({ "loaded": loaded, "tables": ws.tables().len() }));
    }
    println!("Loaded {} remote table(s); {} table(s) total", loaded, ws.tables().len());
    Ok(())
}

fn cmd_notify(ctx: &Context, operation: NotifyOperation, id: String) -> Result<(), CliError> {
    let mut ws = ctx.workspace()?;
    let hub = ctx.hub()?;
    let notification = ChangeNotification { operation: operation.into(), id };
    let effect = ws
        .handle_notification(&notification, &hub)
        .map_err(|e| CliError::sync(e, false, &ctx.api_base))?;
    match effect {
        RealtimeEffect::Remove(id) => println!("Removed remote table {}", id),
        RealtimeEffect::Refetch => println!("Refreshed remote tables ({} total)", ws.tables().len()),
    }
    Ok(())
}

// ============================================================================
// Export
// ============================================================================

fn cmd_export(ctx: &Context, table: &str, output: &Path, format: Option<FileFormat>) -> Result<(), CliError> {
    let ws = ctx.workspace()?;
    let id = resolve::table(&ws, table)?;
    let table = ws.table(&id).ok_or_else(|| CliError::from(CommandError::UnknownTable(id.clone())))?;
    let export_err = |e: peony_io::ExportError| CliError { code: EXIT_EXPORT, message: e.to_string(), hint: None };

    let to_stdout = output == Path::new("-");
    let format = match format.or_else(|| FileFormat::from_path(output)) {
        Some(f) => f,
        None if to_stdout => FileFormat::Csv,
        None => {
            return Err(CliError::usage(format!("cannot infer format from {}", output.display()))
                .with_hint("pass --format csv, tsv or json"))
        }
    };

    if to_stdout {
        return match format {
            FileFormat::Csv => peony_io::csv::write_delimited(table, io::stdout().lock(), b',').map_err(export_err),
            FileFormat::Tsv => peony_io::csv::write_delimited(table, io::stdout().lock(), b'\t').map_err(export_err),
            FileFormat::Json => print_json(&serde_json::json!({
                "name": table.name,
                "columns": table.columns,
                "rows": table.rows,
            })),
        };
    }

    match format {
        FileFormat::Csv => peony_io::csv::export(table, output).map_err(export_err)?,
        FileFormat::Tsv => peony_io::csv::export_tsv(table, output).map_err(export_err)?,
        FileFormat::Json => peony_io::json::export(table, output).map_err(export_err)?,
    }
    eprintln!("Wrote {} rows to {}", table.rows.len(), output.display());
    Ok(())
}
