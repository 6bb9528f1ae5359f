//! Folder-of-CSV inventory source.
//!
//! Each file is classified by its first header line and, failing that, by its
//! file stem. Headers are normalised to the snake_case column names used by
//! the relational source so both sources feed the same transforms.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::cloudaudit::tools::error::{Result, ToolError};
use crate::cloudaudit::tools::model::{ResourceKind, ResourceRecord, SourceTables, Table};

/// Loads every classifiable `.csv` file of a directory.
///
/// Files are visited in file-name order and tables of the same kind are
/// concatenated. Files that match no kind are logged and ignored.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub fn load_csv_directory(dir: &Path) -> Result<SourceTables> {
    if !dir.is_dir() {
        return Err(ToolError::MissingInput(dir.to_path_buf()));
    }

    let mut sources = SourceTables::new();
    for path in csv_files(dir)? {
        let Some(kind) = classify(&path)? else {
            info!(file = %path.display(), "ignoring unrecognised CSV export");
            continue;
        };
        let table = read_table(&path)?;
        debug!(file = %path.display(), kind = %kind, rows = table.len(), "loaded CSV export");
        sources.insert(kind, table);
    }

    Ok(sources)
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    Ok(files)
}

/// Determines the kind of an export from its header line, then its stem.
pub fn classify(path: &Path) -> Result<Option<ResourceKind>> {
    let mut header = String::new();
    BufReader::new(File::open(path)?).read_line(&mut header)?;

    if let Some(kind) = ResourceKind::from_csv_header(&header) {
        return Ok(Some(kind));
    }
    Ok(path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(ResourceKind::from_file_stem))
}

fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(normalise_header).collect();
    let mut table = Table::new(columns.clone());

    for record in reader.records() {
        let record = record?;
        let row: ResourceRecord = columns
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), Value::String(value.to_string())))
            .collect();
        table.push(row);
    }

    Ok(table)
}

/// Turns a display header such as `Vpc ID` into `vpc_id`.
pub fn normalise_header(header: &str) -> String {
    let mut column = String::with_capacity(header.len());
    let mut pending_separator = false;

    for ch in header.trim_start_matches('\u{feff}').trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !column.is_empty() {
                column.push('_');
            }
            pending_separator = false;
            column.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    column
}
