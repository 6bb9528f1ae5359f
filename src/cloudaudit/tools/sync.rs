use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::cloudaudit::tools::compare::{WorkbookDiff, compare_workbooks};
use crate::cloudaudit::tools::config::{InventoryConfig, SourceConfig};
use crate::cloudaudit::tools::error::{Result, ToolError};
use crate::cloudaudit::tools::io::{csv_source, excel_read, excel_write};
use crate::cloudaudit::tools::model::SourceTables;
use crate::cloudaudit::tools::transform::{InventoryReport, build_workbook};

/// Outcome of a successful inventory run.
#[derive(Debug, Clone)]
pub struct InventoryRun {
    pub output: PathBuf,
    pub report: InventoryReport,
}

/// Loads the configured source, builds every sheet and writes the workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %config.output_path().display())
)]
pub fn run_inventory(config: &InventoryConfig) -> Result<InventoryRun> {
    config.validate()?;
    let sources = load_sources(&config.source)?;
    info!(kinds = sources.kinds().count(), "loaded inventory sources");

    let report = build_workbook(&sources);
    debug!(sheet_count = report.workbook.tables.len(), "workbook constructed");

    fs::create_dir_all(&config.output_dir)?;
    let output = config.output_path();
    excel_write::write_workbook(&output, &report.workbook)?;
    info!(
        written = report.written().count(),
        skipped = report.skipped().count(),
        "inventory workbook written"
    );

    Ok(InventoryRun { output, report })
}

/// Loads inventory tables from either kind of source.
pub fn load_sources(source: &SourceConfig) -> Result<SourceTables> {
    match source {
        SourceConfig::CsvDirectory(dir) => csv_source::load_csv_directory(dir),
        #[cfg(feature = "postgres")]
        SourceConfig::Database { url, schema } => {
            crate::cloudaudit::tools::io::postgres_source::load_database(url, schema)
        }
        #[cfg(not(feature = "postgres"))]
        SourceConfig::Database { .. } => Err(ToolError::InvalidConfig(
            "database sources require the `postgres` feature".into(),
        )),
    }
}

/// Compares two previously written workbooks.
#[instrument(
    level = "info",
    skip_all,
    fields(previous = %previous.display(), current = %current.display())
)]
pub fn diff_workbooks(previous: &Path, current: &Path) -> Result<WorkbookDiff> {
    for path in [previous, current] {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
    }
    let previous = excel_read::read_workbook(previous)?;
    let current = excel_read::read_workbook(current)?;
    let diff = compare_workbooks(&previous, &current);
    info!(
        added = diff.sheets_added.len(),
        removed = diff.sheets_removed.len(),
        changed = diff.sheets.len(),
        "workbooks compared"
    );
    Ok(diff)
}
