use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::cloudaudit::tools::error::{Result, ToolError};
use crate::cloudaudit::tools::flatten::{SheetTable, WorkbookData};

/// Reads every sheet of a workbook written by
/// [`write_workbook`](crate::cloudaudit::tools::io::excel_write::write_workbook)
/// back into string tables. The first row of each sheet is its header.
pub fn read_workbook(path: &Path) -> Result<WorkbookData> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let mut data = WorkbookData::default();
    for sheet_name in workbook.sheet_names().to_owned() {
        let range = read_required_sheet(&mut workbook, &sheet_name)?;
        data.tables.push(sheet_from_range(&sheet_name, &range));
    }
    Ok(data)
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn sheet_from_range(sheet_name: &str, range: &calamine::Range<DataType>) -> SheetTable {
    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => Vec::new(),
    };

    let mut table = SheetTable {
        sheet_name: sheet_name.to_string(),
        columns,
        rows: Vec::new(),
    };
    let width = table.columns.len();
    for row in rows {
        let cells = (0..width).map(|col_idx| cell_to_string(row.get(col_idx))).collect();
        table.rows.push(cells);
    }
    table
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
