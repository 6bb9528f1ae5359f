use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::warn;

use crate::cloudaudit::tools::error::Result;
use crate::cloudaudit::tools::flatten::{SheetTable, WorkbookData};

/// Longest text Excel accepts in a single cell.
const MAX_CELL_CHARS: usize = 32_767;
const MAX_COLUMN_WIDTH: usize = 80;
const MIN_COLUMN_WIDTH: usize = 8;
const HEADER_FILL: u32 = 0xD9E1F2;

/// Writes the provided workbook data to the given path.
///
/// A file left behind by a failed write is removed so that no partial
/// workbook survives the run.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let result = render_workbook(path, workbook);
    if result.is_err() && path.exists() {
        if let Err(error) = fs::remove_file(path) {
            warn!(path = %path.display(), %error, "failed to remove partial workbook");
        }
    }
    result
}

fn render_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Top)
        .set_text_wrap();
    let cell_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Top)
        .set_text_wrap();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        write_sheet(worksheet, table, &header_format, &cell_format)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    table: &SheetTable,
    header_format: &Format,
    cell_format: &Format,
) -> Result<()> {
    worksheet.set_name(&table.sheet_name)?;

    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, header_format)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet.write_string_with_format(
                (row_idx + 1) as u32,
                col_idx as u16,
                truncate_cell(cell),
                cell_format,
            )?;
        }
    }

    for (col_idx, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, width as f64)?;
    }

    let col_end = (table.columns.len() as u16).saturating_sub(1);
    worksheet.autofilter(0, 0, table.rows.len() as u32, col_end)?;
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Width per column: the longest line of the header or any cell plus two,
/// clamped to a readable range.
pub fn column_widths(table: &SheetTable) -> Vec<usize> {
    let longest_line = |text: &str| text.lines().map(|line| line.chars().count()).max().unwrap_or(0);

    table
        .columns
        .iter()
        .enumerate()
        .map(|(col_idx, header)| {
            let widest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .map(|cell| longest_line(cell))
                .fold(longest_line(header), usize::max);
            (widest + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

fn truncate_cell(cell: &str) -> &str {
    match cell.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &cell[..end],
        None => cell,
    }
}
