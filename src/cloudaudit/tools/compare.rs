//! Row-level comparison of two inventory workbooks, used to review what
//! changed between two audit runs.

use std::collections::HashMap;
use std::fmt;

use crate::cloudaudit::tools::flatten::{SheetTable, WorkbookData};

/// Differences found in one sheet present in both workbooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetDiff {
    pub sheet: String,
    pub columns_changed: bool,
    pub only_in_previous: Vec<Vec<String>>,
    pub only_in_current: Vec<Vec<String>>,
}

impl SheetDiff {
    pub fn is_empty(&self) -> bool {
        !self.columns_changed && self.only_in_previous.is_empty() && self.only_in_current.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookDiff {
    pub sheets_added: Vec<String>,
    pub sheets_removed: Vec<String>,
    pub sheets: Vec<SheetDiff>,
}

impl WorkbookDiff {
    pub fn is_empty(&self) -> bool {
        self.sheets_added.is_empty() && self.sheets_removed.is_empty() && self.sheets.is_empty()
    }
}

/// Compares two workbooks sheet by sheet.
///
/// Rows are compared as whole text tuples and counted, so a duplicated row
/// that lost one copy shows up once. Row order does not matter.
pub fn compare_workbooks(previous: &WorkbookData, current: &WorkbookData) -> WorkbookDiff {
    let mut diff = WorkbookDiff::default();

    for table in &previous.tables {
        match current.table(&table.sheet_name) {
            Some(other) => {
                let sheet = compare_sheets(table, other);
                if !sheet.is_empty() {
                    diff.sheets.push(sheet);
                }
            }
            None => diff.sheets_removed.push(table.sheet_name.clone()),
        }
    }

    diff.sheets_added = current
        .tables
        .iter()
        .filter(|table| previous.table(&table.sheet_name).is_none())
        .map(|table| table.sheet_name.clone())
        .collect();

    diff
}

fn compare_sheets(previous: &SheetTable, current: &SheetTable) -> SheetDiff {
    SheetDiff {
        sheet: previous.sheet_name.clone(),
        columns_changed: previous.columns != current.columns,
        only_in_previous: rows_missing_from(&previous.rows, &current.rows),
        only_in_current: rows_missing_from(&current.rows, &previous.rows),
    }
}

/// Rows of `rows` that have no remaining counterpart in `other`, in order.
fn rows_missing_from(rows: &[Vec<String>], other: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut available: HashMap<&[String], usize> = HashMap::new();
    for row in other {
        *available.entry(row.as_slice()).or_default() += 1;
    }

    rows.iter()
        .filter(|row| match available.get_mut(row.as_slice()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}

impl fmt::Display for WorkbookDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "workbooks are identical");
        }
        for sheet in &self.sheets_added {
            writeln!(f, "+ sheet {sheet}")?;
        }
        for sheet in &self.sheets_removed {
            writeln!(f, "- sheet {sheet}")?;
        }
        for sheet in &self.sheets {
            writeln!(f, "~ sheet {}", sheet.sheet)?;
            if sheet.columns_changed {
                writeln!(f, "    columns changed")?;
            }
            for row in &sheet.only_in_previous {
                writeln!(f, "    - {}", row.join(" | ").replace('\n', ", "))?;
            }
            for row in &sheet.only_in_current {
                writeln!(f, "    + {}", row.join(" | ").replace('\n', ", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: &[&[&str]]) -> SheetTable {
        let mut table = SheetTable::new(name, &["Name", "ID"]);
        for row in rows {
            table.push(row.iter().map(|cell| cell.to_string()).collect());
        }
        table
    }

    fn workbook(tables: Vec<SheetTable>) -> WorkbookData {
        WorkbookData { tables }
    }

    #[test]
    fn identical_workbooks_have_no_diff() {
        let data = workbook(vec![sheet("VPC", &[&["main", "vpc-1"]])]);
        let diff = compare_workbooks(&data, &data.clone());
        assert!(diff.is_empty());
        assert_eq!(diff.to_string(), "workbooks are identical\n");
    }

    #[test]
    fn rows_and_sheets_are_reported_by_side() {
        let previous = workbook(vec![
            sheet("VPC", &[&["main", "vpc-1"], &["old", "vpc-0"]]),
            sheet("TGW", &[&["hub", "tgw-1"]]),
        ]);
        let current = workbook(vec![
            sheet("VPC", &[&["new", "vpc-2"], &["main", "vpc-1"]]),
            sheet("Subnet", &[&["a", "subnet-1"]]),
        ]);

        let diff = compare_workbooks(&previous, &current);

        assert_eq!(diff.sheets_added, vec!["Subnet"]);
        assert_eq!(diff.sheets_removed, vec!["TGW"]);
        assert_eq!(diff.sheets.len(), 1);
        assert_eq!(diff.sheets[0].only_in_previous, vec![vec!["old", "vpc-0"]]);
        assert_eq!(diff.sheets[0].only_in_current, vec![vec!["new", "vpc-2"]]);
        assert!(!diff.sheets[0].columns_changed);
    }

    #[test]
    fn duplicate_rows_are_counted() {
        let previous = workbook(vec![sheet("VPC", &[&["main", "vpc-1"], &["main", "vpc-1"]])]);
        let current = workbook(vec![sheet("VPC", &[&["main", "vpc-1"]])]);

        let diff = compare_workbooks(&previous, &current);
        assert_eq!(diff.sheets[0].only_in_previous, vec![vec!["main", "vpc-1"]]);
        assert!(diff.sheets[0].only_in_current.is_empty());
    }
}
