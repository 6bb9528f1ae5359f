//! Flattening of nested inventory attributes into display cells, and the
//! string-only tables those cells end up in.
//!
//! Attribute flatteners return `Result<String, FlattenError>`. An absent
//! attribute yields its designed placeholder through `Ok`; only malformed
//! input yields `Err`. Callers turn errors into placeholders with [`cell`] so
//! that a single bad value never aborts a sheet.

use serde_json::Value;
use tracing::warn;

use crate::cloudaudit::tools::error::FlattenError;
use crate::cloudaudit::tools::model::ResourceRecord;

pub mod attributes;
pub mod policy;
pub mod rules;

/// Placeholder used by audit columns that the operator fills in by hand.
pub const TYPE_HERE: &str = "(Type Here)";

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Creates an empty sheet with a fixed column layout.
    pub fn new(sheet_name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a flattened row. A row of the wrong width is padded with
    /// empty cells or cut to the column layout.
    pub fn push(&mut self, mut row: Vec<String>) {
        if row.len() != self.columns.len() {
            warn!(
                sheet = %self.sheet_name,
                expected = self.columns.len(),
                found = row.len(),
                "row width does not match sheet layout"
            );
            row.resize(self.columns.len(), String::new());
        }
        self.rows.push(row);
    }

    /// Appends the rows of another sheet with the same layout.
    pub fn extend(&mut self, other: SheetTable) {
        self.rows.extend(other.rows);
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|known| known == column)
    }

    /// Sorts rows by one column in descending order. The sort is stable, so
    /// rows with equal keys keep their source order.
    pub fn sort_descending_by(&mut self, column: &str) {
        if let Some(index) = self.column_index(column) {
            self.rows.sort_by(|lhs, rhs| rhs[index].cmp(&lhs[index]));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Represents all tables required to materialise the Excel workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

impl WorkbookData {
    pub fn table(&self, sheet_name: &str) -> Option<&SheetTable> {
        self.tables
            .iter()
            .find(|table| table.sheet_name == sheet_name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.tables
            .iter()
            .map(|table| table.sheet_name.as_str())
            .collect()
    }
}

/// Resolves a flattened value, logging malformed input and substituting the
/// placeholder for it.
pub fn cell(result: Result<String, FlattenError>, placeholder: &str, column: &str) -> String {
    match result {
        Ok(value) => value,
        Err(error) => {
            warn!(column, %error, "malformed attribute, using placeholder");
            placeholder.to_string()
        }
    }
}

/// Decodes a nested column of a record and flattens it with `flatten`.
pub fn nested_cell<F>(record: &ResourceRecord, column: &str, placeholder: &str, flatten: F) -> String
where
    F: FnOnce(&Value) -> Result<String, FlattenError>,
{
    let result = record.nested(column).and_then(|value| flatten(&value));
    cell(result, placeholder, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_are_fitted_to_the_column_layout() {
        let mut sheet = SheetTable::new("VPC", &["Name", "ID", "CIDR"]);
        sheet.push(vec!["short".to_string()]);
        sheet.push(vec!["long".into(), "vpc-2".into(), "10.0.0.0/16".into(), "extra".into()]);
        sheet.sort_descending_by("CIDR");

        assert_eq!(sheet.rows[0], vec!["long", "vpc-2", "10.0.0.0/16"]);
        assert_eq!(sheet.rows[1], vec!["short", "", ""]);
    }

    #[test]
    fn descending_sort_is_stable() {
        let mut sheet = SheetTable::new("Test", &["Name", "ID"]);
        sheet.push(vec!["b".into(), "1".into()]);
        sheet.push(vec!["a".into(), "2".into()]);
        sheet.push(vec!["b".into(), "3".into()]);
        sheet.push(vec!["c".into(), "4".into()]);

        sheet.sort_descending_by("Name");

        let ids: Vec<&str> = sheet.rows.iter().map(|row| row[1].as_str()).collect();
        assert_eq!(ids, vec!["4", "1", "3", "2"]);
    }

    #[test]
    fn cell_substitutes_placeholder_for_malformed_input() {
        let record: ResourceRecord = [("tags", json!("{not json"))].into_iter().collect();
        let value = nested_cell(&record, "tags", "-", attributes::format_tags);
        assert_eq!(value, "-");

        let failure = Err(FlattenError::UnexpectedShape {
            expected: "array",
            found: "number",
        });
        assert_eq!(cell(failure, "", "groups"), "");
    }
}
