//! Left join of instance-level records onto their cluster-level parents.

use std::collections::HashMap;

use crate::cloudaudit::tools::model::{ResourceRecord, Table};

/// How two tables are joined and how colliding columns are renamed.
#[derive(Debug, Clone, Copy)]
pub struct JoinSpec<'a> {
    /// Column present on both sides that links a child to its parent.
    pub key: &'a str,
    /// Suffix for child columns whose name also exists on the parent.
    pub child_suffix: &'a str,
    /// Suffix for parent columns whose name also exists on the child.
    pub parent_suffix: &'a str,
}

/// Joins every child row to at most one parent row sharing its key.
///
/// All child rows are kept in order. The first parent row for a key wins and
/// parent rows without a child are dropped. Empty keys never match. Columns
/// other than the key that exist on both sides are renamed with the suffixes
/// of `spec`; columns unique to one side keep their name.
pub fn left_join(child: &Table, parent: &Table, spec: &JoinSpec<'_>) -> Table {
    let child_columns = child.column_set();
    let parent_columns = parent.column_set();
    let rename_child = |column: &str| {
        if column != spec.key && parent_columns.contains(column) {
            format!("{column}{}", spec.child_suffix)
        } else {
            column.to_string()
        }
    };
    let rename_parent = |column: &str| {
        if child_columns.contains(column) {
            format!("{column}{}", spec.parent_suffix)
        } else {
            column.to_string()
        }
    };

    let mut parents: HashMap<String, &ResourceRecord> = HashMap::new();
    for record in &parent.rows {
        let key = record.text(spec.key);
        if !key.is_empty() {
            parents.entry(key).or_insert(record);
        }
    }

    let mut columns: Vec<String> = child.columns.iter().map(|column| rename_child(column)).collect();
    columns.extend(
        parent
            .columns
            .iter()
            .filter(|column| column.as_str() != spec.key)
            .map(|column| rename_parent(column)),
    );

    let mut joined = Table::new(columns);
    for record in &child.rows {
        let mut row = ResourceRecord::new();
        for (column, value) in &record.attributes {
            row.insert(rename_child(column), value.clone());
        }
        if let Some(matched) = parents.get(&record.text(spec.key)) {
            for (column, value) in &matched.attributes {
                if column != spec.key {
                    row.insert(rename_parent(column), value.clone());
                }
            }
        }
        joined.rows.push(row);
    }
    joined
}
