use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cloudaudit::tools::error::FlattenError;

pub mod kind;

pub use kind::ResourceKind;

static NULL: Value = Value::Null;

/// A row describing one AWS resource instance.
///
/// Attributes keep the value exactly as the source produced it. Relational
/// sources yield typed JSON; CSV exports yield strings, and nested columns in
/// those exports hold JSON (or Python-repr) text that is decoded on demand by
/// [`ResourceRecord::nested`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Column → value mapping.
    pub attributes: BTreeMap<String, Value>,
}

impl ResourceRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an attribute value.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.attributes.insert(column.into(), value);
    }

    /// Returns the raw value of a column, or `null` when the column is absent.
    pub fn raw(&self, column: &str) -> &Value {
        self.attributes.get(column).unwrap_or(&NULL)
    }

    /// Renders a scalar column as display text. Absent and `null` values
    /// render as the empty string.
    pub fn text(&self, column: &str) -> String {
        scalar_text(self.raw(column))
    }

    /// Like [`ResourceRecord::text`], but substitutes `fallback` for empty text.
    pub fn text_or(&self, column: &str, fallback: &str) -> String {
        let text = self.text(column);
        if text.is_empty() {
            fallback.to_string()
        } else {
            text
        }
    }

    /// Decodes a nested column.
    ///
    /// Absent columns, `null` and blank text decode to `null`. Text cells are
    /// parsed as JSON first and as Python-repr text second; text that is
    /// neither is reported as [`FlattenError::Unparseable`].
    pub fn nested(&self, column: &str) -> Result<Value, FlattenError> {
        match self.raw(column) {
            Value::String(text) => decode_nested_text(text),
            other => Ok(other.clone()),
        }
    }

    /// Interprets a column as a number, accepting numeric text.
    pub fn number(&self, column: &str) -> Option<f64> {
        match self.raw(column) {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interprets a column as a boolean flag; anything but a true value is false.
    pub fn flag(&self, column: &str) -> bool {
        match self.raw(column) {
            Value::Bool(value) => *value,
            Value::String(text) => {
                matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
            }
            Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
            _ => false,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ResourceRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value))
                .collect(),
        }
    }
}

/// An ordered set of records sharing a column layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in first-seen order.
    pub columns: Vec<String>,
    /// Records of the table.
    pub rows: Vec<ResourceRecord>,
}

impl Table {
    /// Creates an empty table with the given column layout.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table whose columns are the union of the record keys.
    pub fn from_records(records: Vec<ResourceRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.push(record);
        }
        table
    }

    /// Appends a record, registering any column not seen before.
    pub fn push(&mut self, record: ResourceRecord) {
        for column in record.attributes.keys() {
            if !self.columns.iter().any(|known| known == column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.push(record);
    }

    /// Appends every record of another table.
    pub fn append(&mut self, other: Table) {
        for column in other.columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self.rows.extend(other.rows);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|known| known == column)
    }

    pub(crate) fn column_set(&self) -> HashSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

/// Every source table loaded for one run, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTables {
    tables: BTreeMap<ResourceKind, Table>,
}

impl SourceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, appending to any table already loaded for the same kind.
    pub fn insert(&mut self, kind: ResourceKind, table: Table) {
        match self.tables.get_mut(&kind) {
            Some(existing) => existing.append(table),
            None => {
                self.tables.insert(kind, table);
            }
        }
    }

    /// Returns the table of a kind, treating a table without rows as absent.
    pub fn get(&self, kind: ResourceKind) -> Option<&Table> {
        self.tables.get(&kind).filter(|table| !table.is_empty())
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.get(kind).is_some()
    }

    /// Kinds with at least one row, in kind order.
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.tables
            .iter()
            .filter(|(_, table)| !table.is_empty())
            .map(|(kind, _)| *kind)
    }
}

/// Renders a scalar JSON value as display text.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Returns a short name for the JSON type of a value, used in diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_nested_text(text: &str) -> Result<Value, FlattenError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(json_error) => serde_json::from_str(&python_repr_to_json(trimmed))
            .map_err(|_| FlattenError::Unparseable(json_error.to_string())),
    }
}

/// Rewrites Python-repr text as JSON: single-quoted strings become
/// double-quoted and the bare literals `True`, `False` and `None` become
/// their JSON forms. String contents are never rewritten.
fn python_repr_to_json(text: &str) -> String {
    let mut json = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                json.push('"');
                while let Some(inner) = chars.next() {
                    match inner {
                        '\\' => match chars.next() {
                            Some('\'') => json.push('\''),
                            Some(escaped) => {
                                json.push('\\');
                                json.push(escaped);
                            }
                            None => json.push('\\'),
                        },
                        quote if quote == ch => break,
                        '"' => json.push_str("\\\""),
                        other => json.push(other),
                    }
                }
                json.push('"');
            }
            first if first.is_ascii_alphabetic() || first == '_' => {
                let mut word = String::from(first);
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                json.push_str(match word.as_str() {
                    "True" => "true",
                    "False" => "false",
                    "None" => "null",
                    _ => &word,
                });
            }
            other => json.push(other),
        }
    }

    json
}
