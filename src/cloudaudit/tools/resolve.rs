//! Cross-resource lookups built once per run.
//!
//! [`AssociationIndex`] inverts the association lists embedded in parent
//! records (route tables, network ACLs) so that a child key such as a subnet
//! id resolves to its parent in constant time. [`GroupIndex`] and
//! [`RecordIndex`] group or index whole records by a column.

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;

use crate::cloudaudit::tools::flatten::attributes::list_items;
use crate::cloudaudit::tools::model::{ResourceRecord, Table, scalar_text};

/// Describes where the association list lives in a parent record and which
/// fields of each entry carry the child key, parent id and title.
#[derive(Debug, Clone, Copy)]
pub struct AssociationSpec {
    /// Nested list column on the parent record.
    pub list_column: &'static str,
    /// Entry field holding the child key.
    pub child_field: &'static str,
    /// Entry field holding the parent id.
    pub parent_field: &'static str,
    /// Entry field used as the association title.
    pub title_field: &'static str,
    /// Parent record column used when an entry lacks `parent_field`.
    pub parent_id_column: &'static str,
}

/// Parent reference resolved for one child key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Association {
    pub parent_id: String,
    pub title: String,
}

/// Child key → parent association. When several parents claim the same
/// child the last one scanned wins.
#[derive(Debug, Clone, Default)]
pub struct AssociationIndex {
    entries: HashMap<String, Association>,
}

impl AssociationIndex {
    /// Scans every parent record and inverts its association list.
    ///
    /// A record whose list is malformed contributes nothing and is logged;
    /// entries without a child key are skipped.
    pub fn build(parents: &Table, spec: &AssociationSpec) -> Self {
        let mut index = Self::default();
        for record in &parents.rows {
            let associations = match record.nested(spec.list_column) {
                Ok(value) => value,
                Err(error) => {
                    warn!(column = spec.list_column, %error, "skipping malformed association list");
                    continue;
                }
            };
            let entries = match list_items(&associations) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(column = spec.list_column, %error, "skipping malformed association list");
                    continue;
                }
            };
            for entry in entries {
                index.insert_entry(record, entry, spec);
            }
        }
        index
    }

    /// Builds an index from precomputed `(child_key, parent_id)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(child, parent_id)| {
                (
                    child,
                    Association {
                        parent_id,
                        title: String::new(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    fn insert_entry(&mut self, record: &ResourceRecord, entry: &Value, spec: &AssociationSpec) {
        let field = |name: &str| entry.get(name).map(scalar_text).unwrap_or_default();

        let child = field(spec.child_field);
        if child.is_empty() {
            return;
        }
        let mut parent_id = field(spec.parent_field);
        if parent_id.is_empty() {
            parent_id = record.text(spec.parent_id_column);
        }
        let title = field(spec.title_field);
        self.entries.insert(child, Association { parent_id, title });
    }

    pub fn get(&self, child: &str) -> Option<&Association> {
        self.entries.get(child)
    }

    /// Parent id of a child, or `""` when the child is unknown.
    pub fn parent_id(&self, child: &str) -> &str {
        self.get(child).map_or("", |association| association.parent_id.as_str())
    }

    /// Association title of a child, or `""` when the child is unknown.
    pub fn title(&self, child: &str) -> &str {
        self.get(child).map_or("", |association| association.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Groups records by the text of one column, keeping insertion order within
/// each group. Records with an empty key are left out.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex<'a> {
    groups: HashMap<String, Vec<&'a ResourceRecord>>,
}

impl<'a> GroupIndex<'a> {
    pub fn by_column(table: &'a Table, column: &str) -> Self {
        Self::by_key(table, |record| record.text(column))
    }

    pub fn by_key<F>(table: &'a Table, key: F) -> Self
    where
        F: Fn(&ResourceRecord) -> String,
    {
        let mut groups: HashMap<String, Vec<&'a ResourceRecord>> = HashMap::new();
        for record in &table.rows {
            let key = key(record);
            if !key.is_empty() {
                groups.entry(key).or_default().push(record);
            }
        }
        Self { groups }
    }

    /// Records sharing `key`; empty when none do.
    pub fn get(&self, key: &str) -> &[&'a ResourceRecord] {
        self.groups.get(key).map_or(&[], Vec::as_slice)
    }
}

/// Indexes records by the text of one column. The first record with a given
/// key wins; records with an empty key are left out.
#[derive(Debug, Clone, Default)]
pub struct RecordIndex<'a> {
    records: HashMap<String, &'a ResourceRecord>,
}

impl<'a> RecordIndex<'a> {
    pub fn by_column(table: &'a Table, column: &str) -> Self {
        let mut records = HashMap::new();
        for record in &table.rows {
            let key = record.text(column);
            if !key.is_empty() {
                records.entry(key).or_insert(record);
            }
        }
        Self { records }
    }

    pub fn get(&self, key: &str) -> Option<&'a ResourceRecord> {
        self.records.get(key).copied()
    }
}
