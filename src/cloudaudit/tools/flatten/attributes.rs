use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::cloudaudit::tools::error::FlattenError;
use crate::cloudaudit::tools::model::{json_type_name, scalar_text};

/// A bag of resource tags.
///
/// Inventory exports carry tags either as a key → value object (`tags`) or
/// as the raw AWS `[{Key, Value}]` list (`tags_src`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagBag {
    Map(BTreeMap<String, Value>),
    List(Vec<TagEntry>),
}

/// One entry of the AWS tag list representation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagEntry {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl TagBag {
    /// Decodes a tag bag; `null` means the resource carries no tags.
    pub fn parse(value: &Value) -> Result<Option<Self>, FlattenError> {
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|_| FlattenError::UnexpectedShape {
                expected: "tag object or tag list",
                found: json_type_name(value),
            })
    }

    /// Key/value pairs sorted by key. For duplicate keys in the list form the
    /// last entry wins.
    pub fn sorted_pairs(&self) -> Vec<(String, String)> {
        let pairs: BTreeMap<String, String> = match self {
            TagBag::Map(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), scalar_text(value)))
                .collect(),
            TagBag::List(entries) => entries
                .iter()
                .map(|entry| (entry.key.clone(), scalar_text(&entry.value)))
                .collect(),
        };
        pairs.into_iter().collect()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self {
            TagBag::Map(map) => map.get(key).map(scalar_text),
            TagBag::List(entries) => entries
                .iter()
                .rev()
                .find(|entry| entry.key == key)
                .map(|entry| scalar_text(&entry.value)),
        }
    }
}

/// Renders tags as `"k: v, k: v"` in ascending key order; no tags → `-`.
pub fn format_tags(value: &Value) -> Result<String, FlattenError> {
    let rendered = TagBag::parse(value)?
        .map(|bag| {
            bag.sorted_pairs()
                .into_iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    Ok(placeholder_if_empty(rendered, "-"))
}

/// Looks up one tag value; `None` when the bag is absent or lacks the key.
pub fn tag_value(value: &Value, key: &str) -> Result<Option<String>, FlattenError> {
    Ok(TagBag::parse(value)?.and_then(|bag| bag.get(key)))
}

/// Returns the elements of a list attribute; `null` is an empty list.
pub fn list_items(value: &Value) -> Result<&[Value], FlattenError> {
    match value {
        Value::Null => Ok(&[]),
        Value::Array(items) => Ok(items.as_slice()),
        other => Err(FlattenError::UnexpectedShape {
            expected: "array",
            found: json_type_name(other),
        }),
    }
}

/// Joins a list of scalars in source order.
pub fn join_strings(value: &Value, separator: &str) -> Result<String, FlattenError> {
    Ok(list_items(value)?
        .iter()
        .map(scalar_text)
        .collect::<Vec<_>>()
        .join(separator))
}

/// Collects one field of every object in a list, in source order. Entries
/// without the field are skipped.
pub fn pluck(value: &Value, field: &str) -> Result<Vec<String>, FlattenError> {
    Ok(list_items(value)?
        .iter()
        .filter_map(|item| item.get(field))
        .map(scalar_text)
        .collect())
}

/// Joins one field of every object in a list, in source order.
pub fn join_field(value: &Value, field: &str, separator: &str) -> Result<String, FlattenError> {
    Ok(pluck(value, field)?.join(separator))
}

/// Joins one field of every object in a list, sorted and without duplicates.
pub fn join_field_sorted(value: &Value, field: &str, separator: &str) -> Result<String, FlattenError> {
    Ok(sorted_unique(pluck(value, field)?).join(separator))
}

/// Descends through nested objects along `path` and renders the leaf. Any
/// missing level yields the empty string.
pub fn lookup_path(value: &Value, path: &[&str]) -> String {
    path.iter()
        .try_fold(value, |current, key| current.get(key))
        .map(scalar_text)
        .unwrap_or_default()
}

/// Reads `path` from every object of a list and joins the non-empty leaves.
pub fn join_paths(value: &Value, path: &[&str], separator: &str) -> Result<String, FlattenError> {
    Ok(list_items(value)?
        .iter()
        .map(|item| lookup_path(item, path))
        .filter(|leaf| !leaf.is_empty())
        .collect::<Vec<_>>()
        .join(separator))
}

/// Sorts and deduplicates a list of strings.
pub fn sorted_unique(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

/// Deduplicates a list of strings, keeping the first occurrence of each.
pub fn unique_in_order(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

pub fn placeholder_if_empty(text: String, placeholder: &str) -> String {
    if text.is_empty() {
        placeholder.to_string()
    } else {
        text
    }
}

/// Returns the last `/`-separated segment of an ARN.
pub fn arn_resource_name(arn: &str) -> String {
    arn.rsplit('/').next().unwrap_or_default().to_string()
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Renders a timestamp without its timezone as `YYYY-MM-DD HH:MM:SS`.
/// Text that is not a recognised timestamp is returned unchanged.
pub fn naive_timestamp(text: &str) -> String {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return format_naive(parsed.naive_local());
    }
    for pattern in ["%Y-%m-%d %H:%M:%S%#z", "%Y-%m-%d %H:%M:%S%.f%#z"] {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, pattern) {
            return format_naive(parsed.naive_local());
        }
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return format_naive(parsed);
        }
    }
    trimmed.to_string()
}

fn format_naive(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_render_in_ascending_key_order() {
        let tags = json!({"Owner": "ops", "Env": "prod", "Name": "web"});
        assert_eq!(
            format_tags(&tags).unwrap(),
            "Env: prod, Name: web, Owner: ops"
        );
    }

    #[test]
    fn tag_list_form_is_sorted_too() {
        let tags = json!([{"Key": "b", "Value": "2"}, {"Key": "a", "Value": "1"}]);
        assert_eq!(format_tags(&tags).unwrap(), "a: 1, b: 2");
        assert_eq!(tag_value(&tags, "b").unwrap(), Some("2".to_string()));
    }

    #[test]
    fn empty_or_missing_tags_render_dash() {
        assert_eq!(format_tags(&Value::Null).unwrap(), "-");
        assert_eq!(format_tags(&json!({})).unwrap(), "-");
        assert_eq!(format_tags(&json!([])).unwrap(), "-");
    }

    #[test]
    fn tags_of_wrong_shape_are_an_error() {
        assert_eq!(
            format_tags(&json!(42)),
            Err(FlattenError::UnexpectedShape {
                expected: "tag object or tag list",
                found: "number",
            })
        );
    }

    #[test]
    fn lookup_path_returns_empty_when_any_level_is_missing() {
        let node = json!({"Endpoint": {"Address": "cache.local", "Port": 6379}});
        assert_eq!(lookup_path(&node, &["Endpoint", "Address"]), "cache.local");
        assert_eq!(lookup_path(&node, &["Endpoint", "Host"]), "");
        assert_eq!(lookup_path(&node, &["Configuration", "Address"]), "");
        assert_eq!(lookup_path(&Value::Null, &["Endpoint"]), "");
    }

    #[test]
    fn field_joins_skip_entries_without_the_field() {
        let groups = json!([{"GroupId": "sg-2"}, {"Other": 1}, {"GroupId": "sg-1"}]);
        assert_eq!(join_field(&groups, "GroupId", ", ").unwrap(), "sg-2, sg-1");
        assert_eq!(
            join_field_sorted(&groups, "GroupId", "\n").unwrap(),
            "sg-1\nsg-2"
        );
        assert!(join_field(&json!("sg-1"), "GroupId", ", ").is_err());
    }

    #[test]
    fn timestamps_drop_their_timezone() {
        assert_eq!(
            naive_timestamp("2023-04-01T09:30:00Z"),
            "2023-04-01 09:30:00"
        );
        assert_eq!(
            naive_timestamp("2023-04-01 09:30:00+09"),
            "2023-04-01 09:30:00"
        );
        assert_eq!(naive_timestamp("never"), "never");
    }

    #[test]
    fn capitalize_matches_rule_action_display() {
        assert_eq!(capitalize("allow"), "Allow");
        assert_eq!(capitalize("DENY"), "Deny");
        assert_eq!(capitalize(""), "");
    }
}
