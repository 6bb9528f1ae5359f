//! IAM policy documents: principals of bucket and trust policies, and
//! attached policy ARNs.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::cloudaudit::tools::error::FlattenError;
use crate::cloudaudit::tools::flatten::attributes::list_items;
use crate::cloudaudit::tools::model::{json_type_name, scalar_text};

const IAM_ARN_PREFIX: &str = "arn:aws:iam::";

/// A JSON policy document. Only the principals of its statements matter here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    #[serde(default)]
    pub statement: OneOrMany<Statement>,
}

/// AWS accepts a single statement object where a list is expected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => std::slice::from_ref(item),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Statement {
    pub principal: Option<Principal>,
}

/// Either the `"*"` wildcard or a map of principal type to identifiers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    Wildcard(String),
    Mapped(BTreeMap<String, OneOrMany<String>>),
}

impl PolicyDocument {
    pub fn parse(value: &Value) -> Result<Self, FlattenError> {
        if !value.is_object() {
            return Err(FlattenError::UnexpectedShape {
                expected: "policy document",
                found: json_type_name(value),
            });
        }
        serde_json::from_value(value.clone())
            .map_err(|error| FlattenError::Unparseable(format!("policy document: {error}")))
    }

    /// Every principal as `Type: identifier`, sorted.
    pub fn principals(&self) -> Vec<String> {
        let mut principals = Vec::new();
        for statement in self.statement.as_slice() {
            match &statement.principal {
                Some(Principal::Wildcard(wildcard)) => principals.push(wildcard.clone()),
                Some(Principal::Mapped(map)) => {
                    for (kind, identifiers) in map {
                        for identifier in identifiers.as_slice() {
                            principals.push(format!("{kind}: {identifier}"));
                        }
                    }
                }
                None => {}
            }
        }
        principals.sort();
        principals
    }
}

/// Principals of an S3 bucket policy. A bucket without a policy renders
/// `None`; a policy without principals renders `No principals found.`.
pub fn bucket_policy_principals(value: &Value) -> Result<String, FlattenError> {
    if value.is_null() {
        return Ok("None".to_string());
    }
    let principals = PolicyDocument::parse(value)?.principals();
    if principals.is_empty() {
        Ok("No principals found.".to_string())
    } else {
        Ok(principals.join("\n"))
    }
}

/// Principals allowed to assume a role.
pub fn trusted_entities(value: &Value) -> Result<String, FlattenError> {
    if value.is_null() {
        return Ok(String::new());
    }
    Ok(PolicyDocument::parse(value)?.principals().join("\n"))
}

/// Attached policy ARNs without the `arn:aws:iam::` prefix, sorted and
/// newline-joined. No attachment list renders `-`.
pub fn policy_arns(value: &Value) -> Result<String, FlattenError> {
    if value.is_null() {
        return Ok("-".to_string());
    }
    let mut policies: Vec<String> = list_items(value)?
        .iter()
        .map(|arn| scalar_text(arn).replace(IAM_ARN_PREFIX, ""))
        .collect();
    policies.sort();
    Ok(policies.join("\n"))
}
