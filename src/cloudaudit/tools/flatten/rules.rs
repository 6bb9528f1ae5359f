//! Security-group permission and network-ACL entry flattening.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::cloudaudit::tools::error::FlattenError;
use crate::cloudaudit::tools::flatten::attributes::capitalize;
use crate::cloudaudit::tools::model::{json_type_name, scalar_text};

/// Rule number AWS assigns to the catch-all ACL entry.
const DEFAULT_RULE_NUMBER: i64 = 32767;
const ANY_IPV4: &str = "0.0.0.0/0";

/// One `IpPermission` of a security group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IpPermission {
    #[serde(deserialize_with = "lenient_string")]
    pub ip_protocol: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub from_port: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub to_port: Option<i64>,
    pub ip_ranges: Vec<IpRange>,
    pub ipv6_ranges: Vec<Ipv6Range>,
    pub user_id_group_pairs: Vec<GroupPair>,
    pub prefix_list_ids: Vec<PrefixListRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IpRange {
    pub cidr_ip: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Ipv6Range {
    pub cidr_ipv6: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GroupPair {
    pub group_id: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PrefixListRef {
    pub prefix_list_id: Option<String>,
    pub description: Option<String>,
}

/// Display fields of one security-group permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedPermission {
    pub protocol: String,
    pub port_range: String,
    pub source: String,
    pub description: String,
}

impl IpPermission {
    pub fn flatten(&self) -> FlattenedPermission {
        let protocol = match self.ip_protocol.as_deref() {
            Some("-1") => "All".to_string(),
            Some(protocol) if !protocol.is_empty() => protocol.to_string(),
            _ => "-".to_string(),
        };

        let mut sources = Vec::new();
        let mut descriptions = Vec::new();
        let mut record = |source: &Option<String>, description: &Option<String>| {
            sources.push(source.clone().unwrap_or_else(|| "-".to_string()));
            descriptions.push(
                description
                    .clone()
                    .filter(|text| !text.is_empty())
                    .unwrap_or_else(|| "-".to_string()),
            );
        };
        for range in &self.ip_ranges {
            record(&range.cidr_ip, &range.description);
        }
        for range in &self.ipv6_ranges {
            record(&range.cidr_ipv6, &range.description);
        }
        for pair in &self.user_id_group_pairs {
            record(&pair.group_id, &pair.description);
        }
        for prefix in &self.prefix_list_ids {
            record(&prefix.prefix_list_id, &prefix.description);
        }

        let source = if sources.is_empty() {
            "-".to_string()
        } else {
            sources.join(", ")
        };

        FlattenedPermission {
            protocol,
            port_range: port_range(self.from_port, self.to_port, "-"),
            source,
            description: descriptions.join(", "),
        }
    }
}

/// Decodes and flattens a security-group permission list.
pub fn flatten_permissions(value: &Value) -> Result<Vec<FlattenedPermission>, FlattenError> {
    let permissions: Vec<IpPermission> = decode_list(value, "permission list")?;
    Ok(permissions.iter().map(IpPermission::flatten).collect())
}

/// One entry of a network ACL.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AclEntry {
    pub cidr_block: Option<String>,
    pub ipv6_cidr_block: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub egress: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub protocol: Option<String>,
    pub port_range: Option<AclPortRange>,
    #[serde(deserialize_with = "lenient_string")]
    pub rule_action: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub rule_number: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AclPortRange {
    #[serde(deserialize_with = "lenient_int")]
    pub from: Option<i64>,
    #[serde(deserialize_with = "lenient_int")]
    pub to: Option<i64>,
}

/// Display fields of one ACL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedAclEntry {
    pub direction: &'static str,
    pub rule: String,
    pub traffic_type: &'static str,
    pub protocol: String,
    pub port_range: String,
    pub source: String,
    pub action: String,
}

impl AclEntry {
    pub fn flatten(&self) -> FlattenedAclEntry {
        let protocol = match self.protocol.as_deref() {
            None | Some("") | Some("-1") => "All".to_string(),
            Some("6") => "TCP (6)".to_string(),
            Some("17") => "UDP (17)".to_string(),
            Some("1") => "ICMP (1)".to_string(),
            Some(other) => other.to_string(),
        };

        let port_range = match &self.port_range {
            Some(range) => port_range(range.from, range.to, "All"),
            None => "All".to_string(),
        };

        let rule = match self.rule_number {
            Some(DEFAULT_RULE_NUMBER) | None => "*".to_string(),
            Some(number) => number.to_string(),
        };

        let source = [&self.cidr_block, &self.ipv6_cidr_block]
            .into_iter()
            .flatten()
            .find(|block| !block.is_empty())
            .cloned()
            .unwrap_or_else(|| ANY_IPV4.to_string());

        let action = self
            .rule_action
            .as_deref()
            .filter(|action| !action.is_empty())
            .map(capitalize)
            .unwrap_or_else(|| "Deny".to_string());

        FlattenedAclEntry {
            direction: if self.egress { "Outbound" } else { "Inbound" },
            rule,
            traffic_type: if protocol == "All" {
                "All traffic"
            } else {
                "Custom traffic"
            },
            protocol,
            port_range,
            source,
            action,
        }
    }
}

/// Decodes and flattens a network ACL entry list.
pub fn flatten_acl_entries(value: &Value) -> Result<Vec<FlattenedAclEntry>, FlattenError> {
    let entries: Vec<AclEntry> = decode_list(value, "ACL entry list")?;
    Ok(entries.iter().map(AclEntry::flatten).collect())
}

/// Normalises a port range: the full range is `All`, equal bounds collapse
/// to one value, anything else renders `from-to`. Missing bounds render as
/// `missing`.
pub fn port_range(from: Option<i64>, to: Option<i64>, missing: &str) -> String {
    if from == Some(0) && to == Some(65535) {
        return "All".to_string();
    }
    let render = |port: Option<i64>| port.map_or_else(|| missing.to_string(), |port| port.to_string());
    let (from, to) = (render(from), render(to));
    if from == to { from } else { format!("{from}-{to}") }
}

fn decode_list<T: for<'de> Deserialize<'de>>(
    value: &Value,
    expected: &'static str,
) -> Result<Vec<T>, FlattenError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(value.clone())
            .map_err(|error| FlattenError::Unparseable(format!("{expected}: {error}"))),
        other => Err(FlattenError::UnexpectedShape {
            expected,
            found: json_type_name(other),
        }),
    }
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .filter(|value| !value.is_null())
        .map(|value| scalar_text(&value)))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(flag)) => flag,
        Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_protocol_permission_renders_all() {
        let rules = json!([{
            "IpProtocol": "-1",
            "IpRanges": [{"CidrIp": "0.0.0.0/0"}],
            "Ipv6Ranges": [],
            "UserIdGroupPairs": [],
            "PrefixListIds": []
        }]);
        let flattened = flatten_permissions(&rules).unwrap();
        assert_eq!(
            flattened,
            vec![FlattenedPermission {
                protocol: "All".into(),
                port_range: "-".into(),
                source: "0.0.0.0/0".into(),
                description: "-".into(),
            }]
        );
    }

    #[test]
    fn permission_sources_combine_every_reference_kind() {
        let rules = json!([{
            "IpProtocol": "tcp",
            "FromPort": 443,
            "ToPort": 443.0,
            "IpRanges": [{"CidrIp": "10.0.0.0/8", "Description": "office"}],
            "Ipv6Ranges": [{"CidrIpv6": "::/0"}],
            "UserIdGroupPairs": [{"GroupId": "sg-123", "Description": ""}],
            "PrefixListIds": [{"PrefixListId": "pl-1", "Description": "s3"}]
        }]);
        let flattened = &flatten_permissions(&rules).unwrap()[0];
        assert_eq!(flattened.protocol, "tcp");
        assert_eq!(flattened.port_range, "443");
        assert_eq!(flattened.source, "10.0.0.0/8, ::/0, sg-123, pl-1");
        assert_eq!(flattened.description, "office, -, -, s3");
    }

    #[test]
    fn acl_full_port_range_is_all_and_single_port_collapses() {
        assert_eq!(port_range(Some(0), Some(65535), "All"), "All");
        assert_eq!(port_range(Some(80), Some(80), "All"), "80");
        assert_eq!(port_range(Some(1024), Some(2048), "All"), "1024-2048");
        assert_eq!(port_range(None, None, "-"), "-");
    }

    #[test]
    fn acl_entries_normalise_protocol_rule_and_action() {
        let entries = json!([
            {
                "CidrBlock": "0.0.0.0/0",
                "Egress": false,
                "Protocol": "-1",
                "RuleAction": "deny",
                "RuleNumber": 32767
            },
            {
                "Ipv6CidrBlock": "::/0",
                "Egress": true,
                "Protocol": "6",
                "PortRange": {"From": 80, "To": 80},
                "RuleAction": "allow",
                "RuleNumber": 100
            }
        ]);
        let flattened = flatten_acl_entries(&entries).unwrap();

        assert_eq!(flattened[0].rule, "*");
        assert_eq!(flattened[0].protocol, "All");
        assert_eq!(flattened[0].traffic_type, "All traffic");
        assert_eq!(flattened[0].port_range, "All");
        assert_eq!(flattened[0].action, "Deny");
        assert_eq!(flattened[0].direction, "Inbound");

        assert_eq!(flattened[1].rule, "100");
        assert_eq!(flattened[1].protocol, "TCP (6)");
        assert_eq!(flattened[1].traffic_type, "Custom traffic");
        assert_eq!(flattened[1].port_range, "80");
        assert_eq!(flattened[1].source, "::/0");
        assert_eq!(flattened[1].action, "Allow");
        assert_eq!(flattened[1].direction, "Outbound");
    }

    #[test]
    fn acl_entry_without_source_defaults_to_any_ipv4() {
        let flattened = AclEntry::default().flatten();
        assert_eq!(flattened.source, "0.0.0.0/0");
        assert_eq!(flattened.action, "Deny");
    }

    #[test]
    fn non_list_rule_values_are_rejected() {
        assert_eq!(
            flatten_acl_entries(&json!({"RuleNumber": 1})),
            Err(FlattenError::UnexpectedShape {
                expected: "ACL entry list",
                found: "object",
            })
        );
        assert_eq!(flatten_permissions(&Value::Null), Ok(Vec::new()));
    }
}
