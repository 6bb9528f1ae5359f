//! Data and delivery sheets: ElastiCache, CloudFront, S3, RDS and DocumentDB.

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use crate::cloudaudit::tools::error::{FlattenError, Result};
use crate::cloudaudit::tools::flatten::attributes::{
    join_field, join_paths, list_items, lookup_path, pluck,
};
use crate::cloudaudit::tools::flatten::policy::bucket_policy_principals;
use crate::cloudaudit::tools::flatten::{SheetTable, TYPE_HERE, nested_cell};
use crate::cloudaudit::tools::join::{JoinSpec, left_join};
use crate::cloudaudit::tools::model::{ResourceKind, ResourceRecord, SourceTables, Table, scalar_text};
use crate::cloudaudit::tools::transform::{source, tag_cell};

pub const ELASTICACHE_SHEET: &str = "ElastiCache";
pub const CLOUDFRONT_SHEET: &str = "CloudFront";
pub const S3_SHEET: &str = "S3";
pub const RDS_SHEET: &str = "RDS";
pub const DOCDB_SHEET: &str = "DocDB";

const ELASTICACHE_JOIN: JoinSpec<'static> = JoinSpec {
    key: "replication_group_id",
    child_suffix: "_cluster",
    parent_suffix: "_replication",
};

const DATABASE_JOIN: JoinSpec<'static> = JoinSpec {
    key: "db_cluster_identifier",
    child_suffix: "_instance",
    parent_suffix: "_cluster",
};

/// Text of `column` on a joined record, preferring the copy renamed with
/// `suffix` when the column collided during the join.
fn joined_text(record: &ResourceRecord, column: &str, suffix: &str) -> String {
    let renamed = format!("{column}{suffix}");
    if record.attributes.contains_key(&renamed) {
        record.text(&renamed)
    } else {
        record.text(column)
    }
}

fn joined_column(record: &ResourceRecord, column: &str, suffix: &str) -> String {
    let renamed = format!("{column}{suffix}");
    if record.attributes.contains_key(&renamed) {
        renamed
    } else {
        column.to_string()
    }
}

fn enabled(flag: bool) -> String {
    if flag { "Enabled" } else { "Disabled" }.to_string()
}

/// Cache clusters joined with the replication group they belong to.
pub fn elasticache_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        ELASTICACHE_SHEET,
        &[
            "Name",
            "Region",
            "Engine",
            "Type",
            "Subnet Group",
            "Parameter Group",
            "Security Group",
            "Cluster Mode",
            "Multi-AZ",
            "Shard",
            "Node",
            "Endpoint",
            "Encryption at rest",
            "Description",
        ],
    );
    let Some(clusters) = source(sources, ResourceKind::ElastiCacheCluster, "cache_cluster_id")? else {
        return Ok(sheet);
    };
    let Some(groups) = source(sources, ResourceKind::ElastiCacheReplicationGroup, "replication_group_id")?
    else {
        return Ok(sheet);
    };

    let joined = left_join(clusters, groups, &ELASTICACHE_JOIN);
    for row in &joined.rows {
        let cluster = |column: &str| joined_text(row, column, "_cluster");
        let group = |column: &str| joined_text(row, column, "_replication");

        let member_clusters = joined_column(row, "member_clusters", "_replication");
        let multi_az = match row
            .nested(&member_clusters)
            .and_then(|value| Ok(list_items(&value)?.len()))
        {
            Ok(count) if count >= 2 => "Yes",
            Ok(_) => "No",
            Err(error) => {
                warn!(column = %member_clusters, %error, "malformed attribute, using placeholder");
                "No"
            }
        };
        let cluster_mode = enabled(row.flag(&joined_column(row, "cluster_enabled", "_replication")));

        sheet.push(vec![
            cluster("title"),
            cluster("region"),
            cluster("engine"),
            cluster("cache_node_type"),
            cluster("cache_subnet_group_name"),
            nested_cell(row, &joined_column(row, "cache_parameter_group", "_cluster"), "", |value| {
                Ok(lookup_path(value, &["CacheParameterGroupName"]))
            }),
            nested_cell(row, &joined_column(row, "security_groups", "_cluster"), "", |value| {
                join_field(value, "SecurityGroupId", "\n")
            }),
            cluster_mode,
            multi_az.to_string(),
            cluster("num_cache_nodes"),
            nested_cell(row, &joined_column(row, "node_groups", "_replication"), "0", node_member_count),
            nested_cell(row, &joined_column(row, "cache_nodes", "_cluster"), "", |value| {
                join_paths(value, &["Endpoint", "Address"], "\n")
            }),
            enabled(row.flag(&joined_column(row, "at_rest_encryption_enabled", "_cluster"))),
            group("description"),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// Total members across every node group of a replication group.
fn node_member_count(value: &Value) -> std::result::Result<String, FlattenError> {
    let mut total = 0;
    for group in list_items(value)? {
        total += match group.get("NodeGroupMembers") {
            Some(members) => list_items(members)?.len(),
            None => 0,
        };
    }
    Ok(total.to_string())
}

pub fn cloudfront_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        CLOUDFRONT_SHEET,
        &[
            "Domain Name",
            "Alternate Domain Name",
            "ID",
            "Origin",
            "SSL Certificate",
            "Description",
        ],
    );
    let Some(distributions) = source(sources, ResourceKind::CloudFrontDistribution, "id")? else {
        return Ok(sheet);
    };

    for distribution in &distributions.rows {
        sheet.push(vec![
            distribution.text("domain_name"),
            nested_cell(distribution, "aliases", "", |value| {
                let items = value.get("Items").unwrap_or(&Value::Null);
                Ok(list_items(items)?
                    .iter()
                    .map(scalar_text)
                    .collect::<Vec<_>>()
                    .join(", "))
            }),
            distribution.text("id"),
            nested_cell(distribution, "origins", "", |value| join_field(value, "DomainName", ", ")),
            nested_cell(distribution, "viewer_certificate", "", |value| {
                Ok(lookup_path(value, &["Certificate"]))
            }),
            distribution.text("comment"),
        ]);
    }

    sheet.sort_descending_by("Domain Name");
    Ok(sheet)
}

pub fn s3_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        S3_SHEET,
        &[
            "Name",
            "Region",
            "Block All Public Access",
            "Versioning",
            "Encryption",
            "Static Web Hosting",
            "Bucket Policy",
            "CORS",
            "Lifecycle Expire Days",
            "Static Log",
            "Tag",
        ],
    );
    let Some(buckets) = source(sources, ResourceKind::S3Bucket, "name")? else {
        return Ok(sheet);
    };

    for bucket in &buckets.rows {
        let blocked = [
            "block_public_acls",
            "block_public_policy",
            "ignore_public_acls",
            "restrict_public_buckets",
        ]
        .iter()
        .all(|column| bucket.flag(column));

        sheet.push(vec![
            bucket.text("name"),
            bucket.text("region"),
            if blocked { "On" } else { "Off" }.to_string(),
            bucket.text("versioning_enabled"),
            nested_cell(bucket, "server_side_encryption_configuration", "Disabled", |value| {
                Ok(enabled(default_encryption_configured(value)))
            }),
            nested_cell(bucket, "website_configuration", "Disabled", |value| {
                Ok(enabled(!lookup_path(value, &["IndexDocument", "Suffix"]).is_empty()))
            }),
            nested_cell(bucket, "policy", "", bucket_policy_principals),
            TYPE_HERE.to_string(),
            nested_cell(bucket, "lifecycle_rules", "", expiration_days),
            nested_cell(bucket, "logging", "-", |value| {
                Ok(match value {
                    Value::Null => String::new(),
                    logging => logging
                        .get("TargetBucket")
                        .map(scalar_text)
                        .unwrap_or_else(|| "-".to_string()),
                })
            }),
            tag_cell(bucket),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// Whether the first encryption rule sets any default encryption value.
fn default_encryption_configured(configuration: &Value) -> bool {
    configuration
        .get("Rules")
        .and_then(Value::as_array)
        .and_then(|rules| rules.first())
        .and_then(|rule| rule.get("ApplyServerSideEncryptionByDefault"))
        .and_then(Value::as_object)
        .is_some_and(|defaults| defaults.values().any(|value| !value.is_null()))
}

/// Expiration days of every lifecycle rule that sets one.
fn expiration_days(rules: &Value) -> std::result::Result<String, FlattenError> {
    let days: Vec<String> = list_items(rules)?
        .iter()
        .map(|rule| lookup_path(rule, &["Expiration", "Days"]))
        .filter(|days| !days.is_empty() && days != "0")
        .collect();
    Ok(days.join(", "))
}

/// Instance identifiers that publish metrics in a CloudWatch namespace.
fn monitored_instances(metrics: Option<&Table>, namespace: &str) -> HashSet<String> {
    let mut monitored = HashSet::new();
    let Some(metrics) = metrics else {
        return monitored;
    };
    for metric in metrics.rows.iter().filter(|metric| metric.text("namespace") == namespace) {
        let dimensions = match metric.nested("dimensions") {
            Ok(dimensions) => dimensions,
            Err(error) => {
                warn!(column = "dimensions", %error, "ignoring malformed metric dimensions");
                continue;
            }
        };
        let Ok(items) = list_items(&dimensions) else {
            continue;
        };
        monitored.extend(
            items
                .iter()
                .filter(|dimension| lookup_path(dimension, &["Name"]) == "DBInstanceIdentifier")
                .map(|dimension| lookup_path(dimension, &["Value"])),
        );
    }
    monitored
}

/// `Enabled (N day|days)` for a positive retention period, else `Disabled`.
fn backup_retention(period: Option<f64>) -> String {
    match period {
        Some(days) if days > 0.0 => {
            let days = days as i64;
            let label = if days == 1 { "day" } else { "days" };
            format!("Enabled ({days} {label})")
        }
        _ => "Disabled".to_string(),
    }
}

/// Columns shared by the RDS and DocumentDB sheets, in the order each sheet
/// lays them out.
#[derive(Debug, Clone, Copy)]
struct DatabaseLayout {
    sheet: &'static str,
    instances: ResourceKind,
    clusters: ResourceKind,
    class_column: &'static str,
    security_group_column: &'static str,
    namespace: &'static str,
    columns: &'static [&'static str],
}

const RDS_LAYOUT: DatabaseLayout = DatabaseLayout {
    sheet: RDS_SHEET,
    instances: ResourceKind::RdsInstance,
    clusters: ResourceKind::RdsCluster,
    class_column: "class",
    security_group_column: "VPC Security Group",
    namespace: "AWS/RDS",
    columns: &[
        "Cluster Name",
        "DB Name",
        "Port",
        "Engine Version",
        "Size",
        "Subnet Group ID",
        "Subnet ID",
        "Parameter Group",
        "VPC Security Group",
        "Endpoint",
        "Backup",
        "Encryption At Rest",
        "Tier",
        "CloudWatch",
        "Description",
    ],
};

const DOCDB_LAYOUT: DatabaseLayout = DatabaseLayout {
    sheet: DOCDB_SHEET,
    instances: ResourceKind::DocDbInstance,
    clusters: ResourceKind::DocDbCluster,
    class_column: "db_instance_class",
    security_group_column: "Security Group",
    namespace: "AWS/DocDB",
    columns: &[
        "Cluster Name",
        "DB Name",
        "Port",
        "Engine Version",
        "Size",
        "Subnet Group ID",
        "Subnet ID",
        "Parameter Group",
        "Security Group",
        "Endpoint",
        "Backup",
        "Encryption At Rest",
        "Description",
        "CloudWatch",
        "Tier",
    ],
};

pub fn rds_sheet(sources: &SourceTables) -> Result<SheetTable> {
    database_sheet(sources, &RDS_LAYOUT)
}

pub fn docdb_sheet(sources: &SourceTables) -> Result<SheetTable> {
    database_sheet(sources, &DOCDB_LAYOUT)
}

/// Database instances joined with their cluster, one row per instance.
fn database_sheet(sources: &SourceTables, layout: &DatabaseLayout) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(layout.sheet, layout.columns);
    let Some(instances) = source(sources, layout.instances, "db_instance_identifier")? else {
        return Ok(sheet);
    };
    let Some(clusters) = source(sources, layout.clusters, "db_cluster_identifier")? else {
        return Ok(sheet);
    };
    let monitored = monitored_instances(sources.get(ResourceKind::CloudWatchMetric), layout.namespace);

    let joined = left_join(instances, clusters, &DATABASE_JOIN);
    for row in &joined.rows {
        let instance = |column: &str| joined_text(row, column, "_instance");
        let db_name = row.text("db_instance_identifier");

        let cells = [
            ("Cluster Name", row.text("db_cluster_identifier")),
            ("DB Name", db_name.clone()),
            ("Port", instance("endpoint_port")),
            ("Engine Version", instance("engine_version")),
            ("Size", instance(layout.class_column)),
            ("Subnet Group ID", instance("db_subnet_group_name")),
            (
                "Subnet ID",
                nested_cell(row, &joined_column(row, "subnets", "_instance"), "", |value| {
                    Ok(pluck(value, "SubnetIdentifier")?.join("\n"))
                }),
            ),
            ("Parameter Group", joined_text(row, "db_cluster_parameter_group", "_cluster")),
            (
                layout.security_group_column,
                nested_cell(row, &joined_column(row, "vpc_security_groups", "_instance"), "", |value| {
                    join_field(value, "VpcSecurityGroupId", "\n")
                }),
            ),
            ("Endpoint", instance("endpoint_address")),
            (
                "Backup",
                backup_retention(row.number(&joined_column(row, "backup_retention_period", "_instance"))),
            ),
            (
                "Encryption At Rest",
                enabled(row.flag(&joined_column(row, "storage_encrypted", "_instance"))),
            ),
            ("Tier", instance("promotion_tier")),
            ("CloudWatch", enabled(monitored.contains(&db_name))),
            ("Description", instance("db_subnet_group_description")),
        ];
        let row_cells = layout
            .columns
            .iter()
            .map(|column| {
                cells
                    .iter()
                    .find(|(name, _)| name == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default()
            })
            .collect();
        sheet.push(row_cells);
    }

    sheet.sort_descending_by("Cluster Name");
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudaudit::tools::transform::test_support::{column, sources};
    use serde_json::json;

    #[test]
    fn elasticache_clusters_pick_up_replication_group_fields() {
        let sources = sources(vec![
            (
                ResourceKind::ElastiCacheCluster,
                vec![
                    json!({
                        "cache_cluster_id": "redis-001",
                        "title": "redis-001",
                        "replication_group_id": "redis",
                        "engine": "redis",
                        "cache_node_type": "cache.t3.micro",
                        "at_rest_encryption_enabled": true,
                        "cache_parameter_group": {"CacheParameterGroupName": "default.redis7"},
                        "security_groups": [{"SecurityGroupId": "sg-1"}, {"SecurityGroupId": "sg-2"}],
                        "cache_nodes": [{"Endpoint": {"Address": "redis-001.cache", "Port": 6379}}],
                        "num_cache_nodes": 1
                    }),
                    json!({
                        "cache_cluster_id": "memcached",
                        "title": "memcached",
                        "engine": "memcached",
                        "at_rest_encryption_enabled": false
                    }),
                ],
            ),
            (
                ResourceKind::ElastiCacheReplicationGroup,
                vec![json!({
                    "replication_group_id": "redis",
                    "description": "session store",
                    "cluster_enabled": false,
                    "at_rest_encryption_enabled": true,
                    "member_clusters": ["redis-001", "redis-002"],
                    "node_groups": [{"NodeGroupMembers": [{"CacheClusterId": "redis-001"}, {"CacheClusterId": "redis-002"}]}]
                })],
            ),
        ]);
        let sheet = elasticache_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "Name"), vec!["redis-001", "memcached"]);
        assert_eq!(column(&sheet, "Parameter Group")[0], "default.redis7");
        assert_eq!(column(&sheet, "Security Group")[0], "sg-1\nsg-2");
        assert_eq!(column(&sheet, "Multi-AZ"), vec!["Yes", "No"]);
        assert_eq!(column(&sheet, "Node"), vec!["2", "0"]);
        assert_eq!(column(&sheet, "Endpoint")[0], "redis-001.cache");
        assert_eq!(column(&sheet, "Encryption at rest"), vec!["Enabled", "Disabled"]);
        assert_eq!(column(&sheet, "Cluster Mode")[0], "Disabled");
        assert_eq!(column(&sheet, "Description"), vec!["session store", ""]);
    }

    #[test]
    fn s3_buckets_summarise_access_and_policy() {
        let sources = sources(vec![(
            ResourceKind::S3Bucket,
            vec![
                json!({
                    "name": "logs",
                    "block_public_acls": true,
                    "block_public_policy": true,
                    "ignore_public_acls": true,
                    "restrict_public_buckets": true,
                    "versioning_enabled": true,
                    "server_side_encryption_configuration": {
                        "Rules": [{"ApplyServerSideEncryptionByDefault": {"SSEAlgorithm": "AES256", "KMSMasterKeyID": null}}]
                    },
                    "lifecycle_rules": [{"Expiration": {"Days": 30}}, {"Expiration": {"Days": 0}}, {"ID": "noop"}],
                    "logging": {"TargetPrefix": "x/"},
                    "policy": {"Statement": [{"Principal": {"Service": "logging.s3.amazonaws.com"}}]}
                }),
                json!({
                    "name": "assets",
                    "block_public_acls": true,
                    "block_public_policy": false,
                    "website_configuration": {"IndexDocument": {"Suffix": "index.html"}},
                    "logging": {"TargetBucket": "logs"}
                }),
            ],
        )]);
        let sheet = s3_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "Name"), vec!["logs", "assets"]);
        assert_eq!(column(&sheet, "Block All Public Access"), vec!["On", "Off"]);
        assert_eq!(column(&sheet, "Encryption"), vec!["Enabled", "Disabled"]);
        assert_eq!(column(&sheet, "Static Web Hosting"), vec!["Disabled", "Enabled"]);
        assert_eq!(
            column(&sheet, "Bucket Policy"),
            vec!["Service: logging.s3.amazonaws.com", "None"]
        );
        assert_eq!(column(&sheet, "Lifecycle Expire Days"), vec!["30", ""]);
        assert_eq!(column(&sheet, "Static Log"), vec!["-", "logs"]);
    }

    #[test]
    fn cloudfront_sorts_by_domain_name() {
        let sources = sources(vec![(
            ResourceKind::CloudFrontDistribution,
            vec![
                json!({"id": "E1", "domain_name": "a.cloudfront.net",
                       "aliases": {"Quantity": 2, "Items": ["www.example.com", "example.com"]},
                       "origins": [{"DomainName": "bucket.s3.amazonaws.com"}],
                       "viewer_certificate": {"Certificate": "arn:acm:cert"}}),
                json!({"id": "E2", "domain_name": "b.cloudfront.net", "aliases": {"Quantity": 0}}),
            ],
        )]);
        let sheet = cloudfront_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "ID"), vec!["E2", "E1"]);
        assert_eq!(column(&sheet, "Alternate Domain Name")[1], "www.example.com, example.com");
        assert_eq!(column(&sheet, "Origin")[1], "bucket.s3.amazonaws.com");
        assert_eq!(column(&sheet, "SSL Certificate")[1], "arn:acm:cert");
    }

    #[test]
    fn rds_instances_share_their_cluster_and_monitoring_state() {
        let sources = sources(vec![
            (
                ResourceKind::RdsCluster,
                vec![json!({
                    "db_cluster_identifier": "aurora",
                    "db_cluster_parameter_group": "aurora-pg",
                    "engine_version": "15.4",
                    "backup_retention_period": 7
                })],
            ),
            (
                ResourceKind::RdsInstance,
                vec![
                    json!({
                        "db_instance_identifier": "aurora-1",
                        "db_cluster_identifier": "aurora",
                        "engine_version": "15.4",
                        "class": "db.r6g.large",
                        "endpoint_port": 5432,
                        "backup_retention_period": 1,
                        "storage_encrypted": true,
                        "vpc_security_groups": [{"VpcSecurityGroupId": "sg-db"}],
                        "subnets": [{"SubnetIdentifier": "subnet-a"}, {"SubnetIdentifier": "subnet-b"}]
                    }),
                    json!({
                        "db_instance_identifier": "aurora-2",
                        "db_cluster_identifier": "aurora",
                        "engine_version": "15.4",
                        "backup_retention_period": 0
                    }),
                ],
            ),
            (
                ResourceKind::CloudWatchMetric,
                vec![
                    json!({"namespace": "AWS/RDS", "dimensions": [{"Name": "DBInstanceIdentifier", "Value": "aurora-1"}]}),
                    json!({"namespace": "AWS/DocDB", "dimensions": [{"Name": "DBInstanceIdentifier", "Value": "aurora-2"}]}),
                ],
            ),
        ]);
        let sheet = rds_sheet(&sources).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(column(&sheet, "Parameter Group"), vec!["aurora-pg", "aurora-pg"]);
        assert_eq!(column(&sheet, "Backup"), vec!["Enabled (1 day)", "Disabled"]);
        assert_eq!(column(&sheet, "CloudWatch"), vec!["Enabled", "Disabled"]);
        assert_eq!(column(&sheet, "VPC Security Group")[0], "sg-db");
        assert_eq!(column(&sheet, "Subnet ID")[0], "subnet-a\nsubnet-b");
        assert_eq!(column(&sheet, "Encryption At Rest"), vec!["Enabled", "Disabled"]);
        assert_eq!(column(&sheet, "Port")[0], "5432");
    }

    #[test]
    fn docdb_uses_its_own_layout_and_namespace() {
        let sources = sources(vec![
            (
                ResourceKind::DocDbCluster,
                vec![json!({"db_cluster_identifier": "docs", "backup_retention_period": 3})],
            ),
            (
                ResourceKind::DocDbInstance,
                vec![json!({
                    "db_instance_identifier": "docs-1",
                    "db_cluster_identifier": "docs",
                    "db_instance_class": "db.t3.medium",
                    "backup_retention_period": 3,
                    "vpc_security_groups": [{"VpcSecurityGroupId": "sg-docs"}]
                })],
            ),
            (
                ResourceKind::CloudWatchMetric,
                vec![json!({"namespace": "AWS/DocDB", "dimensions": [{"Name": "DBInstanceIdentifier", "Value": "docs-1"}]})],
            ),
        ]);
        let sheet = docdb_sheet(&sources).unwrap();

        assert_eq!(sheet.columns.last().map(String::as_str), Some("Tier"));
        assert_eq!(column(&sheet, "Size"), vec!["db.t3.medium"]);
        assert_eq!(column(&sheet, "Security Group"), vec!["sg-docs"]);
        assert_eq!(column(&sheet, "Backup"), vec!["Enabled (3 days)"]);
        assert_eq!(column(&sheet, "CloudWatch"), vec!["Enabled"]);
    }
}
