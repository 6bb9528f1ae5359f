//! Compute sheets: EC2 instances, load balancers, target groups and auto
//! scaling groups.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::cloudaudit::tools::error::{FlattenError, Result};
use crate::cloudaudit::tools::flatten::attributes::{
    arn_resource_name, join_field, join_strings, list_items, lookup_path, placeholder_if_empty,
    pluck, sorted_unique,
};
use crate::cloudaudit::tools::flatten::{SheetTable, TYPE_HERE, nested_cell};
use crate::cloudaudit::tools::model::{
    ResourceKind, ResourceRecord, SourceTables, Table, json_type_name, scalar_text,
};
use crate::cloudaudit::tools::resolve::{GroupIndex, RecordIndex};
use crate::cloudaudit::tools::transform::{context, source, tag_cell};

pub const EC2_SHEET: &str = "EC2";
pub const ELB_SHEET: &str = "ELB";
pub const TARGET_GROUP_SHEET: &str = "Target Group";
pub const AUTO_SCALING_SHEET: &str = "Auto Scaling";

const ELB_COLUMNS: &[&str] = &[
    "Name",
    "DNS Name",
    "Type",
    "State Code",
    "Region",
    "Availability Zone",
    "Listener From",
    "Listener To",
    "Scheme",
    "Security Group",
    "Cross-Zone Load Balancing",
    "Access Logs",
    "Tag",
];

/// EC2 instances with their EBS volume sizes.
pub fn ec2_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        EC2_SHEET,
        &[
            "Name",
            "ID",
            "Instance State",
            "Region",
            "Availability Zone",
            "SEV",
            "Image ID",
            "Instance Type",
            "Vpc ID",
            "Subnet ID",
            "Private IP",
            "Root Device Type",
            "Security Groups",
            "Security Group Name",
            "Key Name",
            "Public IP",
            "Volume ID",
            "Volume Size(GB)",
            "IAM Role",
            "Tag",
        ],
    );
    let Some(instances) = source(sources, ResourceKind::Ec2Instance, "instance_id")? else {
        return Ok(sheet);
    };
    let volumes = context(sources, ResourceKind::EbsVolume, "volume_id")
        .map(|table| RecordIndex::by_column(table, "volume_id"))
        .unwrap_or_default();

    for instance in &instances.rows {
        let volume_ids = match instance
            .nested("block_device_mappings")
            .and_then(|value| attached_volume_ids(&value))
        {
            Ok(ids) => ids,
            Err(error) => {
                warn!(column = "block_device_mappings", %error, "malformed attribute, using placeholder");
                Vec::new()
            }
        };
        let volume_sizes: Vec<String> = volume_ids
            .iter()
            .map(|id| {
                volumes
                    .get(id)
                    .map(|volume| volume.text("size"))
                    .unwrap_or_else(|| "Unknown".to_string())
            })
            .collect();

        sheet.push(vec![
            instance.text("title"),
            instance.text("instance_id"),
            instance.text("instance_state"),
            instance.text("region"),
            instance.text("placement_availability_zone"),
            TYPE_HERE.to_string(),
            instance.text("image_id"),
            instance.text("instance_type"),
            instance.text("vpc_id"),
            instance.text("subnet_id"),
            instance.text("private_ip_address"),
            instance.text("root_device_type"),
            nested_cell(instance, "security_groups", "", |value| join_field(value, "GroupId", ", ")),
            nested_cell(instance, "security_groups", "", |value| join_field(value, "GroupName", ", ")),
            instance.text("key_name"),
            instance.text_or("public_ip_address", "None"),
            volume_ids.join("\n"),
            volume_sizes.join("\n"),
            arn_resource_name(&instance.text("iam_instance_profile_arn")),
            tag_cell(instance),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// EBS volume ids of a block device mapping list, in device order.
fn attached_volume_ids(mappings: &Value) -> std::result::Result<Vec<String>, FlattenError> {
    Ok(list_items(mappings)?
        .iter()
        .map(|device| lookup_path(device, &["Ebs", "VolumeId"]))
        .filter(|id| !id.is_empty())
        .collect())
}

/// Application load balancers followed by network load balancers, each block
/// sorted on its own.
pub fn elb_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(ELB_SHEET, ELB_COLUMNS);
    let listeners = context(sources, ResourceKind::LoadBalancerListener, "load_balancer_arn")
        .map(|table| GroupIndex::by_column(table, "load_balancer_arn"))
        .unwrap_or_default();

    for (kind, lb_type) in [
        (ResourceKind::Alb, "application"),
        (ResourceKind::Nlb, "network"),
    ] {
        if let Some(balancers) = source(sources, kind, "arn")? {
            sheet.extend(load_balancer_block(balancers, lb_type, &listeners));
        }
    }
    Ok(sheet)
}

fn load_balancer_block(balancers: &Table, lb_type: &str, listeners: &GroupIndex<'_>) -> SheetTable {
    let mut block = SheetTable::new(ELB_SHEET, ELB_COLUMNS);

    for balancer in &balancers.rows {
        let own_listeners = listeners.get(&balancer.text("arn"));
        let listener_from: Vec<String> = own_listeners
            .iter()
            .map(|listener| format!("{}:{}", listener.text("protocol"), listener.text("port")))
            .collect();
        let listener_to: Vec<String> = own_listeners
            .iter()
            .flat_map(|listener| forwarded_target_groups(listener))
            .collect();
        let zones = nested_cell(balancer, "availability_zones", "", |value| {
            Ok(sorted_unique(pluck(value, "ZoneName")?).join(", "))
        });

        block.push(vec![
            balancer.text("name"),
            balancer.text("dns_name"),
            lb_type.to_string(),
            balancer.text("state_code"),
            balancer.text("region"),
            zones,
            listener_from.join("\n"),
            listener_to.join("\n"),
            balancer.text("scheme"),
            nested_cell(balancer, "security_groups", "", |value| join_strings(value, ", ")),
            nested_cell(balancer, "load_balancer_attributes", "", |value| {
                attribute_enabled(value, "load_balancing.cross_zone.enabled")
            }),
            nested_cell(balancer, "load_balancer_attributes", "", |value| {
                attribute_enabled(value, "access_logs.s3.enabled")
            }),
            tag_cell(balancer),
        ]);
    }

    block.sort_descending_by("Name");
    block
}

/// Target-group names of a listener's forward actions. The name is the second
/// to last path segment of the target-group ARN.
fn forwarded_target_groups(listener: &ResourceRecord) -> Vec<String> {
    let actions = match listener.nested("default_actions") {
        Ok(actions) => actions,
        Err(error) => {
            warn!(column = "default_actions", %error, "ignoring malformed listener actions");
            return Vec::new();
        }
    };
    pluck(&actions, "TargetGroupArn")
        .unwrap_or_default()
        .into_iter()
        .filter_map(|arn| {
            let segments: Vec<&str> = arn.split('/').collect();
            segments
                .len()
                .checked_sub(2)
                .map(|index| segments[index].to_string())
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// `Yes` when the `[{Key, Value}]` attribute list enables `key`.
fn attribute_enabled(attributes: &Value, key: &str) -> std::result::Result<String, FlattenError> {
    let enabled = list_items(attributes)?.iter().any(|attribute| {
        lookup_path(attribute, &["Key"]) == key
            && lookup_path(attribute, &["Value"]).eq_ignore_ascii_case("true")
    });
    Ok(if enabled { "Yes" } else { "No" }.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct TargetHealthDescription {
    target: Option<TargetRef>,
    target_health: Option<TargetHealth>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct TargetRef {
    id: Option<String>,
    availability_zone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct TargetHealth {
    state: Option<String>,
}

fn decode_targets(value: &Value) -> std::result::Result<Vec<TargetHealthDescription>, FlattenError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => serde_json::from_value(value.clone())
            .map_err(|error| FlattenError::Unparseable(format!("target health list: {error}"))),
        other => Err(FlattenError::UnexpectedShape {
            expected: "target health list",
            found: json_type_name(other),
        }),
    }
}

/// Aggregated health of the registered targets.
fn health_summary(targets: &[TargetHealthDescription]) -> String {
    let states: Vec<&str> = targets
        .iter()
        .filter_map(|target| target.target_health.as_ref()?.state.as_deref())
        .collect();
    let summary = if states.is_empty() {
        "none"
    } else if states.iter().all(|state| *state == "healthy") {
        "healthy"
    } else if states.contains(&"unhealthy") {
        "partially unhealthy"
    } else {
        "unknown"
    };
    summary.to_string()
}

/// EC2 lookups used to place targets in availability zones.
struct Placement<'a> {
    by_instance: RecordIndex<'a>,
    by_private_ip: RecordIndex<'a>,
}

impl<'a> Placement<'a> {
    fn new(instances: Option<&'a Table>) -> Self {
        Self {
            by_instance: instances
                .map(|table| RecordIndex::by_column(table, "instance_id"))
                .unwrap_or_default(),
            by_private_ip: instances
                .map(|table| RecordIndex::by_column(table, "private_ip_address"))
                .unwrap_or_default(),
        }
    }

    /// Instance registered under a target id, which is either an instance id
    /// or a private IPv4 address.
    fn instance(&self, target_id: &str) -> Option<&'a ResourceRecord> {
        if target_id.parse::<Ipv4Addr>().is_ok() {
            self.by_private_ip.get(target_id)
        } else {
            self.by_instance.get(target_id)
        }
    }

    fn zone(&self, target_id: &str) -> Option<String> {
        self.instance(target_id)
            .map(|instance| instance.text("placement_availability_zone"))
            .filter(|zone| !zone.is_empty())
    }
}

/// Availability zone(s) the targets of a group run in.
fn target_zones(
    targets: &[TargetHealthDescription],
    placement: &Placement<'_>,
    groups: Option<&Table>,
) -> String {
    match targets {
        [single] => {
            let target = single.target.clone().unwrap_or_default();
            match target.availability_zone.as_deref() {
                Some("all") => "All".to_string(),
                Some(zone) => zone.to_string(),
                None => target
                    .id
                    .as_deref()
                    .and_then(|id| placement.zone(id))
                    .unwrap_or_else(|| TYPE_HERE.to_string()),
            }
        }
        [] => TYPE_HERE.to_string(),
        several => {
            let instance_ids: Vec<String> = several
                .iter()
                .filter_map(|target| target.target.as_ref()?.id.clone())
                .filter_map(|id| {
                    if id.parse::<Ipv4Addr>().is_ok() {
                        placement.instance(&id).map(|instance| instance.text("instance_id"))
                    } else {
                        Some(id)
                    }
                })
                .collect();
            let members: HashSet<&str> = instance_ids.iter().map(String::as_str).collect();

            let backed_by_group = groups.is_some_and(|groups| {
                groups.rows.iter().any(|group| {
                    let ids = group
                        .nested("instances")
                        .and_then(|value| pluck(&value, "InstanceId"))
                        .unwrap_or_default();
                    !ids.is_empty() && ids.iter().all(|id| members.contains(id.as_str()))
                })
            });
            if !backed_by_group {
                return TYPE_HERE.to_string();
            }

            let zones = sorted_unique(
                instance_ids
                    .iter()
                    .filter_map(|id| placement.by_instance.get(id))
                    .map(|instance| instance.text("placement_availability_zone"))
                    .filter(|zone| !zone.is_empty())
                    .collect(),
            );
            placeholder_if_empty(zones.join("\n"), TYPE_HERE)
        }
    }
}

/// Target groups with their health summary and inferred zones.
pub fn target_group_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        TARGET_GROUP_SHEET,
        &[
            "Name",
            "Protocol",
            "Target Type",
            "Load Balancer Arn",
            "VPC ID",
            "Healthy Threshold Count",
            "Unhealthy Threshold Count",
            "Health Check Enabled",
            "Health Check Interval Seconds",
            "Health Check Path",
            "Health Check Port",
            "Health Check Protocol",
            "Health Check Timeout Seconds",
            "Target Health States",
            "AZ",
        ],
    );
    let Some(target_groups) = source(sources, ResourceKind::TargetGroup, "target_group_name")? else {
        return Ok(sheet);
    };
    let placement = Placement::new(context(sources, ResourceKind::Ec2Instance, "instance_id"));
    let scaling_groups = sources.get(ResourceKind::AutoScalingGroup);

    for group in &target_groups.rows {
        let targets = group
            .nested("target_health_descriptions")
            .and_then(|value| decode_targets(&value));
        let (health, zones) = match targets {
            Ok(targets) => (
                health_summary(&targets),
                target_zones(&targets, &placement, scaling_groups),
            ),
            Err(error) => {
                warn!(column = "target_health_descriptions", %error, "malformed attribute, using placeholder");
                (String::new(), TYPE_HERE.to_string())
            }
        };

        sheet.push(vec![
            group.text("target_group_name"),
            group.text("protocol"),
            group.text("target_type"),
            nested_cell(group, "load_balancer_arns", "", |value| join_strings(value, ", ")),
            group.text("vpc_id"),
            group.text("healthy_threshold_count"),
            group.text("unhealthy_threshold_count"),
            group.text("health_check_enabled"),
            group.text("health_check_interval_seconds"),
            group.text("health_check_path"),
            group.text("health_check_port"),
            group.text("health_check_protocol"),
            group.text("health_check_timeout_seconds"),
            health,
            zones,
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

pub fn auto_scaling_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        AUTO_SCALING_SHEET,
        &[
            "Name",
            "Launch template/configuration",
            "Instances",
            "Desired Capacity",
            "Min",
            "Max",
            "AZ",
        ],
    );
    let Some(groups) = source(sources, ResourceKind::AutoScalingGroup, "name")? else {
        return Ok(sheet);
    };

    for group in &groups.rows {
        let template = group.text("launch_template_name");
        let launch = if !template.is_empty() {
            format!("{template} (Version: {})", group.text("launch_template_version"))
        } else {
            group.text("launch_configuration_name")
        };

        sheet.push(vec![
            group.text("name"),
            launch,
            nested_cell(group, "instances", "", render_instances),
            group.text("desired_capacity"),
            group.text("min_size"),
            group.text("max_size"),
            nested_cell(group, "availability_zones", "", |value| {
                let zones = list_items(value)?
                    .iter()
                    .map(scalar_text)
                    .collect();
                Ok(sorted_unique(zones).join("\n"))
            }),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// `id (state)` per instance object; no instances → `None`.
fn render_instances(value: &Value) -> std::result::Result<String, FlattenError> {
    let rendered: Vec<String> = list_items(value)?
        .iter()
        .filter(|instance| instance.is_object())
        .map(|instance| {
            format!(
                "{} ({})",
                lookup_path(instance, &["InstanceId"]),
                lookup_path(instance, &["LifecycleState"])
            )
        })
        .collect();
    Ok(placeholder_if_empty(rendered.join(", "), "None"))
}
