//! Network sheets: VPCs, transit gateways, subnets, security groups, network
//! ACLs, VPC endpoints and peering connections.

use serde_json::Value;
use tracing::warn;

use crate::cloudaudit::tools::error::Result;
use crate::cloudaudit::tools::flatten::attributes::{
    join_field, join_strings, list_items, lookup_path, placeholder_if_empty, unique_in_order,
};
use crate::cloudaudit::tools::flatten::rules::{flatten_acl_entries, flatten_permissions};
use crate::cloudaudit::tools::flatten::{SheetTable, TYPE_HERE, nested_cell};
use crate::cloudaudit::tools::model::{ResourceKind, ResourceRecord, SourceTables, scalar_text};
use crate::cloudaudit::tools::resolve::{AssociationIndex, AssociationSpec, GroupIndex};
use crate::cloudaudit::tools::transform::{context, source, tag_value_cell};

pub const VPC_SHEET: &str = "VPC";
pub const TGW_SHEET: &str = "TGW";
pub const SUBNET_SHEET: &str = "Subnet";
pub const SECURITY_GROUP_SHEET: &str = "Security Groups";
pub const NETWORK_ACL_SHEET: &str = "Network ACLs";
pub const VPC_ENDPOINT_SHEET: &str = "VPC Endpoint";
pub const PEERING_SHEET: &str = "Peering Connection";

const NONE: &str = "None";

const ROUTE_TABLE_ASSOCIATIONS: AssociationSpec = AssociationSpec {
    list_column: "associations",
    child_field: "SubnetId",
    parent_field: "RouteTableId",
    title_field: "RouteTableAssociationId",
    parent_id_column: "route_table_id",
};

const NETWORK_ACL_ASSOCIATIONS: AssociationSpec = AssociationSpec {
    list_column: "associations",
    child_field: "SubnetId",
    parent_field: "NetworkAclId",
    title_field: "NetworkAclAssociationId",
    parent_id_column: "network_acl_id",
};

/// VPCs with their attached internet gateways and NAT gateways.
pub fn vpc_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        VPC_SHEET,
        &[
            "Name",
            "ID",
            "VPC CIDR Block",
            "NAT Gateway",
            "Internet Gateways Name",
            "Internet Gateways ID",
            "DNS Resolution",
            "DNS Hostname",
        ],
    );
    let Some(vpcs) = source(sources, ResourceKind::Vpc, "vpc_id")? else {
        return Ok(sheet);
    };
    let gateways = context(sources, ResourceKind::InternetGateway, "internet_gateway_id")
        .map(|table| GroupIndex::by_key(table, attached_vpc_id))
        .unwrap_or_default();
    let nat_gateways = context(sources, ResourceKind::NatGateway, "nat_gateway_id")
        .map(|table| GroupIndex::by_column(table, "vpc_id"))
        .unwrap_or_default();

    let mut seen = Vec::new();
    for vpc in &vpcs.rows {
        let vpc_id = vpc.text("vpc_id");
        if seen.contains(&vpc_id) {
            continue;
        }
        seen.push(vpc_id.clone());

        let attached = gateways.get(&vpc_id);
        let gateway_ids = unique_in_order(attached.iter().map(|igw| igw.text("internet_gateway_id")));
        let gateway_name = attached
            .first()
            .map(|igw| igw.text("title"))
            .unwrap_or_default();
        let nat_ids = unique_in_order(
            nat_gateways
                .get(&vpc_id)
                .iter()
                .map(|ngw| ngw.text("nat_gateway_id")),
        );

        sheet.push(vec![
            vpc.text("title"),
            vpc_id,
            vpc.text("cidr_block"),
            placeholder_if_empty(nat_ids.join(", "), NONE),
            placeholder_if_empty(gateway_name, NONE),
            placeholder_if_empty(gateway_ids.join(", "), NONE),
            TYPE_HERE.to_string(),
            TYPE_HERE.to_string(),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// VPC of an internet gateway's first attachment.
fn attached_vpc_id(gateway: &ResourceRecord) -> String {
    match gateway.nested("attachments") {
        Ok(attachments) => list_items(&attachments)
            .ok()
            .and_then(|items| items.first())
            .map(|first| lookup_path(first, &["VpcId"]))
            .unwrap_or_default(),
        Err(error) => {
            warn!(column = "attachments", %error, "ignoring malformed gateway attachments");
            String::new()
        }
    }
}

pub fn tgw_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        TGW_SHEET,
        &[
            "Name",
            "ID",
            "State",
            "Region",
            "Default Association Route Table",
            "Default Propagation Route Table",
            "Transit Gateway CIDR Blocks",
            "Association Route Table ID",
            "Propagation Route Table ID",
            "Multicast Support",
            "DNS Support",
            "Auto Accept Shared Attachments",
            "VPN ECMP Support",
        ],
    );
    let Some(gateways) = source(sources, ResourceKind::TransitGateway, "transit_gateway_id")? else {
        return Ok(sheet);
    };

    for tgw in &gateways.rows {
        let cidr_blocks = nested_cell(tgw, "cidr_blocks", NONE, |value| match value {
            Value::Array(_) => join_strings(value, ", "),
            other => Ok(scalar_text(other)),
        });
        sheet.push(vec![
            tgw.text("title"),
            tgw.text("transit_gateway_id"),
            tgw.text("state"),
            tgw.text("region"),
            tgw.text("default_route_table_association"),
            tgw.text("default_route_table_propagation"),
            placeholder_if_empty(cidr_blocks, NONE),
            tgw.text_or("association_default_route_table_id", NONE),
            tgw.text_or("propagation_default_route_table_id", NONE),
            tgw.text("multicast_support"),
            tgw.text("dns_support"),
            tgw.text("auto_accept_shared_attachments"),
            tgw.text("vpn_ecmp_support"),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// Subnets with the route table and network ACL each is associated with.
pub fn subnet_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        SUBNET_SHEET,
        &[
            "Name",
            "ID",
            "Subnet CIDR Block",
            "Availability Zone",
            "Route Table ID",
            "Route Table Name",
            "Network ACL ID",
            "Network ACL Name",
        ],
    );
    let Some(subnets) = source(sources, ResourceKind::Subnet, "subnet_id")? else {
        return Ok(sheet);
    };
    let route_tables = sources
        .get(ResourceKind::RouteTable)
        .map(|table| AssociationIndex::build(table, &ROUTE_TABLE_ASSOCIATIONS))
        .unwrap_or_default();
    let network_acls = sources
        .get(ResourceKind::NetworkAcl)
        .map(|table| AssociationIndex::build(table, &NETWORK_ACL_ASSOCIATIONS))
        .unwrap_or_default();

    for subnet in &subnets.rows {
        let subnet_id = subnet.text("subnet_id");
        sheet.push(vec![
            subnet.text("title"),
            subnet_id.clone(),
            subnet.text("cidr_block"),
            subnet.text("availability_zone"),
            route_tables.parent_id(&subnet_id).to_string(),
            route_tables.title(&subnet_id).to_string(),
            network_acls.parent_id(&subnet_id).to_string(),
            network_acls.title(&subnet_id).to_string(),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// One row per inbound or outbound permission of every security group.
pub fn security_group_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        SECURITY_GROUP_SHEET,
        &[
            "Name",
            "Security Group Name",
            "Group ID",
            "Rule ID",
            "Region",
            "Protocol",
            "Port Range",
            "Source/Destination",
            "Direction",
            "Description",
            "Comments",
        ],
    );
    let Some(groups) = source(sources, ResourceKind::SecurityGroup, "group_id")? else {
        return Ok(sheet);
    };
    let rule_ids = sources
        .get(ResourceKind::SecurityGroupRule)
        .map(|rules| {
            AssociationIndex::from_pairs(rules.rows.iter().map(|rule| {
                let direction = if rule.flag("is_egress") { "Outbound" } else { "Inbound" };
                (
                    format!("{}-{direction}", rule.text("group_id")),
                    rule.text("security_group_rule_id"),
                )
            }))
        })
        .unwrap_or_default();

    for group in &groups.rows {
        let name = tag_value_cell(group, "Name", "-");
        let group_name = group.text("group_name");
        let group_id = group.text("group_id");

        for (column, direction) in [("ip_permissions", "Inbound"), ("ip_permissions_egress", "Outbound")] {
            let permissions = match group.nested(column).and_then(|value| flatten_permissions(&value)) {
                Ok(permissions) => permissions,
                Err(error) => {
                    warn!(%group_id, column, %error, "skipping malformed permissions");
                    continue;
                }
            };
            let rule_id = placeholder_if_empty(
                rule_ids.parent_id(&format!("{group_id}-{direction}")).to_string(),
                "-",
            );

            for permission in permissions {
                let comments = rule_comments(&permission.protocol, &permission.source, &name, &group_name);
                sheet.push(vec![
                    name.clone(),
                    group_name.clone(),
                    group_id.clone(),
                    rule_id.clone(),
                    group.text("region"),
                    permission.protocol,
                    permission.port_range,
                    permission.source,
                    direction.to_string(),
                    permission.description,
                    comments,
                ]);
            }
        }
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// Audit remarks for one permission.
fn rule_comments(protocol: &str, source: &str, name: &str, group_name: &str) -> String {
    let mut comments = String::new();
    if source == "0.0.0.0/0" {
        comments.push_str("All IPs are open");
    }
    if protocol == "All" {
        if comments.is_empty() {
            comments.push_str("All ports are open\n");
        } else {
            comments.push_str(" and all ports are open\n");
        }
    }
    if name == "-" {
        if comments.is_empty() {
            comments.push_str("No security group name");
        } else {
            comments.push_str(", No security group name");
        }
    }
    if group_name.eq_ignore_ascii_case("default") {
        if comments.is_empty() {
            comments.push_str("Default Security Group has rules\n");
        } else {
            comments.push_str(" and Default Security Group has rules\n");
        }
    }
    comments.trim_end_matches('\n').to_string()
}

/// One row per entry of every network ACL.
pub fn network_acl_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        NETWORK_ACL_SHEET,
        &[
            "Name",
            "ID",
            "VPC ID",
            "Region",
            "Direction",
            "Rule",
            "Type",
            "Protocol",
            "Port Range",
            "Source",
            "Allow / Deny",
        ],
    );
    let Some(acls) = source(sources, ResourceKind::NetworkAcl, "network_acl_id")? else {
        return Ok(sheet);
    };

    for acl in &acls.rows {
        let acl_id = acl.text("network_acl_id");
        let title = acl.text("title");
        let name = if title == acl_id { "-".to_string() } else { title };

        let entries = match acl.nested("entries").and_then(|value| flatten_acl_entries(&value)) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(network_acl_id = %acl_id, %error, "skipping malformed ACL entries");
                continue;
            }
        };
        for entry in entries {
            sheet.push(vec![
                name.clone(),
                acl_id.clone(),
                acl.text("vpc_id"),
                acl.text("region"),
                entry.direction.to_string(),
                entry.rule,
                entry.traffic_type.to_string(),
                entry.protocol,
                entry.port_range,
                entry.source,
                entry.action,
            ]);
        }
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

pub fn vpc_endpoint_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        VPC_ENDPOINT_SHEET,
        &[
            "Name",
            "ID",
            "VPC ID",
            "Service Name",
            "Type",
            "Route Table",
            "Subnet (Interface)",
            "Security Group (Interface)",
            "Terraform",
        ],
    );
    let Some(endpoints) = source(sources, ResourceKind::VpcEndpoint, "vpc_endpoint_id")? else {
        return Ok(sheet);
    };

    for endpoint in &endpoints.rows {
        let route_tables = nested_cell(endpoint, "route_table_ids", NONE, |value| join_strings(value, ", "));
        let subnets = nested_cell(endpoint, "subnet_ids", NONE, |value| join_strings(value, ", "));
        let groups = nested_cell(endpoint, "groups", NONE, |value| join_field(value, "GroupName", ", "));
        let terraform = if tag_value_cell(endpoint, "Terraform", "") == "True" {
            "Yes"
        } else {
            "No"
        };

        sheet.push(vec![
            endpoint.text("title"),
            endpoint.text("vpc_endpoint_id"),
            endpoint.text("vpc_id"),
            endpoint.text("service_name"),
            endpoint.text("vpc_endpoint_type"),
            placeholder_if_empty(route_tables, NONE),
            placeholder_if_empty(subnets, NONE),
            placeholder_if_empty(groups, NONE),
            terraform.to_string(),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

pub fn peering_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        PEERING_SHEET,
        &[
            "Name",
            "ID",
            "State",
            "Requester VPC",
            "Accepter VPC",
            "Requester CIDRs",
            "Accepter CIDRs",
            "Requester owner ID",
            "Accepter owner ID",
            "Requester Region",
            "Accepter Region",
        ],
    );
    let Some(connections) = source(sources, ResourceKind::PeeringConnection, "id")? else {
        return Ok(sheet);
    };

    for connection in &connections.rows {
        let cidrs = |column: &str| {
            let joined = nested_cell(connection, column, NONE, |value| join_field(value, "CidrBlock", ", "));
            placeholder_if_empty(joined, NONE)
        };
        sheet.push(vec![
            connection.text("title"),
            connection.text("id"),
            connection.text("status_code"),
            connection.text("requester_vpc_id"),
            connection.text("accepter_vpc_id"),
            cidrs("requester_cidr_block_set"),
            cidrs("accepter_cidr_block_set"),
            connection.text("requester_owner_id"),
            connection.text("accepter_owner_id"),
            connection.text("requester_region"),
            connection.text("accepter_region"),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudaudit::tools::transform::test_support::{column, sources};
    use serde_json::json;

    #[test]
    fn vpc_rows_collect_gateways_once_per_vpc() {
        let sources = sources(vec![
            (
                ResourceKind::Vpc,
                vec![
                    json!({"vpc_id": "vpc-1", "title": "alpha", "cidr_block": "10.0.0.0/16"}),
                    json!({"vpc_id": "vpc-2", "title": "beta", "cidr_block": "10.1.0.0/16"}),
                ],
            ),
            (
                ResourceKind::InternetGateway,
                vec![json!({
                    "internet_gateway_id": "igw-1",
                    "title": "edge",
                    "attachments": "[{'State': 'available', 'VpcId': 'vpc-1'}]"
                })],
            ),
            (
                ResourceKind::NatGateway,
                vec![
                    json!({"nat_gateway_id": "nat-1", "vpc_id": "vpc-1"}),
                    json!({"nat_gateway_id": "nat-2", "vpc_id": "vpc-1"}),
                    json!({"nat_gateway_id": "nat-1", "vpc_id": "vpc-1"}),
                ],
            ),
        ]);
        let sheet = vpc_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "Name"), vec!["beta", "alpha"]);
        assert_eq!(column(&sheet, "NAT Gateway"), vec!["None", "nat-1, nat-2"]);
        assert_eq!(column(&sheet, "Internet Gateways ID"), vec!["None", "igw-1"]);
        assert_eq!(column(&sheet, "Internet Gateways Name"), vec!["None", "edge"]);
        assert_eq!(column(&sheet, "DNS Resolution"), vec![TYPE_HERE, TYPE_HERE]);
    }

    #[test]
    fn subnets_resolve_route_tables_and_acls() {
        let sources = sources(vec![
            (
                ResourceKind::Subnet,
                vec![
                    json!({"subnet_id": "subnet-a", "title": "app-a", "cidr_block": "10.0.1.0/24"}),
                    json!({"subnet_id": "subnet-b", "title": "app-b", "cidr_block": "10.0.2.0/24"}),
                ],
            ),
            (
                ResourceKind::RouteTable,
                vec![json!({
                    "route_table_id": "rtb-1",
                    "associations": [{
                        "SubnetId": "subnet-a",
                        "RouteTableId": "rtb-1",
                        "RouteTableAssociationId": "rtbassoc-1"
                    }]
                })],
            ),
            (
                ResourceKind::NetworkAcl,
                vec![json!({
                    "network_acl_id": "acl-1",
                    "associations": [
                        {"SubnetId": "subnet-a", "NetworkAclId": "acl-1", "NetworkAclAssociationId": "aclassoc-1"},
                        {"SubnetId": "subnet-b", "NetworkAclId": "acl-1", "NetworkAclAssociationId": "aclassoc-2"}
                    ]
                })],
            ),
        ]);
        let sheet = subnet_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "ID"), vec!["subnet-b", "subnet-a"]);
        assert_eq!(column(&sheet, "Route Table ID"), vec!["", "rtb-1"]);
        assert_eq!(column(&sheet, "Route Table Name"), vec!["", "rtbassoc-1"]);
        assert_eq!(column(&sheet, "Network ACL ID"), vec!["acl-1", "acl-1"]);
        assert_eq!(column(&sheet, "Network ACL Name"), vec!["aclassoc-2", "aclassoc-1"]);
    }

    #[test]
    fn security_group_permissions_become_rows_with_comments() {
        let sources = sources(vec![
            (
                ResourceKind::SecurityGroup,
                vec![json!({
                    "group_id": "sg-1",
                    "group_name": "default",
                    "region": "ap-northeast-2",
                    "tags": {},
                    "ip_permissions": [{
                        "IpProtocol": "-1",
                        "IpRanges": [{"CidrIp": "0.0.0.0/0"}]
                    }],
                    "ip_permissions_egress": [{
                        "IpProtocol": "tcp",
                        "FromPort": 443,
                        "ToPort": 443,
                        "IpRanges": [{"CidrIp": "10.0.0.0/8", "Description": "internal"}]
                    }]
                })],
            ),
            (
                ResourceKind::SecurityGroupRule,
                vec![
                    json!({"group_id": "sg-1", "is_egress": false, "security_group_rule_id": "sgr-in"}),
                    json!({"group_id": "sg-1", "is_egress": "True", "security_group_rule_id": "sgr-out"}),
                ],
            ),
        ]);
        let sheet = security_group_sheet(&sources).unwrap();

        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(column(&sheet, "Rule ID"), vec!["sgr-in", "sgr-out"]);
        assert_eq!(column(&sheet, "Protocol"), vec!["All", "tcp"]);
        assert_eq!(column(&sheet, "Port Range"), vec!["-", "443"]);
        assert_eq!(column(&sheet, "Direction"), vec!["Inbound", "Outbound"]);
        assert_eq!(column(&sheet, "Description"), vec!["-", "internal"]);
        assert_eq!(
            column(&sheet, "Comments"),
            vec![
                "All IPs are open and all ports are open\n, No security group name and Default Security Group has rules",
                "No security group name and Default Security Group has rules",
            ]
        );
    }

    #[test]
    fn named_group_without_open_rules_has_no_comment() {
        assert_eq!(rule_comments("tcp", "10.0.0.0/8", "web", "web-sg"), "");
        assert_eq!(rule_comments("All", "10.0.0.0/8", "web", "web-sg"), "All ports are open");
    }

    #[test]
    fn acl_rows_hide_titles_that_repeat_the_id() {
        let sources = sources(vec![(
            ResourceKind::NetworkAcl,
            vec![json!({
                "network_acl_id": "acl-1",
                "title": "acl-1",
                "vpc_id": "vpc-1",
                "region": "us-east-1",
                "entries": [
                    {"Egress": false, "Protocol": "6", "PortRange": {"From": 22, "To": 22},
                     "CidrBlock": "10.0.0.0/8", "RuleAction": "allow", "RuleNumber": 100},
                    {"Egress": false, "Protocol": "-1", "CidrBlock": "0.0.0.0/0",
                     "RuleAction": "deny", "RuleNumber": 32767}
                ]
            })],
        )]);
        let sheet = network_acl_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "Name"), vec!["-", "-"]);
        assert_eq!(column(&sheet, "Rule"), vec!["100", "*"]);
        assert_eq!(column(&sheet, "Port Range"), vec!["22", "All"]);
        assert_eq!(column(&sheet, "Allow / Deny"), vec!["Allow", "Deny"]);
    }

    #[test]
    fn endpoints_and_peering_render_none_for_missing_lists() {
        let sources = sources(vec![
            (
                ResourceKind::VpcEndpoint,
                vec![json!({
                    "vpc_endpoint_id": "vpce-1",
                    "title": "s3",
                    "vpc_endpoint_type": "Gateway",
                    "route_table_ids": ["rtb-1", "rtb-2"],
                    "subnet_ids": [],
                    "tags_src": [{"Key": "Terraform", "Value": "True"}]
                })],
            ),
            (
                ResourceKind::PeeringConnection,
                vec![json!({
                    "id": "pcx-1",
                    "title": "peer",
                    "requester_cidr_block_set": [{"CidrBlock": "10.0.0.0/16"}, {"CidrBlock": "10.2.0.0/16"}]
                })],
            ),
        ]);

        let endpoints = vpc_endpoint_sheet(&sources).unwrap();
        assert_eq!(column(&endpoints, "Route Table"), vec!["rtb-1, rtb-2"]);
        assert_eq!(column(&endpoints, "Subnet (Interface)"), vec!["None"]);
        assert_eq!(column(&endpoints, "Security Group (Interface)"), vec!["None"]);
        assert_eq!(column(&endpoints, "Terraform"), vec!["Yes"]);

        let peering = peering_sheet(&sources).unwrap();
        assert_eq!(column(&peering, "Requester CIDRs"), vec!["10.0.0.0/16, 10.2.0.0/16"]);
        assert_eq!(column(&peering, "Accepter CIDRs"), vec!["None"]);
    }
}
