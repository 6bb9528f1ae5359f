//! Per-resource-type sheet builders and the catalogue that orders them.
//!
//! Each builder reads the source tables it needs, resolves cross-resource
//! context and flattens every record into a [`SheetTable`]. The pipeline in
//! [`build_workbook`] decides which builders run, isolates their failures and
//! appends a summary sheet describing what happened to each entry.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cloudaudit::tools::error::{FlattenError, Result, ToolError};
use crate::cloudaudit::tools::flatten::attributes::{format_tags, placeholder_if_empty, tag_value};
use crate::cloudaudit::tools::flatten::{SheetTable, WorkbookData, cell};
use crate::cloudaudit::tools::model::{ResourceKind, ResourceRecord, SourceTables, Table};

pub mod compute;
pub mod data;
pub mod iam;
pub mod network;

/// Name of the trailing sheet that reports every catalogue entry.
pub const SUMMARY_SHEET: &str = "Summary";

/// Source tables a sheet cannot be built without.
#[derive(Debug, Clone, Copy)]
pub enum Requirement {
    /// Every listed kind must be present.
    All(&'static [ResourceKind]),
    /// At least one listed kind must be present.
    Any(&'static [ResourceKind]),
}

impl Requirement {
    /// Kinds that keep the requirement from being met.
    pub fn missing(&self, sources: &SourceTables) -> Vec<ResourceKind> {
        match self {
            Requirement::All(kinds) => kinds
                .iter()
                .copied()
                .filter(|kind| !sources.contains(*kind))
                .collect(),
            Requirement::Any(kinds) => {
                if kinds.iter().any(|kind| sources.contains(*kind)) {
                    Vec::new()
                } else {
                    kinds.to_vec()
                }
            }
        }
    }
}

/// One entry of the sheet catalogue.
#[derive(Debug, Clone, Copy)]
pub struct SheetSpec {
    pub name: &'static str,
    pub requires: Requirement,
    pub build: fn(&SourceTables) -> Result<SheetTable>,
}

/// Sheets in workbook order.
pub const CATALOGUE: &[SheetSpec] = &[
    SheetSpec {
        name: network::VPC_SHEET,
        requires: Requirement::All(&[ResourceKind::Vpc]),
        build: network::vpc_sheet,
    },
    SheetSpec {
        name: network::TGW_SHEET,
        requires: Requirement::All(&[ResourceKind::TransitGateway]),
        build: network::tgw_sheet,
    },
    SheetSpec {
        name: network::SUBNET_SHEET,
        requires: Requirement::All(&[ResourceKind::Subnet]),
        build: network::subnet_sheet,
    },
    SheetSpec {
        name: network::SECURITY_GROUP_SHEET,
        requires: Requirement::All(&[ResourceKind::SecurityGroup]),
        build: network::security_group_sheet,
    },
    SheetSpec {
        name: network::NETWORK_ACL_SHEET,
        requires: Requirement::All(&[ResourceKind::NetworkAcl]),
        build: network::network_acl_sheet,
    },
    SheetSpec {
        name: compute::EC2_SHEET,
        requires: Requirement::All(&[ResourceKind::Ec2Instance]),
        build: compute::ec2_sheet,
    },
    SheetSpec {
        name: compute::ELB_SHEET,
        requires: Requirement::Any(&[ResourceKind::Alb, ResourceKind::Nlb]),
        build: compute::elb_sheet,
    },
    SheetSpec {
        name: compute::TARGET_GROUP_SHEET,
        requires: Requirement::All(&[ResourceKind::TargetGroup]),
        build: compute::target_group_sheet,
    },
    SheetSpec {
        name: compute::AUTO_SCALING_SHEET,
        requires: Requirement::All(&[ResourceKind::AutoScalingGroup]),
        build: compute::auto_scaling_sheet,
    },
    SheetSpec {
        name: data::ELASTICACHE_SHEET,
        requires: Requirement::All(&[
            ResourceKind::ElastiCacheCluster,
            ResourceKind::ElastiCacheReplicationGroup,
        ]),
        build: data::elasticache_sheet,
    },
    SheetSpec {
        name: data::CLOUDFRONT_SHEET,
        requires: Requirement::All(&[ResourceKind::CloudFrontDistribution]),
        build: data::cloudfront_sheet,
    },
    SheetSpec {
        name: data::S3_SHEET,
        requires: Requirement::All(&[ResourceKind::S3Bucket]),
        build: data::s3_sheet,
    },
    SheetSpec {
        name: iam::IAM_GROUP_SHEET,
        requires: Requirement::All(&[ResourceKind::IamGroup]),
        build: iam::iam_group_sheet,
    },
    SheetSpec {
        name: iam::IAM_ROLE_SHEET,
        requires: Requirement::All(&[ResourceKind::IamRole]),
        build: iam::iam_role_sheet,
    },
    SheetSpec {
        name: iam::IAM_USER_SHEET,
        requires: Requirement::All(&[ResourceKind::IamUser]),
        build: iam::iam_user_sheet,
    },
    SheetSpec {
        name: data::RDS_SHEET,
        requires: Requirement::All(&[ResourceKind::RdsInstance, ResourceKind::RdsCluster]),
        build: data::rds_sheet,
    },
    SheetSpec {
        name: data::DOCDB_SHEET,
        requires: Requirement::All(&[ResourceKind::DocDbInstance, ResourceKind::DocDbCluster]),
        build: data::docdb_sheet,
    },
    SheetSpec {
        name: network::VPC_ENDPOINT_SHEET,
        requires: Requirement::All(&[ResourceKind::VpcEndpoint]),
        build: network::vpc_endpoint_sheet,
    },
    SheetSpec {
        name: network::PEERING_SHEET,
        requires: Requirement::All(&[ResourceKind::PeeringConnection]),
        build: network::peering_sheet,
    },
];

/// Why a catalogue sheet is not in the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A required source table is absent or empty.
    MissingInput(Vec<ResourceKind>),
    /// The builder ran but produced no rows.
    NoRows,
    /// The builder failed; the message is the error it returned.
    Failed(String),
}

impl SkipReason {
    fn describe(&self) -> String {
        match self {
            SkipReason::MissingInput(kinds) => {
                let keys: Vec<&str> = kinds.iter().map(|kind| kind.key()).collect();
                format!("skipped: missing input ({})", keys.join(", "))
            }
            SkipReason::NoRows => "skipped: no rows".to_string(),
            SkipReason::Failed(message) => format!("skipped: {message}"),
        }
    }
}

/// Result of one catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetStatus {
    Written { rows: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOutcome {
    pub sheet: &'static str,
    pub status: SheetStatus,
}

/// Workbook content plus the per-sheet outcomes of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryReport {
    pub workbook: WorkbookData,
    pub outcomes: Vec<SheetOutcome>,
}

impl InventoryReport {
    pub fn written(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, SheetStatus::Written { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, SheetStatus::Skipped(_)))
    }
}

/// Runs every catalogue entry against `sources` and assembles the workbook.
///
/// A sheet whose inputs are missing, whose builder fails or which ends up
/// without rows is left out; the run itself never fails here. The summary
/// sheet is always appended last.
pub fn build_workbook(sources: &SourceTables) -> InventoryReport {
    let mut workbook = WorkbookData::default();
    let mut outcomes = Vec::with_capacity(CATALOGUE.len());

    for spec in CATALOGUE {
        let status = match run_sheet(spec, sources) {
            Ok(table) => {
                let rows = table.rows.len();
                debug!(sheet = spec.name, rows, "sheet built");
                workbook.tables.push(table);
                SheetStatus::Written { rows }
            }
            Err(reason) => SheetStatus::Skipped(reason),
        };
        outcomes.push(SheetOutcome {
            sheet: spec.name,
            status,
        });
    }

    workbook.tables.push(summary_sheet(&outcomes));
    InventoryReport { workbook, outcomes }
}

fn run_sheet(spec: &SheetSpec, sources: &SourceTables) -> std::result::Result<SheetTable, SkipReason> {
    let missing = spec.requires.missing(sources);
    if !missing.is_empty() {
        info!(sheet = spec.name, ?missing, "skipping sheet, required input absent");
        return Err(SkipReason::MissingInput(missing));
    }

    match (spec.build)(sources) {
        Ok(table) if table.is_empty() => {
            info!(sheet = spec.name, "skipping sheet, no rows");
            Err(SkipReason::NoRows)
        }
        Ok(table) => Ok(table),
        Err(error) => {
            warn!(sheet = spec.name, %error, "sheet transform failed, omitting sheet");
            Err(SkipReason::Failed(error.to_string()))
        }
    }
}

/// Renders the outcome of every catalogue entry as a sheet.
pub fn summary_sheet(outcomes: &[SheetOutcome]) -> SheetTable {
    let mut sheet = SheetTable::new(SUMMARY_SHEET, &["Sheet", "Rows", "Status"]);
    for outcome in outcomes {
        let (rows, status) = match &outcome.status {
            SheetStatus::Written { rows } => (rows.to_string(), "written".to_string()),
            SheetStatus::Skipped(reason) => ("0".to_string(), reason.describe()),
        };
        sheet.push(vec![outcome.sheet.to_string(), rows, status]);
    }
    sheet
}

/// Fails with [`ToolError::MissingColumn`] unless `table` has `column`.
pub(crate) fn require_column(table: &Table, kind: ResourceKind, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(ToolError::MissingColumn {
            kind,
            column: column.to_string(),
        })
    }
}

/// Returns the table of `kind` after checking its identifier column, or
/// `None` when the table is absent.
pub(crate) fn source<'a>(
    sources: &'a SourceTables,
    kind: ResourceKind,
    id_column: &str,
) -> Result<Option<&'a Table>> {
    match sources.get(kind) {
        Some(table) => {
            require_column(table, kind, id_column)?;
            Ok(Some(table))
        }
        None => Ok(None),
    }
}

/// Returns an optional context table of `kind`. A table without its
/// identifier column is logged and treated as absent, so the sheet it only
/// enriches is still written.
pub(crate) fn context<'a>(
    sources: &'a SourceTables,
    kind: ResourceKind,
    id_column: &str,
) -> Option<&'a Table> {
    let table = sources.get(kind)?;
    if table.has_column(id_column) {
        Some(table)
    } else {
        warn!(kind = %kind, column = id_column, "ignoring context table without its identifier column");
        None
    }
}

/// Decodes the tag bag of a record, reading `tags` and falling back to the
/// raw `tags_src` list.
pub(crate) fn record_tags(record: &ResourceRecord) -> std::result::Result<Value, FlattenError> {
    let tags = record.nested("tags")?;
    if tags.is_null() {
        record.nested("tags_src")
    } else {
        Ok(tags)
    }
}

/// The record's tags rendered as `k: v` pairs.
pub(crate) fn tag_cell(record: &ResourceRecord) -> String {
    cell(record_tags(record).and_then(|tags| format_tags(&tags)), "-", "tags")
}

/// One tag value of the record, or `fallback` when it is absent.
pub(crate) fn tag_value_cell(record: &ResourceRecord, key: &str, fallback: &str) -> String {
    let value = record_tags(record)
        .and_then(|tags| tag_value(&tags, key))
        .map(|value| value.unwrap_or_default());
    placeholder_if_empty(cell(value, fallback, "tags"), fallback)
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::Value;

    use crate::cloudaudit::tools::model::{ResourceKind, ResourceRecord, SourceTables, Table};

    /// Builds a table from JSON objects.
    pub fn table(records: Vec<Value>) -> Table {
        Table::from_records(
            records
                .into_iter()
                .map(|value| match value {
                    Value::Object(map) => map.into_iter().collect::<ResourceRecord>(),
                    other => panic!("expected object, got {other}"),
                })
                .collect(),
        )
    }

    pub fn sources(tables: Vec<(ResourceKind, Vec<Value>)>) -> SourceTables {
        let mut sources = SourceTables::new();
        for (kind, records) in tables {
            sources.insert(kind, table(records));
        }
        sources
    }

    /// Values of one column of a sheet, top to bottom.
    pub fn column(sheet: &crate::cloudaudit::tools::flatten::SheetTable, name: &str) -> Vec<String> {
        let index = sheet
            .column_index(name)
            .unwrap_or_else(|| panic!("sheet '{}' has no column '{name}'", sheet.sheet_name));
        sheet.rows.iter().map(|row| row[index].clone()).collect()
    }
}
