//! IAM sheets: groups, roles and users.

use serde_json::Value;

use crate::cloudaudit::tools::error::{FlattenError, Result};
use crate::cloudaudit::tools::flatten::attributes::{list_items, naive_timestamp, pluck, sorted_unique};
use crate::cloudaudit::tools::flatten::policy::{policy_arns, trusted_entities};
use crate::cloudaudit::tools::flatten::{SheetTable, nested_cell};
use crate::cloudaudit::tools::model::{ResourceKind, SourceTables};
use crate::cloudaudit::tools::transform::source;

pub const IAM_GROUP_SHEET: &str = "IAM Group";
pub const IAM_ROLE_SHEET: &str = "IAM Role";
pub const IAM_USER_SHEET: &str = "IAM User";

const POLICY_COLUMN: &str = "Policy(arn:aws:iam::)";

/// Sorted unique values of one field across a list of objects.
fn sorted_names(value: &Value, field: &str) -> std::result::Result<String, FlattenError> {
    Ok(sorted_unique(pluck(value, field)?).join("\n"))
}

pub fn iam_group_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(IAM_GROUP_SHEET, &["Name", POLICY_COLUMN, "Users"]);
    let Some(groups) = source(sources, ResourceKind::IamGroup, "name")? else {
        return Ok(sheet);
    };

    for group in &groups.rows {
        sheet.push(vec![
            group.text("name"),
            nested_cell(group, "attached_policy_arns", "-", policy_arns),
            nested_cell(group, "users", "-", |value| sorted_names(value, "UserName")),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

pub fn iam_role_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        IAM_ROLE_SHEET,
        &[
            "Name",
            "Trusted Entities",
            POLICY_COLUMN,
            "Create Date",
            "Role Last Used Date",
        ],
    );
    let Some(roles) = source(sources, ResourceKind::IamRole, "name")? else {
        return Ok(sheet);
    };

    for role in &roles.rows {
        sheet.push(vec![
            role.text("name"),
            nested_cell(role, "assume_role_policy", "", trusted_entities),
            nested_cell(role, "attached_policy_arns", "-", policy_arns),
            naive_timestamp(&role.text("create_date")),
            naive_timestamp(&role.text("role_last_used_date")),
        ]);
    }

    sheet.sort_descending_by("Name");
    Ok(sheet)
}

/// `Enabled` when any device records who enabled it, when, and its serial.
fn mfa_status(devices: &Value) -> std::result::Result<String, FlattenError> {
    let enabled = list_items(devices)?.iter().any(|device| {
        ["UserName", "EnableDate", "SerialNumber"]
            .iter()
            .all(|field| device.get(field).is_some())
    });
    Ok(if enabled { "Enabled" } else { "Disabled" }.to_string())
}

pub fn iam_user_sheet(sources: &SourceTables) -> Result<SheetTable> {
    let mut sheet = SheetTable::new(
        IAM_USER_SHEET,
        &[
            "Name",
            "IAM Group",
            "MFA Device",
            "Create Date",
            "Password Last Used",
        ],
    );
    let Some(users) = source(sources, ResourceKind::IamUser, "name")? else {
        return Ok(sheet);
    };

    for user in &users.rows {
        sheet.push(vec![
            user.text("name"),
            nested_cell(user, "groups", "-", |value| sorted_names(value, "GroupName")),
            nested_cell(user, "mfa_devices", "-", mfa_status),
            naive_timestamp(&user.text("create_date")),
            naive_timestamp(&user.text("password_last_used")),
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
    fn group_users_are_sorted_and_unique() {
        let sources = sources(vec![(
            ResourceKind::IamGroup,
            vec![json!({
                "name": "admins",
                "attached_policy_arns": ["arn:aws:iam::aws:policy/AdministratorAccess"],
                "users": [{"UserName": "zoe"}, {"UserName": "amir"}, {"UserName": "zoe"}]
            })],
        )]);
        let sheet = iam_group_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, POLICY_COLUMN), vec!["aws:policy/AdministratorAccess"]);
        assert_eq!(column(&sheet, "Users"), vec!["amir\nzoe"]);
    }

    #[test]
    fn roles_list_trusted_entities_and_naive_dates() {
        let sources = sources(vec![(
            ResourceKind::IamRole,
            vec![json!({
                "name": "ec2-role",
                "assume_role_policy": "{\"Statement\": [{\"Principal\": {\"Service\": \"ec2.amazonaws.com\"}}]}",
                "create_date": "2023-01-05T10:00:00Z",
                "role_last_used_date": ""
            })],
        )]);
        let sheet = iam_role_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "Trusted Entities"), vec!["Service: ec2.amazonaws.com"]);
        assert_eq!(column(&sheet, POLICY_COLUMN), vec!["-"]);
        assert_eq!(column(&sheet, "Create Date"), vec!["2023-01-05 10:00:00"]);
        assert_eq!(column(&sheet, "Role Last Used Date"), vec![""]);
    }

    #[test]
    fn mfa_requires_a_complete_device_record() {
        let sources = sources(vec![(
            ResourceKind::IamUser,
            vec![
                json!({
                    "name": "alice",
                    "groups": [{"GroupName": "dev"}, {"GroupName": "admins"}],
                    "mfa_devices": [{"UserName": "alice", "EnableDate": "2023-01-01", "SerialNumber": "arn:mfa"}]
                }),
                json!({
                    "name": "bob",
                    "groups": [],
                    "mfa_devices": [{"UserName": "bob", "SerialNumber": "arn:mfa"}]
                }),
            ],
        )]);
        let sheet = iam_user_sheet(&sources).unwrap();

        assert_eq!(column(&sheet, "Name"), vec!["bob", "alice"]);
        assert_eq!(column(&sheet, "MFA Device"), vec!["Disabled", "Enabled"]);
        assert_eq!(column(&sheet, "IAM Group"), vec!["", "admins\ndev"]);
    }
}
