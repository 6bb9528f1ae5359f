use std::fs;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use chrono::NaiveDate;
use cloudaudit_tools::config::{InventoryConfig, SourceConfig};
use cloudaudit_tools::io::excel_read;
use cloudaudit_tools::sync;
use cloudaudit_tools::transform::SUMMARY_SHEET;
use tempfile::tempdir;

const VPC_CSV: &str = "Vpc ID,Title,Cidr Block\nvpc-1,main,10.0.0.0/16\n";

const SUBNET_CSV: &str = "Subnet ID,Title,Cidr Block,Availability Zone\n\
    subnet-a,app-a,10.0.1.0/24,eu-west-1a\n\
    subnet-b,app-b,10.0.2.0/24,eu-west-1b\n";

const ROUTE_TABLE_CSV: &str = r#"Route Table ID,Title,Associations
rtb-1,private,"[{""SubnetId"": ""subnet-a"", ""RouteTableId"": ""rtb-1"", ""RouteTableAssociationId"": ""rtbassoc-1""}]"
"#;

const IAM_USER_CSV: &str = r#"Name,Groups,Mfa Devices,Create Date,Password Last Used
alice,"[{""GroupName"": ""dev""}]","[{""UserName"": ""alice"", ""EnableDate"": ""2023-01-01"", ""SerialNumber"": ""arn:mfa""}]",2023-01-05T10:00:00Z,
"#;

fn write_exports(dir: &Path) {
    fs::write(dir.join("vpc.csv"), VPC_CSV).expect("vpc export");
    fs::write(dir.join("subnet.csv"), SUBNET_CSV).expect("subnet export");
    fs::write(dir.join("rt.csv"), ROUTE_TABLE_CSV).expect("route table export");
    fs::write(dir.join("iamuser.csv"), IAM_USER_CSV).expect("iam user export");
}

fn config(input: &Path, output: &Path) -> InventoryConfig {
    InventoryConfig::new(SourceConfig::CsvDirectory(input.to_path_buf()))
        .with_output_dir(output)
        .with_run_date(NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date"))
}

#[test]
fn csv_exports_become_an_audit_workbook() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("exports");
    fs::create_dir(&input).expect("input directory");
    write_exports(&input);

    let output_dir = temp_dir.path().join("file/download");
    let run = sync::run_inventory(&config(&input, &output_dir)).expect("inventory run");

    assert_eq!(run.output, output_dir.join("Inventory_240307.xlsx"));
    assert!(run.output.exists());

    let workbook: Xlsx<_> = open_workbook(&run.output).expect("workbook opens");
    assert_eq!(
        workbook.sheet_names().to_owned(),
        vec!["VPC", "Subnet", "IAM User", SUMMARY_SHEET]
    );

    let data = excel_read::read_workbook(&run.output).expect("Excel read");

    let vpc = data.table("VPC").expect("VPC sheet");
    assert_eq!(
        vpc.rows,
        vec![vec![
            "main",
            "vpc-1",
            "10.0.0.0/16",
            "None",
            "None",
            "None",
            "(Type Here)",
            "(Type Here)"
        ]]
    );

    let subnet = data.table("Subnet").expect("Subnet sheet");
    let route_table = subnet.column_index("Route Table ID").expect("route table column");
    let by_name: Vec<(&str, &str)> = subnet
        .rows
        .iter()
        .map(|row| (row[0].as_str(), row[route_table].as_str()))
        .collect();
    assert_eq!(by_name, vec![("app-b", ""), ("app-a", "rtb-1")]);

    let users = data.table("IAM User").expect("IAM User sheet");
    assert_eq!(
        users.rows,
        vec![vec!["alice", "dev", "Enabled", "2023-01-05 10:00:00", ""]]
    );
}

#[test]
fn absent_load_balancers_only_skip_the_elb_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    write_exports(temp_dir.path());

    let output_dir = temp_dir.path().join("out");
    let run = sync::run_inventory(&config(temp_dir.path(), &output_dir)).expect("inventory run");
    let data = excel_read::read_workbook(&run.output).expect("Excel read");

    assert!(data.table("ELB").is_none());
    let summary = data.table(SUMMARY_SHEET).expect("summary sheet");
    let elb = summary
        .rows
        .iter()
        .find(|row| row[0] == "ELB")
        .expect("ELB summary row");
    assert_eq!(elb, &vec!["ELB", "0", "skipped: missing input (alb, nlb)"]);
    let vpc = summary
        .rows
        .iter()
        .find(|row| row[0] == "VPC")
        .expect("VPC summary row");
    assert_eq!(vpc, &vec!["VPC", "1", "written"]);
}

#[test]
fn identical_inputs_produce_identical_workbooks() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("exports");
    fs::create_dir(&input).expect("input directory");
    write_exports(&input);

    let first = sync::run_inventory(&config(&input, &temp_dir.path().join("first")))
        .expect("first run");
    let second = sync::run_inventory(&config(&input, &temp_dir.path().join("second")))
        .expect("second run");

    assert_eq!(first.report, second.report);
    let diff = sync::diff_workbooks(&first.output, &second.output).expect("diff");
    assert!(diff.is_empty());
}

#[test]
fn diff_reports_new_resources() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("exports");
    fs::create_dir(&input).expect("input directory");
    write_exports(&input);
    let previous = sync::run_inventory(&config(&input, &temp_dir.path().join("previous")))
        .expect("previous run");

    fs::write(
        input.join("subnet.csv"),
        format!("{SUBNET_CSV}subnet-c,app-c,10.0.3.0/24,eu-west-1c\n"),
    )
    .expect("subnet export");
    let current = sync::run_inventory(&config(&input, &temp_dir.path().join("current")))
        .expect("current run");

    let diff = sync::diff_workbooks(&previous.output, &current.output).expect("diff");
    let sheets: Vec<&str> = diff.sheets.iter().map(|sheet| sheet.sheet.as_str()).collect();
    assert_eq!(sheets, vec!["Subnet", SUMMARY_SHEET]);
    assert_eq!(
        diff.sheets[0].only_in_current,
        vec![vec!["app-c", "subnet-c", "10.0.3.0/24", "eu-west-1c", "", "", "", ""]]
    );
    assert!(diff.sheets[0].only_in_previous.is_empty());
}

#[test]
fn missing_input_directory_is_an_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let result = sync::run_inventory(&config(&temp_dir.path().join("absent"), temp_dir.path()));

    assert!(matches!(
        result,
        Err(cloudaudit_tools::ToolError::MissingInput(_))
    ));
}
