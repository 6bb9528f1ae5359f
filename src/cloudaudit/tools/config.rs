//! Run configuration, built once from command-line arguments and passed to
//! the pipeline explicitly.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::cloudaudit::tools::error::{Result, ToolError};

pub const DEFAULT_OUTPUT_DIR: &str = "file/download";
pub const DEFAULT_PREFIX: &str = "Inventory";

/// Where the inventory tables come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// A folder of CSV exports.
    CsvDirectory(PathBuf),
    /// A Postgres schema holding one table per resource kind.
    Database { url: String, schema: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    pub source: SourceConfig,
    pub output_dir: PathBuf,
    pub prefix: String,
    pub run_date: NaiveDate,
}

impl InventoryConfig {
    /// Configuration with the default output directory, prefix and today's date.
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prefix: DEFAULT_PREFIX.to_string(),
            run_date: Local::now().date_naive(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = run_date;
        self
    }

    /// `<output_dir>/<prefix>_<YYMMDD>.xlsx`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.xlsx",
            self.prefix,
            self.run_date.format("%y%m%d")
        ))
    }

    /// Rejects settings that would only fail later, half way through a run.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(ToolError::InvalidConfig("output prefix is empty".into()));
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(ToolError::InvalidConfig(format!(
                "output prefix '{}' contains a path separator",
                self.prefix
            )));
        }

        match &self.source {
            SourceConfig::CsvDirectory(dir) => {
                if !dir.is_dir() {
                    return Err(ToolError::MissingInput(dir.clone()));
                }
            }
            SourceConfig::Database { url, schema } => {
                if url.trim().is_empty() {
                    return Err(ToolError::InvalidConfig("database URL is empty".into()));
                }
                if !is_plain_identifier(schema) {
                    return Err(ToolError::InvalidConfig(format!(
                        "schema '{schema}' is not a plain identifier"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parses a `YYMMDD` run date as printed in output file names.
pub fn parse_run_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%y%m%d")
        .map_err(|error| ToolError::InvalidConfig(format!("run date '{text}': {error}")))
}

/// Letters, digits and underscores, not starting with a digit.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn output_path_uses_prefix_and_short_date() {
        let config = InventoryConfig::new(SourceConfig::CsvDirectory("in".into()))
            .with_output_dir("out")
            .with_run_date(date(2024, 3, 7));

        assert_eq!(config.output_path(), PathBuf::from("out/Inventory_240307.xlsx"));
        assert_eq!(
            config.with_prefix("Audit").output_path(),
            PathBuf::from("out/Audit_240307.xlsx")
        );
    }

    #[test]
    fn run_date_round_trips_through_the_file_name_format() {
        assert_eq!(parse_run_date("240307").expect("date"), date(2024, 3, 7));
        assert!(matches!(parse_run_date("2024-03-07"), Err(ToolError::InvalidConfig(_))));
    }

    #[test]
    fn schema_names_must_be_plain_identifiers() {
        assert!(is_plain_identifier("aws_inventory"));
        assert!(is_plain_identifier("_raw2"));
        assert!(!is_plain_identifier("2024"));
        assert!(!is_plain_identifier("public; drop table x"));
        assert!(!is_plain_identifier(""));
    }

    #[test]
    fn validation_checks_the_source() {
        let dir = tempdir().expect("temporary directory");
        let valid = InventoryConfig::new(SourceConfig::CsvDirectory(dir.path().to_path_buf()));
        assert!(valid.validate().is_ok());

        let missing = InventoryConfig::new(SourceConfig::CsvDirectory(dir.path().join("absent")));
        assert!(matches!(missing.validate(), Err(ToolError::MissingInput(_))));

        let database = InventoryConfig::new(SourceConfig::Database {
            url: "postgres://localhost/steampipe".into(),
            schema: "aws-prod".into(),
        });
        assert!(matches!(database.validate(), Err(ToolError::InvalidConfig(_))));

        let bad_prefix = valid.with_prefix("../escape");
        assert!(matches!(bad_prefix.validate(), Err(ToolError::InvalidConfig(_))));
    }
}
