use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cloudaudit_tools::config::{
    DEFAULT_OUTPUT_DIR, DEFAULT_PREFIX, InventoryConfig, SourceConfig, parse_run_date,
};
use cloudaudit_tools::transform::SheetStatus;
use cloudaudit_tools::{Result, ToolError, sync};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build(args) => execute_build(args),
        Command::Diff(args) => execute_diff(args),
    }
}

fn execute_build(args: BuildArgs) -> Result<()> {
    let config = args.into_config()?;
    let run = sync::run_inventory(&config)?;

    for outcome in &run.report.outcomes {
        match &outcome.status {
            SheetStatus::Written { rows } => println!("{:<20} {rows:>6} rows", outcome.sheet),
            SheetStatus::Skipped(_) => println!("{:<20} {:>6}", outcome.sheet, "-"),
        }
    }
    println!("{}", run.output.display());
    Ok(())
}

fn execute_diff(args: DiffArgs) -> Result<()> {
    let diff = sync::diff_workbooks(&args.previous, &args.current)?;
    print!("{diff}");
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn AWS inventory exports into an audit workbook."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the inventory workbook from CSV exports or a database schema.
    Build(BuildArgs),
    /// Compare two inventory workbooks row by row.
    Diff(DiffArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Folder of CSV inventory exports.
    #[arg(long, conflicts_with = "database_url", required_unless_present = "database_url")]
    input_dir: Option<PathBuf>,

    /// Postgres connection URL of the inventory database.
    #[arg(long)]
    database_url: Option<String>,

    /// Schema holding the inventory tables.
    #[arg(long, default_value = "aws")]
    schema: String,

    /// Directory the workbook is written to.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// File name prefix of the workbook.
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Run date as YYMMDD; defaults to today.
    #[arg(long)]
    date: Option<String>,
}

impl BuildArgs {
    fn into_config(self) -> Result<InventoryConfig> {
        let source = match (self.input_dir, self.database_url) {
            (Some(dir), _) => SourceConfig::CsvDirectory(dir),
            (None, Some(url)) => SourceConfig::Database {
                url,
                schema: self.schema,
            },
            (None, None) => {
                return Err(ToolError::InvalidConfig(
                    "either --input-dir or --database-url is required".into(),
                ));
            }
        };

        let mut config = InventoryConfig::new(source)
            .with_output_dir(self.output_dir)
            .with_prefix(self.prefix);
        if let Some(date) = &self.date {
            config = config.with_run_date(parse_run_date(date)?);
        }
        Ok(config)
    }
}

#[derive(clap::Args)]
struct DiffArgs {
    /// Workbook of the earlier run.
    #[arg(long)]
    previous: PathBuf,

    /// Workbook of the later run.
    #[arg(long)]
    current: PathBuf,
}
