use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use shipment_loader::config::LoaderConfig;
use shipment_loader::io::store::SqliteStore;
use shipment_loader::pipeline::{self, RunReport};
use shipment_loader::{LoaderError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    let config = cli.settings.resolve()?;

    match cli.command {
        Command::Load(args) => execute_load(&config, args),
        Command::Clear => execute_clear(&config),
    }
}

fn execute_load(config: &LoaderConfig, args: LoadArgs) -> Result<()> {
    let mut store = SqliteStore::open(&config.database)?;
    let report = pipeline::run(&mut store, config)?;
    store.close()?;

    print_report(&report, args.report)?;

    if args.strict && !report.is_clean() {
        return Err(LoaderError::StrictFailure {
            run_id: report.run_id.to_string(),
            summary: report.problems().join("; "),
        });
    }
    Ok(())
}

fn execute_clear(config: &LoaderConfig) -> Result<()> {
    let mut store = SqliteStore::open(&config.database)?;
    pipeline::clear(&mut store)?;
    store.close()
}

fn print_report(report: &RunReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => print!("{report}"),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| LoaderError::Logging(err.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Load shipment and product CSV files into a SQLite database."
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clear the tables, then run the product and shipment stages.
    Load(LoadArgs),
    /// Delete every product and shipment record.
    Clear,
}

#[derive(clap::Args)]
struct SettingsArgs {
    /// TOML file with loader settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory containing the stage input files.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// SQLite database file.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Input file name template; `{stage}` becomes the stage number.
    #[arg(long, global = true)]
    file_template: Option<String>,
}

#[derive(clap::Args)]
struct LoadArgs {
    /// Exit with an error when a stage aborts or any product is skipped.
    #[arg(long)]
    strict: bool,

    /// How to print the run report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

impl SettingsArgs {
    fn resolve(&self) -> Result<LoaderConfig> {
        let mut config = match &self.config {
            Some(path) => LoaderConfig::from_toml_file(path)?,
            None => LoaderConfig::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(template) = &self.file_template {
            config.file_template = template.clone();
        }
        config.validate()?;
        Ok(config)
    }
}
