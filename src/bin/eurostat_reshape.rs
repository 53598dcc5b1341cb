use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use eurostat_reshape::app::{App, RunOptions};
use eurostat_reshape::config::{ConfigLoader, ResolvedConfig};
use eurostat_reshape::domain::{Dataset, Selection};
use eurostat_reshape::error::ReshapeError;
use eurostat_reshape::fetch::EurostatHttpClient;
use eurostat_reshape::output::{OutputMode, ReportOutput};

#[derive(Parser)]
#[command(name = "eurostat-reshape")]
#[command(about = "Fetch Eurostat bulk tables and reshape them into long-format CSV")]
#[command(version)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    output_dir: Option<Utf8PathBuf>,

    #[arg(long, global = true)]
    cache_dir: Option<Utf8PathBuf>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Download, reshape and write datasets (default: all)")]
    Run(RunArgs),
    #[command(about = "Reshape an already decompressed TSV file")]
    Transform(TransformArgs),
}

#[derive(Args, Default)]
struct RunArgs {
    #[arg(value_enum)]
    selection: Option<Selection>,

    #[arg(long)]
    offline: bool,
}

#[derive(Args)]
struct TransformArgs {
    dataset: String,
    input: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ReshapeError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &ReshapeError) -> u8 {
    match error {
        ReshapeError::Http(_) | ReshapeError::HttpStatus { .. } => 3,
        ReshapeError::Decompress { .. } | ReshapeError::MissingCache(_) => 4,
        ReshapeError::TableRead { .. }
        | ReshapeError::MissingKeyColumn { .. }
        | ReshapeError::KeyTooShort { .. } => 5,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    apply_overrides(&mut config, cli.output_dir, cli.cache_dir);

    let client = EurostatHttpClient::new(config.timeout)?;
    let app = App::new(config, client);

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            let options = RunOptions {
                offline: args.offline,
            };
            let report = app.run(args.selection.unwrap_or_default(), options)?;
            ReportOutput::print_run(&report, mode).into_diagnostic()
        }
        Commands::Transform(args) => {
            let dataset: Dataset = args.dataset.parse()?;
            let report = app.transform_file(dataset, &args.input)?;
            ReportOutput::print_dataset(&report, mode).into_diagnostic()
        }
    }
}

fn apply_overrides(
    config: &mut ResolvedConfig,
    output_dir: Option<Utf8PathBuf>,
    cache_dir: Option<Utf8PathBuf>,
) {
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(dir) = cache_dir {
        config.cache_dir = dir;
    }
}
