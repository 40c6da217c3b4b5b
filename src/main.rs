use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zenhub_export::config::{ExportArgs, RunConfig, load_settings};
use zenhub_export::error::{ErrorKind, ExportError};
use zenhub_export::export::run_export;
use zenhub_export::types::COLUMNS;

#[derive(Parser)]
#[command(
    name = "zenhub-export",
    version,
    about = "Export GitHub issues with ZenHub board data to a spreadsheet"
)]
struct Cli {
    /// Path to a settings file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log progress (-v) or every request (-vv) to stderr.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the issues of one repository.
    Export(ExportArgs),
    /// List the columns of the exported sheet, in order.
    Columns,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn export(cli_config: Option<PathBuf>, args: &ExportArgs) -> Result<(), ExportError> {
    let settings = load_settings(cli_config.as_deref())?;
    let config = RunConfig::resolve(args, |var| std::env::var(var).ok())?;
    tracing::debug!(?config, "resolved run configuration");

    let summary = run_export(&config, &settings).await?;
    println!(
        "Wrote {} issue(s) from {} to {}",
        summary.rows,
        config.repo,
        summary.path.display()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Columns => {
            for column in COLUMNS {
                println!("{}", column.header());
            }
            ExitCode::SUCCESS
        }
        Commands::Export(args) => match export(cli.config, &args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                let kind: ErrorKind = err.kind();
                // `{:#}` prints the whole source chain on one line.
                eprintln!("error: {:#}", anyhow::Error::new(err));
                ExitCode::from(kind.exit_code())
            }
        },
    }
}
