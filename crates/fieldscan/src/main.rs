//! fieldscan command-line entry point

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use fieldscan::cli;
use fieldscan_logging::{init_logging, LogConfig};

#[derive(Parser, Debug)]
#[command(
    name = "fieldscan",
    version,
    about = "Read-only metadata inventory for field-research data trees"
)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inventory the selected categories and write one CSV per category
    Run(cli::run::RunArgs),

    /// Show the effective configuration
    Config(cli::config::ConfigArgs),
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => cli::run::run(args),
        Commands::Config(args) => cli::config::run(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "fieldscan",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::FAILURE
        }
    }
}
