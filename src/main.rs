use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use gasdash::cli::chart::ChartArgs;
use gasdash::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List available tickers and COT columns
    Options,
    /// Compose the price and COT chart once
    Chart {
        /// First date shown (inclusive), YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date shown (exclusive), YYYY-MM-DD. Defaults to today
        #[arg(long)]
        to: Option<NaiveDate>,
        /// COT ticker. Defaults to the first one in the store
        #[arg(long)]
        ticker: Option<String>,
        /// COT column. Defaults to the first one in the store
        #[arg(long)]
        column: Option<String>,
        /// Write the chart JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Start an interactive session reading commands from stdin
    Session {
        /// Chart file rewritten after every change
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl From<Commands> for gasdash::AppCommand {
    fn from(cmd: Commands) -> gasdash::AppCommand {
        match cmd {
            Commands::Options => gasdash::AppCommand::Options,
            Commands::Chart {
                from,
                to,
                ticker,
                column,
                output,
            } => gasdash::AppCommand::Chart(ChartArgs {
                from,
                to,
                ticker,
                column,
                output,
            }),
            Commands::Session { output } => gasdash::AppCommand::Session { output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => gasdash::cli::setup::setup(),
        Some(cmd) => gasdash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
