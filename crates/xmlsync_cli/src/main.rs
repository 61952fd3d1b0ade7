//! XmlSync CLI
//!
//! Keeps a database table and an XML record file in step.
//!
//! # Commands
//!
//! - `export <file>` - Write every table row to the file
//! - `sync <file>` - Make the table hold exactly the file's records

mod commands;
mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use xmlsync_engine::{AppConfig, DEFAULT_CONFIG_FILE};

/// Reconcile a database table with an XML record file.
#[derive(Parser)]
#[command(name = "xmlsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file with the database settings
    #[arg(global = true, short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the table to an XML file, replacing it
    Export {
        /// XML file to write
        file: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Synchronize the table with an XML file; the file wins
    Sync {
        /// XML file to read
        file: PathBuf,

        /// Compute the changes, then roll them back
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// How reports are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Configuration is needed before logging can be set up, so a bad
    // config file is only reported on stderr.
    let config = AppConfig::load(&cli.config)?;
    logging::init(cli.verbose, config.log_file.as_deref())?;
    tracing::debug!(config = %cli.config.display(), "starting");

    match cli.command {
        Commands::Export { file, format } => {
            commands::export::run(&config, &cli.config, &file, format)?;
        }
        Commands::Sync {
            file,
            dry_run,
            format,
        } => {
            commands::sync::run(&config, &cli.config, &file, dry_run, format)?;
        }
    }

    Ok(())
}
