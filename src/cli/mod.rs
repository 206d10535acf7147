//! Command line interface for deployline
//!
//! - `run`: execute a deployment batch
//! - `plan`: show the operation each computer would receive
//! - `completions`: generate shell completions

pub mod completions;
pub mod plan;
pub mod run;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use deployline::infrastructure::ReportFormat;

/// CLI arguments for deployline
#[derive(Parser, Debug)]
#[command(name = "deployline")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a deployment batch
    Run {
        /// Settings file (YAML)
        file: PathBuf,
        /// Per-target timeout in milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,
        /// Report file (stdout if not specified)
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Report format
        #[arg(short, long, value_enum)]
        format: Option<ReportFormatArg>,
    },

    /// Show the resolved operation for every computer without running it
    Plan {
        /// Settings file (YAML)
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormatArg {
    Text,
    Json,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Text => ReportFormat::Text,
            ReportFormatArg::Json => ReportFormat::Json,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    use clap::CommandFactory;
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<ExitCode> {
    let args = Args::parse();
    let debug = std::env::var("DEPLOYLINE_DEBUG").is_ok();

    match args.command {
        Command::Run {
            file,
            timeout_ms,
            report,
            format,
        } => {
            let overrides = run::RunOverrides {
                timeout_ms,
                report,
                format: format.map(Into::into),
            };
            Ok(run::run_batch(&file, &overrides, debug)?.into())
        }
        Command::Plan { file } => {
            plan::print_plan(&file)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let completions = completions::generate_completions(shell)?;

            if let Some(output_path) = output {
                completions::save_completions(&completions, &output_path)?;
            } else {
                println!("{completions}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
