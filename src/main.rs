//! deployline - fan a deployment out across a fleet of machines
//!
//! Runs a script, or installs, repairs or removes a package, on every
//! computer in a list. Each computer gets one attempt bounded by a timeout,
//! and the batch ends with a report of every computer's result.
//!
//! ## Commands
//!
//! - `deployline run` - Execute a batch described by a settings file
//! - `deployline plan` - Show what each computer would receive
//! - `deployline completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # See what would happen
//! deployline plan agent.yaml
//!
//! # Deploy, writing a JSON report
//! deployline run agent.yaml --format json --report reports/agent.json
//! ```

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            if std::env::var("DEPLOYLINE_DEBUG").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
