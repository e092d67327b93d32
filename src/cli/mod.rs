//! CLI module for FIDC Pipelines
//!
//! - `serve`: run the HTTP API
//! - `stages`: print the stages and built-in checklist of a pipeline

pub mod serve;
pub mod stages;

use clap::{Parser, Subcommand};

use crate::domain::PipelineKind;

/// FIDC Pipelines - stage-gated workflows for a receivables fund
#[derive(Parser)]
#[command(name = "fidc-pipelines")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Print the stage list and checklist of a pipeline
    Stages {
        /// originators, receivables, allocation or monitoring
        kind: PipelineKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stages_command() {
        let cli = Cli::try_parse_from(["fidc-pipelines", "stages", "allocation"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Stages {
                kind: PipelineKind::Allocation
            }
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(Cli::try_parse_from(["fidc-pipelines", "stages", "treasury"]).is_err());
    }
}
