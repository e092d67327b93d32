use clap::Parser;
use fidc_pipelines::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Stages { kind } => cli::stages::run(kind),
    }
}
