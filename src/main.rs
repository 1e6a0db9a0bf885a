use anyhow::Result;
use clap::Parser;

use relaybot::{cli::Cli, runtime::Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let orchestrator = Orchestrator::new(cli)?;
    orchestrator.run().await
}
