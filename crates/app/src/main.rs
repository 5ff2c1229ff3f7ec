//! Secretly - Main Entry Point
//!
//! Parses the command line, installs logging and runs one command.

use clap::Parser;
use secretly::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    secretly::init_logging(cli.verbose);

    let output = secretly::run(cli).await?;
    print!("{output}");
    Ok(())
}
