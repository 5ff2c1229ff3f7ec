//! Secretly - command-line environment editor
//!
//! Wires configuration, the HTTP adapter and the synchronization loop
//! together behind a `clap` interface.

pub mod cli;
pub mod commands;
pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use secretly_infrastructure::ReqwestEnvironmentApi;

pub use cli::{Cli, Command};
pub use session::{Outcome, Session};

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise the level is `info`, or `debug` with
/// `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    // A second install in the same process is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs the parsed command line against the configured backend.
///
/// # Errors
/// Returns an error for invalid configuration or a failed command.
pub async fn run(cli: Cli) -> Result<String> {
    let config = cli.client_config().context("invalid configuration")?;
    tracing::debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms(), "client configured");

    let api = ReqwestEnvironmentApi::new(&config).context("failed to create HTTP client")?;
    let mut session = Session::start(Arc::new(api));
    let result = commands::execute(&mut session, cli.command).await;
    session.close().await?;
    result
}
