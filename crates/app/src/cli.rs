//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secretly_domain::parse_assignment;
use secretly_infrastructure::{ClientConfig, ConfigError, ExportFormat};

/// Edit remote environments from the terminal.
#[derive(Debug, Parser)]
#[command(name = "secretly", author, version, about, long_about = None)]
pub struct Cli {
    /// API root, overrides SECRETLY_BASE_URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds, overrides SECRETLY_TIMEOUT_SECS
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands. Every one runs through the synchronization loop.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List all environments with masked values
    List,

    /// Show one environment
    Show {
        /// Environment name
        name: String,
        /// Print values in clear text
        #[arg(long)]
        reveal: bool,
    },

    /// Print one value
    Get {
        /// Environment name
        name: String,
        /// Variable key
        key: String,
    },

    /// Create an environment
    Create {
        /// Environment name
        name: String,
        /// Variables as KEY=VALUE
        #[arg(value_parser = assignment)]
        vars: Vec<(String, String)>,
    },

    /// Set variables of an existing environment
    Set {
        /// Environment name
        name: String,
        /// Variables as KEY=VALUE
        #[arg(value_parser = assignment, required = true)]
        vars: Vec<(String, String)>,
    },

    /// Rename an environment
    Rename {
        /// Current name
        name: String,
        /// New name
        new_name: String,
    },

    /// Delete an environment
    Delete {
        /// Environment name
        name: String,
    },

    /// Delete one variable
    Unset {
        /// Environment name
        name: String,
        /// Variable key
        key: String,
    },

    /// Write an environment to stdout or a file
    Export {
        /// Environment name
        name: String,
        /// Output format: dotenv or json
        #[arg(long, default_value_t = ExportFormat::Dotenv)]
        format: ExportFormat,
        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Create or update an environment from a .env file
    Import {
        /// Path of the .env file
        file: PathBuf,
        /// Target environment name
        #[arg(long)]
        name: String,
    },
}

impl Cli {
    /// Builds the client configuration: defaults, then the environment,
    /// then flags.
    ///
    /// # Errors
    /// Returns an error if any source holds an invalid value.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        self.apply_overrides(ClientConfig::from_env()?)
    }

    fn apply_overrides(&self, mut config: ClientConfig) -> Result<ClientConfig, ConfigError> {
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs)?;
        }
        Ok(config)
    }
}

fn assignment(input: &str) -> Result<(String, String), String> {
    parse_assignment(input).map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from(["secretly", "create", "dev", "PORT=8080", "URL=a=b"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Create {
                name: "dev".to_string(),
                vars: vec![
                    ("PORT".to_string(), "8080".to_string()),
                    ("URL".to_string(), "a=b".to_string()),
                ],
            }
        );
    }

    #[test]
    fn test_invalid_assignment_is_rejected() {
        assert!(Cli::try_parse_from(["secretly", "set", "dev", "PORT"]).is_err());
        assert!(Cli::try_parse_from(["secretly", "set", "dev", "=1"]).is_err());
        assert!(Cli::try_parse_from(["secretly", "set", "dev"]).is_err());
    }

    #[test]
    fn test_export_defaults_to_dotenv() {
        let cli = Cli::try_parse_from(["secretly", "export", "dev"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Export {
                name: "dev".to_string(),
                format: ExportFormat::Dotenv,
                output: None,
            }
        );

        let cli = Cli::try_parse_from(["secretly", "export", "dev", "--format", "json", "-o", "dev.json"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Export { format: ExportFormat::Json, output: Some(_), .. }
        ));
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "secretly",
            "list",
            "--base-url",
            "https://vault.example.com/api/v1",
            "--timeout-secs",
            "3",
        ])
        .unwrap();
        let config = cli.apply_overrides(ClientConfig::default()).unwrap();
        assert_eq!(config.base_url.as_str(), "https://vault.example.com/api/v1");
        assert_eq!(config.timeout_ms(), 3000);

        let cli = Cli::try_parse_from(["secretly", "list", "--timeout-secs", "0"]).unwrap();
        assert!(cli.apply_overrides(ClientConfig::default()).is_err());
    }

    #[test]
    fn test_show_reveal_flag() {
        let cli = Cli::try_parse_from(["secretly", "show", "prod", "--reveal"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Show {
                name: "prod".to_string(),
                reveal: true,
            }
        );
    }
}
