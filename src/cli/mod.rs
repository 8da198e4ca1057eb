//! CLI module for finchat
//!
//! Provides commands:
//! - `serve`: Start the HTTP server (default)
//! - `config`: Print the effective configuration with secrets masked

use anyhow::Result;
use clap::{Parser, Subcommand};

mod config;

/// finchat multi-persona chat backend
#[derive(Parser, Debug)]
#[command(name = "finchat")]
#[command(about = "Multi-persona financial chat backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve {
        /// Bind address, overriding server.host
        #[arg(long)]
        host: Option<String>,
        /// Listen port, overriding server.port and PORT
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Print the effective configuration
    Config,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Config) => config::run(),
        Some(Commands::Serve { host, port }) => {
            crate::server::run(crate::server::ServeOverrides { host, port }).await
        }
        None => crate::server::run(crate::server::ServeOverrides::default()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_optional() {
        let cli = Cli::try_parse_from(["finchat"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from(["finchat", "serve", "--host", "127.0.0.1", "-p", "8080"])
            .unwrap();
        match cli.command {
            Some(Commands::Serve { host, port }) => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_command() {
        let cli = Cli::try_parse_from(["finchat", "config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config)));
    }
}
