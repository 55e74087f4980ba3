//! CLI module for the tutor server
//!
//! Provides command-line interface parsing for the kidtutor-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kid Tutor - a kid-friendly question answering server
#[derive(Parser, Debug)]
#[command(
    name = "kidtutor-server",
    version,
    about = "Kid Tutor - answers children's questions through an LLM",
    long_about = "A small HTTP backend that wraps each question in a kid-friendly tutor prompt,\n\
                  forwards it to a hosted language model and keeps a running summary per session.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  kidtutor-server                          # Start the server (tutor.toml optional)\n    \
                  kidtutor-server serve --port 8080        # Override the listen port\n    \
                  kidtutor-server ask \"Why is the sky blue?\" --session kid42\n    \
                  kidtutor-server config --validate        # Check configuration and API key"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tutor.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Host address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ask a single question from the terminal
    Ask {
        /// The question to ask
        question: String,

        /// Session to ask in
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration, including the API key
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, defaulting to `serve`
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::try_parse_from(["kidtutor-server"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("tutor.toml"));
        assert_eq!(
            cli.command(),
            Commands::Serve {
                host: None,
                port: None
            }
        );
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "kidtutor-server",
            "--config",
            "custom.toml",
            "ask",
            "Why do cats purr?",
            "--session",
            "kid42",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert_eq!(
            cli.command(),
            Commands::Ask {
                question: "Why do cats purr?".to_string(),
                session: Some("kid42".to_string())
            }
        );
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["kidtutor-server", "serve", "--port", "8080", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.command(),
            Commands::Serve {
                host: None,
                port: Some(8080)
            }
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["kidtutor-server", "serve", "--port", "99999"]).is_err());
    }
}
