//! CLI module for switchboard
//!
//! Command-line parsing for the switchboard binary. Uses clap for argument
//! parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// switchboard - a chat assistant that routes each request to the right tool
#[derive(Parser, Debug)]
#[command(
    name = "switchboard",
    version,
    about = "A chat assistant that routes each request to the right tool",
    long_about = "Answers questions about your documents and the company database, looks up\n\
                  the weather, recommends today's events, generates images and searches the web.\n\n\
                  Run without arguments to start an interactive chat.",
    after_help = "EXAMPLES:\n    \
                  switchboard                                 # Interactive chat\n    \
                  switchboard ask \"What's the weather in Oslo?\"\n    \
                  switchboard seed                            # Create the sample stores\n    \
                  switchboard config --validate               # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "switchboard.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive chat session (default)
    ///
    /// Type `/reset` to start a new session and `/quit` to exit.
    Chat,

    /// Send a single message and print the answer
    Ask {
        /// The message to send
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Create the sample company and event stores
    ///
    /// Seeds both stores unless one of the flags narrows it down.
    Seed {
        /// Seed only the company store
        #[arg(long)]
        company: bool,

        /// Seed only the event store (events for today and tomorrow)
        #[arg(long)]
        events: bool,
    },

    /// Show the effective configuration
    Config {
        /// Validate the configuration, including required environment variables
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, `chat` when none was given
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Chat)
    }
}
