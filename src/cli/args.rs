//! CLI argument definitions using clap
//!
//! Commands:
//! - multiverse init --config <path>
//! - multiverse serve --config <path> [--port <port>]
//! - multiverse check --config <path> --name-identifier <key>
//! - multiverse fix --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::NameIdentifier;

/// multiverse - universes, families and the balance of family power
#[derive(Parser, Debug)]
#[command(name = "multiverse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./multiverse.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./multiverse.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check whether one family group is balanced and exit
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./multiverse.json")]
        config: PathBuf,

        /// Family group to check
        #[arg(long, allow_negative_numbers = true)]
        name_identifier: NameIdentifier,
    },

    /// Rebalance every family group and exit
    Fix {
        /// Path to configuration file
        #[arg(long, default_value = "./multiverse.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
