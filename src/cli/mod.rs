//! CLI module for multiverse
//!
//! Provides command-line interface for:
//! - init: Create the data directory and an empty store image
//! - serve: Open the store and serve the HTTP API
//! - check: One-shot balance check of one family group
//! - fix: One-shot rebalance of every family group

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, fix, init, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
