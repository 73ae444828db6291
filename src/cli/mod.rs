//! CLI interface for oracle-relay
//!
//! Provides subcommands for:
//! - `run`: Start relaying prices (and deposits) to the consensus application
//! - `config`: Print the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "oracle-relay")]
#[command(about = "Relays exchange prices and on-chain deposits into a consensus application")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file; built-in defaults are used if it does not exist
    #[arg(short, long, default_value = "relay.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay
    Run(RunArgs),
    /// Print the effective configuration as TOML
    Config,
}
