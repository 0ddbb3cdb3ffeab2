// CLI - Command line interface for the turnstile engine
// Principle: Simple, clear, composable commands

pub mod config;
pub mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Turnstile - Quantum-resistance migration consensus engine
#[derive(Parser, Debug)]
#[command(name = "turnstile")]
#[command(author = "Turnstile Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate transactions against the quantum-resistance migration schedule")]
#[command(long_about = r#"
Turnstile validates UTXO transactions under a phased migration from
legacy elliptic-curve outputs to quantum-resistant outputs.

Check the built-in mainnet schedule:
  turnstile check-config --network main

Validate a transaction against a UTXO file:
  turnstile validate-tx --network regtest --tx tx.json --utxos utxos.json --height 250
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", env = "TURNSTILE_LOG")]
    pub log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the consensus configuration and print the schedule
    CheckConfig(CheckConfigCmd),

    /// Write a network's built-in parameters to a JSON file
    ExportParams(ExportParamsCmd),

    /// Validate one transaction
    ValidateTx(ValidateTxCmd),

    /// Print the address class of a locking script
    Classify(ClassifyCmd),
}

/// Network selection shared by every command
#[derive(Parser, Debug, Clone)]
pub struct NetworkArgs {
    /// Network (main, test, regtest)
    #[arg(long, default_value = "main", env = "TURNSTILE_NETWORK")]
    pub network: String,

    /// Parameter file overriding the built-in network parameters
    #[arg(long, env = "TURNSTILE_PARAMS")]
    pub params: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CheckConfigCmd {
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Also show the rules active at this height
    #[arg(long)]
    pub height: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct ExportParamsCmd {
    /// Network (main, test, regtest)
    #[arg(long, default_value = "main")]
    pub network: String,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ValidateTxCmd {
    #[command(flatten)]
    pub network: NetworkArgs,

    /// Transaction file (JSON)
    #[arg(long)]
    pub tx: PathBuf,

    /// Height of the block the transaction would be included in
    #[arg(long)]
    pub height: u64,

    /// Median time past of that block
    #[arg(long, default_value = "0")]
    pub time: u64,

    /// UTXO file (JSON list of hex-encoded entries)
    #[arg(long, conflicts_with = "utxo_db")]
    pub utxos: Option<PathBuf>,

    /// UTXO database directory
    #[arg(long, env = "TURNSTILE_UTXO_DB")]
    pub utxo_db: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ClassifyCmd {
    /// Locking script (hex)
    pub script: String,
}
