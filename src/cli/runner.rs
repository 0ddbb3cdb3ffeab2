// Runner - Command execution
// Principle: build the engine once, report verdicts, never repair input

use crate::cli::config::{load_transaction, load_utxos, CliConfigError, EngineConfig};
use crate::cli::{CheckConfigCmd, ClassifyCmd, ExportParamsCmd, ValidateTxCmd};
use crate::consensus::{RejectReason, TxValidationResult};
use crate::params::{ChainParams, ConfigError, Network};
use crate::script::classify;
use crate::storage::{MemoryUtxoStore, RocksUtxoStore, UtxoError};
use crate::types::{AddressClass, ChainContext};
use tracing::{debug, info, warn};

/// Validate the configuration and print the deployment schedule
pub fn check_config(cmd: &CheckConfigCmd) -> Result<(), RunnerError> {
    let config = EngineConfig::from_args(&cmd.network)?;
    let validator = config.build_validator()?;
    let ledger = validator.ledger();

    info!("✅ Configuration valid for {}", config.params.network);
    println!("Network: {}", config.params.network);
    println!("Legacy scheme: {}", config.params.legacy_scheme);
    for phase in ledger.iter() {
        println!("  {}", phase);
    }

    if let Some(height) = cmd.height {
        println!("Active at #{}:", height);
        for class in AddressClass::SPENDABLE {
            let rule = ledger
                .active_rule(class, height)
                .map(|rule| format!("{:?}", rule))
                .unwrap_or_else(|| "-".to_string());
            match ledger.next_transition(class, height) {
                Some(next) => println!("  {:<16} {} (until #{})", class, rule, next),
                None => println!("  {:<16} {}", class, rule),
            }
        }
    }
    Ok(())
}

/// Write built-in parameters to a JSON file
pub fn export_params(cmd: &ExportParamsCmd) -> Result<(), RunnerError> {
    let network: Network = cmd
        .network
        .parse()
        .map_err(|_| CliConfigError::UnknownNetwork(cmd.network.clone()))?;
    ChainParams::for_network(network).to_file(&cmd.output.to_string_lossy())?;
    info!("📄 {} parameters written to {}", network, cmd.output.display());
    Ok(())
}

/// Validate one transaction and print the result as JSON
pub async fn validate_tx(cmd: ValidateTxCmd) -> Result<TxValidationResult, RunnerError> {
    let config = EngineConfig::from_args(&cmd.network)?;
    let validator = config.build_validator()?;
    let tx = load_transaction(&cmd.tx)?;
    let ctx = ChainContext::new(cmd.height, cmd.time);

    info!("🔍 Validating tx {} at #{}", tx.txid(), ctx.height);
    let result = match (&cmd.utxos, &cmd.utxo_db) {
        (Some(path), _) => {
            let utxos = load_utxos(path)?;
            debug!("Loaded {} UTXOs from {}", utxos.len(), path.display());
            let store = MemoryUtxoStore::with_outputs(utxos);
            tokio::task::spawn_blocking(move || validator.validate(&tx, &ctx, &store)).await
        }
        (None, Some(dir)) => {
            let store = RocksUtxoStore::open(dir)?;
            tokio::task::spawn_blocking(move || validator.validate(&tx, &ctx, &store)).await
        }
        (None, None) => return Err(RunnerError::NoUtxoSource),
    }
    .map_err(|e| RunnerError::Task(e.to_string()))?;

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| RunnerError::Io(e.to_string()))?;
    println!("{}", json);
    Ok(result)
}

/// Print the class of a hex-encoded locking script
pub fn classify_script(cmd: &ClassifyCmd) -> Result<AddressClass, RunnerError> {
    let script = hex::decode(cmd.script.trim()).map_err(|e| RunnerError::Hex(e.to_string()))?;
    let class = classify(&script);
    println!("{}", class);
    Ok(class)
}

/// Exit-worthy outcome of a validation
pub fn ensure_accepted(result: &TxValidationResult) -> Result<(), RunnerError> {
    match &result.reason {
        None => Ok(()),
        Some(reason) => {
            warn!("Transaction rejected: {}", reason);
            Err(RunnerError::Rejected(reason.clone()))
        }
    }
}

/// Runner errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Cli(#[from] CliConfigError),

    #[error("UTXO store error: {0}")]
    Utxo(#[from] UtxoError),

    #[error("Either --utxos or --utxo-db is required")]
    NoUtxoSource,

    #[error("Invalid hex: {0}")]
    Hex(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Task error: {0}")]
    Task(String),

    #[error("Transaction rejected: {0}")]
    Rejected(RejectReason),
}
