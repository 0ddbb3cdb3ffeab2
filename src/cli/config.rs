// CLI Configuration - Convert CLI args to engine config
// Principle: Clear mapping between user input and internal configuration

use crate::cli::NetworkArgs;
use crate::consensus::ConsensusValidator;
use crate::crypto::default_registry;
use crate::params::{ChainParams, ConfigError, Network};
use crate::types::{Hash, OutPoint, Output, Transaction};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Engine configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Consensus parameters (built-in or loaded from file)
    pub params: ChainParams,
}

impl EngineConfig {
    /// Resolve the network and optional parameter file
    pub fn from_args(args: &NetworkArgs) -> Result<Self, CliConfigError> {
        let network: Network = args
            .network
            .parse()
            .map_err(|_| CliConfigError::UnknownNetwork(args.network.clone()))?;

        let params = match &args.params {
            Some(path) => {
                let params = ChainParams::from_file(&path.to_string_lossy())
                    .map_err(|e| CliConfigError::Params(e.to_string()))?;
                if params.network != network {
                    return Err(CliConfigError::NetworkMismatch {
                        requested: network,
                        file: params.network,
                    });
                }
                info!("Loaded parameters from {}", path.display());
                params
            }
            None => ChainParams::for_network(network),
        };

        Ok(Self { params })
    }

    /// Build the validator with every verifier compiled into this binary
    pub fn build_validator(&self) -> Result<ConsensusValidator, ConfigError> {
        let registry = Arc::new(default_registry()?);
        ConsensusValidator::new(&self.params, registry)
    }
}

/// One UTXO as written in a `--utxos` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    /// Transaction id (hex, 32 bytes)
    pub txid: String,
    pub vout: u32,
    pub value: u64,
    /// Locking script (hex)
    pub script: String,
}

impl UtxoEntry {
    pub fn decode(&self) -> Result<(OutPoint, Output), CliConfigError> {
        let txid: [u8; 32] = hex::decode(&self.txid)
            .map_err(|e| CliConfigError::Hex(format!("txid {}: {}", self.txid, e)))?
            .try_into()
            .map_err(|_| CliConfigError::Hex(format!("txid {} is not 32 bytes", self.txid)))?;
        let script = hex::decode(&self.script)
            .map_err(|e| CliConfigError::Hex(format!("script {}: {}", self.script, e)))?;
        Ok((
            OutPoint::new(Hash::from_bytes(txid), self.vout),
            Output::new(self.value, script),
        ))
    }
}

/// Load a JSON list of UTXO entries
pub fn load_utxos(path: &Path) -> Result<Vec<(OutPoint, Output)>, CliConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliConfigError::Io(format!("{}: {}", path.display(), e)))?;
    let entries: Vec<UtxoEntry> = serde_json::from_str(&content)
        .map_err(|e| CliConfigError::Parse(format!("{}: {}", path.display(), e)))?;
    entries.iter().map(UtxoEntry::decode).collect()
}

/// Load a JSON transaction
pub fn load_transaction(path: &Path) -> Result<Transaction, CliConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliConfigError::Io(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliConfigError::Parse(format!("{}: {}", path.display(), e)))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum CliConfigError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Parameter file is for {file}, requested {requested}")]
    NetworkMismatch { requested: Network, file: Network },

    #[error("Failed to load parameters: {0}")]
    Params(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid hex: {0}")]
    Hex(String),
}
