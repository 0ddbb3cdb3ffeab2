// Chain parameters - Everything consensus-relevant that is fixed at startup
use super::deployments;
use crate::activation::{DeploymentPhase, LedgerError};
use crate::crypto::RegistryError;
use crate::script::ScriptLimits;
use crate::types::SchemeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Networks with built-in parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "mainnet" => Ok(Network::Mainnet),
            "test" | "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
            Network::Regtest => f.write_str("regtest"),
        }
    }
}

/// Consensus parameters injected at startup
///
/// This is the single source of truth for the deployment schedule; there
/// is no global deadline constant anywhere else in the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    pub network: Network,

    /// Ordered deployment table (see `ActivationLedger`)
    pub deployments: Vec<DeploymentPhase>,

    /// Scheme verified by CHECKSIG
    pub legacy_scheme: SchemeId,

    /// QR schemes that must be registered for this network
    pub qr_schemes: Vec<SchemeId>,

    /// Script resource limits
    #[serde(default)]
    pub script_limits: ScriptLimits,
}

impl ChainParams {
    pub fn mainnet() -> Self {
        Self::with_deployments(Network::Mainnet, deployments::mainnet())
    }

    pub fn testnet() -> Self {
        Self::with_deployments(Network::Testnet, deployments::testnet())
    }

    pub fn regtest() -> Self {
        Self::with_deployments(Network::Regtest, deployments::regtest())
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    fn with_deployments(network: Network, deployments: Vec<DeploymentPhase>) -> Self {
        Self {
            network,
            deployments,
            legacy_scheme: SchemeId::ED25519,
            qr_schemes: vec![SchemeId::FALCON512],
            script_limits: ScriptLimits::default(),
        }
    }

    /// Charge depuis un fichier JSON
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(format!("{}: {}", path, e)))
    }

    /// Sauvegarde vers un fichier JSON
    pub fn to_file(&self, path: &str) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Startup configuration errors
///
/// Every variant is fatal: the engine refuses to validate anything with a
/// configuration it cannot trust.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid deployment table: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid signature scheme configuration: {0}")]
    Registry(#[from] RegistryError),

    #[error("Unknown network '{0}' (expected main, test or regtest)")]
    UnknownNetwork(String),

    #[error("Invalid script limits: {0}")]
    ScriptLimits(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
