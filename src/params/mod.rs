// Params - Per-network consensus parameters
pub mod config;
pub mod deployments;

pub use config::{ChainParams, ConfigError, Network};
