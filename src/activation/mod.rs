// Activation - Phased, height-driven enforcement of quantum-resistant rules
// Principle: one table, validated once, read-only forever after

pub mod ledger;
pub mod phase;

pub use ledger::{ActivationLedger, LedgerError};
pub use phase::{DeploymentPhase, EnforcementRule};
