// Turnstile - Quantum-resistance migration consensus engine
// Principle: Minimal, auditable, deterministic

pub mod activation;
pub mod cli;
pub mod consensus;
pub mod crypto;
pub mod params;
pub mod script;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;

pub use activation::{ActivationLedger, DeploymentPhase, EnforcementRule};
pub use consensus::{
    BlockValidator, ConsensusValidator, RejectReason, TurnstileRecord, TxValidationResult,
};
pub use crypto::{SchemeKind, SignatureSchemeRegistry, SignatureVerifier};
pub use params::{ChainParams, Network};
pub use types::{AddressClass, ChainContext, Output, Transaction};
