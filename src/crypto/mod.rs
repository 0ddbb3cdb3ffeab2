// Crypto - Signature verification capabilities
// Principle: the engine consumes verification, it never implements it

pub mod ed25519;
#[cfg(feature = "falcon")]
pub mod falcon;
pub mod registry;

pub use ed25519::Ed25519Verifier;
#[cfg(feature = "falcon")]
pub use falcon::Falcon512Verifier;
pub use registry::{RegistryError, SchemeKind, SchemeRegistryBuilder, SignatureSchemeRegistry};

use crate::types::SchemeId;
use std::sync::Arc;

/// Opaque verification capability for one signature scheme
///
/// Implementations must be deterministic and must never panic on
/// malformed input: anything that does not verify is `false`.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, pubkey: &[u8], signature: &[u8], message: &[u8]) -> bool;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Registry with every verifier compiled into this build
pub fn default_registry() -> Result<SignatureSchemeRegistry, RegistryError> {
    let builder = SignatureSchemeRegistry::builder().register(
        SchemeId::ED25519,
        SchemeKind::Legacy,
        Arc::new(Ed25519Verifier),
    )?;

    #[cfg(feature = "falcon")]
    let builder = builder.register(
        SchemeId::FALCON512,
        SchemeKind::QuantumResistant,
        Arc::new(Falcon512Verifier),
    )?;

    Ok(builder.build())
}
