// Signature scheme registry - SchemeId -> verification capability
// Principle: fixed at startup, read-only afterwards

use super::SignatureVerifier;
use crate::types::SchemeId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Which opcode family may use a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SchemeKind {
    /// Verified by CHECKSIG
    Legacy,
    /// Verified by CHECK_QSIG
    QuantumResistant,
}

struct RegisteredScheme {
    kind: SchemeKind,
    verifier: Arc<dyn SignatureVerifier>,
}

/// Collects registrations during initialization
///
/// Registration only exists on the builder. Once `build()` runs, the
/// resulting registry is immutable, so a late registration cannot be
/// expressed at all.
#[derive(Default)]
pub struct SchemeRegistryBuilder {
    schemes: BTreeMap<SchemeId, RegisteredScheme>,
}

impl SchemeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a verifier for `id`
    pub fn register(
        mut self,
        id: SchemeId,
        kind: SchemeKind,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Result<Self, RegistryError> {
        if self.schemes.contains_key(&id) {
            return Err(RegistryError::DuplicateScheme(id));
        }
        debug!("Registering {} ({:?}) -> {}", id, kind, verifier.name());
        self.schemes.insert(id, RegisteredScheme { kind, verifier });
        Ok(self)
    }

    pub fn build(self) -> SignatureSchemeRegistry {
        info!("Signature scheme registry sealed with {} scheme(s)", self.schemes.len());
        SignatureSchemeRegistry {
            schemes: self.schemes,
        }
    }
}

/// Immutable scheme registry shared by every validation
pub struct SignatureSchemeRegistry {
    schemes: BTreeMap<SchemeId, RegisteredScheme>,
}

impl SignatureSchemeRegistry {
    pub fn builder() -> SchemeRegistryBuilder {
        SchemeRegistryBuilder::new()
    }

    /// Verify a signature under `id`
    ///
    /// An unregistered id yields `false`.
    pub fn verify(&self, id: SchemeId, pubkey: &[u8], signature: &[u8], message: &[u8]) -> bool {
        match self.schemes.get(&id) {
            Some(scheme) => scheme.verifier.verify(pubkey, signature, message),
            None => {
                debug!("Verification requested for unregistered {}", id);
                false
            }
        }
    }

    /// Verify only if `id` is registered with `kind`
    pub fn verify_kind(
        &self,
        kind: SchemeKind,
        id: SchemeId,
        pubkey: &[u8],
        signature: &[u8],
        message: &[u8],
    ) -> bool {
        match self.kind_of(id) {
            Some(registered) if registered == kind => self.verify(id, pubkey, signature, message),
            _ => false,
        }
    }

    pub fn kind_of(&self, id: SchemeId) -> Option<SchemeKind> {
        self.schemes.get(&id).map(|scheme| scheme.kind)
    }

    pub fn contains(&self, id: SchemeId) -> bool {
        self.schemes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Startup check: `id` must exist with the expected kind
    pub fn require(&self, id: SchemeId, kind: SchemeKind) -> Result<(), RegistryError> {
        match self.kind_of(id) {
            None => Err(RegistryError::UnregisteredScheme(id)),
            Some(registered) if registered != kind => Err(RegistryError::WrongKind {
                id,
                expected: kind,
                registered,
            }),
            Some(_) => Ok(()),
        }
    }
}

impl fmt::Debug for SignatureSchemeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(
                self.schemes
                    .iter()
                    .map(|(id, scheme)| (id, (scheme.kind, scheme.verifier.name()))),
            )
            .finish()
    }
}

/// Registry configuration errors (fatal at startup)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Scheme {0} registered twice")]
    DuplicateScheme(SchemeId),

    #[error("Scheme {0} is referenced by the chain parameters but not registered")]
    UnregisteredScheme(SchemeId),

    #[error("Scheme {id} registered as {registered:?}, expected {expected:?}")]
    WrongKind {
        id: SchemeId,
        expected: SchemeKind,
        registered: SchemeKind,
    },
}
