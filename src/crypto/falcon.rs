//! Falcon-512 verifier adapter
//!
//! Post-quantum signature math lives entirely in `pqcrypto-falcon`; this
//! adapter only maps raw bytes onto its detached-signature API so the
//! registry can treat Falcon as one more opaque verification capability.

use super::SignatureVerifier;
use pqcrypto_falcon::falcon512;
use pqcrypto_traits::sign::{DetachedSignature as _, PublicKey as _};

/// Falcon-512 public key size in bytes
pub const FALCON512_PUBKEY_BYTES: usize = 897;

/// Verifies detached Falcon-512 signatures
#[derive(Debug, Clone, Copy, Default)]
pub struct Falcon512Verifier;

impl SignatureVerifier for Falcon512Verifier {
    fn verify(&self, pubkey: &[u8], signature: &[u8], message: &[u8]) -> bool {
        if pubkey.len() != FALCON512_PUBKEY_BYTES {
            return false;
        }
        let Ok(pk) = falcon512::PublicKey::from_bytes(pubkey) else {
            return false;
        };
        let Ok(sig) = falcon512::DetachedSignature::from_bytes(signature) else {
            return false;
        };
        falcon512::verify_detached_signature(&sig, message, &pk).is_ok()
    }

    fn name(&self) -> &'static str {
        "falcon512"
    }
}
