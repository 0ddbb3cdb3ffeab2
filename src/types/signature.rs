// Signature - Scheme identifiers and domain separation

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Domain separation constants for signatures
// =============================================================================
//
// Each signed message carries a unique prefix so that a signature produced
// for one purpose can never be replayed for another.
// =============================================================================

/// Domain separator for per-input spend signatures (CHECKSIG / CHECK_QSIG)
pub const DOMAIN_SIGHASH: &[u8] = b"TURNSTILE_SIGHASH_V1:";

/// Domain separator for quantum-resistant output authorizations
/// Used by turnstile transactions to bind a new QR output to its key owner
pub const DOMAIN_QR_AUTHORIZATION: &[u8] = b"TURNSTILE_QR_AUTH_V1:";

/// Create a domain-separated message for signing
#[inline]
pub fn domain_separate(domain: &[u8], message: &[u8]) -> Vec<u8> {
    let mut separated = Vec::with_capacity(domain.len() + message.len());
    separated.extend_from_slice(domain);
    separated.extend_from_slice(message);
    separated
}

/// Opaque signature scheme identifier
///
/// On the wire it is the first byte of a quantum-resistant public key
/// element; the remaining bytes are the scheme's key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemeId(pub u8);

impl SchemeId {
    /// Legacy elliptic-curve scheme (Ed25519)
    pub const ED25519: SchemeId = SchemeId(0x00);

    /// Falcon-512 (NIST round 3 parameters)
    pub const FALCON512: SchemeId = SchemeId(0x01);
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "scheme:0x{:02x}", self.0)
    }
}

/// Split a quantum-resistant key element into (scheme, key material)
///
/// Returns `None` for an empty element.
pub fn split_qr_key(element: &[u8]) -> Option<(SchemeId, &[u8])> {
    let (&scheme, key) = element.split_first()?;
    Some((SchemeId(scheme), key))
}

/// Encode a quantum-resistant key element
pub fn encode_qr_key(scheme: SchemeId, key: &[u8]) -> Vec<u8> {
    let mut element = Vec::with_capacity(key.len() + 1);
    element.push(scheme.0);
    element.extend_from_slice(key);
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_separate_prefixes() {
        let msg = domain_separate(DOMAIN_SIGHASH, b"abc");
        assert!(msg.starts_with(DOMAIN_SIGHASH));
        assert!(msg.ends_with(b"abc"));
        assert_ne!(msg, domain_separate(DOMAIN_QR_AUTHORIZATION, b"abc"));
    }

    #[test]
    fn test_qr_key_encoding() {
        let element = encode_qr_key(SchemeId::FALCON512, &[7, 8, 9]);
        let (scheme, key) = split_qr_key(&element).unwrap();
        assert_eq!(scheme, SchemeId::FALCON512);
        assert_eq!(key, &[7, 8, 9]);
        assert!(split_qr_key(&[]).is_none());
    }
}
