// Ed25519 - Legacy elliptic-curve verifier
use super::SignatureVerifier;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verifies 64-byte Ed25519 signatures against 32-byte public keys
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, pubkey: &[u8], signature: &[u8], message: &[u8]) -> bool {
        let Ok(key_bytes) = <[u8; 32]>::try_from(pubkey) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
            return false;
        };

        let public_key = match VerifyingKey::from_bytes(&key_bytes) {
            Ok(pk) => pk,
            Err(_) => return false,
        };

        let sig = Signature::from_bytes(&sig_bytes);

        public_key.verify(message, &sig).is_ok()
    }

    fn name(&self) -> &'static str {
        "ed25519"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    #[test]
    fn test_ed25519_verify() {
        let signing = SigningKey::from_bytes(&[7u8; 32]);
        let pubkey = signing.verifying_key().to_bytes();
        let sig = signing.sign(b"message").to_bytes();

        assert!(Ed25519Verifier.verify(&pubkey, &sig, b"message"));
        assert!(!Ed25519Verifier.verify(&pubkey, &sig, b"other"));
    }

    #[test]
    fn test_ed25519_rejects_malformed_lengths() {
        assert!(!Ed25519Verifier.verify(&[0u8; 31], &[0u8; 64], b"m"));
        assert!(!Ed25519Verifier.verify(&[0u8; 32], &[0u8; 63], b"m"));
    }
}
