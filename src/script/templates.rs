// Templates - Standard locking scripts
//
// Byte layouts (push of 20 = 0x14, push of 32 = 0x20):
//   P2PKH   76 a9 14 <h20> 88 ac
//   P2PK    20 <k32> ac
//   P2QPKH  76 c1 14 <h20> 88 c0
//   HYBRID  76 a9 14 <h20> 88 ad 76 c1 14 <q20> 88 c0

use super::opcodes::*;

pub const SHORT_HASH_LEN: usize = 20;
pub const LEGACY_PUBKEY_LEN: usize = 32;

pub const P2PKH_LEN: usize = 25;
pub const P2PK_LEN: usize = 34;
pub const P2QPKH_LEN: usize = 25;
pub const HYBRID_LEN: usize = 50;

/// Pay to legacy public key hash
pub fn p2pkh(key_hash: &[u8; SHORT_HASH_LEN]) -> Vec<u8> {
    let mut script = Vec::with_capacity(P2PKH_LEN);
    script.extend_from_slice(&[OP_DUP, OP_HASH160, SHORT_HASH_LEN as u8]);
    script.extend_from_slice(key_hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    script
}

/// Pay to bare legacy public key
pub fn p2pk(pubkey: &[u8; LEGACY_PUBKEY_LEN]) -> Vec<u8> {
    let mut script = Vec::with_capacity(P2PK_LEN);
    script.push(LEGACY_PUBKEY_LEN as u8);
    script.extend_from_slice(pubkey);
    script.push(OP_CHECKSIG);
    script
}

/// Pay to quantum-resistant public key hash
pub fn p2qpkh(qr_key_hash: &[u8; SHORT_HASH_LEN]) -> Vec<u8> {
    let mut script = Vec::with_capacity(P2QPKH_LEN);
    script.extend_from_slice(&[OP_DUP, OP_QHASH160, SHORT_HASH_LEN as u8]);
    script.extend_from_slice(qr_key_hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECK_QSIG]);
    script
}

/// Both signatures required: legacy first, then quantum-resistant
pub fn hybrid(key_hash: &[u8; SHORT_HASH_LEN], qr_key_hash: &[u8; SHORT_HASH_LEN]) -> Vec<u8> {
    let mut script = Vec::with_capacity(HYBRID_LEN);
    script.extend_from_slice(&[OP_DUP, OP_HASH160, SHORT_HASH_LEN as u8]);
    script.extend_from_slice(key_hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIGVERIFY]);
    script.extend_from_slice(&[OP_DUP, OP_QHASH160, SHORT_HASH_LEN as u8]);
    script.extend_from_slice(qr_key_hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECK_QSIG]);
    script
}

/// `script` is a P2PKH template
pub fn is_p2pkh(script: &[u8]) -> bool {
    script.len() == P2PKH_LEN
        && script[..3] == [OP_DUP, OP_HASH160, SHORT_HASH_LEN as u8]
        && script[23..] == [OP_EQUALVERIFY, OP_CHECKSIG]
}

pub fn is_p2pk(script: &[u8]) -> bool {
    script.len() == P2PK_LEN
        && script[0] == LEGACY_PUBKEY_LEN as u8
        && script[P2PK_LEN - 1] == OP_CHECKSIG
}

pub fn is_p2qpkh(script: &[u8]) -> bool {
    script.len() == P2QPKH_LEN
        && script[..3] == [OP_DUP, OP_QHASH160, SHORT_HASH_LEN as u8]
        && script[23..] == [OP_EQUALVERIFY, OP_CHECK_QSIG]
}

pub fn is_hybrid(script: &[u8]) -> bool {
    script.len() == HYBRID_LEN
        && script[..3] == [OP_DUP, OP_HASH160, SHORT_HASH_LEN as u8]
        && script[23..28] == [OP_EQUALVERIFY, OP_CHECKSIGVERIFY, OP_DUP, OP_QHASH160, SHORT_HASH_LEN as u8]
        && script[48..] == [OP_EQUALVERIFY, OP_CHECK_QSIG]
}

/// Embedded QR key hash of a P2QPKH script
pub fn qr_key_hash(script: &[u8]) -> Option<[u8; SHORT_HASH_LEN]> {
    if !is_p2qpkh(script) {
        return None;
    }
    let mut hash = [0u8; SHORT_HASH_LEN];
    hash.copy_from_slice(&script[3..23]);
    Some(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lengths() {
        assert_eq!(p2pkh(&[0; 20]).len(), P2PKH_LEN);
        assert_eq!(p2pk(&[0; 32]).len(), P2PK_LEN);
        assert_eq!(p2qpkh(&[0; 20]).len(), P2QPKH_LEN);
        assert_eq!(hybrid(&[0; 20], &[0; 20]).len(), HYBRID_LEN);
    }

    #[test]
    fn test_template_predicates_are_exclusive() {
        let scripts = [p2pkh(&[1; 20]), p2pk(&[2; 32]), p2qpkh(&[3; 20]), hybrid(&[4; 20], &[5; 20])];
        let predicates: [fn(&[u8]) -> bool; 4] = [is_p2pkh, is_p2pk, is_p2qpkh, is_hybrid];

        for (i, script) in scripts.iter().enumerate() {
            for (j, predicate) in predicates.iter().enumerate() {
                assert_eq!(predicate(script), i == j, "script {} predicate {}", i, j);
            }
        }
    }

    #[test]
    fn test_qr_key_hash_extraction() {
        assert_eq!(qr_key_hash(&p2qpkh(&[7; 20])), Some([7; 20]));
        assert_eq!(qr_key_hash(&p2pkh(&[7; 20])), None);
    }
}
