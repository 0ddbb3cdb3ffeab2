// Primitives - Types fondamentaux minimaux du moteur de migration
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash universel (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; 32]);

impl Hash {
    pub const ZERO: Hash = Hash([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash des données avec Blake3
    pub fn hash(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Hash(*hash.as_bytes())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }
}

/// Hauteur de bloc
pub type Height = u64;

/// Timestamp Unix en secondes (median time past)
pub type Timestamp = u64;

/// Montant en unités de base
pub type Amount = u64;

/// 1 coin = 10^8 unités
pub const COIN: Amount = 100_000_000;

/// Aucun montant (ni aucune somme) ne peut dépasser ce plafond
pub const MAX_MONEY: Amount = 21_000_000 * COIN;

/// Is `value` a legal monetary amount?
#[inline]
pub fn money_range(value: Amount) -> bool {
    value <= MAX_MONEY
}

/// Reference to a specific output of a previous transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Hash,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Hash, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// Clé de stockage stable (txid || vout big-endian)
    pub fn to_key(&self) -> [u8; 36] {
        let mut key = [0u8; 36];
        key[..32].copy_from_slice(self.txid.as_bytes());
        key[32..].copy_from_slice(&self.vout.to_be_bytes());
        key
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Block context supplied by the chain for every validation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainContext {
    /// Height of the block the transaction is (or would be) included in
    pub height: Height,
    /// Median time past of that block
    pub time: Timestamp,
}

impl ChainContext {
    pub fn new(height: Height, time: Timestamp) -> Self {
        Self { height, time }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let data = b"turnstile";
        assert_eq!(Hash::hash(data), Hash::hash(data));
        assert_ne!(Hash::hash(data), Hash::hash(b"other"));
    }

    #[test]
    fn test_money_range() {
        assert!(money_range(0));
        assert!(money_range(MAX_MONEY));
        assert!(!money_range(MAX_MONEY + 1));
    }

    #[test]
    fn test_outpoint_key_orders_by_vout() {
        let txid = Hash::hash(b"tx");
        let a = OutPoint::new(txid, 1).to_key();
        let b = OutPoint::new(txid, 256).to_key();
        assert!(a < b);
        assert_eq!(&a[..32], txid.as_bytes());
    }
}
