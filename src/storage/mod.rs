// Storage - UTXO set access (mémoire + RocksDB)
// Principe: snapshot cohérent par bloc, écriture atomique

pub mod db;
pub mod utxo;

pub use db::RocksUtxoStore;
pub use utxo::{MemoryUtxoStore, SnapshotView, UtxoError, UtxoSnapshot, UtxoStore, UtxoView};
