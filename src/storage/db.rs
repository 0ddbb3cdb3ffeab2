// Database - UTXO store sur RocksDB
use super::utxo::{check_spends, UtxoError, UtxoStore, UtxoView};
use crate::types::{Height, OutPoint, Output};
use rocksdb::{Options, WriteBatch, DB};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Storage key prefixes
const PREFIX_UTXO: &[u8] = b"utxo:";
const KEY_TIP_HEIGHT: &[u8] = b"tip_height";

/// Persistent UTXO set
pub struct RocksUtxoStore {
    db: Arc<DB>,
    /// Serializes apply_block (check-then-write must not interleave)
    write_lock: Mutex<()>,
}

impl RocksUtxoStore {
    /// Ouvre ou crée une base de données
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, UtxoError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        // Limiter l'accumulation de fichiers pour éviter "Too many open files"
        opts.set_keep_log_file_num(5);
        opts.set_max_background_jobs(2);

        let db = DB::open(&opts, path).map_err(|e| UtxoError::Storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    fn key(outpoint: &OutPoint) -> Vec<u8> {
        let mut key = Vec::with_capacity(PREFIX_UTXO.len() + 36);
        key.extend_from_slice(PREFIX_UTXO);
        key.extend_from_slice(&outpoint.to_key());
        key
    }

    fn decode(bytes: &[u8]) -> Result<Output, UtxoError> {
        bincode::deserialize(bytes).map_err(|e| UtxoError::Serialization(e.to_string()))
    }

    /// Dernière hauteur appliquée
    pub fn tip(&self) -> Result<Option<Height>, UtxoError> {
        let value = self
            .db
            .get(KEY_TIP_HEIGHT)
            .map_err(|e| UtxoError::Storage(e.to_string()))?;
        match value {
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| UtxoError::Serialization("tip height must be 8 bytes".into()))?;
                Ok(Some(u64::from_be_bytes(arr)))
            }
            None => Ok(None),
        }
    }
}

impl UtxoView for RocksUtxoStore {
    fn lookup(&self, outpoint: &OutPoint) -> Result<Option<Output>, UtxoError> {
        self.db
            .get(Self::key(outpoint))
            .map_err(|e| UtxoError::Storage(e.to_string()))?
            .map(|bytes| Self::decode(&bytes))
            .transpose()
    }
}

impl UtxoStore for RocksUtxoStore {
    fn lookup_many(&self, outpoints: &[OutPoint]) -> Result<HashMap<OutPoint, Output>, UtxoError> {
        // Une seule vue cohérente pour tout le bloc
        let snapshot = self.db.snapshot();
        let mut found = HashMap::with_capacity(outpoints.len());
        for outpoint in outpoints {
            let value = snapshot
                .get(Self::key(outpoint))
                .map_err(|e| UtxoError::Storage(e.to_string()))?;
            if let Some(bytes) = value {
                found.insert(*outpoint, Self::decode(&bytes)?);
            }
        }
        Ok(found)
    }

    fn apply_block(
        &self,
        height: Height,
        spends: &[OutPoint],
        creates: &[(OutPoint, Output)],
    ) -> Result<(), UtxoError> {
        let _guard = self.write_lock.lock().map_err(|_| UtxoError::LockPoisoned)?;

        check_spends(spends, |op| Ok(self.lookup(op)?.is_some()))?;
        for (outpoint, _) in creates {
            if self.lookup(outpoint)?.is_some() {
                return Err(UtxoError::DuplicateCreate(*outpoint));
            }
        }

        let mut batch = WriteBatch::default();
        for outpoint in spends {
            batch.delete(Self::key(outpoint));
        }
        for (outpoint, output) in creates {
            let value =
                bincode::serialize(output).map_err(|e| UtxoError::Serialization(e.to_string()))?;
            batch.put(Self::key(outpoint), value);
        }
        batch.put(KEY_TIP_HEIGHT, height.to_be_bytes());

        self.db
            .write(batch)
            .map_err(|e| UtxoError::Storage(e.to_string()))?;

        info!(
            "💾 UTXO set persisted at #{}: -{} +{}",
            height,
            spends.len(),
            creates.len()
        );
        Ok(())
    }
}
