// UTXO - Store abstraction, in-memory store and per-block snapshot
//
// The engine never observes partially applied state: block validation reads
// from an immutable UtxoSnapshot captured once, and writes happen only via
// apply_block after the whole block validated.

use crate::types::{Height, OutPoint, Output, Transaction};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Read access to unspent outputs
pub trait UtxoView {
    /// `Ok(None)` means the outpoint is not (or no longer) unspent
    fn lookup(&self, outpoint: &OutPoint) -> Result<Option<Output>, UtxoError>;
}

/// Externally owned UTXO set
pub trait UtxoStore: UtxoView + Send + Sync {
    /// Resolve many outpoints against one consistent view of the set
    fn lookup_many(&self, outpoints: &[OutPoint]) -> Result<HashMap<OutPoint, Output>, UtxoError>;

    /// Atomically remove `spends` and insert `creates`
    ///
    /// Nothing is written if any spend is missing or duplicated.
    fn apply_block(
        &self,
        height: Height,
        spends: &[OutPoint],
        creates: &[(OutPoint, Output)],
    ) -> Result<(), UtxoError>;
}

/// Check a block's spend list before writing anything
pub(crate) fn check_spends<F>(spends: &[OutPoint], mut exists: F) -> Result<(), UtxoError>
where
    F: FnMut(&OutPoint) -> Result<bool, UtxoError>,
{
    let mut seen = HashSet::with_capacity(spends.len());
    for outpoint in spends {
        if !seen.insert(*outpoint) {
            return Err(UtxoError::DuplicateSpend(*outpoint));
        }
        if !exists(outpoint)? {
            return Err(UtxoError::MissingSpend(*outpoint));
        }
    }
    Ok(())
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// UTXO set held in memory (tests, tooling, regtest)
#[derive(Debug, Default)]
pub struct MemoryUtxoStore {
    inner: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    utxos: HashMap<OutPoint, Output>,
    tip: Option<Height>,
}

impl MemoryUtxoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the set directly (genesis / fixtures)
    pub fn with_outputs<I>(outputs: I) -> Self
    where
        I: IntoIterator<Item = (OutPoint, Output)>,
    {
        Self {
            inner: RwLock::new(MemoryState {
                utxos: outputs.into_iter().collect(),
                tip: None,
            }),
        }
    }

    pub fn len(&self) -> Result<usize, UtxoError> {
        let state = self.inner.read().map_err(|_| UtxoError::LockPoisoned)?;
        Ok(state.utxos.len())
    }

    pub fn is_empty(&self) -> Result<bool, UtxoError> {
        Ok(self.len()? == 0)
    }

    pub fn tip(&self) -> Result<Option<Height>, UtxoError> {
        let state = self.inner.read().map_err(|_| UtxoError::LockPoisoned)?;
        Ok(state.tip)
    }
}

impl UtxoView for MemoryUtxoStore {
    fn lookup(&self, outpoint: &OutPoint) -> Result<Option<Output>, UtxoError> {
        let state = self.inner.read().map_err(|_| UtxoError::LockPoisoned)?;
        Ok(state.utxos.get(outpoint).cloned())
    }
}

impl UtxoStore for MemoryUtxoStore {
    fn lookup_many(&self, outpoints: &[OutPoint]) -> Result<HashMap<OutPoint, Output>, UtxoError> {
        let state = self.inner.read().map_err(|_| UtxoError::LockPoisoned)?;
        Ok(outpoints
            .iter()
            .filter_map(|op| state.utxos.get(op).map(|out| (*op, out.clone())))
            .collect())
    }

    fn apply_block(
        &self,
        height: Height,
        spends: &[OutPoint],
        creates: &[(OutPoint, Output)],
    ) -> Result<(), UtxoError> {
        let mut state = self.inner.write().map_err(|_| UtxoError::LockPoisoned)?;

        check_spends(spends, |op| Ok(state.utxos.contains_key(op)))?;
        for (outpoint, _) in creates {
            if state.utxos.contains_key(outpoint) {
                return Err(UtxoError::DuplicateCreate(*outpoint));
            }
        }

        for outpoint in spends {
            state.utxos.remove(outpoint);
        }
        for (outpoint, output) in creates {
            state.utxos.insert(*outpoint, output.clone());
        }
        state.tip = Some(height);

        info!(
            "UTXO set at #{}: -{} +{} ({} total)",
            height,
            spends.len(),
            creates.len(),
            state.utxos.len()
        );
        Ok(())
    }
}

// =============================================================================
// BLOCK SNAPSHOT
// =============================================================================

/// Immutable view of the UTXO set for one block's validation pass
///
/// Captures every outpoint the block references in a single consistent
/// read, rejects sibling transactions that spend the same outpoint, and
/// overlays outputs created earlier in the same block.
#[derive(Debug)]
pub struct UtxoSnapshot {
    base: HashMap<OutPoint, Output>,
    /// Outputs created inside the block, with the index of the creating tx
    created: HashMap<OutPoint, (usize, Output)>,
}

impl UtxoSnapshot {
    pub fn capture(store: &dyn UtxoStore, txs: &[Transaction]) -> Result<Self, UtxoError> {
        let mut created = HashMap::new();
        for (tx_index, tx) in txs.iter().enumerate() {
            for (outpoint, output) in tx.created_outputs() {
                created.insert(outpoint, (tx_index, output));
            }
        }

        let mut spent_by: HashMap<OutPoint, usize> = HashMap::new();
        let mut external = Vec::new();
        for (tx_index, tx) in txs.iter().enumerate() {
            for input in &tx.inputs {
                match spent_by.get(&input.prevout) {
                    // Same-tx duplicates are rejected by transaction validation
                    Some(&first) if first == tx_index => continue,
                    Some(&first) => {
                        return Err(UtxoError::ConflictingSpend {
                            outpoint: input.prevout,
                            first_tx: first,
                            second_tx: tx_index,
                        })
                    }
                    None => {
                        spent_by.insert(input.prevout, tx_index);
                        if !created.contains_key(&input.prevout) {
                            external.push(input.prevout);
                        }
                    }
                }
            }
        }

        let base = store.lookup_many(&external)?;
        debug!(
            "UTXO snapshot: {} external, {} in-block outputs",
            base.len(),
            created.len()
        );

        Ok(Self { base, created })
    }

    /// View seen by transaction `tx_index` (only earlier siblings' outputs)
    pub fn view(self: &Arc<Self>, tx_index: usize) -> SnapshotView {
        SnapshotView {
            snapshot: Arc::clone(self),
            tx_index,
        }
    }
}

/// Per-transaction view onto a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotView {
    snapshot: Arc<UtxoSnapshot>,
    tx_index: usize,
}

impl UtxoView for SnapshotView {
    fn lookup(&self, outpoint: &OutPoint) -> Result<Option<Output>, UtxoError> {
        if let Some((creator, output)) = self.snapshot.created.get(outpoint) {
            return Ok((*creator < self.tx_index).then(|| output.clone()));
        }
        Ok(self.snapshot.base.get(outpoint).cloned())
    }
}

/// UTXO store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UtxoError {
    #[error("Spent outpoint {0} is not in the UTXO set")]
    MissingSpend(OutPoint),

    #[error("Outpoint {0} spent twice in one block")]
    DuplicateSpend(OutPoint),

    #[error("Outpoint {0} already exists")]
    DuplicateCreate(OutPoint),

    #[error("Outpoint {outpoint} spent by transactions {first_tx} and {second_tx}")]
    ConflictingSpend {
        outpoint: OutPoint,
        first_tx: usize,
        second_tx: usize,
    },

    #[error("UTXO store lock poisoned")]
    LockPoisoned,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
