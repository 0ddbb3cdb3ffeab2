// Block - Parallel, all-or-nothing validation of a block's transactions
//
// Each transaction runs as its own blocking task against one immutable
// UTXO snapshot. The first rejection raises a shared flag that siblings
// check between inputs. The reported failure is always the lowest-index
// rejected transaction, whatever order the tasks finished in.

use super::validation::{ConsensusValidator, TxValidationResult};
use crate::storage::{UtxoError, UtxoSnapshot, UtxoStore};
use crate::types::{ChainContext, Hash, OutPoint, Output, Transaction};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Block-level failures
#[derive(Debug, thiserror::Error)]
pub enum BlockValidationError {
    #[error("Transaction {tx_index} ({txid}) rejected: {result:?}")]
    Rejected {
        tx_index: usize,
        txid: Hash,
        result: TxValidationResult,
    },

    #[error("UTXO error: {0}")]
    Utxo(#[from] UtxoError),

    #[error("Validation task failed: {0}")]
    Task(String),
}

/// Summary of a connected block
#[derive(Debug, Clone)]
pub struct ConnectedBlock {
    pub results: Vec<TxValidationResult>,
    pub spent: usize,
    pub created: usize,
}

pub struct BlockValidator {
    validator: ConsensusValidator,
}

impl BlockValidator {
    pub fn new(validator: ConsensusValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &ConsensusValidator {
        &self.validator
    }

    /// Validate every transaction of a block at `ctx`
    ///
    /// Returns one accepted result per transaction, or the lowest-index
    /// rejection.
    pub async fn validate_block(
        &self,
        ctx: ChainContext,
        txs: Arc<[Transaction]>,
        store: Arc<dyn UtxoStore>,
    ) -> Result<Vec<TxValidationResult>, BlockValidationError> {
        debug!("🔍 Validating block #{} ({} txs)", ctx.height, txs.len());

        let snapshot = {
            let txs = Arc::clone(&txs);
            tokio::task::spawn_blocking(move || UtxoSnapshot::capture(store.as_ref(), &txs))
                .await
                .map_err(|e| BlockValidationError::Task(e.to_string()))??
        };
        let snapshot = Arc::new(snapshot);
        let cancel = Arc::new(AtomicBool::new(false));

        let mut tasks = JoinSet::new();
        for tx_index in 0..txs.len() {
            let validator = self.validator.clone();
            let txs = Arc::clone(&txs);
            let view = snapshot.view(tx_index);
            let cancel = Arc::clone(&cancel);
            tasks.spawn_blocking(move || {
                let result = validator.validate_cancellable(&txs[tx_index], &ctx, &view, &cancel);
                if !result.accepted && !result.is_cancelled() {
                    cancel.store(true, Ordering::Relaxed);
                }
                (tx_index, result)
            });
        }

        let mut results: Vec<Option<TxValidationResult>> = vec![None; txs.len()];
        while let Some(joined) = tasks.join_next().await {
            let (tx_index, result) =
                joined.map_err(|e| BlockValidationError::Task(e.to_string()))?;
            results[tx_index] = Some(result);
        }

        let mut accepted = Vec::with_capacity(txs.len());
        for (tx_index, slot) in results.into_iter().enumerate() {
            let mut result = slot.ok_or_else(|| {
                BlockValidationError::Task(format!("no result for transaction {}", tx_index))
            })?;

            // Cancelled before a real failure: finish it to keep reporting deterministic
            if result.is_cancelled() {
                let validator = self.validator.clone();
                let txs = Arc::clone(&txs);
                let view = snapshot.view(tx_index);
                result = tokio::task::spawn_blocking(move || {
                    validator.validate(&txs[tx_index], &ctx, &view)
                })
                .await
                .map_err(|e| BlockValidationError::Task(e.to_string()))?;
            }

            if !result.accepted {
                let txid = txs[tx_index].txid();
                warn!("❌ Block #{} rejected at tx {} ({})", ctx.height, tx_index, txid);
                return Err(BlockValidationError::Rejected {
                    tx_index,
                    txid,
                    result,
                });
            }
            accepted.push(result);
        }

        debug!("✅ Block #{} valid", ctx.height);
        Ok(accepted)
    }

    /// Validate, then atomically apply the block to `store`
    pub async fn connect_block(
        &self,
        ctx: ChainContext,
        txs: Arc<[Transaction]>,
        store: Arc<dyn UtxoStore>,
    ) -> Result<ConnectedBlock, BlockValidationError> {
        let results = self
            .validate_block(ctx, Arc::clone(&txs), Arc::clone(&store))
            .await?;

        let (spends, creates) = block_delta(&txs);
        let (spent, created) = (spends.len(), creates.len());

        tokio::task::spawn_blocking(move || store.apply_block(ctx.height, &spends, &creates))
            .await
            .map_err(|e| BlockValidationError::Task(e.to_string()))??;

        let migrations = results.iter().filter(|r| r.turnstile.is_some()).count();
        info!(
            "📦 Block #{} connected: {} txs, {} turnstile migrations",
            ctx.height,
            results.len(),
            migrations
        );

        Ok(ConnectedBlock {
            results,
            spent,
            created,
        })
    }
}

/// Net UTXO changes of a block
///
/// Outputs created and spent inside the same block never reach the store.
pub fn block_delta(txs: &[Transaction]) -> (Vec<OutPoint>, Vec<(OutPoint, Output)>) {
    let created: Vec<(OutPoint, Output)> =
        txs.iter().flat_map(Transaction::created_outputs).collect();
    let created_ids: HashSet<OutPoint> = created.iter().map(|(op, _)| *op).collect();

    let mut consumed = HashSet::new();
    let mut spends = Vec::new();
    for input in txs.iter().flat_map(|tx| tx.inputs.iter()) {
        if created_ids.contains(&input.prevout) {
            consumed.insert(input.prevout);
        } else {
            spends.push(input.prevout);
        }
    }

    let creates = created
        .into_iter()
        .filter(|(op, _)| !consumed.contains(op))
        .collect();
    (spends, creates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::templates;
    use crate::types::{TxIn, TxOut};

    #[test]
    fn test_block_delta_nets_out_in_block_spends() {
        let funding = OutPoint::new(Hash::hash(b"funding"), 0);
        let parent = Transaction::new(
            vec![TxIn::new(funding, vec![])],
            vec![
                TxOut::new(5, templates::p2pkh(&[1; 20])),
                TxOut::new(5, templates::p2pkh(&[2; 20])),
            ],
        );
        let child = Transaction::new(
            vec![TxIn::new(OutPoint::new(parent.txid(), 0), vec![])],
            vec![TxOut::new(5, templates::p2qpkh(&[3; 20]))],
        );

        let (spends, creates) = block_delta(&[parent.clone(), child.clone()]);
        assert_eq!(spends, vec![funding]);
        assert_eq!(creates.len(), 2);
        assert!(creates.iter().any(|(op, _)| *op == OutPoint::new(parent.txid(), 1)));
        assert!(creates.iter().any(|(op, _)| *op == OutPoint::new(child.txid(), 0)));
    }

    #[test]
    fn test_block_delta_keeps_creation_order() {
        let txs: Vec<Transaction> = (0..50u32)
            .map(|i| {
                Transaction::new(
                    vec![TxIn::new(OutPoint::new(Hash::hash(&i.to_le_bytes()), 0), vec![])],
                    vec![TxOut::new(1, templates::p2pkh(&[i as u8; 20]))],
                )
            })
            .collect();

        let (spends, creates) = block_delta(&txs);
        assert_eq!(spends.len(), 50);
        let expected: Vec<OutPoint> = txs.iter().map(|tx| OutPoint::new(tx.txid(), 0)).collect();
        let actual: Vec<OutPoint> = creates.iter().map(|(op, _)| *op).collect();
        assert_eq!(actual, expected);
    }
}
