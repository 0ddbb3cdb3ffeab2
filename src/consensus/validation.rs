// Validation - Consensus validation of a single transaction
//
// Fixed evaluation order, first failure wins:
//   1. structure (inputs, outputs, duplicate prevouts, value ranges)
//   2. lock-time finality
//   3. each input in index order: lookup, class, active phase, script
//   4. fee, then the turnstile invariant if any legacy input is governed
//      by a TurnstileRequired phase
//
// Every path returns a TxValidationResult; nothing here panics on input.

use super::binding::{KeyHashBinding, MigrationBindingPolicy};
use super::turnstile::{TurnstileInput, TurnstileRecord, TurnstileValidator};
use crate::activation::{ActivationLedger, EnforcementRule};
use crate::crypto::{SchemeKind, SignatureSchemeRegistry};
use crate::params::{ChainParams, ConfigError};
use crate::script::{ScriptError, ScriptEvaluator, ScriptLimits};
use crate::storage::UtxoView;
use crate::types::{
    money_range, AddressClass, Amount, ChainContext, SchemeId, Transaction, LOCKTIME_THRESHOLD,
    SEQUENCE_FINAL,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a transaction was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail")]
pub enum RejectReason {
    #[error("Transaction has no inputs")]
    EmptyInputs,

    #[error("Transaction has no outputs")]
    EmptyOutputs,

    #[error("Outpoint spent twice in one transaction")]
    DuplicateInput,

    #[error("Value out of range")]
    ValueOutOfRange,

    #[error("Spent output not found")]
    MissingInput,

    #[error("Spent output has an unknown class")]
    UnknownOutputClass,

    #[error("Transaction is not final")]
    NonFinal,

    #[error("Transaction cannot be serialized for signing")]
    Unserializable,

    #[error("Script failed: {0}")]
    ScriptFailed(ScriptError),

    #[error("Legacy input lacks a valid legacy signature")]
    MissingLegacySignature,

    #[error("No valid quantum-resistant signature authorizes a new QR output")]
    MissingQRSignature,

    #[error("QR outputs do not cover migrated legacy value")]
    InsufficientQROutput,

    #[error("Outputs exceed inputs")]
    NegativeFee,

    #[error("UTXO store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Validation cancelled")]
    Cancelled,
}

impl RejectReason {
    /// False for reasons that say nothing about the transaction itself
    pub fn is_consensus(&self) -> bool {
        !matches!(self, RejectReason::StoreUnavailable(_) | RejectReason::Cancelled)
    }
}

/// Outcome of validating one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxValidationResult {
    pub accepted: bool,
    pub reason: Option<RejectReason>,
    /// First failing input, when the failure is attributable to one
    pub input_index: Option<usize>,
    /// Migration accounting for accepted turnstile transactions
    pub turnstile: Option<TurnstileRecord>,
}

impl TxValidationResult {
    pub fn accept(turnstile: Option<TurnstileRecord>) -> Self {
        Self {
            accepted: true,
            reason: None,
            input_index: None,
            turnstile,
        }
    }

    pub fn reject(reason: RejectReason, input_index: Option<usize>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
            input_index,
            turnstile: None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.reason == Some(RejectReason::Cancelled)
    }
}

/// Transaction validator
///
/// Holds only immutable, shared state; clones are cheap and can be moved
/// into worker tasks.
#[derive(Clone)]
pub struct ConsensusValidator {
    ledger: Arc<ActivationLedger>,
    registry: Arc<SignatureSchemeRegistry>,
    limits: Arc<ScriptLimits>,
    legacy_scheme: SchemeId,
    binding: Arc<dyn MigrationBindingPolicy>,
}

impl ConsensusValidator {
    /// Build from chain parameters, refusing any inconsistent configuration
    pub fn new(
        params: &ChainParams,
        registry: Arc<SignatureSchemeRegistry>,
    ) -> Result<Self, ConfigError> {
        let ledger = ActivationLedger::new(&params.deployments)?;

        registry.require(params.legacy_scheme, SchemeKind::Legacy)?;
        for scheme in &params.qr_schemes {
            registry.require(*scheme, SchemeKind::QuantumResistant)?;
        }

        let limits = &params.script_limits;
        if limits.max_script_size == 0
            || limits.max_element_size == 0
            || limits.max_stack_size == 0
            || limits.max_ops == 0
        {
            return Err(ConfigError::ScriptLimits(format!(
                "all limits must be non-zero: {:?}",
                limits
            )));
        }
        if limits.max_element_size > limits.max_script_size {
            return Err(ConfigError::ScriptLimits(format!(
                "max_element_size {} exceeds max_script_size {}",
                limits.max_element_size, limits.max_script_size
            )));
        }

        info!(
            "⚙️  Consensus validator ready: network={} phases={} schemes={}",
            params.network,
            params.deployments.len(),
            registry.len()
        );

        Ok(Self {
            ledger: Arc::new(ledger),
            registry,
            limits: Arc::new(limits.clone()),
            legacy_scheme: params.legacy_scheme,
            binding: Arc::new(KeyHashBinding),
        })
    }

    /// Replace the default key-hash binding policy
    pub fn with_binding_policy(mut self, binding: Arc<dyn MigrationBindingPolicy>) -> Self {
        self.binding = binding;
        self
    }

    pub fn ledger(&self) -> &ActivationLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &SignatureSchemeRegistry {
        &self.registry
    }

    /// Validate `tx` for inclusion at `ctx`
    pub fn validate(
        &self,
        tx: &Transaction,
        ctx: &ChainContext,
        utxos: &dyn UtxoView,
    ) -> TxValidationResult {
        self.validate_cancellable(tx, ctx, utxos, &AtomicBool::new(false))
    }

    /// Same as `validate`, giving up between inputs once `cancel` is set
    pub fn validate_cancellable(
        &self,
        tx: &Transaction,
        ctx: &ChainContext,
        utxos: &dyn UtxoView,
        cancel: &AtomicBool,
    ) -> TxValidationResult {
        let result = match self.run(tx, ctx, utxos, cancel) {
            Ok(turnstile) => TxValidationResult::accept(turnstile),
            Err((reason, input_index)) => TxValidationResult::reject(reason, input_index),
        };

        match &result.reason {
            None => debug!("✅ Tx {} valid at #{}", tx.txid(), ctx.height),
            Some(RejectReason::Cancelled) => {
                debug!("Tx {} validation cancelled", tx.txid())
            }
            Some(reason) => warn!(
                "❌ Tx {} rejected at #{}: {} (input {:?})",
                tx.txid(),
                ctx.height,
                reason,
                result.input_index
            ),
        }
        result
    }

    fn run(
        &self,
        tx: &Transaction,
        ctx: &ChainContext,
        utxos: &dyn UtxoView,
        cancel: &AtomicBool,
    ) -> Result<Option<TurnstileRecord>, (RejectReason, Option<usize>)> {
        // 1. Structure
        if tx.inputs.is_empty() {
            return Err((RejectReason::EmptyInputs, None));
        }
        if tx.outputs.is_empty() {
            return Err((RejectReason::EmptyOutputs, None));
        }
        let mut seen = HashSet::with_capacity(tx.inputs.len());
        for (index, input) in tx.inputs.iter().enumerate() {
            if !seen.insert(input.prevout) {
                return Err((RejectReason::DuplicateInput, Some(index)));
            }
        }
        let total_out = tx
            .output_total()
            .filter(|total| money_range(*total))
            .ok_or((RejectReason::ValueOutOfRange, None))?;
        if tx.outputs.iter().any(|out| !money_range(out.value)) {
            return Err((RejectReason::ValueOutOfRange, None));
        }

        // 2. Finality
        if !is_final(tx, ctx) {
            return Err((RejectReason::NonFinal, None));
        }

        // 3. Inputs, in declared order
        let evaluator = ScriptEvaluator::new(&self.registry, &self.limits, self.legacy_scheme);
        let mut total_in: Amount = 0;
        let mut governed = Vec::new();

        for (index, input) in tx.inputs.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                return Err((RejectReason::Cancelled, Some(index)));
            }

            let spent = utxos
                .lookup(&input.prevout)
                .map_err(|e| (RejectReason::StoreUnavailable(e.to_string()), Some(index)))?
                .ok_or((RejectReason::MissingInput, Some(index)))?;

            if !money_range(spent.value()) {
                return Err((RejectReason::ValueOutOfRange, Some(index)));
            }
            total_in = total_in
                .checked_add(spent.value())
                .filter(|total| money_range(*total))
                .ok_or((RejectReason::ValueOutOfRange, Some(index)))?;

            let class = spent.class();
            if !class.is_spendable() {
                return Err((RejectReason::UnknownOutputClass, Some(index)));
            }
            let phase = self
                .ledger
                .active_phase(class, ctx.height)
                .ok_or((RejectReason::UnknownOutputClass, Some(index)))?;
            let turnstile =
                class == AddressClass::LegacyEcc && phase.rule == EnforcementRule::TurnstileRequired;
            debug!(
                "Input {} spends {} ({}) under {}",
                index, input.prevout, class, phase
            );

            let message = tx
                .signing_message(index)
                .ok_or((RejectReason::Unserializable, Some(index)))?;

            match evaluator.verify_input(&input.unlocking_script, spent.locking_script(), &message)
            {
                Ok(trace) => {
                    if turnstile {
                        governed.push(TurnstileInput {
                            index,
                            value: spent.value(),
                            legacy_signature: trace.legacy_sigs_verified > 0,
                        });
                    }
                }
                Err(e) if turnstile && e.is_signature_failure() => {
                    return Err((RejectReason::MissingLegacySignature, Some(index)));
                }
                Err(e) => return Err((RejectReason::ScriptFailed(e), Some(index))),
            }
        }

        // 4. Value conservation
        if total_out > total_in {
            return Err((RejectReason::NegativeFee, None));
        }
        if governed.is_empty() {
            return Ok(None);
        }

        TurnstileValidator::new(&self.registry, self.binding.as_ref())
            .check(tx, &governed, total_in)
            .map(Some)
    }
}

/// Lock-time finality at the given chain context
pub fn is_final(tx: &Transaction, ctx: &ChainContext) -> bool {
    if tx.lock_time == 0 {
        return true;
    }
    let cutoff = if tx.lock_time < LOCKTIME_THRESHOLD {
        ctx.height
    } else {
        ctx.time
    };
    if u64::from(tx.lock_time) < cutoff {
        return true;
    }
    tx.inputs.iter().all(|input| input.sequence == SEQUENCE_FINAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Hash, OutPoint, TxIn, TxOut};

    fn tx_with_lock(lock_time: u32, sequence: u32) -> Transaction {
        let mut input = TxIn::new(OutPoint::new(Hash::hash(b"p"), 0), vec![]);
        input.sequence = sequence;
        let mut tx = Transaction::new(vec![input], vec![TxOut::new(1, vec![0x51])]);
        tx.lock_time = lock_time;
        tx
    }

    #[test]
    fn test_finality_by_height() {
        let ctx = ChainContext::new(100, 1_700_000_000);
        assert!(is_final(&tx_with_lock(0, 0), &ctx));
        assert!(is_final(&tx_with_lock(99, 0), &ctx));
        assert!(!is_final(&tx_with_lock(100, 0), &ctx));
        assert!(is_final(&tx_with_lock(100, SEQUENCE_FINAL), &ctx));
    }

    #[test]
    fn test_finality_by_time() {
        let ctx = ChainContext::new(100, 1_700_000_000);
        assert!(is_final(&tx_with_lock(1_600_000_000, 0), &ctx));
        assert!(!is_final(&tx_with_lock(1_800_000_000, 0), &ctx));
    }

    #[test]
    fn test_reject_reason_serialization() {
        let reason = RejectReason::ScriptFailed(ScriptError::EvalFalse);
        let json = serde_json::to_string(&reason).unwrap();
        assert!(json.contains("ScriptFailed"));
        assert_eq!(serde_json::from_str::<RejectReason>(&json).unwrap(), reason);

        let json = serde_json::to_string(&RejectReason::InsufficientQROutput).unwrap();
        assert_eq!(json, r#"{"reason":"InsufficientQROutput"}"#);
    }

    #[test]
    fn test_raised_cancel_flag_stops_before_first_input() {
        use crate::storage::MemoryUtxoStore;
        use crate::tests::helpers::{validator, LegacyKey};

        let alice = LegacyKey::new(1);
        let prevout = OutPoint::new(Hash::hash(b"p"), 0);
        let store = MemoryUtxoStore::with_outputs([(prevout, alice.output(10))]);
        let mut tx = Transaction::new(vec![TxIn::new(prevout, vec![])], vec![alice.txout(9)]);
        alice.sign_input(&mut tx, 0);
        let ctx = ChainContext::new(10, 0);
        let validator = validator();

        let cancelled = validator.validate_cancellable(&tx, &ctx, &store, &AtomicBool::new(true));
        assert!(!cancelled.accepted);
        assert!(cancelled.is_cancelled());
        assert_eq!(cancelled.input_index, Some(0));
        assert!(cancelled.turnstile.is_none());

        let finished = validator.validate_cancellable(&tx, &ctx, &store, &AtomicBool::new(false));
        assert!(finished.accepted, "{:?}", finished);

        // Structural failures are reported ahead of cancellation
        let mut empty = tx.clone();
        empty.outputs.clear();
        let result = validator.validate_cancellable(&empty, &ctx, &store, &AtomicBool::new(true));
        assert_eq!(result.reason, Some(RejectReason::EmptyOutputs));
    }

    #[test]
    fn test_non_consensus_reasons() {
        assert!(!RejectReason::Cancelled.is_consensus());
        assert!(!RejectReason::StoreUnavailable("io".into()).is_consensus());
        assert!(RejectReason::MissingQRSignature.is_consensus());
    }
}
