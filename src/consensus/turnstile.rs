// Turnstile - Value conservation for mandatory legacy -> QR migration
//
// Invoked once per transaction that spends at least one LegacyECC output
// under a TurnstileRequired phase. Checks, in this order:
//   1. fee = Σinputs − Σoutputs must not be negative        (NegativeFee)
//   2. every such legacy input proved a legacy signature    (MissingLegacySignature)
//   3. qrOut + fee >= legacyIn                              (InsufficientQROutput)
//   4. at least one valid QR signature authorizes a new
//      QR output under the binding policy                   (MissingQRSignature)
//
// The floor is an inequality: extra QR-class inputs, consolidation and
// over-funding of QR outputs are always legal.

use super::binding::MigrationBindingPolicy;
use super::validation::RejectReason;
use crate::crypto::{SchemeKind, SignatureSchemeRegistry};
use crate::types::{split_qr_key, AddressClass, Amount, QrAuthorization, Transaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Legacy input subject to mandatory migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnstileInput {
    pub index: usize,
    pub value: Amount,
    /// Script evaluation verified a legacy-scheme signature
    pub legacy_signature: bool,
}

/// Transaction-scoped migration accounting (derived, never persisted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnstileRecord {
    /// Σ values of turnstile-governed legacy inputs
    pub legacy_in: Amount,
    /// Σ values of QuantumResistant-class outputs
    pub qr_out: Amount,
    /// Σ inputs − Σ outputs
    pub fee: Amount,
}

impl TurnstileRecord {
    /// `qr_out + fee >= legacy_in`, computed without overflow
    pub fn satisfies_floor(&self) -> bool {
        self.qr_out as u128 + self.fee as u128 >= self.legacy_in as u128
    }
}

/// Rejection with the input it is attributed to
pub type TurnstileFailure = (RejectReason, Option<usize>);

pub struct TurnstileValidator<'a> {
    registry: &'a SignatureSchemeRegistry,
    binding: &'a dyn MigrationBindingPolicy,
}

impl<'a> TurnstileValidator<'a> {
    pub fn new(
        registry: &'a SignatureSchemeRegistry,
        binding: &'a dyn MigrationBindingPolicy,
    ) -> Self {
        Self { registry, binding }
    }

    /// Check the whole-transaction migration invariant
    ///
    /// `inputs` must be non-empty and in input order; value failures are
    /// attributed to the first of them.
    pub fn check(
        &self,
        tx: &Transaction,
        inputs: &[TurnstileInput],
        total_in: Amount,
    ) -> Result<TurnstileRecord, TurnstileFailure> {
        let anchor = inputs.first().map(|input| input.index);

        let total_out = tx
            .output_total()
            .ok_or((RejectReason::ValueOutOfRange, None))?;
        let fee = total_in
            .checked_sub(total_out)
            .ok_or((RejectReason::NegativeFee, None))?;

        if let Some(unsigned) = inputs.iter().find(|input| !input.legacy_signature) {
            return Err((RejectReason::MissingLegacySignature, Some(unsigned.index)));
        }

        let legacy_in = inputs
            .iter()
            .try_fold(0u64, |acc, input| acc.checked_add(input.value))
            .ok_or((RejectReason::ValueOutOfRange, anchor))?;

        let qr_out = tx
            .outputs
            .iter()
            .filter(|out| out.class() == AddressClass::QuantumResistant)
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
            .ok_or((RejectReason::ValueOutOfRange, None))?;

        let record = TurnstileRecord {
            legacy_in,
            qr_out,
            fee,
        };
        debug!(
            "Turnstile: legacy_in={} qr_out={} fee={}",
            record.legacy_in, record.qr_out, record.fee
        );

        if !record.satisfies_floor() {
            return Err((RejectReason::InsufficientQROutput, anchor));
        }

        if !tx
            .qr_authorizations
            .iter()
            .any(|auth| self.authorizes(tx, auth))
        {
            return Err((RejectReason::MissingQRSignature, anchor));
        }

        Ok(record)
    }

    /// One authorization: targets a QR output, is bound to it, and verifies
    fn authorizes(&self, tx: &Transaction, auth: &QrAuthorization) -> bool {
        let Some(output) = tx.outputs.get(auth.output_index as usize) else {
            return false;
        };
        if output.class() != AddressClass::QuantumResistant {
            return false;
        }
        if !self.binding.binds(auth, output) {
            debug!(
                "QR authorization for output {} not bound under '{}' policy",
                auth.output_index,
                self.binding.name()
            );
            return false;
        }
        let Some((scheme, key)) = split_qr_key(&auth.pubkey) else {
            return false;
        };
        let Some(message) = tx.qr_authorization_message(auth.output_index) else {
            return false;
        };
        self.registry.verify_kind(
            SchemeKind::QuantumResistant,
            scheme,
            key,
            &auth.signature,
            &message,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_is_inclusive() {
        let exact = TurnstileRecord {
            legacy_in: 500,
            qr_out: 490,
            fee: 10,
        };
        assert!(exact.satisfies_floor());

        let short = TurnstileRecord {
            legacy_in: 500,
            qr_out: 300,
            fee: 0,
        };
        assert!(!short.satisfies_floor());
    }

    #[test]
    fn test_floor_no_overflow() {
        let record = TurnstileRecord {
            legacy_in: u64::MAX,
            qr_out: u64::MAX,
            fee: u64::MAX,
        };
        assert!(record.satisfies_floor());
    }
}
