// Transaction - UTXO transactions and their signing messages
use super::output::{AddressClass, Output};
use super::primitives::{Amount, Hash, OutPoint};
use super::signature::{domain_separate, DOMAIN_QR_AUTHORIZATION, DOMAIN_SIGHASH};
use crate::script::classifier::classify;
use serde::{Deserialize, Serialize};

/// Sequence value that opts an input out of lock-time enforcement
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Lock times below this are heights, above are unix timestamps
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// Output being spent
    pub prevout: OutPoint,

    /// Unlocking script (push-only)
    pub unlocking_script: Vec<u8>,

    pub sequence: u32,
}

impl TxIn {
    pub fn new(prevout: OutPoint, unlocking_script: Vec<u8>) -> Self {
        Self {
            prevout,
            unlocking_script,
            sequence: SEQUENCE_FINAL,
        }
    }
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: Amount,
    pub locking_script: Vec<u8>,
}

impl TxOut {
    pub fn new(value: Amount, locking_script: Vec<u8>) -> Self {
        Self {
            value,
            locking_script,
        }
    }

    pub fn class(&self) -> AddressClass {
        classify(&self.locking_script)
    }

    /// UTXO entry created when this output is confirmed
    pub fn to_output(&self) -> Output {
        Output::new(self.value, self.locking_script.clone())
    }
}

/// Quantum-resistant signature authorizing a newly created QR output
///
/// Carried by turnstile transactions. `pubkey` uses the QR key element
/// encoding (`scheme_id || key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrAuthorization {
    pub output_index: u32,
    pub pubkey: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    #[serde(default)]
    pub qr_authorizations: Vec<QrAuthorization>,
}

/// Committed part of a transaction (everything a signature covers)
#[derive(Serialize)]
struct SigningPayload<'a> {
    version: u32,
    prevouts: Vec<(&'a OutPoint, u32)>,
    outputs: &'a [TxOut],
    lock_time: u32,
    index: u32,
}

impl Transaction {
    pub fn new(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
            qr_authorizations: Vec::new(),
        }
    }

    /// Transaction id
    ///
    /// Covers version, prevouts, sequences, outputs and lock time. Unlocking
    /// scripts and QR authorizations are left out, so attaching or altering
    /// them never changes the outpoints later transactions reference.
    pub fn txid(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            hasher.update(&input.prevout.to_key());
            hasher.update(&input.sequence.to_le_bytes());
        }
        hasher.update(&(self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            hasher.update(&output.value.to_le_bytes());
            hasher.update(&(output.locking_script.len() as u64).to_le_bytes());
            hasher.update(&output.locking_script);
        }
        hasher.update(&self.lock_time.to_le_bytes());
        Hash::from_bytes(*hasher.finalize().as_bytes())
    }

    fn payload(&self, index: u32) -> SigningPayload<'_> {
        SigningPayload {
            version: self.version,
            prevouts: self
                .inputs
                .iter()
                .map(|input| (&input.prevout, input.sequence))
                .collect(),
            outputs: &self.outputs,
            lock_time: self.lock_time,
            index,
        }
    }

    /// Message signed by the key owning input `input_index`
    ///
    /// Unlocking scripts and QR authorizations are not covered.
    pub fn signing_message(&self, input_index: usize) -> Option<Vec<u8>> {
        let index = u32::try_from(input_index).ok()?;
        let bytes = bincode::serialize(&self.payload(index)).ok()?;
        Some(domain_separate(DOMAIN_SIGHASH, &bytes))
    }

    /// Message signed by the owner of a new QR output (turnstile)
    pub fn qr_authorization_message(&self, output_index: u32) -> Option<Vec<u8>> {
        let bytes = bincode::serialize(&self.payload(output_index)).ok()?;
        Some(domain_separate(DOMAIN_QR_AUTHORIZATION, &bytes))
    }

    /// Outputs this transaction creates, keyed by outpoint
    pub fn created_outputs(&self) -> Vec<(OutPoint, Output)> {
        let txid = self.txid();
        self.outputs
            .iter()
            .enumerate()
            .map(|(vout, out)| (OutPoint::new(txid, vout as u32), out.to_output()))
            .collect()
    }

    /// Sum of output values, `None` on overflow
    pub fn output_total(&self) -> Option<Amount> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
    }
}
