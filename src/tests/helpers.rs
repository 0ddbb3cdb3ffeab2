// Test helpers - Keys, fixtures and a deterministic QR verifier

use crate::consensus::ConsensusValidator;
use crate::crypto::{Ed25519Verifier, SchemeKind, SignatureSchemeRegistry, SignatureVerifier};
use crate::params::deployments::two_phase_schedule;
use crate::params::{ChainParams, Network};
use crate::script::{hash160, qhash160, templates, ScriptBuilder, ScriptLimits};
use crate::types::{
    encode_qr_key, Amount, Hash, Height, OutPoint, Output, QrAuthorization, SchemeId, Transaction,
    TxIn, TxOut, COIN,
};
use ed25519_dalek::{Signer, SigningKey};
use std::sync::Arc;

/// Height of the turnstile in the test schedule
pub const TURNSTILE_HEIGHT: Height = 680_000;

/// Scheme id of the test QR verifier
pub const QR_TEST: SchemeId = SchemeId(0x42);

/// Accepts signature == blake3(key || message)
///
/// Stands in for post-quantum math: deterministic, cheap, and impossible
/// to satisfy without knowing the exact key and message.
pub struct HashVerifier;

impl SignatureVerifier for HashVerifier {
    fn verify(&self, pubkey: &[u8], signature: &[u8], message: &[u8]) -> bool {
        signature == hash_sign(pubkey, message).as_slice()
    }

    fn name(&self) -> &'static str {
        "hash-test"
    }
}

fn hash_sign(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut data = key.to_vec();
    data.extend_from_slice(message);
    blake3::hash(&data).as_bytes().to_vec()
}

pub fn registry() -> Arc<SignatureSchemeRegistry> {
    Arc::new(
        SignatureSchemeRegistry::builder()
            .register(SchemeId::ED25519, SchemeKind::Legacy, Arc::new(Ed25519Verifier))
            .unwrap()
            .register(QR_TEST, SchemeKind::QuantumResistant, Arc::new(HashVerifier))
            .unwrap()
            .build(),
    )
}

pub fn params() -> ChainParams {
    ChainParams {
        network: Network::Regtest,
        deployments: two_phase_schedule(TURNSTILE_HEIGHT),
        legacy_scheme: SchemeId::ED25519,
        qr_schemes: vec![QR_TEST],
        script_limits: ScriptLimits::default(),
    }
}

pub fn validator() -> ConsensusValidator {
    ConsensusValidator::new(&params(), registry()).unwrap()
}

pub fn coins(whole: u64, tenths: u64) -> Amount {
    whole * COIN + tenths * COIN / 10
}

pub fn outpoint(seed: &str) -> OutPoint {
    OutPoint::new(Hash::hash(seed.as_bytes()), 0)
}

/// Ed25519 key owning P2PKH outputs
pub struct LegacyKey(SigningKey);

impl LegacyKey {
    pub fn new(seed: u8) -> Self {
        LegacyKey(SigningKey::from_bytes(&[seed; 32]))
    }

    pub fn pubkey(&self) -> [u8; 32] {
        self.0.verifying_key().to_bytes()
    }

    pub fn script(&self) -> Vec<u8> {
        templates::p2pkh(&hash160(&self.pubkey()))
    }

    pub fn output(&self, value: Amount) -> Output {
        Output::new(value, self.script())
    }

    pub fn txout(&self, value: Amount) -> TxOut {
        TxOut::new(value, self.script())
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.0.sign(message).to_bytes().to_vec()
    }

    /// Fill input `index` with `<sig> <pubkey>`
    pub fn sign_input(&self, tx: &mut Transaction, index: usize) {
        let message = tx.signing_message(index).unwrap();
        tx.inputs[index].unlocking_script = ScriptBuilder::new()
            .push_slice(&self.sign(&message))
            .push_slice(&self.pubkey())
            .into_bytes()
            .unwrap();
    }
}

/// Test-scheme key owning P2QPKH outputs
pub struct QrKey(Vec<u8>);

impl QrKey {
    pub fn new(seed: u8) -> Self {
        QrKey(vec![seed; 1_024])
    }

    /// Key element as it appears on the stack (`scheme_id || key`)
    pub fn element(&self) -> Vec<u8> {
        encode_qr_key(QR_TEST, &self.0)
    }

    pub fn script(&self) -> Vec<u8> {
        templates::p2qpkh(&qhash160(&self.element()))
    }

    pub fn output(&self, value: Amount) -> Output {
        Output::new(value, self.script())
    }

    pub fn txout(&self, value: Amount) -> TxOut {
        TxOut::new(value, self.script())
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        hash_sign(&self.0, message)
    }

    /// Fill input `index` with `<qsig> <element>`
    pub fn sign_input(&self, tx: &mut Transaction, index: usize) {
        let message = tx.signing_message(index).unwrap();
        tx.inputs[index].unlocking_script = ScriptBuilder::new()
            .push_slice(&self.sign(&message))
            .push_slice(&self.element())
            .into_bytes()
            .unwrap();
    }

    /// Authorize output `output_index` of `tx` as its new owner
    pub fn authorize(&self, tx: &mut Transaction, output_index: u32) {
        let message = tx.qr_authorization_message(output_index).unwrap();
        tx.qr_authorizations.push(QrAuthorization {
            output_index,
            pubkey: self.element(),
            signature: self.sign(&message),
        });
    }
}

/// Unsigned transaction spending `prevouts`
pub fn unsigned(prevouts: &[OutPoint], outputs: Vec<TxOut>) -> Transaction {
    Transaction::new(
        prevouts.iter().map(|op| TxIn::new(*op, vec![])).collect(),
        outputs,
    )
}
