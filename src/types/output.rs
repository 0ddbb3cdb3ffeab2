// Output - Unspent outputs and their address class
use super::primitives::Amount;
use crate::script::classifier::classify;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cryptographic class of an output, derived from its locking script
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AddressClass {
    /// Secured by the pre-existing elliptic-curve scheme
    #[serde(rename = "LegacyECC")]
    LegacyEcc,
    /// Secured by a post-quantum scheme
    QuantumResistant,
    /// Requires both a legacy and a post-quantum signature
    Hybrid,
    /// Unrecognized script: never spendable under any migration rule
    Unknown,
}

impl AddressClass {
    /// Classes that the activation ledger must cover
    pub const SPENDABLE: [AddressClass; 3] = [
        AddressClass::LegacyEcc,
        AddressClass::QuantumResistant,
        AddressClass::Hybrid,
    ];

    pub fn is_spendable(&self) -> bool {
        !matches!(self, AddressClass::Unknown)
    }
}

impl fmt::Display for AddressClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AddressClass::LegacyEcc => "LegacyECC",
            AddressClass::QuantumResistant => "QuantumResistant",
            AddressClass::Hybrid => "Hybrid",
            AddressClass::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Unspent output as seen by the validator
///
/// The class is computed once when the output is built and cannot be
/// changed afterwards: fields are private and there is no setter. On
/// deserialization the class is recomputed from the script, which yields
/// the same value because classification is a pure function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOutput", into = "RawOutput")]
pub struct Output {
    value: Amount,
    locking_script: Vec<u8>,
    class: AddressClass,
}

impl Output {
    pub fn new(value: Amount, locking_script: Vec<u8>) -> Self {
        let class = classify(&locking_script);
        Self {
            value,
            locking_script,
            class,
        }
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn locking_script(&self) -> &[u8] {
        &self.locking_script
    }

    pub fn class(&self) -> AddressClass {
        self.class
    }
}

/// Forme sérialisée (la classe n'est pas persistée)
#[derive(Serialize, Deserialize)]
struct RawOutput {
    value: Amount,
    locking_script: Vec<u8>,
}

impl From<RawOutput> for Output {
    fn from(raw: RawOutput) -> Self {
        Output::new(raw.value, raw.locking_script)
    }
}

impl From<Output> for RawOutput {
    fn from(output: Output) -> Self {
        RawOutput {
            value: output.value,
            locking_script: output.locking_script,
        }
    }
}
