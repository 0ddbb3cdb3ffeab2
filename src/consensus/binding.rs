// Binding policy - Which QR authorization may vouch for which new output
//
// How a spent legacy input is tied to its destination QR output is a
// pluggable policy. The engine only fixes the value floor and the
// dual-signature requirement; this trait decides whether a given
// authorization is about a given output.

use crate::script::{qhash160, templates};
use crate::types::{QrAuthorization, TxOut};

/// Pluggable binding between a QR authorization and a created output
pub trait MigrationBindingPolicy: Send + Sync {
    /// Does `authorization` speak for `output`?
    fn binds(&self, authorization: &QrAuthorization, output: &TxOut) -> bool;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Embedded key-hash reference
///
/// The output must be a P2QPKH script whose embedded hash is the
/// QHASH160 of the authorizing key element.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyHashBinding;

impl MigrationBindingPolicy for KeyHashBinding {
    fn binds(&self, authorization: &QrAuthorization, output: &TxOut) -> bool {
        templates::qr_key_hash(&output.locking_script)
            .map_or(false, |embedded| embedded == qhash160(&authorization.pubkey))
    }

    fn name(&self) -> &'static str {
        "key-hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{encode_qr_key, SchemeId};

    #[test]
    fn test_key_hash_binding() {
        let element = encode_qr_key(SchemeId(0x42), &[1u8; 48]);
        let auth = QrAuthorization {
            output_index: 0,
            pubkey: element.clone(),
            signature: vec![],
        };

        let bound = TxOut::new(10, templates::p2qpkh(&qhash160(&element)));
        let other = TxOut::new(10, templates::p2qpkh(&[0u8; 20]));
        let legacy = TxOut::new(10, templates::p2pkh(&qhash160(&element)));

        assert!(KeyHashBinding.binds(&auth, &bound));
        assert!(!KeyHashBinding.binds(&auth, &other));
        assert!(!KeyHashBinding.binds(&auth, &legacy));
    }
}
