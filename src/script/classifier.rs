// Output classifier - Locking script -> AddressClass
// Principle: total and fail-closed; unrecognized means Unknown, never a guess

use super::templates::{is_hybrid, is_p2pk, is_p2pkh, is_p2qpkh};
use crate::types::AddressClass;

/// Classify a locking script
///
/// Pure, deterministic and total. Classification never rejects anything
/// by itself; it only feeds phase resolution downstream.
pub fn classify(locking_script: &[u8]) -> AddressClass {
    if is_p2pkh(locking_script) || is_p2pk(locking_script) {
        AddressClass::LegacyEcc
    } else if is_p2qpkh(locking_script) {
        AddressClass::QuantumResistant
    } else if is_hybrid(locking_script) {
        AddressClass::Hybrid
    } else {
        AddressClass::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::templates;

    #[test]
    fn test_classify_templates() {
        assert_eq!(classify(&templates::p2pkh(&[1; 20])), AddressClass::LegacyEcc);
        assert_eq!(classify(&templates::p2pk(&[1; 32])), AddressClass::LegacyEcc);
        assert_eq!(classify(&templates::p2qpkh(&[1; 20])), AddressClass::QuantumResistant);
        assert_eq!(classify(&templates::hybrid(&[1; 20], &[2; 20])), AddressClass::Hybrid);
    }

    #[test]
    fn test_classify_fails_closed() {
        assert_eq!(classify(&[]), AddressClass::Unknown);
        assert_eq!(classify(&[0x51]), AddressClass::Unknown);

        // One byte off a valid template
        let mut script = templates::p2qpkh(&[1; 20]);
        script.push(0x61);
        assert_eq!(classify(&script), AddressClass::Unknown);

        let mut truncated = templates::p2pkh(&[1; 20]);
        truncated.pop();
        assert_eq!(classify(&truncated), AddressClass::Unknown);
    }

    #[test]
    fn test_classify_deterministic() {
        let script = templates::hybrid(&[9; 20], &[8; 20]);
        assert_eq!(classify(&script), classify(&script.clone()));
    }
}
