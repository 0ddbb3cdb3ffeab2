// Script - Locking/unlocking scripts extended with quantum-resistant opcodes
// Principle: closed instruction set, explicit capability lookup

pub mod classifier;
pub mod interpreter;
pub mod opcodes;
pub mod templates;

pub use classifier::classify;
pub use interpreter::{ExecutionTrace, ScriptEvaluator};
pub use opcodes::{parse_script, Instruction, Opcode, ScriptBuilder};

use serde::{Deserialize, Serialize};
use templates::SHORT_HASH_LEN;

const HASH160_CONTEXT: &str = "turnstile 2024-06 legacy public key hash160";
const QHASH160_CONTEXT: &str = "turnstile 2024-06 quantum-resistant public key hash160";

/// Short hash used by legacy pay-to-hash templates
pub fn hash160(data: &[u8]) -> [u8; SHORT_HASH_LEN] {
    truncate(blake3::derive_key(HASH160_CONTEXT, data))
}

/// Short hash of a quantum-resistant key element (`scheme_id || key`)
///
/// Same construction as `hash160`, separate context.
pub fn qhash160(data: &[u8]) -> [u8; SHORT_HASH_LEN] {
    truncate(blake3::derive_key(QHASH160_CONTEXT, data))
}

fn truncate(digest: [u8; 32]) -> [u8; SHORT_HASH_LEN] {
    let mut out = [0u8; SHORT_HASH_LEN];
    out.copy_from_slice(&digest[..SHORT_HASH_LEN]);
    out
}

/// Script resource limits (external configuration)
///
/// Defaults are raised over legacy values so that post-quantum keys and
/// signatures (several KB each) fit in one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLimits {
    pub max_script_size: usize,
    pub max_element_size: usize,
    pub max_stack_size: usize,
    pub max_ops: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_script_size: 20_000,
            max_element_size: 8_192,
            max_stack_size: 1_000,
            max_ops: 201,
        }
    }
}

/// Script evaluation failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ScriptError {
    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Stack overflow (max {max})")]
    StackOverflow { max: usize },

    #[error("Unknown opcode 0x{0:02x}")]
    UnknownOpcode(u8),

    #[error("Malformed push")]
    BadPush,

    #[error("Script size {size} exceeds {max}")]
    ScriptSize { size: usize, max: usize },

    #[error("Element size {size} exceeds {max}")]
    PushSize { size: usize, max: usize },

    #[error("Too many opcodes (max {max})")]
    OpCount { max: usize },

    #[error("Unlocking script is not push-only")]
    UnlockingNotPushOnly,

    #[error("OP_RETURN executed")]
    OpReturn,

    #[error("OP_VERIFY failed")]
    VerifyFailed,

    #[error("OP_EQUALVERIFY failed")]
    EqualVerifyFailed,

    #[error("OP_CHECKSIGVERIFY failed")]
    CheckSigVerifyFailed,

    #[error("OP_CHECK_QSIGVERIFY failed")]
    CheckQSigVerifyFailed,

    #[error("Script evaluated to false")]
    EvalFalse,
}

impl ScriptError {
    /// Failure caused by a signature that did not verify
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            ScriptError::EvalFalse
                | ScriptError::CheckSigVerifyFailed
                | ScriptError::CheckQSigVerifyFailed
        )
    }
}
