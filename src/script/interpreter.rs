// Interpreter - Stack machine for locking/unlocking scripts
//
// Evaluation order:
//   1. size limits on both scripts
//   2. unlocking script must be push-only
//   3. unlocking runs, then locking runs on the same stack
//   4. success iff the final top element is true
//
// Every failure is a ScriptError value; nothing here panics on input.

use super::opcodes::{parse_script, Instruction, Opcode};
use super::{hash160, qhash160, ScriptError, ScriptLimits};
use crate::crypto::{SchemeKind, SignatureSchemeRegistry};
use crate::types::{split_qr_key, SchemeId};
use tracing::trace;

/// What a successful evaluation proved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionTrace {
    /// Signatures verified by CHECKSIG / CHECKSIGVERIFY
    pub legacy_sigs_verified: u32,
    /// Signatures verified by CHECK_QSIG / CHECK_QSIGVERIFY
    pub qr_sigs_verified: u32,
    /// Non-push opcodes executed
    pub op_count: usize,
}

/// Script evaluator bound to the immutable registry and limits
pub struct ScriptEvaluator<'a> {
    registry: &'a SignatureSchemeRegistry,
    limits: &'a ScriptLimits,
    legacy_scheme: SchemeId,
}

type Stack = Vec<Vec<u8>>;

impl<'a> ScriptEvaluator<'a> {
    pub fn new(
        registry: &'a SignatureSchemeRegistry,
        limits: &'a ScriptLimits,
        legacy_scheme: SchemeId,
    ) -> Self {
        Self {
            registry,
            limits,
            legacy_scheme,
        }
    }

    /// Verify that `unlocking` satisfies `locking` for the given signing message
    pub fn verify_input(
        &self,
        unlocking: &[u8],
        locking: &[u8],
        message: &[u8],
    ) -> Result<ExecutionTrace, ScriptError> {
        for script in [unlocking, locking] {
            if script.len() > self.limits.max_script_size {
                return Err(ScriptError::ScriptSize {
                    size: script.len(),
                    max: self.limits.max_script_size,
                });
            }
        }

        let unlocking = parse_script(unlocking)?;
        if !unlocking.iter().all(Instruction::is_push) {
            return Err(ScriptError::UnlockingNotPushOnly);
        }
        let locking = parse_script(locking)?;

        let mut stack: Stack = Vec::new();
        let mut trace = ExecutionTrace::default();

        self.execute(&unlocking, &mut stack, &mut trace, message)?;
        self.execute(&locking, &mut stack, &mut trace, message)?;

        match stack.last() {
            Some(top) if cast_to_bool(top) => Ok(trace),
            _ => Err(ScriptError::EvalFalse),
        }
    }

    fn execute(
        &self,
        instructions: &[Instruction],
        stack: &mut Stack,
        trace: &mut ExecutionTrace,
        message: &[u8],
    ) -> Result<(), ScriptError> {
        for instruction in instructions {
            match instruction {
                Instruction::Push(data) => {
                    if data.len() > self.limits.max_element_size {
                        return Err(ScriptError::PushSize {
                            size: data.len(),
                            max: self.limits.max_element_size,
                        });
                    }
                    self.push(stack, data.clone())?;
                }
                Instruction::Op(op) => {
                    if !op.is_push() {
                        trace.op_count += 1;
                        if trace.op_count > self.limits.max_ops {
                            return Err(ScriptError::OpCount {
                                max: self.limits.max_ops,
                            });
                        }
                    }
                    self.step(*op, stack, trace, message)?;
                }
            }
        }
        Ok(())
    }

    fn step(
        &self,
        op: Opcode,
        stack: &mut Stack,
        trace: &mut ExecutionTrace,
        message: &[u8],
    ) -> Result<(), ScriptError> {
        match op {
            Opcode::SmallInt(n) => self.push(stack, vec![n])?,
            Opcode::Nop => {}
            Opcode::Verify => {
                if !cast_to_bool(&pop(stack)?) {
                    return Err(ScriptError::VerifyFailed);
                }
            }
            Opcode::Return => return Err(ScriptError::OpReturn),
            Opcode::Drop => {
                pop(stack)?;
            }
            Opcode::Dup => {
                let top = stack.last().cloned().ok_or(ScriptError::StackUnderflow)?;
                self.push(stack, top)?;
            }
            Opcode::Equal | Opcode::EqualVerify => {
                let a = pop(stack)?;
                let b = pop(stack)?;
                let equal = a == b;
                if op == Opcode::EqualVerify {
                    if !equal {
                        return Err(ScriptError::EqualVerifyFailed);
                    }
                } else {
                    self.push(stack, bool_bytes(equal))?;
                }
            }
            Opcode::Hash160 => {
                let data = pop(stack)?;
                self.push(stack, hash160(&data).to_vec())?;
            }
            Opcode::QHash160 => {
                let data = pop(stack)?;
                self.push(stack, qhash160(&data).to_vec())?;
            }
            Opcode::CheckSig | Opcode::CheckSigVerify => {
                let pubkey = pop(stack)?;
                let signature = pop(stack)?;
                let valid = self.registry.verify_kind(
                    SchemeKind::Legacy,
                    self.legacy_scheme,
                    &pubkey,
                    &signature,
                    message,
                );
                trace!("CHECKSIG -> {}", valid);
                if valid {
                    trace.legacy_sigs_verified += 1;
                }
                if op == Opcode::CheckSigVerify {
                    if !valid {
                        return Err(ScriptError::CheckSigVerifyFailed);
                    }
                } else {
                    self.push(stack, bool_bytes(valid))?;
                }
            }
            Opcode::CheckQSig | Opcode::CheckQSigVerify => {
                let qr_pubkey = pop(stack)?;
                let signature = pop(stack)?;
                let valid = match split_qr_key(&qr_pubkey) {
                    Some((scheme, key)) => self.registry.verify_kind(
                        SchemeKind::QuantumResistant,
                        scheme,
                        key,
                        &signature,
                        message,
                    ),
                    None => false,
                };
                trace!("CHECK_QSIG -> {}", valid);
                if valid {
                    trace.qr_sigs_verified += 1;
                }
                if op == Opcode::CheckQSigVerify {
                    if !valid {
                        return Err(ScriptError::CheckQSigVerifyFailed);
                    }
                } else {
                    self.push(stack, bool_bytes(valid))?;
                }
            }
        }
        Ok(())
    }

    fn push(&self, stack: &mut Stack, item: Vec<u8>) -> Result<(), ScriptError> {
        if stack.len() >= self.limits.max_stack_size {
            return Err(ScriptError::StackOverflow {
                max: self.limits.max_stack_size,
            });
        }
        stack.push(item);
        Ok(())
    }
}

fn pop(stack: &mut Stack) -> Result<Vec<u8>, ScriptError> {
    stack.pop().ok_or(ScriptError::StackUnderflow)
}

fn bool_bytes(value: bool) -> Vec<u8> {
    if value {
        vec![1]
    } else {
        Vec::new()
    }
}

/// Any non-zero byte is true, except a lone sign bit in the last byte
fn cast_to_bool(data: &[u8]) -> bool {
    for (i, &byte) in data.iter().enumerate() {
        if byte != 0 {
            return !(i == data.len() - 1 && byte == 0x80);
        }
    }
    false
}
