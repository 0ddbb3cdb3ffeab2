// Opcodes - Closed instruction set, parser and builder
use super::ScriptError;

/// Every opcode the evaluator understands
///
/// Push opcodes are represented by `Instruction::Push`; this enum only
/// lists the non-push instructions plus the small-integer pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// OP_1 .. OP_16 (value 1..=16)
    SmallInt(u8),
    Nop,
    Verify,
    Return,
    Drop,
    Dup,
    Equal,
    EqualVerify,
    Hash160,
    CheckSig,
    CheckSigVerify,
    /// Quantum-resistant signature check
    CheckQSig,
    /// Short hash of a quantum-resistant public key
    QHash160,
    CheckQSigVerify,
}

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_NOP: u8 = 0x61;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECK_QSIG: u8 = 0xc0;
pub const OP_QHASH160: u8 = 0xc1;
pub const OP_CHECK_QSIGVERIFY: u8 = 0xc2;

/// Largest push encodable with a single length byte opcode
const MAX_DIRECT_PUSH: u8 = 0x4b;

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        let op = match byte {
            OP_1..=OP_16 => Opcode::SmallInt(byte - OP_1 + 1),
            OP_NOP => Opcode::Nop,
            OP_VERIFY => Opcode::Verify,
            OP_RETURN => Opcode::Return,
            OP_DROP => Opcode::Drop,
            OP_DUP => Opcode::Dup,
            OP_EQUAL => Opcode::Equal,
            OP_EQUALVERIFY => Opcode::EqualVerify,
            OP_HASH160 => Opcode::Hash160,
            OP_CHECKSIG => Opcode::CheckSig,
            OP_CHECKSIGVERIFY => Opcode::CheckSigVerify,
            OP_CHECK_QSIG => Opcode::CheckQSig,
            OP_QHASH160 => Opcode::QHash160,
            OP_CHECK_QSIGVERIFY => Opcode::CheckQSigVerify,
            _ => return None,
        };
        Some(op)
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::SmallInt(n) => OP_1 + n.clamp(1, 16) - 1,
            Opcode::Nop => OP_NOP,
            Opcode::Verify => OP_VERIFY,
            Opcode::Return => OP_RETURN,
            Opcode::Drop => OP_DROP,
            Opcode::Dup => OP_DUP,
            Opcode::Equal => OP_EQUAL,
            Opcode::EqualVerify => OP_EQUALVERIFY,
            Opcode::Hash160 => OP_HASH160,
            Opcode::CheckSig => OP_CHECKSIG,
            Opcode::CheckSigVerify => OP_CHECKSIGVERIFY,
            Opcode::CheckQSig => OP_CHECK_QSIG,
            Opcode::QHash160 => OP_QHASH160,
            Opcode::CheckQSigVerify => OP_CHECK_QSIGVERIFY,
        }
    }

    /// Small-integer pushes count as push-only
    pub fn is_push(self) -> bool {
        matches!(self, Opcode::SmallInt(_))
    }
}

/// One decoded script instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Push(Vec<u8>),
    Op(Opcode),
}

impl Instruction {
    pub fn is_push(&self) -> bool {
        match self {
            Instruction::Push(_) => true,
            Instruction::Op(op) => op.is_push(),
        }
    }
}

/// Decode script bytes into instructions
///
/// Fails closed: a truncated push or unknown byte is an error, never a guess.
pub fn parse_script(script: &[u8]) -> Result<Vec<Instruction>, ScriptError> {
    let mut instructions = Vec::new();
    let mut pos = 0usize;

    while pos < script.len() {
        let byte = script[pos];
        pos += 1;

        let push_len = match byte {
            OP_0 => Some(0usize),
            1..=MAX_DIRECT_PUSH => Some(byte as usize),
            OP_PUSHDATA1 => {
                let len = *script.get(pos).ok_or(ScriptError::BadPush)?;
                pos += 1;
                Some(len as usize)
            }
            OP_PUSHDATA2 => {
                let bytes = script.get(pos..pos + 2).ok_or(ScriptError::BadPush)?;
                pos += 2;
                Some(u16::from_le_bytes([bytes[0], bytes[1]]) as usize)
            }
            _ => None,
        };

        match push_len {
            Some(len) => {
                let data = script.get(pos..pos + len).ok_or(ScriptError::BadPush)?;
                pos += len;
                instructions.push(Instruction::Push(data.to_vec()));
            }
            None => {
                let op = Opcode::from_byte(byte).ok_or(ScriptError::UnknownOpcode(byte))?;
                instructions.push(Instruction::Op(op));
            }
        }
    }

    Ok(instructions)
}

/// Incremental script serializer
///
/// An unencodable push is remembered and reported by `into_bytes`.
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
    error: Option<ScriptError>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal push encoding for `data`
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len <= MAX_DIRECT_PUSH as usize {
            self.bytes.push(len as u8);
        } else if len <= u8::MAX as usize {
            self.bytes.push(OP_PUSHDATA1);
            self.bytes.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.bytes.push(OP_PUSHDATA2);
            self.bytes.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.error.get_or_insert(ScriptError::PushSize {
                size: len,
                max: u16::MAX as usize,
            });
            return self;
        }
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn push_opcode(mut self, op: Opcode) -> Self {
        self.bytes.push(op.to_byte());
        self
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, ScriptError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.bytes),
        }
    }
}
