/*
    Locking scripts (scriptPubKeys) and redeem scripts.

    A script is kept as raw bytes. Instructions are parsed on demand,
    and the standard output patterns are recognised by exact byte layout.
*/

pub mod builder;
pub mod instruction;

pub use builder::{
    Builder as ScriptBuilder,
    Opcode,
    opcodes
};
pub use instruction::{
    Instruction,
    Instructions,
    ScriptError
};

use crate::hash;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Script {
    pub code: Vec<u8>
}

impl Script {
    /**
        Create a new instance of self
    */
    pub fn new(code: Vec<u8>) -> Self {
        Self {
            code
        }
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self::new(hex::decode(s)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /**
        Hash the script with Hash160
    */
    pub fn hash(&self) -> [u8; 20] {
        hash::hash160(&self.code)
    }

    pub fn instructions(&self) -> Instructions<'_> {
        Instructions::new(&self.code)
    }

    /**
        Re-serializes every data push with the shortest encoding
        for its length. Opcodes are copied as they are.

        Fails if a push has a truncated length prefix or payload.
    */
    pub fn canonicalize(&self) -> Result<Self, ScriptError> {
        let mut builder = ScriptBuilder::new();
        for ins in self.instructions() {
            builder = match ins? {
                Instruction::Op(op) => builder.push_opcode(Opcode::from(op)),
                Instruction::Push(data) => builder.push_slice(data)
            };
        }
        Ok(builder.into_script())
    }

    /// OP_HASH160 <20 bytes> OP_EQUAL
    pub fn is_p2sh(&self) -> bool {
        self.code.len() == 23
            && opcodes::OP_HASH160 == self.code[0]
            && opcodes::OP_PUSHBYTES_20 == self.code[1]
            && opcodes::OP_EQUAL == self.code[22]
    }

    /// OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    pub fn is_p2pkh(&self) -> bool {
        self.code.len() == 25
            && opcodes::OP_DUP == self.code[0]
            && opcodes::OP_HASH160 == self.code[1]
            && opcodes::OP_PUSHBYTES_20 == self.code[2]
            && opcodes::OP_EQUALVERIFY == self.code[23]
            && opcodes::OP_CHECKSIG == self.code[24]
    }

    /// OP_0 <20 bytes>
    pub fn is_witness_v0_keyhash(&self) -> bool {
        self.code.len() == 22
            && opcodes::OP_0 == self.code[0]
            && opcodes::OP_PUSHBYTES_20 == self.code[1]
    }

    /// The keyhash witness program pushed as a P2SH redeem script:
    /// <22 bytes: OP_0 <20 bytes>>
    pub fn is_witness_v0_nested_keyhash(&self) -> bool {
        self.code.len() == 23
            && opcodes::OP_PUSHBYTES_22 == self.code[0]
            && opcodes::OP_0 == self.code[1]
            && opcodes::OP_PUSHBYTES_20 == self.code[2]
    }

    /**
        Returns the public key of a bare <pubkey> OP_CHECKSIG script.

        Only direct 33 and 65 byte pushes match, so the script must
        already be canonical.
    */
    pub fn bare_checksig_pubkey(&self) -> Option<&[u8]> {
        let code = &self.code;
        if code.len() == 35
            && opcodes::OP_PUSHBYTES_33 == code[0]
            && opcodes::OP_CHECKSIG == code[34] {
            return Some(&code[1..34])
        }
        if code.len() == 67
            && opcodes::OP_PUSHBYTES_65 == code[0]
            && opcodes::OP_CHECKSIG == code[66] {
            //All 65 key bytes, prefix included, are what gets hashed
            return Some(&code[1..66])
        }
        None
    }

    /// P2SH script pub key
    /// OP_HASH160 <Hash160(self)> OP_EQUAL
    pub fn to_p2sh_script_pubkey(&self) -> Self {
        ScriptBuilder::new()
            .push_opcode(opcodes::OP_HASH160)
            .push_slice(&self.hash())
            .push_opcode(opcodes::OP_EQUAL)
            .into_script()
    }
}

impl From<Vec<u8>> for Script {
    fn from(code: Vec<u8>) -> Self {
        Self::new(code)
    }
}

impl From<&[u8]> for Script {
    fn from(code: &[u8]) -> Self {
        Self::new(code.to_vec())
    }
}

impl AsRef<[u8]> for Script {
    fn as_ref(&self) -> &[u8] {
        &self.code
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.code))
    }
}
