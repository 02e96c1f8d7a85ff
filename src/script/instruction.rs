/*
    Parsing of raw script bytes into opcodes and data pushes.
*/

use super::opcodes;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("push at offset {position} is missing its length prefix")]
    MissingPushLength { position: usize },
    #[error("push at offset {position} wants {expected} bytes but only {available} remain")]
    TruncatedPushData { position: usize, expected: usize, available: usize }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// A non-push opcode
    Op(u8),
    /// Data pushed by a push opcode (OP_0, direct push or OP_PUSHDATA1/2/4)
    Push(&'a [u8])
}

/// Iterator over the instructions of a script.
///
/// Yields an error once on malformed push data and stops afterwards.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    code: &'a [u8],
    pos: usize,
    done: bool
}

impl<'a> Instructions<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, pos: 0, done: false }
    }

    fn read_len(&mut self, width: usize, position: usize) -> Result<usize, ScriptError> {
        if self.code.len() - self.pos < width {
            return Err(ScriptError::MissingPushLength { position })
        }

        let mut le = [0u8; 4];
        le[..width].copy_from_slice(&self.code[self.pos..self.pos + width]);
        self.pos += width;
        Ok(u32::from_le_bytes(le) as usize)
    }

    fn next_instruction(&mut self) -> Result<Instruction<'a>, ScriptError> {
        let position = self.pos;
        let opcode = self.code[self.pos];
        self.pos += 1;

        let len = if opcode < opcodes::OP_PUSHDATA1.into_u8() {
            opcode as usize
        } else if opcode == opcodes::OP_PUSHDATA1.into_u8() {
            self.read_len(1, position)?
        } else if opcode == opcodes::OP_PUSHDATA2.into_u8() {
            self.read_len(2, position)?
        } else if opcode == opcodes::OP_PUSHDATA4.into_u8() {
            self.read_len(4, position)?
        } else {
            return Ok(Instruction::Op(opcode))
        };

        let available = self.code.len() - self.pos;
        if available < len {
            return Err(ScriptError::TruncatedPushData { position, expected: len, available })
        }

        let data = &self.code[self.pos..self.pos + len];
        self.pos += len;
        Ok(Instruction::Push(data))
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.code.len() {
            return None
        }

        let res = self.next_instruction();
        if res.is_err() {
            self.done = true;
        }
        Some(res)
    }
}
