/* 

    Script builder module.

*/

use super::Script;

#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub code: Vec<u8>
}

impl Builder {
    /// Return a new instance of self
    pub fn new() -> Self  {
        Self { code: Vec::new() }
    }

    /// Push an opcode into self
    pub fn push_opcode(mut self, opcode: Opcode) -> Self {
        self.code.push(opcode.into_u8());
        self
    }

    /**
        Push a slice of data into the code using the shortest
        push encoding for its length.
    */
    pub fn push_slice(mut self, slice: &[u8]) -> Self {
        let len = slice.len();
        if len < opcodes::OP_PUSHDATA1.into_u8() as usize {
            self.code.push(len as u8);
        } else if len <= 0xff {
            self.code.push(opcodes::OP_PUSHDATA1.into_u8());
            self.code.push(len as u8);
        } else if len <= 0xffff {
            self.code.push(opcodes::OP_PUSHDATA2.into_u8());
            self.code.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.code.push(opcodes::OP_PUSHDATA4.into_u8());
            self.code.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.code.extend_from_slice(slice);
        self
    }

    /// Convert self into a script
    pub fn into_script(self) -> Script {
        Script::new(self.code)
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    code: u8
}

impl Opcode {
    pub fn into_u8(self) -> u8 {
        self.code
    }
}

impl From<u8> for Opcode {
    fn from(code: u8) -> Self {
        Self { code }
    }
}

impl PartialEq<u8> for Opcode {
    fn eq(&self, other: &u8) -> bool {
        self.code == *other
    }
}

// Opcode constants
pub mod opcodes {
    use super::Opcode;

    /// Push an empty array onto the stack
    pub const OP_0: Opcode = Opcode {code: 0x00};
    /// Push the next 20 bytes as an array onto the stack
    pub const OP_PUSHBYTES_20: Opcode = Opcode {code: 0x14};
    /// Push the next 22 bytes as an array onto the stack
    pub const OP_PUSHBYTES_22: Opcode = Opcode {code: 0x16};
    /// Push the next 33 bytes as an array onto the stack
    pub const OP_PUSHBYTES_33: Opcode = Opcode {code: 0x21};
    /// Push the next 65 bytes as an array onto the stack
    pub const OP_PUSHBYTES_65: Opcode = Opcode {code: 0x41};
    /// Read the next byte as N; push the next N bytes as an array onto the stack
    pub const OP_PUSHDATA1: Opcode = Opcode {code: 0x4c};
    /// Read the next 2 bytes as N; push the next N bytes as an array onto the stack
    pub const OP_PUSHDATA2: Opcode = Opcode {code: 0x4d};
    /// Read the next 4 bytes as N; push the next N bytes as an array onto the stack
    pub const OP_PUSHDATA4: Opcode = Opcode {code: 0x4e};
    /// Push the number 1 onto the stack
    pub const OP_1: Opcode = Opcode {code: 0x51};
    /// Fail the script immediately
    pub const OP_RETURN: Opcode = Opcode {code: 0x6a};
    /// Duplicates the top stack item
    pub const OP_DUP: Opcode = Opcode {code: 0x76};
    /// Pushes 1 if the inputs are exactly equal, 0 otherwise
    pub const OP_EQUAL: Opcode = Opcode {code: 0x87};
    /// Returns success if the inputs are exactly equal, failure otherwise
    pub const OP_EQUALVERIFY: Opcode = Opcode {code: 0x88};
    /// Hashes the input twice: first with SHA-256 and then with RIPEMD-160
    pub const OP_HASH160: Opcode = Opcode {code: 0xa9};
    /// Pushes 1 if the signature is valid for the public key and transaction
    pub const OP_CHECKSIG: Opcode = Opcode {code: 0xac};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_slice_uses_minimal_encoding() {
        let cases: [(usize, &str); 6] = [
            (0, "00"),
            (20, "14"),
            (0x4b, "4b"),
            (0x4c, "4c4c"),
            (0xff, "4cff"),
            (0x100, "4d0001"),
        ];

        for (len, prefix) in cases.iter() {
            let script = Builder::new().push_slice(&vec![0xab; *len]).into_script();
            let expected_prefix = hex::decode(prefix).unwrap();
            assert_eq!(&script.as_bytes()[..expected_prefix.len()], &expected_prefix[..]);
            assert_eq!(script.len(), expected_prefix.len() + len);
        }
    }

    #[test]
    fn pushdata4_for_large_pushes() {
        let script = Builder::new().push_slice(&vec![0u8; 0x10000]).into_script();
        assert_eq!(&script.as_bytes()[..5], &[0x4e, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn opcodes_serialize_in_order() {
        let script = Builder::new()
            .push_opcode(opcodes::OP_DUP)
            .push_opcode(opcodes::OP_HASH160)
            .push_opcode(opcodes::OP_CHECKSIG)
            .into_script();
        assert_eq!(script.as_bytes(), &[0x76, 0xa9, 0xac]);
        assert!(opcodes::OP_EQUAL == 0x87);
    }
}
