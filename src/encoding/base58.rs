use crate::{
    bs58,
    hash
};
use std::fmt;
use thiserror::Error;

/// Number of checksum bytes appended to Base58Check data.
pub const CHECKSUM_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base58Error {
    #[error("invalid base58 character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("base58check data too short: {0} bytes")]
    TooShort(usize),
    #[error("checksum mismatch: expected {expected:?}, found {found:?}")]
    ChecksumMismatch { expected: [u8; 4], found: [u8; 4] },
    #[error("base58 decode failed: {0}")]
    Other(String)
}

/// The decoded form of a Base58Check string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionedPayload {
    pub version: u8,
    pub payload: Vec<u8>
}

impl VersionedPayload {
    pub fn new(version: u8, payload: &[u8]) -> Self {
        Self {
            version,
            payload: payload.to_vec()
        }
    }

    /// Check encode data by appending the checksum and then encoding it.
    pub fn check_encode(&self) -> String {
        //Concatenate: prefix | payload | checksum
        let mut bytes: Vec<u8> = Vec::with_capacity(1 + self.payload.len() + CHECKSUM_LEN);
        bytes.push(self.version);
        bytes.extend_from_slice(&self.payload);
        let checksum = checksum(&bytes);
        bytes.extend_from_slice(&checksum);

        encode_raw(&bytes)
    }

    /**
        Decodes a Base58Check string, verifies the checksum and splits
        off the version byte.
    */
    pub fn check_decode(encoded: &str) -> Result<Self, Base58Error> {
        let bytes = decode_raw(encoded)?;
        if bytes.len() < 1 + CHECKSUM_LEN {
            return Err(Base58Error::TooShort(bytes.len()))
        }

        let (data, found) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        let expected = checksum(data);
        if expected[..] != found[..] {
            let mut f = [0u8; 4];
            f.copy_from_slice(found);
            return Err(Base58Error::ChecksumMismatch { expected, found: f })
        }

        Ok(Self {
            version: data[0],
            payload: data[1..].to_vec()
        })
    }
}

impl fmt::Display for VersionedPayload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.check_encode())
    }
}

/// First four bytes of Sha256d(data)
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let digest = hash::sha256d(data);
    [digest[0], digest[1], digest[2], digest[3]]
}

/**
    Returns the Base58Check encoded value of version || payload.
*/
pub fn check_encode(version: u8, payload: &[u8]) -> String {
    VersionedPayload::new(version, payload).check_encode()
}

/**
    Decodes a Base58Check string into its version byte and payload.
*/
pub fn check_decode(encoded: &str) -> Result<VersionedPayload, Base58Error> {
    VersionedPayload::check_decode(encoded)
}

/**
    Encodes a given u8 slice into base 58 without a checksum.
    Every leading zero byte becomes a leading '1'.
*/
pub fn encode_raw(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/**
    Decodes a given Base58 string into a byte vector.
    Does NOT remove the checksum or version prefix if present.
*/
pub fn decode_raw(encoded: &str) -> Result<Vec<u8>, Base58Error> {
    bs58::decode(encoded).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => Base58Error::InvalidCharacter { character, index },
        bs58::decode::Error::NonAsciiCharacter { index } => Base58Error::InvalidCharacter {
            character: encoded.get(index..).and_then(|s| s.chars().next()).unwrap_or(char::REPLACEMENT_CHARACTER),
            index
        },
        other => Base58Error::Other(other.to_string())
    })
}
