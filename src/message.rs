/*
    Signed messages.

    A message is hashed under a fixed magic prefix so a signature over it
    can never be replayed as a transaction signature. Signatures use the
    65 byte compact format (header || r || s), base64 encoded.
*/

use crate::{
    hash,
    address::{
        Address,
        AddressError
    },
    key::{
        CompactSignature,
        KeyError,
        PrivKey,
        PubKey
    },
    params::{
        ChainParams,
        DEFAULT_MESSAGE_MAGIC
    },
    util::write_var_bytes
};
use base64::{
    Engine as _,
    engine::general_purpose::STANDARD as BASE64
};
use std::fmt;
use thiserror::Error;

/// Lowest valid header byte of a compact signature
const HEADER_BASE: u8 = 27;
/// Added to the header when the signing key is compressed
const COMPRESSED_OFFSET: u8 = 4;
const COMPACT_LEN: usize = 65;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("invalid signature encoding: {0}")]
    InvalidSignatureEncoding(String),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Key(#[from] KeyError)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    magic: String,
    message: Vec<u8>
}

impl SignedMessage {
    /// A message under the standard "Bitcoin Signed Message:\n" magic.
    pub fn new<T: AsRef<[u8]>>(message: T) -> Self {
        Self::with_magic(message, DEFAULT_MESSAGE_MAGIC)
    }

    /// A message under the magic of the given network.
    pub fn with_params<T: AsRef<[u8]>>(message: T, params: &ChainParams) -> Self {
        Self::with_magic(message, &params.message_magic)
    }

    pub fn with_magic<T: AsRef<[u8]>>(message: T, magic: &str) -> Self {
        Self {
            magic: magic.to_string(),
            message: message.as_ref().to_vec()
        }
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn magic(&self) -> &str {
        &self.magic
    }

    /**
        Sha256d( varint(len(magic)) || magic || varint(len(message)) || message )
    */
    pub fn hash(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(self.magic.len() + self.message.len() + 18);
        write_var_bytes(self.magic.as_bytes(), &mut data);
        write_var_bytes(&self.message, &mut data);
        hash::sha256d(&data)
    }
}

impl fmt::Display for SignedMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.message))
    }
}

/**
    Serializes a compact signature as header || r || s where
    header = 27 + recovery id (+ 4 if the key is compressed).
*/
pub fn encode_compact(sig: &CompactSignature) -> [u8; COMPACT_LEN] {
    let mut out = [0u8; COMPACT_LEN];
    out[0] = HEADER_BASE + sig.recovery_id() + if sig.is_compressed() { COMPRESSED_OFFSET } else { 0 };
    out[1..].copy_from_slice(sig.rs());
    out
}

/**
    Parses header || r || s. The header must be within 27..=34.
*/
pub fn decode_compact(bytes: &[u8]) -> Result<CompactSignature, MessageError> {
    if bytes.len() != COMPACT_LEN {
        return Err(MessageError::InvalidSignatureEncoding(format!("expected {} bytes, got {}", COMPACT_LEN, bytes.len())))
    }

    let header = bytes[0];
    if !(HEADER_BASE..HEADER_BASE + 2 * COMPRESSED_OFFSET).contains(&header) {
        return Err(MessageError::InvalidSignatureEncoding(format!("header byte {} out of range", header)))
    }

    let offset = header - HEADER_BASE;
    let mut rs = [0u8; 64];
    rs.copy_from_slice(&bytes[1..]);

    CompactSignature::new(offset & 0x03, offset >= COMPRESSED_OFFSET, rs).map_err(MessageError::from)
}

/**
    Signs a message, returning the base64 compact signature.
*/
pub fn sign_message(key: &PrivKey, message: &SignedMessage) -> Result<String, MessageError> {
    let sig = key.sign_compact(&message.hash())?;
    Ok(BASE64.encode(&encode_compact(&sig)[..]))
}

/**
    Verifies a base64 compact signature against an address.

    The signer's key is recovered from the signature and hashed into a
    P2PKH address with the expected address's version byte. Returns false
    if that address differs; only a malformed signature is an error.
*/
pub fn verify_message(address: &Address, message: &SignedMessage, signature: &str) -> Result<bool, MessageError> {
    let bytes = BASE64.decode(signature.trim())
        .map_err(|e| MessageError::InvalidSignatureEncoding(e.to_string()))?;
    let sig = decode_compact(&bytes)?;

    if address.is_p2sh() {
        log::debug!("verify_message: {} is not a pubkey hash address", address);
        return Ok(false)
    }

    let pubkey = match PubKey::recover_compact(&message.hash(), &sig) {
        Some(pk) => pk,
        None => {
            log::debug!("verify_message: no key recoverable from signature");
            return Ok(false)
        }
    };

    let recovered = Address::p2pkh_like(address, pubkey.hash160());
    log::trace!("verify_message: recovered {} expecting {}", recovered, address);
    Ok(recovered == *address)
}

/**
    Same as verify_message but parses the address string against the given network first.
*/
pub fn verify_message_str(address: &str, params: &ChainParams, message: &SignedMessage, signature: &str) -> Result<bool, MessageError> {
    let address = Address::from_str_with(address, params)?;
    verify_message(&address, message, signature)
}
