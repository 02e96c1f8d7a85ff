/*
    Keys.

    PrivKey owns a secp256k1 scalar and the public key derived from it,
    PubKey wraps a validated curve point and how it is serialized, and
    Secret pairs a decoded WIF payload with the PrivKey built from it.
*/

use crate::{
    Secp256k1,
    PublicKey,
    SecretKey,
    OsRng,
    hash,
    encoding::base58::{
        Base58Error,
        VersionedPayload
    },
    params::ChainParams
};
use secp256k1::{
    All,
    Message,
    ecdsa::{
        Signature as EcdsaSignature,
        RecoverableSignature,
        RecoveryId
    }
};
use once_cell::sync::Lazy;
use std::fmt;
use thiserror::Error;

static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Marker byte appended to WIF payloads of compressed keys.
const COMPRESSED_FLAG: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("hash must be 32 bytes, got {0}")]
    InvalidInputLength(usize),
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("invalid public key")]
    InvalidPubKey,
    #[error("invalid secret key encoding: {0}")]
    Encoding(#[from] Base58Error),
    #[error("not a secret key: got version {found}, expected {expected}")]
    InvalidVersion { expected: u8, found: u8 },
    #[error("invalid secret key payload length {0}")]
    InvalidLength(usize),
    #[error("invalid compression flag {0}")]
    InvalidCompressionFlag(u8),
    #[error("recovery id {0} out of range")]
    InvalidRecoveryId(u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PubKey {
    key: PublicKey,
    compressed: bool
}

impl PubKey {
    /**
        Finds the public key of a secret key.

        Is the result of static point G on the secp256k1 curve multipled k times, where k is the private key.
    */
    pub fn from_priv_key(k: &SecretKey, compressed: bool) -> Self {
        Self {
            key: PublicKey::from_secret_key(&SECP, k),
            compressed
        }
    }

    /**
        Parses a serialized public key.

        Accepts 33 byte compressed (0x02/0x03) and 65 byte uncompressed (0x04)
        encodings of a point on the curve. The encoding is remembered so the
        key hashes to the same address it was given as.
    */
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let compressed = match (bytes.len(), bytes.first()) {
            (33, Some(0x02)) | (33, Some(0x03)) => true,
            (65, Some(0x04)) => false,
            _ => return Err(KeyError::InvalidPubKey)
        };

        let key = PublicKey::from_slice(bytes).map_err(|_| KeyError::InvalidPubKey)?;
        Ok(Self { key, compressed })
    }

    /// True if bytes encode a point on the curve in a standard encoding.
    pub fn is_fully_valid(bytes: &[u8]) -> bool {
        Self::from_slice(bytes).is_ok()
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /**
        Serializes the key as 33 bytes if compressed, otherwise as 65 bytes.
    */
    pub fn to_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.key.serialize().to_vec()
        } else {
            self.key.serialize_uncompressed().to_vec()
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Hash160 of the serialized key
    pub fn hash160(&self) -> [u8; 20] {
        hash::hash160(self.to_bytes())
    }

    pub fn inner(&self) -> &PublicKey {
        &self.key
    }

    /**
        Verifies a DER encoded signature over a 32 byte hash.

        Malformed input, high-S signatures and signatures by another key
        all return false.
    */
    pub fn verify(&self, hash: &[u8], sig: &[u8]) -> bool {
        let msg = match Message::from_digest_slice(hash) {
            Ok(m) => m,
            Err(_) => {
                log::debug!("verify: hash is {} bytes", hash.len());
                return false
            }
        };
        let sig = match EcdsaSignature::from_der(sig) {
            Ok(s) => s,
            Err(_) => {
                log::debug!("verify: signature is not strict DER");
                return false
            }
        };

        SECP.verify_ecdsa(&msg, &sig, &self.key).is_ok()
    }

    /**
        Recovers the public key that produced a compact signature over hash.

        Returns None if no key can be recovered.
    */
    pub fn recover_compact(hash: &[u8; 32], sig: &CompactSignature) -> Option<Self> {
        let recid = RecoveryId::from_i32(sig.recovery_id() as i32).ok()?;
        let rsig = RecoverableSignature::from_compact(&sig.rs, recid).ok()?;
        let msg = Message::from_digest_slice(hash).ok()?;
        let key = SECP.recover_ecdsa(&msg, &rsig).ok()?;

        Some(Self { key, compressed: sig.compressed })
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// DER encoded ECDSA signature with a low S value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Recoverable signature: r || s plus the id needed to recover the signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactSignature {
    recovery_id: u8,
    compressed: bool,
    rs: [u8; 64]
}

impl CompactSignature {
    /// The recovery id must be within 0..=3.
    pub fn new(recovery_id: u8, compressed: bool, rs: [u8; 64]) -> Result<Self, KeyError> {
        if recovery_id > 3 {
            return Err(KeyError::InvalidRecoveryId(recovery_id))
        }

        Ok(Self { recovery_id, compressed, rs })
    }

    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn rs(&self) -> &[u8; 64] {
        &self.rs
    }

    pub fn r(&self) -> &[u8] {
        &self.rs[..32]
    }

    pub fn s(&self) -> &[u8] {
        &self.rs[32..]
    }
}

/**
    True if der is a strictly encoded signature whose S is in the
    lower half of the curve order.
*/
pub fn is_low_der_signature(der: &[u8]) -> bool {
    match EcdsaSignature::from_der(der) {
        Ok(sig) => {
            let mut normalized = sig;
            normalized.normalize_s();
            normalized == sig
        },
        Err(_) => false
    }
}

fn message_from_hash(hash: &[u8]) -> Result<Message, KeyError> {
    if hash.len() != 32 {
        return Err(KeyError::InvalidInputLength(hash.len()))
    }
    Message::from_digest_slice(hash).map_err(|_| KeyError::InvalidInputLength(hash.len()))
}

#[derive(Clone, PartialEq, Eq)]
pub struct PrivKey {
    key: SecretKey,
    pubkey: PubKey
}

impl PrivKey {
    
    /**
        Generates a random secret key using OsRng.
    */
    pub fn new_rand(compressed: bool) -> Self {
        Self::from_secret(SecretKey::new(&mut OsRng), compressed)
    }

    /**
        Use a predefined 32 byte scalar as a secret key.
    */
    pub fn from_slice(byte_array: &[u8], compressed: bool) -> Result<Self, KeyError> {
        let key = SecretKey::from_slice(byte_array).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_secret(key, compressed))
    }

    // The public key is derived once here and never again
    fn from_secret(key: SecretKey, compressed: bool) -> Self {
        Self {
            key,
            pubkey: PubKey::from_priv_key(&key, compressed)
        }
    }

    pub fn pubkey(&self) -> &PubKey {
        &self.pubkey
    }

    pub fn is_compressed(&self) -> bool {
        self.pubkey.is_compressed()
    }

    /**
        Serializes the private key into a array of bytes.
    */
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.key.secret_bytes()
    }

    /**
        Signs a 32 byte hash. Nonces are derived deterministically (RFC6979)
        and the result always has a low S value.
    */
    pub fn sign(&self, hash: &[u8]) -> Result<Signature, KeyError> {
        let msg = message_from_hash(hash)?;
        let mut sig = SECP.sign_ecdsa(&msg, &self.key);
        sig.normalize_s();
        Ok(Signature(sig.serialize_der().to_vec()))
    }

    /**
        Signs a 32 byte hash producing a signature the public key
        can be recovered from.
    */
    pub fn sign_compact(&self, hash: &[u8]) -> Result<CompactSignature, KeyError> {
        let msg = message_from_hash(hash)?;
        let (recid, rs) = SECP.sign_ecdsa_recoverable(&msg, &self.key).serialize_compact();
        log::trace!("compact signature with recovery id {}", recid.to_i32());

        Ok(CompactSignature {
            recovery_id: recid.to_i32() as u8,
            compressed: self.is_compressed(),
            rs
        })
    }

    /*
        Export the private key in wallet-import-format (Base58Check encoded with the
        network's secret key prefix). Compressed keys carry a trailing 0x01.
    */
    pub fn to_wif(&self, params: &ChainParams) -> String {
        self.wif_payload(params).check_encode()
    }

    fn wif_payload(&self, params: &ChainParams) -> VersionedPayload {
        let mut key: Vec<u8> = self.secret_bytes().to_vec();
        if self.is_compressed() {
            key.push(COMPRESSED_FLAG);
        }
        VersionedPayload::new(params.secret_key, &key)
    }
}

impl fmt::Debug for PrivKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivKey")
         .field("pubkey", &self.pubkey)
         .finish()
    }
}

/// A WIF encoded secret key and the key it decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    payload: VersionedPayload,
    key: PrivKey
}

impl Secret {
    /**
        Decode a WIF string, checking it was encoded for the given network.
    */
    pub fn from_wif(wif: &str, params: &ChainParams) -> Result<Self, KeyError> {
        let payload = VersionedPayload::check_decode(wif)?;
        Self::from_payload(payload, params)
    }

    /**
        Create a secret key from a 32 byte scalar.
    */
    pub fn from_secret_bytes(secret: &[u8], compressed: bool, params: &ChainParams) -> Result<Self, KeyError> {
        let key = PrivKey::from_slice(secret, compressed)?;
        Ok(Self {
            payload: key.wif_payload(params),
            key
        })
    }

    fn from_payload(payload: VersionedPayload, params: &ChainParams) -> Result<Self, KeyError> {
        if payload.version != params.secret_key {
            return Err(KeyError::InvalidVersion { expected: params.secret_key, found: payload.version })
        }

        let compressed = match payload.payload.len() {
            32 => false,
            33 if payload.payload[32] == COMPRESSED_FLAG => true,
            33 => return Err(KeyError::InvalidCompressionFlag(payload.payload[32])),
            n => return Err(KeyError::InvalidLength(n))
        };

        let key = PrivKey::from_slice(&payload.payload[..32], compressed)?;
        Ok(Self { payload, key })
    }

    pub fn key(&self) -> &PrivKey {
        &self.key
    }

    pub fn pubkey(&self) -> &PubKey {
        self.key.pubkey()
    }

    pub fn is_compressed(&self) -> bool {
        self.key.is_compressed()
    }

    pub fn payload(&self) -> &VersionedPayload {
        &self.payload
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.payload.check_encode())
    }
}
