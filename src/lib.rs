/*
    Address, script and message signing core for Gozer.

    Converts between Base58Check addresses, the hashes they commit to and
    the scriptPubKeys that lock funds to them, and signs and verifies
    messages with compact recoverable signatures.

    Every operation that depends on a network takes its ChainParams
    explicitly; nothing reads a global "current network".

    References:
        - The Bitcoin Book (https://github.com/bitcoinbook/bitcoinbook/)
            for the address and script formats
        
        - Bitcoin Core's base58 and signmessage test vectors
*/

//Outward facing modules
pub mod address;
pub mod encoding;
pub mod key;
pub mod message;
pub mod params;
pub mod prelude;
pub mod script;
pub mod util;

//Modules for internal use
mod hash;

pub use hash::{
    hash160,
    ripemd160,
    sha256,
    sha256d
};

//Dependencies
use rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Sha256, Digest};
use ripemd::Ripemd160;
use bs58;
