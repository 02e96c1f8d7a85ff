/*
    Hash functions used to turn keys and scripts into addresses
    and to checksum Base58Check payloads.
*/

use crate::{
    Ripemd160, Sha256, Digest
};

/*
    Takes in a byte array and returns the sha256 hash of it
*/
pub fn sha256<T>(input: T) -> [u8; 32]
where T: AsRef<[u8]>
{
    let mut r = Sha256::new();
    r.update(input);
    r.finalize().into()
}

/// Sha256(Sha256(input)). Used for checksums and message hashes.
pub fn sha256d<T>(input: T) -> [u8; 32]
where T: AsRef<[u8]>
{
    sha256(sha256(input))
}

/*
    Takes in an byte array and returns the ripemd160 hash of it
*/
pub fn ripemd160<T>(input: T) -> [u8; 20]
where T: AsRef<[u8]>
{
    let mut r = Ripemd160::new();
    r.update(input);
    r.finalize().into()
}

/// Ripemd160(Sha256(input)), the digest that addresses commit to.
pub fn hash160<T>(input: T) -> [u8; 20]
where T: AsRef<[u8]>
{
    ripemd160(sha256(input))
}
