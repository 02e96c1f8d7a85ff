/*
    Module that bundles together the encoding schemes used for
    addresses and secret keys.
*/

pub mod base58;
pub use base58::{
    Base58Error,
    VersionedPayload
};
