/*
    This module contains the default imports for the library.

    Import the library using:
        use gozer_keyaddress::prelude::*;
    to quickly import the essential parts of the library.
*/

pub use crate::{

    key::{
        PubKey,
        PrivKey,
        Secret,
        Signature,
        CompactSignature,
        KeyError,
        is_low_der_signature
    },
    
    address::{
        Address,
        AddressKind,
        AddressError,
        MatchOptions
    },

    message::{
        SignedMessage,
        MessageError,
        sign_message,
        verify_message,
        verify_message_str
    },

    encoding::{
        base58::{
            check_encode,
            check_decode,
            Base58Error,
            VersionedPayload
        }
    },

    params::{
        ChainParams,
        Network,
        ParamsError
    },

    script::{
        Script,
        ScriptBuilder,
        ScriptError,
        opcodes
    }

};
