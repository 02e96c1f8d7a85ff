use crate::{
    hash,
    key::PubKey,
    encoding::base58::{
        Base58Error,
        VersionedPayload
    },
    params::ChainParams,
    script::{
        Script,
        ScriptBuilder,
        opcodes
    },
    util::try_into
};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address encoding: {0}")]
    Encoding(#[from] Base58Error),
    #[error("version {0} is not a recognized address version")]
    UnrecognizedVersion(u8),
    #[error("incorrect version: got {found}, expected {expected}")]
    InvalidVersion { expected: u8, found: u8 },
    #[error("address hash must be 20 bytes, got {0}")]
    InvalidLength(usize),
    #[error("invalid pubkey")]
    InvalidPubKey,
    #[error("scriptPubKey not a recognized address form")]
    UnrecognizedScript,
    #[error("invalid script: {0}")]
    InvalidScript(String)
}

/**
    Options used when matching a scriptPubKey against the P2PKH family.

    * accept_non_canonical_pushdata - canonicalize pushes before matching
    * accept_bare_checksig          - treat <pubkey> OP_CHECKSIG as P2PKH
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub accept_non_canonical_pushdata: bool,
    pub accept_bare_checksig: bool
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            accept_non_canonical_pushdata: true,
            accept_bare_checksig: true
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    P2PKH,
    P2SH
}

impl AddressKind {
    /// Version byte the network assigns to this kind.
    pub fn version(&self, params: &ChainParams) -> u8 {
        match self {
            AddressKind::P2PKH => params.pubkey_address,
            AddressKind::P2SH => params.script_address
        }
    }
}

/**
    A P2PKH or P2SH address. The version byte always belongs to the
    address kind; the fields are only set through the constructors below.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    kind: AddressKind,
    version: u8,
    hash: [u8; 20]
}

impl Address {
    /**
        Creates a P2PKH address for the given network.
    */
    pub fn p2pkh(hash: [u8; 20], params: &ChainParams) -> Self {
        Self { kind: AddressKind::P2PKH, version: params.pubkey_address, hash }
    }

    /**
        Creates a P2SH address for the given network.
    */
    pub fn p2sh(hash: [u8; 20], params: &ChainParams) -> Self {
        Self { kind: AddressKind::P2SH, version: params.script_address, hash }
    }

    /**
        Creates an address of an explicit kind. The version must be the one
        the network assigns to that kind.
    */
    pub fn new(kind: AddressKind, version: u8, hash: [u8; 20], params: &ChainParams) -> Result<Self, AddressError> {
        let expected = kind.version(params);
        if version != expected {
            return Err(AddressError::InvalidVersion { expected, found: version })
        }

        Ok(Self { kind, version, hash })
    }

    /// P2PKH address carrying the version of another P2PKH address.
    pub(crate) fn p2pkh_like(other: &Address, hash: [u8; 20]) -> Self {
        Self { kind: AddressKind::P2PKH, version: other.version, hash }
    }

    /**
        Builds an address from a hash and version byte. The variant is
        picked by matching the version against the network's table.
    */
    pub fn from_bytes(hash: &[u8], version: u8, params: &ChainParams) -> Result<Self, AddressError> {
        let hash: [u8; 20] = try_into(hash).ok_or(AddressError::InvalidLength(hash.len()))?;

        if version == params.script_address {
            Ok(Self { kind: AddressKind::P2SH, version, hash })
        } else if version == params.pubkey_address {
            Ok(Self { kind: AddressKind::P2PKH, version, hash })
        } else {
            Err(AddressError::UnrecognizedVersion(version))
        }
    }

    /**
        Parses a Base58Check address that must belong to the given network.
    */
    pub fn from_str_with(s: &str, params: &ChainParams) -> Result<Self, AddressError> {
        let decoded = VersionedPayload::check_decode(s)?;
        Self::from_bytes(&decoded.payload, decoded.version, params)
    }

    /**
        Creates a P2PKH address from a serialized public key.
        * Base58Check( Ripemd160( Sha256( Public Key ) ) )

        Unless accept_invalid is set the bytes must be a valid public key.
        With it set any bytes are hashed, which is how keys already found
        in bare checksig scripts are handled.
    */
    pub fn from_pubkey(pubkey: &[u8], params: &ChainParams, accept_invalid: bool) -> Result<Self, AddressError> {
        if !accept_invalid && !PubKey::is_fully_valid(pubkey) {
            return Err(AddressError::InvalidPubKey)
        }

        Ok(Self::p2pkh(hash::hash160(pubkey), params))
    }

    /// P2PKH address of a parsed public key, in the encoding the key carries.
    pub fn from_pub_key(pk: &PubKey, params: &ChainParams) -> Self {
        Self::p2pkh(pk.hash160(), params)
    }

    /**
        Creates a P2SH address from a redeem script.
    */
    pub fn p2sh_from_redeem_script(script: &Script, params: &ChainParams) -> Self {
        Self::p2sh(script.hash(), params)
    }

    /**
        Converts a scriptPubKey to an address.

        P2SH is tried first, then the P2PKH family with the default
        match options.
    */
    pub fn from_script_pubkey(script: &Script, params: &ChainParams) -> Result<Self, AddressError> {
        if let Ok(addr) = Self::p2sh_from_script_pubkey(script, params) {
            return Ok(addr)
        }

        if let Ok(addr) = Self::p2pkh_from_script_pubkey(script, params, MatchOptions::default()) {
            return Ok(addr)
        }

        log::debug!("no address form matches script {}", script);
        Err(AddressError::UnrecognizedScript)
    }

    /**
        Matches OP_HASH160 <20 bytes> OP_EQUAL exactly. Non-canonical
        pushes are not accepted here.
    */
    pub fn p2sh_from_script_pubkey(script: &Script, params: &ChainParams) -> Result<Self, AddressError> {
        if !script.is_p2sh() {
            return Err(AddressError::UnrecognizedScript)
        }

        Self::from_bytes(&script.as_bytes()[2..22], params.script_address, params)
    }

    /**
        Matches the scripts that pay to a single public key hash:
        witness v0 keyhash, nested witness v0 keyhash, canonical P2PKH
        and optionally bare checksig.
    */
    pub fn p2pkh_from_script_pubkey(script: &Script, params: &ChainParams, options: MatchOptions) -> Result<Self, AddressError> {
        let canonical;
        let script = if options.accept_non_canonical_pushdata {
            canonical = script.canonicalize().map_err(|e| {
                log::debug!("script could not be canonicalized: {}", e);
                AddressError::InvalidScript(e.to_string())
            })?;
            &canonical
        } else {
            script
        };

        let code = script.as_bytes();
        if script.is_witness_v0_keyhash() {
            log::trace!("matched witness v0 keyhash");
            return Self::from_bytes(&code[2..22], params.pubkey_address, params)
        }
        if script.is_witness_v0_nested_keyhash() {
            log::trace!("matched nested witness v0 keyhash");
            return Self::from_bytes(&code[3..23], params.pubkey_address, params)
        }
        if script.is_p2pkh() {
            return Self::from_bytes(&code[3..23], params.pubkey_address, params)
        }

        if options.accept_bare_checksig {
            // Keys already on chain are hashed as they are
            if let Some(pubkey) = script.bare_checksig_pubkey() {
                log::trace!("matched bare checksig with {} byte key", pubkey.len());
                return Self::from_pubkey(pubkey, params, true)
            }
        }

        Err(AddressError::UnrecognizedScript)
    }

    /**
        Convert an address to its scriptPubKey.
    */
    pub fn to_script_pubkey(&self) -> Script {
        match self.kind {
            AddressKind::P2SH => ScriptBuilder::new()
                .push_opcode(opcodes::OP_HASH160)
                .push_slice(&self.hash)
                .push_opcode(opcodes::OP_EQUAL)
                .into_script(),
            AddressKind::P2PKH => ScriptBuilder::new()
                .push_opcode(opcodes::OP_DUP)
                .push_opcode(opcodes::OP_HASH160)
                .push_slice(&self.hash)
                .push_opcode(opcodes::OP_EQUALVERIFY)
                .push_opcode(opcodes::OP_CHECKSIG)
                .into_script()
        }
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    pub fn is_p2sh(&self) -> bool {
        self.kind == AddressKind::P2SH
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", VersionedPayload::new(self.version(), self.hash()).check_encode())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn mainnet() -> ChainParams {
        ChainParams::mainnet()
    }

    fn script(s: &str) -> Script {
        Script::from_hex(s).unwrap()
    }

    fn hash20(s: &str) -> [u8; 20] {
        try_into(&hex::decode(s).unwrap()[..]).unwrap()
    }

    #[test]
    fn create_from_string() {
        let cases: [(&str, &str, u8, bool); 2] = [
            ("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", "62e907b15cbf27d5425399ebf6f0fb50ebb88f18", 0, false),
            ("37k7toV1Nv4DfmQbmZ8KuZDQCYK9x5KpzP", "4266fc6f2c2861d7fe229b279a79803afca7ba34", 5, true)
        ];

        for (s, hash, version, p2sh) in cases.iter() {
            let addr = Address::from_str_with(s, &mainnet()).unwrap();
            assert_eq!(addr.hash(), &hash20(hash));
            assert_eq!(addr.version(), *version);
            assert_eq!(addr.is_p2sh(), *p2sh);
            assert_eq!(addr.to_string(), *s);
        }
    }

    #[test]
    fn wrong_version_for_network() {
        //Testnet addresses under mainnet parameters
        assert_eq!(Address::from_str_with("mpXwg4jMtRhuSpVq4xS3HFHmCmWp9NyGKt", &mainnet()), Err(AddressError::UnrecognizedVersion(111)));
        assert_eq!(Address::from_str_with("2MyJKxYR2zNZZsZ39SgkCXWCfQtXKhnWSWq", &mainnet()), Err(AddressError::UnrecognizedVersion(196)));

        //...and accepted under testnet parameters
        let addr = Address::from_str_with("2MyJKxYR2zNZZsZ39SgkCXWCfQtXKhnWSWq", &ChainParams::testnet()).unwrap();
        assert!(addr.is_p2sh());
    }

    #[test]
    fn bad_encoding_is_wrapped() {
        let res = Address::from_str_with("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb", &mainnet());
        assert!(matches!(res, Err(AddressError::Encoding(Base58Error::ChecksumMismatch { .. }))));

        let res = Address::from_str_with("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfN0", &mainnet());
        assert!(matches!(res, Err(AddressError::Encoding(Base58Error::InvalidCharacter { .. }))));
    }

    #[test]
    fn from_bytes_checks_length() {
        assert_eq!(Address::from_bytes(&[0u8; 19], 0, &mainnet()), Err(AddressError::InvalidLength(19)));
        assert_eq!(Address::from_bytes(&[0u8; 20], 42, &mainnet()), Err(AddressError::UnrecognizedVersion(42)));
    }

    #[test]
    fn from_script_pubkey() {
        let cases: [(&str, &str, bool); 2] = [
            ("a914000000000000000000000000000000000000000087", "31h1vYVSYuKP6AhS86fbRdMw9XHieotbST", true),
            ("76a914000000000000000000000000000000000000000088ac", "1111111111111111111114oLvT2", false)
        ];

        for (spk, expected, p2sh) in cases.iter() {
            let addr = Address::from_script_pubkey(&script(spk), &mainnet()).unwrap();
            assert_eq!(addr.to_string(), *expected);
            assert_eq!(addr.is_p2sh(), *p2sh);
        }
    }

    #[test]
    fn from_nonstandard_script_pubkey() {
        let cases: [&str; 4] = [
            //P2SH with non-canonical pushdata
            "a94c14000000000000000000000000000000000000000087",
            //P2PKH missing a byte
            "76a914000000000000000000000000000000000000000088",
            //P2PKH with one extra byte
            "76a914000000000000000000000000000000000000000088acac",
            //P2PKH with one byte changed
            "76a914000000000000000000000000000000000000000088ad"
        ];

        for spk in cases.iter() {
            assert_eq!(Address::from_script_pubkey(&script(spk), &mainnet()), Err(AddressError::UnrecognizedScript), "{}", spk);
        }
    }

    #[test]
    fn from_invalid_script_pubkey() {
        //Truncated P2SH and P2PKH
        for spk in ["a91400000000000000000000000000000000000000", "76a91400000000000000000000000000000000000000"].iter() {
            assert_eq!(Address::from_script_pubkey(&script(spk), &mainnet()), Err(AddressError::UnrecognizedScript));
        }
    }

    #[test]
    fn to_script_pubkey() {
        let cases: [(&str, &str); 2] = [
            ("31h1vYVSYuKP6AhS86fbRdMw9XHieotbST", "a914000000000000000000000000000000000000000087"),
            ("1111111111111111111114oLvT2", "76a914000000000000000000000000000000000000000088ac")
        ];

        for (addr, spk) in cases.iter() {
            let addr = Address::from_str_with(addr, &mainnet()).unwrap();
            assert_eq!(addr.to_script_pubkey().to_string(), *spk);
        }
    }

    #[test]
    fn script_round_trip() {
        for params in [ChainParams::mainnet(), ChainParams::testnet()].iter() {
            for fill in [0x00u8, 0x5a, 0xff].iter() {
                for addr in [Address::p2pkh([*fill; 20], params), Address::p2sh([*fill; 20], params)].iter() {
                    assert_eq!(Address::from_script_pubkey(&addr.to_script_pubkey(), params).unwrap(), *addr);
                }
            }
        }
    }

    #[test]
    fn p2sh_takes_precedence() {
        //Matches P2SH framing; would otherwise fall through to the P2PKH family
        let spk = script("a914000000000000000000000000000000000000000087");
        assert!(Address::from_script_pubkey(&spk, &mainnet()).unwrap().is_p2sh());
    }

    #[test]
    fn from_redeem_script() {
        let addr = Address::p2sh_from_redeem_script(&Script::default(), &mainnet());
        assert_eq!(addr.to_string(), "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy");

        //Same as matching the P2SH scriptPubKey of the redeem script
        let spk = Script::default().to_p2sh_script_pubkey();
        assert_eq!(Address::p2sh_from_script_pubkey(&spk, &mainnet()).unwrap(), addr);
    }

    #[test]
    fn from_non_canonical_script_pubkey() {
        let cases: [&str; 3] = [
            "76a94c14000000000000000000000000000000000000000088ac",
            "76a94d1400000000000000000000000000000000000000000088ac",
            "76a94e14000000000000000000000000000000000000000000000088ac"
        ];
        let strict = MatchOptions { accept_non_canonical_pushdata: false, ..MatchOptions::default() };

        for spk in cases.iter() {
            let spk = script(spk);
            let addr = Address::p2pkh_from_script_pubkey(&spk, &mainnet(), MatchOptions::default()).unwrap();
            assert_eq!(addr.to_string(), "1111111111111111111114oLvT2");
            assert_eq!(Address::p2pkh_from_script_pubkey(&spk, &mainnet(), strict), Err(AddressError::UnrecognizedScript));
        }

        //Invalid scripts are reported as such
        let res = Address::p2pkh_from_script_pubkey(&script("76a94c14"), &mainnet(), MatchOptions::default());
        assert!(matches!(res, Err(AddressError::InvalidScript(_))));
    }

    #[test]
    fn from_bare_checksig_script_pubkey() {
        let cases: [(String, &str); 3] = [
            //compressed
            (format!("21{}ac", "00".repeat(33)), "14p5cGy5DZmtNMQwTQiytBvxMVuTmFMSyU"),
            //uncompressed
            (format!("41{}ac", "00".repeat(65)), "13VmALKHkCdSN1JULkP6RqW3LcbpWvgryV"),
            //non-canonical encoding
            (format!("4c21{}ac", "00".repeat(33)), "14p5cGy5DZmtNMQwTQiytBvxMVuTmFMSyU")
        ];
        let no_bare = MatchOptions { accept_bare_checksig: false, ..MatchOptions::default() };

        for (spk, expected) in cases.iter() {
            let spk = script(spk);
            let addr = Address::p2pkh_from_script_pubkey(&spk, &mainnet(), MatchOptions::default()).unwrap();
            assert_eq!(addr.to_string(), *expected);
            assert_eq!(Address::p2pkh_from_script_pubkey(&spk, &mainnet(), no_bare), Err(AddressError::UnrecognizedScript));
        }

        //odd-lengths are *not* accepted
        let odd = script(&format!("22{}ac", "00".repeat(34)));
        assert_eq!(Address::from_script_pubkey(&odd, &mainnet()), Err(AddressError::UnrecognizedScript));
    }

    #[test]
    fn from_witness_script_pubkeys() {
        let hash = "751e76e8199196d454941c45d1b3a323f1433bd6";
        let keyhash = script(&format!("0014{}", hash));
        let nested = script(&format!("160014{}", hash));

        for spk in [keyhash, nested].iter() {
            let addr = Address::from_script_pubkey(spk, &mainnet()).unwrap();
            assert_eq!(addr, Address::p2pkh(hash20(hash), &mainnet()));
        }
    }

    #[test]
    fn from_valid_pubkey() {
        let cases: [(&str, &str); 2] = [
            ("0378d430274f8c5ec1321338151e9f27f4c676a008bdf8638d07c0b6be9ab35c71", "1C7zdTfnkzmr13HfA2vNm5SJYRK6nEKyq8"),
            ("0478d430274f8c5ec1321338151e9f27f4c676a008bdf8638d07c0b6be9ab35c71a1518063243acd4dfe96b66e3f2ec8013c8e072cd09b3834a19f81f659cc3455", "1JwSSubhmg6iPtRjtyqhUYYH7bZg3Lfy1T")
        ];

        for (pubkey, expected) in cases.iter() {
            let bytes = hex::decode(pubkey).unwrap();
            assert_eq!(Address::from_pubkey(&bytes, &mainnet(), false).unwrap().to_string(), *expected);

            let pk = PubKey::from_slice(&bytes).unwrap();
            assert_eq!(Address::from_pub_key(&pk, &mainnet()).to_string(), *expected);
        }
    }

    #[test]
    fn from_invalid_pubkeys() {
        let off_curve = hex::decode("0378d430274f8c5ec1321338151e9f27f4c676a008bdf8638d07c0b6be9ab35c72").unwrap();

        assert_eq!(Address::from_pubkey(&[], &mainnet(), true).unwrap().to_string(), "1HT7xU2Ngenf7D4yocz2SAcnNLW7rK8d4E");
        assert_eq!(Address::from_pubkey(&off_curve, &mainnet(), true).unwrap().to_string(), "1L9V4NXbNtZsLjrD3nkU7gtEYLWRBWXLiZ");

        assert_eq!(Address::from_pubkey(&[], &mainnet(), false), Err(AddressError::InvalidPubKey));
        assert_eq!(Address::from_pubkey(&off_curve, &mainnet(), false), Err(AddressError::InvalidPubKey));
    }

    #[test]
    fn kind_and_version_agree() {
        let hash = [7u8; 20];
        let params = mainnet();

        //A P2SH address cannot carry the P2PKH version
        assert_eq!(Address::new(AddressKind::P2SH, 0, hash, &params), Err(AddressError::InvalidVersion { expected: 5, found: 0 }));
        assert_eq!(Address::new(AddressKind::P2PKH, 5, hash, &params), Err(AddressError::InvalidVersion { expected: 0, found: 5 }));

        //Every constructor survives the string round trip unchanged
        let addrs = [
            Address::p2pkh(hash, &params),
            Address::p2sh(hash, &params),
            Address::new(AddressKind::P2SH, 5, hash, &params).unwrap(),
            Address::from_bytes(&hash, 0, &params).unwrap(),
            Address::from_pubkey(&[7u8; 33], &params, true).unwrap(),
            Address::p2sh_from_redeem_script(&Script::default(), &params)
        ];
        for addr in addrs.iter() {
            let parsed = Address::from_str_with(&addr.to_string(), &params).unwrap();
            assert_eq!(parsed, *addr);
            assert_eq!(parsed.kind(), addr.kind());
            assert_eq!(addr.version(), addr.kind().version(&params));
        }
    }

    #[test]
    fn testnet_prefixes() {
        let testnet = ChainParams::testnet();
        assert_eq!(Address::p2pkh([0u8; 20], &testnet).to_string(), "mfWxJ45yp2SFn7UciZyNpvDKrzbhyfKrY8");
        assert_eq!(Address::p2sh([0u8; 20], &testnet).to_string(), "2MsFDzHRUAMpjHxKyoEHU3aMCMsVtMqs1PV");
    }
}
