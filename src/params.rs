/*
    Chain parameters.

    Every network assigns its own version bytes to addresses and
    secret keys. These tables are plain values passed into each
    codec, address and key operation; nothing in the library reads
    a "current network" from global state.
*/

use std::{
    fmt,
    fs,
    path::Path,
    str::FromStr
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Magic prepended to messages before they are hashed and signed.
pub const DEFAULT_MESSAGE_MAGIC: &str = "Bitcoin Signed Message:\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    pub name: String,
    /// Version byte of pay-to-pubkey-hash addresses
    pub pubkey_address: u8,
    /// Version byte of pay-to-script-hash addresses
    pub script_address: u8,
    /// Version byte of WIF encoded secret keys
    pub secret_key: u8,
    #[serde(default = "default_magic")]
    pub message_magic: String
}

fn default_magic() -> String {
    DEFAULT_MESSAGE_MAGIC.to_string()
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
    #[error("could not read chain parameters: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse chain parameters: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("version byte {0} is assigned to more than one kind of data")]
    DuplicateVersion(u8)
}

impl ChainParams {
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            pubkey_address: 0,
            script_address: 5,
            secret_key: 128,
            message_magic: default_magic()
        }
    }

    pub fn testnet() -> Self {
        Self {
            name: "testnet".to_string(),
            pubkey_address: 111,
            script_address: 196,
            secret_key: 239,
            message_magic: default_magic()
        }
    }

    pub fn regtest() -> Self {
        Self {
            name: "regtest".to_string(),
            ..Self::testnet()
        }
    }

    /**
        Parse a custom network profile from TOML.

        ```toml
        name = "gozernet"
        pubkey_address = 38
        script_address = 23
        secret_key = 166
        ```
    */
    pub fn from_toml_str(s: &str) -> Result<Self, ParamsError> {
        let params: Self = toml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Load a network profile from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParamsError> {
        let contents = fs::read_to_string(path.as_ref())?;
        log::debug!("loading chain parameters from {}", path.as_ref().display());
        Self::from_toml_str(&contents)
    }

    // Address variants are told apart by version byte alone
    fn validate(&self) -> Result<(), ParamsError> {
        if self.pubkey_address == self.script_address {
            return Err(ParamsError::DuplicateVersion(self.pubkey_address))
        }
        Ok(())
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest
}

impl Network {
    pub fn params(&self) -> ChainParams {
        match self {
            Network::Mainnet => ChainParams::mainnet(),
            Network::Testnet => ChainParams::testnet(),
            Network::Regtest => ChainParams::regtest()
        }
    }
}

impl FromStr for Network {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(ParamsError::UnknownNetwork(s.to_string()))
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest"
        };
        write!(f, "{}", name)
    }
}
