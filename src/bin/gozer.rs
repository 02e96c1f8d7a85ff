//! Command line front end for the address, script and message tools.

use clap::{Parser, Subcommand};
use gozer_keyaddress::prelude::*;
use std::{error::Error, path::PathBuf, process};

#[derive(Parser)]
#[command(name = "gozer", version, about = "Gozer address, script and message tools")]
struct Cli {
    /// Network whose version bytes are used
    #[arg(long, short, default_value = "mainnet")]
    network: Network,

    /// TOML file with custom chain parameters (overrides --network)
    #[arg(long)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the kind, version and hash of an address
    DecodeAddress { address: String },
    /// P2PKH address of a hex encoded public key
    AddressFromPubkey { pubkey: String },
    /// Address paid to by a hex encoded scriptPubKey
    AddressFromScript { script: String },
    /// Hex scriptPubKey that pays to an address
    ScriptFromAddress { address: String },
    /// Public key and address of a WIF secret key
    WifInfo { wif: String },
    /// Sign a message with a WIF secret key
    SignMessage { wif: String, message: String },
    /// Verify a base64 message signature against an address
    VerifyMessage {
        address: String,
        message: String,
        signature: String,
    },
}

fn chain_params(cli: &Cli) -> Result<ChainParams, ParamsError> {
    match &cli.params {
        Some(path) => ChainParams::from_file(path),
        None => Ok(cli.network.params()),
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let params = chain_params(&cli)?;
    log::debug!("using chain parameters {:?}", params);

    match cli.command {
        Command::DecodeAddress { address } => {
            let addr = Address::from_str_with(&address, &params)?;
            println!("type:    {:?}", addr.kind());
            println!("version: {}", addr.version());
            println!("hash:    {}", hex::encode(addr.hash()));
        }
        Command::AddressFromPubkey { pubkey } => {
            let bytes = hex::decode(pubkey)?;
            println!("{}", Address::from_pubkey(&bytes, &params, false)?);
        }
        Command::AddressFromScript { script } => {
            let script = Script::from_hex(&script)?;
            println!("{}", Address::from_script_pubkey(&script, &params)?);
        }
        Command::ScriptFromAddress { address } => {
            let addr = Address::from_str_with(&address, &params)?;
            println!("{}", addr.to_script_pubkey());
        }
        Command::WifInfo { wif } => {
            let secret = Secret::from_wif(&wif, &params)?;
            println!("pubkey:     {}", secret.pubkey());
            println!("compressed: {}", secret.is_compressed());
            println!("address:    {}", Address::from_pub_key(secret.pubkey(), &params));
        }
        Command::SignMessage { wif, message } => {
            let secret = Secret::from_wif(&wif, &params)?;
            let message = SignedMessage::with_params(message, &params);
            println!("{}", sign_message(secret.key(), &message)?);
        }
        Command::VerifyMessage {
            address,
            message,
            signature,
        } => {
            let message = SignedMessage::with_params(message, &params);
            println!("{}", verify_message_str(&address, &params, &message, &signature)?);
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}
