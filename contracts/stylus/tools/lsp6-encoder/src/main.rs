use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lsp6_encoder::{
    encode_permissions_setup, set_data_batch_payload, sign_relay_call, signer::parse_signing_key, update_bundle,
    Section, SetupFile,
};
use lsp6_key_manager_types::ValidityTimestamps;

/// Build LSP6 controller setup payloads and sign LSP25 relay calls.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Collect results in this bundle file instead of printing them. Signed relay
    /// calls accumulate in order, ready for `executeRelayCallBatch`.
    #[arg(long, global = true)]
    out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a `setDataBatch` payload registering the controllers in a setup file.
    Setup {
        /// JSON controller file.
        #[arg(long)]
        file: PathBuf,
    },
    /// Sign a payload for `executeRelayCall`.
    SignRelay {
        #[arg(long, env = "LSP6_KEY_MANAGER")]
        key_manager: Address,

        #[arg(long, env = "LSP6_CHAIN_ID")]
        chain_id: u64,

        /// Hex private key of the controller.
        #[arg(long, env = "LSP6_SIGNER_KEY", hide_env_values = true)]
        signer_key: String,

        /// ERC725 payload to relay (hex).
        #[arg(long)]
        payload: String,

        #[arg(long, default_value_t = 0)]
        channel: u128,

        /// Next sequence number on the channel (see `getNonce`).
        #[arg(long)]
        sequence: u128,

        /// Earliest timestamp the call is valid at; 0 for none.
        #[arg(long, default_value_t = 0)]
        valid_from: u128,

        /// Latest timestamp the call is valid at; 0 for none.
        #[arg(long, default_value_t = 0)]
        valid_until: u128,

        /// Wei the relayer must attach.
        #[arg(long, default_value = "0")]
        value: U256,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (section, output) = match cli.command {
        Command::Setup { ref file } => (Section::Setup, setup(file)?),
        Command::SignRelay {
            key_manager,
            chain_id,
            ref signer_key,
            ref payload,
            channel,
            sequence,
            valid_from,
            valid_until,
            value,
        } => {
            let signing_key = parse_signing_key(signer_key)?;
            let payload = hex::decode(payload.trim().trim_start_matches("0x")).context("payload is not hex")?;
            let validity = ValidityTimestamps {
                start: valid_from,
                end: valid_until,
            };
            let signed = sign_relay_call(
                &signing_key,
                key_manager,
                chain_id,
                channel,
                sequence,
                validity,
                value,
                &payload,
            )?;
            info!(signer = %signed.signer, nonce = %signed.nonce, "signed relay call");
            (Section::RelayCalls, serde_json::to_value(&signed)?)
        }
    };

    let mut output = output;
    output["generatedAt"] = json!(now());
    match cli.out {
        Some(ref path) => {
            let entries = update_bundle(path, section, output)
                .with_context(|| format!("failed updating bundle {}", path.display()))?;
            info!(path = %path.display(), entries, "updated bundle");
        }
        None => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

fn setup(file: &Path) -> Result<Value> {
    let raw = fs::read_to_string(file).with_context(|| format!("failed reading {}", file.display()))?;
    let setup: SetupFile =
        serde_json::from_str(&raw).with_context(|| format!("failed parsing JSON in {}", file.display()))?;

    let entries = encode_permissions_setup(&setup)?;
    let payload = set_data_batch_payload(&entries);
    info!(
        controllers = setup.controllers.len(),
        data_keys = entries.len(),
        "encoded controller setup"
    );

    Ok(json!({
        "dataKeys": entries.keys,
        "dataValues": entries.values.iter().map(|v| format!("0x{}", hex::encode(v))).collect::<Vec<_>>(),
        "payload": format!("0x{}", hex::encode(payload)),
    }))
}

fn now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}
