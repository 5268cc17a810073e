use std::path::PathBuf;

use bitcoin::Network;
use clap::Parser;

use btc_probe_core::probe::{DEFAULT_ADDRESS, DEFAULT_MAX_CONF, DEFAULT_MIN_CONF, DEFAULT_TXID};
use btc_probe_core::ProbeTargets;

/// btc-probe: print the tip block, one transaction and an address balance
/// from a Bitcoin Core node.
///
/// Connection settings come from BITCOIN_IP, BITCOIN_RPC_PORT,
/// BITCOIN_USERNAME and BITCOIN_PASSWORD (a `.env` file is read if present).
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Dotenv file to load instead of searching for `.env`.
    #[arg(long, env = "BTC_PROBE_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Transaction to look up (hex txid).
    #[arg(long, default_value = DEFAULT_TXID)]
    pub txid: String,

    /// Address whose unspent outputs are summed.
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Network the address must belong to (bitcoin, testnet, signet, regtest).
    /// Defaults to the chain reported by the node.
    #[arg(long)]
    pub network: Option<Network>,

    /// Minimum confirmations for an output to count.
    #[arg(long, default_value_t = DEFAULT_MIN_CONF)]
    pub min_conf: u32,

    /// Maximum confirmations for an output to count.
    #[arg(long, default_value_t = DEFAULT_MAX_CONF)]
    pub max_conf: u32,
}

impl Cli {
    pub fn targets(&self) -> ProbeTargets {
        ProbeTargets {
            txid: self.txid.clone(),
            address: self.address.clone(),
            network: self.network,
            min_conf: self.min_conf,
            max_conf: self.max_conf,
        }
    }
}
