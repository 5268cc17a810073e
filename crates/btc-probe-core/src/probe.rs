//! The fixed probe sequence: tip block, one transaction, one address balance.
//!
//! Steps run strictly in order and the first failure ends the probe. Output
//! for completed steps is flushed before the next RPC call is issued.

use std::io::Write;

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network, Txid};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::report;
use crate::rpc::BitcoinRpc;
use crate::types::{map_chain_to_network, total_balance, BlockSummary};

/// Transaction looked up when none is given on the command line.
pub const DEFAULT_TXID: &str = "9d817a0bf45548dc4879d6dba0173d53617ad0d250e202b5160fd9fcbf330b67";
/// Address whose balance is reported when none is given on the command line.
pub const DEFAULT_ADDRESS: &str = "tb1q50p0jp9hdyzt3k7ep3r50hxaaqucm4dpnys08t";
pub const DEFAULT_MIN_CONF: u32 = 1;
pub const DEFAULT_MAX_CONF: u32 = 9_999_999;

/// What to look up after the tip block.
#[derive(Debug, Clone)]
pub struct ProbeTargets {
    /// Hex txid, parsed only when the transaction step is reached.
    pub txid: String,
    /// Address string, decoded only when the balance step is reached.
    pub address: String,
    /// Network the address must belong to; `None` means the node's chain.
    pub network: Option<Network>,
    pub min_conf: u32,
    pub max_conf: u32,
}

impl Default for ProbeTargets {
    fn default() -> Self {
        Self {
            txid: DEFAULT_TXID.to_owned(),
            address: DEFAULT_ADDRESS.to_owned(),
            network: None,
            min_conf: DEFAULT_MIN_CONF,
            max_conf: DEFAULT_MAX_CONF,
        }
    }
}

// ==============================================================================
// Steps and Errors
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStep {
    ChainInfo,
    BlockHash,
    Block,
    ParseTxid,
    Transaction,
    DecodeAddress,
    ListUnspent,
    Output,
}

impl std::fmt::Display for ProbeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChainInfo => write!(f, "getting blockchain info"),
            Self::BlockHash => write!(f, "getting block hash"),
            Self::Block => write!(f, "getting block"),
            Self::ParseTxid => write!(f, "parsing transaction hash"),
            Self::Transaction => write!(f, "getting raw transaction"),
            Self::DecodeAddress => write!(f, "decoding address"),
            Self::ListUnspent => write!(f, "listing unspent outputs"),
            Self::Output => write!(f, "writing report"),
        }
    }
}

/// A probe failure tagged with the step that produced it.
#[derive(Debug, thiserror::Error)]
#[error("error {step}")]
pub struct ProbeError {
    pub step: ProbeStep,
    #[source]
    pub source: CoreError,
}

trait AtStep<T> {
    fn at(self, step: ProbeStep) -> Result<T, ProbeError>;
}

impl<T> AtStep<T> for Result<T, CoreError> {
    fn at(self, step: ProbeStep) -> Result<T, ProbeError> {
        self.map_err(|source| ProbeError { step, source })
    }
}

// ==============================================================================
// Sequence
// ==============================================================================

/// Run the probe against `rpc`, writing the report to `out`.
pub async fn run_probe<W: Write>(
    rpc: &dyn BitcoinRpc,
    targets: &ProbeTargets,
    out: &mut W,
) -> Result<(), ProbeError> {
    let chain_info = rpc.get_blockchain_info().await.at(ProbeStep::ChainInfo)?;
    info!(
        chain = %chain_info.chain,
        blocks = *chain_info.blocks,
        "connected to Bitcoin Core"
    );
    if chain_info.pruned {
        warn!("node is pruned; old transactions may be unavailable");
    }

    let tip_hash = rpc
        .get_block_hash(chain_info.blocks)
        .await
        .at(ProbeStep::BlockHash)?;
    let block = rpc.get_block(&tip_hash).await.at(ProbeStep::Block)?;
    let summary = BlockSummary::new(chain_info.blocks, &block);
    report::write_block(out, &summary).at(ProbeStep::Output)?;
    flush(out)?;

    let txid: Txid = targets.txid.trim().parse().map_err(|e| ProbeError {
        step: ProbeStep::ParseTxid,
        source: CoreError::InvalidData(format!("invalid transaction hash `{}`: {e}", targets.txid)),
    })?;
    let tx = rpc
        .get_raw_transaction_verbose(&txid)
        .await
        .at(ProbeStep::Transaction)?;
    report::write_transaction(out, &tx).at(ProbeStep::Output)?;
    flush(out)?;

    let network = match targets.network {
        Some(network) => network,
        None => map_chain_to_network(&chain_info.chain).at(ProbeStep::DecodeAddress)?,
    };
    let address = decode_address(&targets.address, network).at(ProbeStep::DecodeAddress)?;
    debug!(%address, %network, "decoded address");

    let utxos = rpc
        .list_unspent(targets.min_conf, targets.max_conf, std::slice::from_ref(&address))
        .await
        .at(ProbeStep::ListUnspent)?;
    let balance = total_balance(&utxos).at(ProbeStep::ListUnspent)?;
    info!(%address, utxos = utxos.len(), sats = balance.to_sat(), "summed unspent outputs");

    report::write_balance(out, &targets.address, balance).at(ProbeStep::Output)?;
    flush(out)?;
    Ok(())
}

/// Parse `address` and check it belongs to `network`.
pub fn decode_address(address: &str, network: Network) -> Result<Address, CoreError> {
    let unchecked: Address<NetworkUnchecked> = address
        .trim()
        .parse()
        .map_err(|e| CoreError::InvalidAddress(format!("`{address}`: {e}")))?;
    unchecked
        .require_network(network)
        .map_err(|e| CoreError::InvalidAddress(format!("`{address}`: {e}")))
}

fn flush<W: Write>(out: &mut W) -> Result<(), ProbeError> {
    out.flush().map_err(|e| ProbeError {
        step: ProbeStep::Output,
        source: CoreError::Io(e),
    })
}
