//! Domain types for the probe: chain info, block summary, verbose
//! transaction detail and wallet UTXOs, plus shared enums like `ScriptType`
//! and `BlockHeight`.

use bitcoin::block::Header;
use bitcoin::{Amount, BlockHash, Network, OutPoint, ScriptBuf, Txid, Wtxid};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ==============================================================================
// Script Type Classification
// ==============================================================================

/// Classifies a script output type. Detection is delegated to the `bitcoin`
/// crate's `Script::is_p2pkh()`, `is_p2sh()`, etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    P2pk,
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2tr,
    BareMultisig,
    OpReturn,
    Unknown,
}

impl ScriptType {
    #[must_use]
    pub fn classify(script: &bitcoin::Script) -> Self {
        if script.is_p2pk() {
            Self::P2pk
        } else if script.is_p2pkh() {
            Self::P2pkh
        } else if script.is_p2sh() {
            Self::P2sh
        } else if script.is_p2wpkh() {
            Self::P2wpkh
        } else if script.is_p2wsh() {
            Self::P2wsh
        } else if script.is_p2tr() {
            Self::P2tr
        } else if script.is_multisig() {
            Self::BareMultisig
        } else if script.is_op_return() {
            Self::OpReturn
        } else {
            Self::Unknown
        }
    }
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P2pk => write!(f, "p2pk"),
            Self::P2pkh => write!(f, "p2pkh"),
            Self::P2sh => write!(f, "p2sh"),
            Self::P2wpkh => write!(f, "p2wpkh"),
            Self::P2wsh => write!(f, "p2wsh"),
            Self::P2tr => write!(f, "p2tr"),
            Self::BareMultisig => write!(f, "bare_multisig"),
            Self::OpReturn => write!(f, "op_return"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ==============================================================================
// Block Height
// ==============================================================================

/// A Bitcoin block height, wrapped for type safety.
///
/// `#[serde(transparent)]` keeps the JSON representation a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockHeight(pub u32);

impl From<u32> for BlockHeight {
    fn from(h: u32) -> Self {
        Self(h)
    }
}

impl From<BlockHeight> for u32 {
    fn from(h: BlockHeight) -> Self {
        h.0
    }
}

impl std::ops::Deref for BlockHeight {
    type Target = u32;
    fn deref(&self) -> &u32 {
        &self.0
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// Chain Info
// ==============================================================================

/// Basic chain information from `getblockchaininfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: BlockHeight,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: BlockHash,
    #[serde(default)]
    pub pruned: bool,
}

/// Map the chain name reported by `getblockchaininfo` to a [`Network`].
pub fn map_chain_to_network(chain: &str) -> Result<Network, CoreError> {
    match chain {
        "main" => Ok(Network::Bitcoin),
        // testnet4 shares testnet's address encoding.
        "test" | "testnet4" => Ok(Network::Testnet),
        "signet" => Ok(Network::Signet),
        "regtest" => Ok(Network::Regtest),
        _ => Err(CoreError::InvalidData(format!(
            "unrecognized chain name `{chain}` from getblockchaininfo"
        ))),
    }
}

// ==============================================================================
// Block Summary
// ==============================================================================

/// The tip block as printed: its identity plus the decoded header.
#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub hash: BlockHash,
    pub height: BlockHeight,
    pub header: Header,
    pub tx_count: usize,
}

impl BlockSummary {
    pub fn new(height: BlockHeight, block: &bitcoin::Block) -> Self {
        Self {
            hash: block.block_hash(),
            height,
            header: block.header,
            tx_count: block.txdata.len(),
        }
    }
}

// ==============================================================================
// Transaction Detail
// ==============================================================================

/// A transaction as returned by verbose `getrawtransaction`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxDetail {
    pub txid: Txid,
    pub wtxid: Wtxid,
    pub version: i32,
    pub locktime: u32,
    pub size: u64,
    pub vsize: u64,
    pub weight: u64,
    /// `None` while the transaction sits in the mempool.
    pub block_hash: Option<BlockHash>,
    pub confirmations: Option<u64>,
    pub time: Option<u64>,
    pub block_time: Option<u64>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl TxDetail {
    /// A coinbase transaction has exactly one input whose prevout is `None`.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_none()
    }
}

/// A transaction input. For coinbase inputs, `prevout` is `None` and
/// `coinbase` carries the raw coinbase data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    pub prevout: Option<OutPoint>,
    pub coinbase: Option<ScriptBuf>,
    pub script_sig: Option<ScriptBuf>,
    pub sequence: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    pub n: u32,
    pub script_pub_key: ScriptBuf,
    pub script_type: ScriptType,
    /// Address as rendered by the node, when the script has one.
    pub address: Option<String>,
}

// ==============================================================================
// Unspent Outputs
// ==============================================================================

/// One entry of `listunspent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub address: Option<String>,
    pub amount: Amount,
    pub confirmations: u64,
    pub spendable: bool,
}

/// Sum UTXO amounts, failing instead of wrapping on overflow.
pub fn total_balance(utxos: &[Utxo]) -> Result<Amount, CoreError> {
    utxos.iter().try_fold(Amount::ZERO, |acc, utxo| {
        acc.checked_add(utxo.amount)
            .ok_or_else(|| CoreError::InvalidData("UTXO balance overflows".into()))
    })
}
