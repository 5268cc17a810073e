//! Bitcoin Core RPC abstraction layer.
//!
//! Defines the [`BitcoinRpc`] trait and provides an HTTP JSON-RPC
//! implementation ([`HttpRpcClient`]) plus a test mock (`mock::MockRpc`).

mod http_adapter;
#[cfg(test)]
pub mod mock;

pub use http_adapter::HttpRpcClient;

use async_trait::async_trait;
use bitcoin::{Address, BlockHash, Txid};

use crate::error::CoreError;
use crate::types::{BlockHeight, ChainInfo, TxDetail, Utxo};

/// The read-only Bitcoin Core RPC methods the probe issues.
///
/// Implementations are expected to handle authentication, connection
/// management, and response deserialization internally.
#[async_trait]
pub trait BitcoinRpc: Send + Sync {
    /// Fetch basic chain info (network, block count, pruning status).
    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError>;

    /// Hash of the block at `height` on the active chain.
    async fn get_block_hash(&self, height: BlockHeight) -> Result<BlockHash, CoreError>;

    /// Fetch and consensus-decode a full block.
    async fn get_block(&self, hash: &BlockHash) -> Result<bitcoin::Block, CoreError>;

    /// Fetch a decoded transaction by txid (`getrawtransaction` verbose).
    async fn get_raw_transaction_verbose(&self, txid: &Txid) -> Result<TxDetail, CoreError>;

    /// Wallet UTXOs paying to any of `addresses` with a confirmation count in
    /// `min_conf..=max_conf`.
    async fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: u32,
        addresses: &[Address],
    ) -> Result<Vec<Utxo>, CoreError>;
}
