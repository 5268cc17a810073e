use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bitcoin::hashes::Hash;
use bitcoin::{Address, BlockHash, Txid};

use crate::error::{CoreError, RpcError};
use crate::types::{BlockHeight, ChainInfo, TxDetail, Utxo};

use super::BitcoinRpc;

/// A mock Bitcoin RPC backend for testing. Returns canned data populated via
/// the builder pattern and records every method it is asked to serve.
pub struct MockRpc {
    chain_info: ChainInfo,
    block_hashes: HashMap<BlockHeight, BlockHash>,
    blocks: HashMap<BlockHash, bitcoin::Block>,
    transactions: HashMap<Txid, TxDetail>,
    utxos: HashMap<String, Vec<Utxo>>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<&'static str>>,
}

impl MockRpc {
    pub fn builder() -> MockRpcBuilder {
        MockRpcBuilder {
            chain_info: ChainInfo {
                chain: "regtest".into(),
                blocks: BlockHeight(0),
                best_block_hash: BlockHash::all_zeros(),
                pruned: false,
            },
            block_hashes: HashMap::new(),
            blocks: HashMap::new(),
            transactions: HashMap::new(),
            utxos: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    /// Method names served so far, in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    fn record(&self, method: &'static str) -> Result<(), CoreError> {
        self.calls.lock().expect("mock call log poisoned").push(method);
        if self.failing.contains(method) {
            return Err(CoreError::Rpc(RpcError::ServerError {
                code: -1,
                message: format!("injected {method} failure"),
            }));
        }
        Ok(())
    }
}

pub struct MockRpcBuilder {
    chain_info: ChainInfo,
    block_hashes: HashMap<BlockHeight, BlockHash>,
    blocks: HashMap<BlockHash, bitcoin::Block>,
    transactions: HashMap<Txid, TxDetail>,
    utxos: HashMap<String, Vec<Utxo>>,
    failing: HashSet<&'static str>,
}

impl MockRpcBuilder {
    pub fn with_chain(mut self, chain: &str) -> Self {
        self.chain_info.chain = chain.to_owned();
        self
    }

    /// Make `block` the chain tip at `height`.
    pub fn with_tip(mut self, height: BlockHeight, block: bitcoin::Block) -> Self {
        let hash = block.block_hash();
        self.chain_info.blocks = height;
        self.chain_info.best_block_hash = hash;
        self.block_hashes.insert(height, hash);
        self.blocks.insert(hash, block);
        self
    }

    pub fn with_tx(mut self, tx: TxDetail) -> Self {
        self.transactions.insert(tx.txid, tx);
        self
    }

    pub fn with_utxos(mut self, address: &str, utxos: Vec<Utxo>) -> Self {
        self.utxos.insert(address.to_owned(), utxos);
        self
    }

    /// Make every call to `method` (JSON-RPC method name) fail.
    pub fn failing(mut self, method: &'static str) -> Self {
        self.failing.insert(method);
        self
    }

    pub fn build(self) -> MockRpc {
        MockRpc {
            chain_info: self.chain_info,
            block_hashes: self.block_hashes,
            blocks: self.blocks,
            transactions: self.transactions,
            utxos: self.utxos,
            failing: self.failing,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BitcoinRpc for MockRpc {
    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError> {
        self.record("getblockchaininfo")?;
        Ok(self.chain_info.clone())
    }

    async fn get_block_hash(&self, height: BlockHeight) -> Result<BlockHash, CoreError> {
        self.record("getblockhash")?;
        self.block_hashes.get(&height).copied().ok_or_else(|| {
            CoreError::Rpc(RpcError::ServerError {
                code: -8,
                message: "Block height out of range".into(),
            })
        })
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<bitcoin::Block, CoreError> {
        self.record("getblock")?;
        self.blocks.get(hash).cloned().ok_or_else(|| {
            CoreError::Rpc(RpcError::ServerError {
                code: -5,
                message: "Block not found".into(),
            })
        })
    }

    async fn get_raw_transaction_verbose(&self, txid: &Txid) -> Result<TxDetail, CoreError> {
        self.record("getrawtransaction")?;
        self.transactions
            .get(txid)
            .cloned()
            .ok_or(CoreError::TxNotFound(*txid))
    }

    async fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: u32,
        addresses: &[Address],
    ) -> Result<Vec<Utxo>, CoreError> {
        self.record("listunspent")?;
        let range = u64::from(min_conf)..=u64::from(max_conf);
        Ok(addresses
            .iter()
            .filter_map(|address| self.utxos.get(&address.to_string()))
            .flatten()
            .filter(|utxo| range.contains(&utxo.confirmations))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use bitcoin::address::NetworkUnchecked;
    use bitcoin::{Amount, Network};

    const REGTEST_ADDR: &str = "bcrt1q50p0jp9hdyzt3k7ep3r50hxaaqucm4dp3dfzsz";

    #[tokio::test]
    async fn with_tip_serves_height_hash_and_block() {
        let genesis = regtest_genesis();
        let rpc = MockRpc::builder()
            .with_tip(BlockHeight(0), genesis.clone())
            .build();

        let info = rpc.get_blockchain_info().await.unwrap();
        assert_eq!(info.best_block_hash, genesis.block_hash());

        let hash = rpc.get_block_hash(info.blocks).await.unwrap();
        let block = rpc.get_block(&hash).await.unwrap();
        assert_eq!(block.block_hash(), genesis.block_hash());
        assert_eq!(
            rpc.calls(),
            vec!["getblockchaininfo", "getblockhash", "getblock"]
        );
    }

    #[tokio::test]
    async fn list_unspent_filters_by_confirmations() {
        let address: Address = REGTEST_ADDR
            .parse::<Address<NetworkUnchecked>>()
            .unwrap()
            .require_network(Network::Regtest)
            .unwrap();
        let mut shallow = make_utxo(txid_from_byte(2), 0, 1_000);
        shallow.confirmations = 0;
        let deep = make_utxo(txid_from_byte(3), 1, 2_000);

        let rpc = MockRpc::builder()
            .with_utxos(REGTEST_ADDR, vec![shallow, deep])
            .build();
        let utxos = rpc.list_unspent(1, 9_999_999, &[address]).await.unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].amount, Amount::from_sat(2_000));
    }

    #[tokio::test]
    async fn failing_method_returns_error_and_is_recorded() {
        let rpc = MockRpc::builder().failing("getblockchaininfo").build();
        assert!(rpc.get_blockchain_info().await.is_err());
        assert_eq!(rpc.calls(), vec!["getblockchaininfo"]);
    }
}
