use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bitcoin::{Address, BlockHash, Txid};
use reqwest::{header, StatusCode};
use tracing::{debug, trace};

use crate::config::RpcConfig;
use crate::error::{CoreError, RpcError};
use crate::types::{BlockHeight, ChainInfo, TxDetail, Utxo};

use super::super::BitcoinRpc;
use super::connection::endpoint_url;
use super::parsing::{parse_block_hex, parse_hash, parse_list_unspent, parse_tx_detail};
use super::protocol::{decode_response, JsonRpcRequest};

/// Bitcoin Core JSON-RPC client over HTTP.
///
/// One request per call; Bitcoin Core only speaks JSON-RPC over HTTP POST.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    user: String,
    password: String,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    /// Client for `http://{host}:{port}` authenticated with the configured
    /// username and password.
    pub fn from_config(config: &RpcConfig) -> Result<Self, CoreError> {
        let url = endpoint_url(&config.host, config.port)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(RpcError::Transport)?;

        Ok(Self {
            client,
            url,
            user: config.user.clone(),
            password: config.password.clone(),
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn reserve_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        let id = self.reserve_request_id();
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .basic_auth(&self.user, Some(&self.password))
            .json(&req)
            .send()
            .await
            .map_err(RpcError::Transport)?;
        let status = response.status();

        // Bitcoin Core answers bad credentials with an empty 401 body.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RpcError::Unauthorized {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(RpcError::Transport)?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        decode_response(&body)
    }
}

#[async_trait]
impl BitcoinRpc for HttpRpcClient {
    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError> {
        let raw = self.rpc_call("getblockchaininfo", Vec::new()).await?;
        let info: ChainInfo = serde_json::from_value(raw).map_err(|e| {
            CoreError::InvalidData(format!("invalid getblockchaininfo result: {e}"))
        })?;
        Ok(info)
    }

    async fn get_block_hash(&self, height: BlockHeight) -> Result<BlockHash, CoreError> {
        let raw = self
            .rpc_call("getblockhash", vec![serde_json::json!(*height)])
            .await?;
        parse_hash(Some(&raw), "getblockhash result")
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<bitcoin::Block, CoreError> {
        let raw = self
            .rpc_call(
                "getblock",
                vec![serde_json::json!(hash.to_string()), serde_json::json!(0)],
            )
            .await?;
        parse_block_hex(&raw, hash)
    }

    async fn get_raw_transaction_verbose(&self, txid: &Txid) -> Result<TxDetail, CoreError> {
        let raw = self
            .rpc_call(
                "getrawtransaction",
                vec![serde_json::json!(txid.to_string()), serde_json::json!(true)],
            )
            .await
            .map_err(|err| normalize_getrawtransaction_error(txid, err))?;
        parse_tx_detail(&raw)
    }

    async fn list_unspent(
        &self,
        min_conf: u32,
        max_conf: u32,
        addresses: &[Address],
    ) -> Result<Vec<Utxo>, CoreError> {
        let addresses: Vec<String> = addresses.iter().map(ToString::to_string).collect();
        let raw = self
            .rpc_call(
                "listunspent",
                vec![
                    serde_json::json!(min_conf),
                    serde_json::json!(max_conf),
                    serde_json::json!(addresses),
                ],
            )
            .await?;
        parse_list_unspent(&raw)
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

// ==============================================================================
// RPC Error Normalization
// ==============================================================================

/// Convert Bitcoin Core "missing tx" JSON-RPC responses into `TxNotFound`,
/// preserving other RPC/transport failures as-is.
fn normalize_getrawtransaction_error(txid: &Txid, err: CoreError) -> CoreError {
    match err {
        CoreError::Rpc(RpcError::ServerError { code, message })
            if is_tx_not_found_server_error(code, &message) =>
        {
            CoreError::TxNotFound(*txid)
        }
        other => other,
    }
}

fn is_tx_not_found_server_error(code: i64, message: &str) -> bool {
    if code != -5 {
        return false;
    }

    let msg = message.to_ascii_lowercase();
    msg.contains("not found") || msg.contains("no such mempool or blockchain transaction")
}
