use std::path::PathBuf;

use bitcoin::Txid;

/// Wrapping variants leave their cause to `source()`; messages never embed it.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure")]
    Rpc(#[from] RpcError),

    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("transaction not found: {0}")]
    TxNotFound(Txid),

    #[error("invalid RPC data: {0}")]
    InvalidData(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures talking to the node, split by where in the exchange they happened.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),

    #[error("node rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("server error {code}: {message}")]
    ServerError { code: i64, message: String },

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("environment variable {0} is empty")]
    EmptyVar(&'static str),

    #[error("invalid port `{value}`: {reason}")]
    InvalidPort { value: String, reason: String },

    #[error("failed to load env file {}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("invalid RPC endpoint: {0}")]
    InvalidEndpoint(String),
}
