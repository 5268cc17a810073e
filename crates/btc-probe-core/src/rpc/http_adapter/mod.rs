//! Native JSON-RPC client for Bitcoin Core compatible endpoints.
//!
//! Implements [`BitcoinRpc`](super::BitcoinRpc) over JSON-RPC using
//! `reqwest`, with basic auth and plain HTTP transport.

mod client;
mod connection;
mod parsing;
mod protocol;

pub use client::HttpRpcClient;
