//! Shared test helpers for `btc-probe-core` unit tests.
//!
//! Builder functions for dummy transactions, outputs and UTXOs so that tests
//! across modules share a single source of truth for fixture construction.

use bitcoin::hashes::Hash;
use bitcoin::{Amount, Network, OutPoint, ScriptBuf, Txid, Wtxid};

use crate::types::{ScriptType, TxDetail, TxInput, TxOutput, Utxo};

// ==============================================================================
// Hash Helpers
// ==============================================================================

/// Create a deterministic `Txid` from a single distinguishing byte.
pub fn txid_from_byte(b: u8) -> Txid {
    let mut bytes = [0u8; 32];
    bytes[0] = b;
    Txid::from_byte_array(bytes)
}

/// The regtest genesis block; a real, consensus-valid block for decode tests.
pub fn regtest_genesis() -> bitcoin::Block {
    bitcoin::blockdata::constants::genesis_block(Network::Regtest)
}

// ==============================================================================
// Transaction Builders
// ==============================================================================

/// A coinbase input (no prevout).
pub fn coinbase_input() -> TxInput {
    TxInput {
        prevout: None,
        coinbase: Some(ScriptBuf::from_bytes(vec![0x51, 0x00])),
        script_sig: None,
        sequence: 0xFFFFFFFF,
    }
}

/// A spending input referencing `funding_txid:vout`.
pub fn spending_input(funding_txid: Txid, vout: u32) -> TxInput {
    TxInput {
        prevout: Some(OutPoint::new(funding_txid, vout)),
        coinbase: None,
        script_sig: Some(ScriptBuf::new()),
        sequence: 0xFFFFFFFE,
    }
}

/// A minimal valid P2WPKH output with the given satoshi value and index.
pub fn p2wpkh_output(sats: u64, n: u32) -> TxOutput {
    // OP_0 PUSH20 <20-byte-hash>
    let script_bytes = [
        0x00, 0x14, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
        0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14,
    ];
    TxOutput {
        value: Amount::from_sat(sats),
        n,
        script_pub_key: ScriptBuf::from_bytes(script_bytes.to_vec()),
        script_type: ScriptType::P2wpkh,
        address: None,
    }
}

/// Build a confirmed `TxDetail` with sane defaults. Override fields after
/// construction when needed.
pub fn make_tx_detail(txid: Txid, inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> TxDetail {
    TxDetail {
        txid,
        wtxid: Wtxid::from_byte_array(txid.to_byte_array()),
        version: 2,
        locktime: 0,
        size: 250,
        vsize: 140,
        weight: 560,
        block_hash: None,
        confirmations: Some(6),
        time: Some(1_700_000_000),
        block_time: Some(1_700_000_000),
        inputs,
        outputs,
    }
}

/// A spendable, confirmed UTXO worth `sats`.
pub fn make_utxo(txid: Txid, vout: u32, sats: u64) -> Utxo {
    Utxo {
        outpoint: OutPoint::new(txid, vout),
        address: None,
        amount: Amount::from_sat(sats),
        confirmations: 10,
        spendable: true,
    }
}
