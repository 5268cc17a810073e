//! Plain-text rendering of the probe results.
//!
//! Each section is written as soon as its data is available, so a failure
//! later in the probe leaves the earlier sections on the output.

use std::io::Write;

use bitcoin::Amount;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::CoreError;
use crate::types::{BlockSummary, TxDetail, TxInput, TxOutput};

pub fn write_block<W: Write>(out: &mut W, block: &BlockSummary) -> Result<(), CoreError> {
    let header = &block.header;
    writeln!(out, "Latest Block Hash: {}", block.hash)?;
    writeln!(out, "Block Height: {}", block.height)?;
    writeln!(out, "Block Version: {}", header.version.to_consensus())?;
    writeln!(out, "Previous Block Hash: {}", header.prev_blockhash)?;
    writeln!(out, "Merkle Root: {}", header.merkle_root)?;
    writeln!(out, "Timestamp: {}", format_timestamp(header.time)?)?;
    writeln!(out, "Bits: {}", header.bits.to_consensus())?;
    writeln!(out, "Nonce: {}", header.nonce)?;
    writeln!(out, "Transaction Count: {}", block.tx_count)?;
    Ok(())
}

pub fn write_transaction<W: Write>(out: &mut W, tx: &TxDetail) -> Result<(), CoreError> {
    writeln!(out, "Transaction ID: {}", tx.txid)?;
    writeln!(out, "Transaction Hash: {}", tx.wtxid)?;
    writeln!(out, "Confirmations: {}", tx.confirmations.unwrap_or(0))?;
    match tx.block_hash {
        Some(hash) => writeln!(out, "Block Hash: {hash}")?,
        None => writeln!(out, "Block Hash: (unconfirmed)")?,
    }
    writeln!(out, "Block Time: {}", tx.block_time.unwrap_or(0))?;
    writeln!(out, "Transaction Time: {}", tx.time.unwrap_or(0))?;

    writeln!(out, "Inputs:")?;
    for input in &tx.inputs {
        write_input(out, input)?;
    }
    writeln!(out, "Outputs:")?;
    for output in &tx.outputs {
        write_output(out, output)?;
    }
    Ok(())
}

fn write_input<W: Write>(out: &mut W, input: &TxInput) -> Result<(), CoreError> {
    match (&input.prevout, &input.coinbase) {
        (Some(prevout), _) => {
            let script_sig = input
                .script_sig
                .as_ref()
                .map(|s| s.to_asm_string())
                .unwrap_or_default();
            writeln!(
                out,
                "  TxID: {}, Vout: {}, ScriptSig: {}",
                prevout.txid, prevout.vout, script_sig
            )?;
        }
        (None, Some(coinbase)) => {
            writeln!(
                out,
                "  Coinbase: {:x}, Sequence: {}",
                coinbase.as_script(),
                input.sequence
            )?;
        }
        (None, None) => {
            writeln!(out, "  (no prevout), Sequence: {}", input.sequence)?;
        }
    }
    Ok(())
}

fn write_output<W: Write>(out: &mut W, output: &TxOutput) -> Result<(), CoreError> {
    writeln!(
        out,
        "  Value: {}, N: {}, ScriptPubKey: {} ({})",
        format_btc(output.value),
        output.n,
        output.script_pub_key.to_asm_string(),
        output.script_type
    )?;
    Ok(())
}

pub fn write_balance<W: Write>(out: &mut W, address: &str, balance: Amount) -> Result<(), CoreError> {
    writeln!(
        out,
        "Balance for address {address}: {} BTC",
        format_btc(balance)
    )?;
    Ok(())
}

/// Fixed eight-decimal BTC rendering, computed from satoshis so no float
/// rounding creeps in.
pub fn format_btc(amount: Amount) -> String {
    let sats = amount.to_sat();
    format!("{}.{:08}", sats / 100_000_000, sats % 100_000_000)
}

fn format_timestamp(unix: u32) -> Result<String, CoreError> {
    OffsetDateTime::from_unix_timestamp(i64::from(unix))
        .map_err(|e| CoreError::InvalidData(format!("invalid block timestamp {unix}: {e}")))?
        .format(&Rfc3339)
        .map_err(|e| CoreError::InvalidData(format!("format block timestamp {unix}: {e}")))
}
