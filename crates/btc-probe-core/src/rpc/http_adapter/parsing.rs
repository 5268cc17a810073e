use bitcoin::hex::FromHex;
use bitcoin::{Amount, BlockHash, OutPoint, ScriptBuf, Txid, Wtxid};

use crate::error::CoreError;
use crate::types::{ScriptType, TxDetail, TxInput, TxOutput, Utxo};

/// Parse any hash newtype (`Txid`, `Wtxid`, `BlockHash`) from a hex string field.
pub(super) fn parse_hash<H>(value: Option<&serde_json::Value>, field: &str) -> Result<H, CoreError>
where
    H: std::str::FromStr,
    H::Err: std::fmt::Display,
{
    let value = value
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| CoreError::InvalidData(format!("missing {field}")))?;
    value
        .parse()
        .map_err(|e| CoreError::InvalidData(format!("invalid {field}: {e}")))
}

pub(super) fn parse_opt_block_hash(
    value: Option<&serde_json::Value>,
) -> Result<Option<BlockHash>, CoreError> {
    match value.and_then(serde_json::Value::as_str) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|e| CoreError::InvalidData(format!("invalid blockhash: {e}"))),
    }
}

pub(super) fn parse_integer_required<T, const SIGNED: bool>(
    value: Option<&serde_json::Value>,
    field: &str,
) -> Result<T, CoreError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    parse_integer::<T, SIGNED, true>(value, field)?
        .ok_or_else(|| CoreError::InvalidData(format!("missing {field}")))
}

pub(super) fn parse_integer_optional<T, const SIGNED: bool>(
    value: Option<&serde_json::Value>,
) -> Option<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    parse_integer::<T, SIGNED, false>(value, "value")
        .ok()
        .flatten()
}

// Generic integer parser used by all concrete numeric helpers.
// `REQUIRED=false` treats missing/null/type-mismatch as `Ok(None)`.
fn parse_integer<T, const SIGNED: bool, const REQUIRED: bool>(
    value: Option<&serde_json::Value>,
    field: &str,
) -> Result<Option<T>, CoreError>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let missing_or_none = || {
        if REQUIRED {
            Err(CoreError::InvalidData(format!("missing {field}")))
        } else {
            Ok(None)
        }
    };

    let Some(value) = value else {
        return missing_or_none();
    };

    if SIGNED {
        let Some(n) = value.as_i64() else {
            return missing_or_none();
        };
        T::try_from(n)
            .map(Some)
            .map_err(|_| CoreError::InvalidData(format!("{field} out of range: {n}")))
    } else {
        let Some(n) = value.as_u64() else {
            return missing_or_none();
        };
        T::try_from(n)
            .map(Some)
            .map_err(|_| CoreError::InvalidData(format!("{field} out of range: {n}")))
    }
}

// ==============================================================================
// Blocks
// ==============================================================================

/// Decode the hex string returned by `getblock <hash> 0` and check that it is
/// the block that was asked for.
pub(super) fn parse_block_hex(
    raw: &serde_json::Value,
    expected: &BlockHash,
) -> Result<bitcoin::Block, CoreError> {
    let hex_str = raw
        .as_str()
        .ok_or_else(|| CoreError::InvalidData(format!("expected block hex string, got: {raw}")))?;
    let bytes = Vec::<u8>::from_hex(hex_str)
        .map_err(|e| CoreError::InvalidData(format!("invalid block hex: {e}")))?;
    let block: bitcoin::Block = bitcoin::consensus::deserialize(&bytes)
        .map_err(|e| CoreError::InvalidData(format!("invalid block encoding: {e}")))?;

    let actual = block.block_hash();
    if actual != *expected {
        return Err(CoreError::InvalidData(format!(
            "node returned block {actual} for requested hash {expected}"
        )));
    }
    Ok(block)
}

// ==============================================================================
// Transactions
// ==============================================================================

pub(super) fn parse_tx_detail(raw: &serde_json::Value) -> Result<TxDetail, CoreError> {
    let txid: Txid = parse_hash(raw.get("txid"), "txid")?;
    let wtxid: Wtxid = parse_hash(raw.get("hash"), "hash")?;
    let version = parse_integer_required::<i32, true>(raw.get("version"), "version")?;
    let locktime = parse_integer_required::<u32, false>(raw.get("locktime"), "locktime")?;
    let size = parse_integer_required::<u64, false>(raw.get("size"), "size")?;
    let vsize = parse_integer_required::<u64, false>(raw.get("vsize"), "vsize")?;
    let weight = parse_integer_required::<u64, false>(raw.get("weight"), "weight")?;
    let block_hash = parse_opt_block_hash(raw.get("blockhash"))?;
    let confirmations = parse_integer_optional::<u64, false>(raw.get("confirmations"));
    let time = parse_integer_optional::<u64, false>(raw.get("time"));
    let block_time = parse_integer_optional::<u64, false>(raw.get("blocktime"));

    let vin = raw
        .get("vin")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| CoreError::InvalidData("missing vin array".into()))?;
    let vout = raw
        .get("vout")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| CoreError::InvalidData("missing vout array".into()))?;

    Ok(TxDetail {
        txid,
        wtxid,
        version,
        locktime,
        size,
        vsize,
        weight,
        block_hash,
        confirmations,
        time,
        block_time,
        inputs: parse_vin(vin)?,
        outputs: parse_vout(vout)?,
    })
}

pub(super) fn parse_vin(vin: &[serde_json::Value]) -> Result<Vec<TxInput>, CoreError> {
    vin.iter()
        .map(|input| {
            let sequence = parse_integer_required::<u32, false>(input.get("sequence"), "sequence")?;

            if let Some(coinbase) = input.get("coinbase") {
                let coinbase_hex = coinbase
                    .as_str()
                    .ok_or_else(|| CoreError::InvalidData("coinbase must be a hex string".into()))?;
                return Ok(TxInput {
                    prevout: None,
                    coinbase: Some(script_from_hex(coinbase_hex)?),
                    script_sig: None,
                    sequence,
                });
            }

            let prev_txid = parse_hash(input.get("txid"), "vin.txid")?;
            let prev_vout = parse_integer_required::<u32, false>(input.get("vout"), "vin.vout")?;
            let script_sig = input
                .get("scriptSig")
                .and_then(|s| s.get("hex"))
                .and_then(serde_json::Value::as_str)
                .map(script_from_hex)
                .transpose()?;

            Ok(TxInput {
                prevout: Some(OutPoint::new(prev_txid, prev_vout)),
                coinbase: None,
                script_sig,
                sequence,
            })
        })
        .collect()
}

pub(super) fn parse_vout(vout: &[serde_json::Value]) -> Result<Vec<TxOutput>, CoreError> {
    vout.iter()
        .enumerate()
        .map(|(position, output)| {
            let value = parse_btc_amount(
                output
                    .get("value")
                    .ok_or_else(|| CoreError::InvalidData("missing value in vout".into()))?,
            )?;
            let n = parse_integer_required::<u32, false>(output.get("n"), "vout.n")?;
            if usize::try_from(n).ok() != Some(position) {
                return Err(CoreError::InvalidData(format!(
                    "vout.n {n} does not match position {position}"
                )));
            }

            let spk = output
                .get("scriptPubKey")
                .ok_or_else(|| CoreError::InvalidData("missing scriptPubKey in vout".into()))?;
            let script = parse_script_pubkey_from_json(spk)?;
            let script_type = ScriptType::classify(script.as_script());
            let address = spk
                .get("address")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned);

            Ok(TxOutput {
                value,
                n,
                script_pub_key: script,
                script_type,
                address,
            })
        })
        .collect()
}

// ==============================================================================
// Unspent Outputs
// ==============================================================================

pub(super) fn parse_list_unspent(raw: &serde_json::Value) -> Result<Vec<Utxo>, CoreError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| CoreError::InvalidData(format!("expected listunspent array, got: {raw}")))?;
    entries.iter().map(parse_utxo).collect()
}

fn parse_utxo(entry: &serde_json::Value) -> Result<Utxo, CoreError> {
    let txid: Txid = parse_hash(entry.get("txid"), "listunspent.txid")?;
    let vout = parse_integer_required::<u32, false>(entry.get("vout"), "listunspent.vout")?;
    let amount = parse_btc_amount(
        entry
            .get("amount")
            .ok_or_else(|| CoreError::InvalidData("missing amount in listunspent".into()))?,
    )?;
    let confirmations =
        parse_integer_required::<u64, false>(entry.get("confirmations"), "confirmations")?;
    let address = entry
        .get("address")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    let spendable = entry
        .get("spendable")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    Ok(Utxo {
        outpoint: OutPoint::new(txid, vout),
        address,
        amount,
        confirmations,
        spendable,
    })
}

// ==============================================================================
// Scripts and Amounts
// ==============================================================================

fn parse_script_pubkey_from_json(spk: &serde_json::Value) -> Result<ScriptBuf, CoreError> {
    let hex_str = spk
        .get("hex")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| CoreError::InvalidData("missing hex in scriptPubKey".into()))?;
    script_from_hex(hex_str)
}

fn script_from_hex(hex_str: &str) -> Result<ScriptBuf, CoreError> {
    ScriptBuf::from_hex(hex_str)
        .map_err(|e| CoreError::InvalidData(format!("invalid script hex: {e}")))
}

/// Parse a BTC amount from a JSON value.
///
/// Number values are parsed via `Amount::from_float_in` to support scientific
/// notation, while string values are parsed via `Amount::from_str_in`.
pub(super) fn parse_btc_amount(value: &serde_json::Value) -> Result<Amount, CoreError> {
    match value {
        serde_json::Value::Number(n) => {
            let parsed = n
                .as_f64()
                .ok_or_else(|| CoreError::InvalidData(format!("invalid BTC amount `{value}`")))?;
            Amount::from_float_in(parsed, bitcoin::Denomination::Bitcoin)
                .map_err(|e| CoreError::InvalidData(format!("invalid BTC amount `{value}`: {e}")))
        }
        serde_json::Value::String(s) => Amount::from_str_in(s, bitcoin::Denomination::Bitcoin)
            .map_err(|e| CoreError::InvalidData(format!("invalid BTC amount `{s}`: {e}"))),
        _ => Err(CoreError::InvalidData(format!(
            "expected numeric BTC amount, got: {value}"
        ))),
    }
}
