use crate::error::{CoreError, RpcError};

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: Vec<serde_json::Value>,
}

#[derive(serde::Deserialize)]
pub(super) struct JsonRpcResponse {
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

/// Parse a JSON-RPC error value into a structured `CoreError`.
///
/// Errors of the shape `{"code": <int>, "message": <string>}` become a
/// `ServerError`; anything else falls back to `InvalidResponse` with the raw
/// JSON.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> CoreError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    if let Ok(parsed) = serde_json::from_value::<JsonRpcError>(err.clone()) {
        CoreError::Rpc(RpcError::ServerError {
            code: parsed.code,
            message: parsed.message,
        })
    } else {
        CoreError::Rpc(RpcError::InvalidResponse(format!(
            "non-standard JSON-RPC error: {err}"
        )))
    }
}

/// Decode a response body into its `result`, surfacing the `error` member.
///
/// Bitcoin Core sends `"error": null` on success and a `null` result for
/// some methods, so a missing result is mapped to `Value::Null`.
pub(super) fn decode_response(body: &str) -> Result<serde_json::Value, CoreError> {
    let decoded: JsonRpcResponse = serde_json::from_str(body).map_err(|e| {
        RpcError::InvalidResponse(format!("decode JSON-RPC response: {e}; body={body}"))
    })?;

    match decoded.error {
        Some(err) if !err.is_null() => Err(parse_jsonrpc_error(err)),
        _ => Ok(decoded.result.unwrap_or(serde_json::Value::Null)),
    }
}
