use crate::error::RpcError;

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

/// Turn the `error` member of a JSON-RPC response into an [`RpcError`].
///
/// Neo nodes answer `{"code": <int>, "message": <string>}`, sometimes with
/// a `data` member holding the underlying exception text, which is appended.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> RpcError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
        #[serde(default)]
        data: Option<serde_json::Value>,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => {
            let message = match parsed.data.as_ref().and_then(serde_json::Value::as_str) {
                Some(data) if !data.is_empty() && data != parsed.message => {
                    format!("{} - {data}", parsed.message)
                }
                _ => parsed.message,
            };
            RpcError::ServerError {
                code: parsed.code,
                message,
            }
        }
        Err(_) => RpcError::InvalidResponse(format!("non-standard JSON-RPC error: {err}")),
    }
}
