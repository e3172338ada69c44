use reqwest::Url;

use crate::error::RpcError;

/// Validate an RPC endpoint, accepting only HTTP(S) URLs.
pub(super) fn parse_connection(connection: &str) -> Result<String, RpcError> {
    let connection = connection.trim();
    if connection.is_empty() {
        return Err(RpcError::Client("RPC URL is empty".to_owned()));
    }
    let parsed = Url::parse(connection).map_err(|e| {
        RpcError::Client(format!(
            "invalid connection `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(connection.to_owned()),
        other => Err(RpcError::Client(format!(
            "unsupported connection scheme `{other}`; expected http or https"
        ))),
    }
}
