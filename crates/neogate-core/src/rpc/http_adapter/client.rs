use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use lru::LruCache;
use reqwest::header;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::error::{NeoError, RpcError};
use crate::types::{
    Balance, Block, BlockHeader, GasAmount, InvocationResult, RawTransaction, Validator,
};
use crate::validation::{Address, BlockRef, Hash256};

use super::super::types::ContractCall;
use super::super::NeoRpc;
use super::connection::parse_connection;
use super::parsing::{
    parse_block, parse_block_header, parse_integer_required, parse_invocation_result,
    parse_nep17_balances, parse_raw_transaction, parse_send_result, parse_unclaimed_gas,
    parse_validators,
};
use super::protocol::{parse_jsonrpc_error, JsonRpcRequest, JsonRpcResponse};

/// Maximum number of block headers cached in memory.
const BLOCK_HEADER_CACHE_CAP: usize = 10_000;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Neo N3 JSON-RPC client over HTTP(S).
///
/// Keeps an LRU cache of block headers keyed by hash so confirmation
/// lookups for already-seen blocks skip the `getblockheader` round trip.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
    /// Headers of blocks already on chain never change; entries are only
    /// evicted under memory pressure.
    header_cache: RwLock<LruCache<Hash256, BlockHeader>>,
}

impl HttpRpcClient {
    /// Create a client for an `http://` or `https://` endpoint.
    ///
    /// If `requests_per_second` is set, outbound HTTP requests are paced to
    /// that rate instead of being rejected.
    pub fn new(connection: &str, requests_per_second: Option<u32>) -> Result<Self, NeoError> {
        let url = parse_connection(connection)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| RpcError::Client(format!("build HTTP client: {e}")))?;

        let limiter = match requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    NeoError::validation("requests_per_second must be at least 1")
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            limiter,
            next_id: AtomicU64::new(initial_request_id()),
            header_cache: RwLock::new(LruCache::new(
                NonZeroUsize::new(BLOCK_HEADER_CACHE_CAP).unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    async fn rpc_call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, RpcError> {
        self.wait_for_rate_limit().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
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
            .json(&req)
            .send()
            .await?;
        let status = response.status();

        let body = response.text().await?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(rpc.id = id, rpc.method = method, body = %body, "rpc response body");

        // Nodes report JSON-RPC errors with HTTP 200; anything else that is
        // not a JSON-RPC envelope is an HTTP-level failure.
        let decoded: JsonRpcResponse = match serde_json::from_str(&body) {
            Ok(decoded) => decoded,
            Err(_) if !status.is_success() => {
                return Err(RpcError::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => {
                return Err(RpcError::InvalidResponse(format!(
                    "decode JSON-RPC response: {e}; body={body}"
                )));
            }
        };

        if let Some(err) = decoded.error {
            return Err(parse_jsonrpc_error(err));
        }

        Ok(decoded.result.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl NeoRpc for HttpRpcClient {
    async fn get_block_count(&self) -> Result<u32, NeoError> {
        let raw = self.rpc_call("getblockcount", Vec::new()).await?;
        Ok(parse_integer_required(Some(&raw), "getblockcount result")?)
    }

    async fn get_next_block_validators(&self) -> Result<Vec<Validator>, NeoError> {
        let raw = self.rpc_call("getnextblockvalidators", Vec::new()).await?;
        Ok(parse_validators(raw)?)
    }

    async fn get_block(&self, block: &BlockRef) -> Result<Block, NeoError> {
        let raw = self
            .rpc_call("getblock", vec![block.to_param(), serde_json::json!(true)])
            .await?;
        Ok(parse_block(raw)?)
    }

    async fn get_block_header(&self, hash: &Hash256) -> Result<BlockHeader, NeoError> {
        // `LruCache::get` updates recency, so even lookups need the write lock.
        if let Some(header) = self.header_cache.write().await.get(hash).cloned() {
            return Ok(header);
        }

        let raw = self
            .rpc_call(
                "getblockheader",
                vec![serde_json::json!(hash.as_str()), serde_json::json!(true)],
            )
            .await?;
        let header = parse_block_header(&raw)?;
        self.header_cache
            .write()
            .await
            .put(hash.clone(), header.clone());
        Ok(header)
    }

    async fn get_raw_transaction(
        &self,
        hash: &Hash256,
    ) -> Result<Option<RawTransaction>, NeoError> {
        let result = self
            .rpc_call(
                "getrawtransaction",
                vec![serde_json::json!(hash.as_str()), serde_json::json!(true)],
            )
            .await;
        match result {
            Ok(raw) => Ok(Some(parse_raw_transaction(raw)?)),
            Err(RpcError::ServerError { code, message })
                if is_unknown_transaction_error(code, &message) =>
            {
                debug!(tx = %hash, code, "node does not know transaction");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_nep17_balances(&self, address: &Address) -> Result<Balance, NeoError> {
        let raw = self
            .rpc_call(
                "getnep17balances",
                vec![serde_json::json!(address.as_str())],
            )
            .await?;
        Ok(parse_nep17_balances(raw, address)?)
    }

    async fn get_unclaimed_gas(&self, address: &Address) -> Result<GasAmount, NeoError> {
        let raw = self
            .rpc_call("getunclaimedgas", vec![serde_json::json!(address.as_str())])
            .await?;
        Ok(parse_unclaimed_gas(raw)?)
    }

    async fn invoke_function(&self, call: &ContractCall) -> Result<InvocationResult, NeoError> {
        let raw = self.rpc_call("invokefunction", call.to_params()).await?;
        Ok(parse_invocation_result(raw)?)
    }

    async fn send_raw_transaction(&self, raw: &str) -> Result<Hash256, NeoError> {
        let result = self
            .rpc_call("sendrawtransaction", vec![serde_json::json!(raw)])
            .await
            .map_err(normalize_broadcast_error)?;
        Ok(parse_send_result(result)?)
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

/// Older nodes answer `-100 Unknown transaction`, newer ones `-103`.
fn is_unknown_transaction_error(code: i64, message: &str) -> bool {
    let msg = message.to_ascii_lowercase();
    matches!(code, -100 | -103) && msg.contains("unknown transaction")
}

/// The node refusing a transaction (bad witness, insufficient funds,
/// expired, duplicate) is a rejection, not a connectivity problem.
fn normalize_broadcast_error(err: RpcError) -> NeoError {
    match err {
        RpcError::ServerError { code, message } => {
            NeoError::Transaction(format!("{message} (code {code})"))
        }
        other => other.into(),
    }
}
