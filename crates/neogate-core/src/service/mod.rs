//! The resilient facade over one network's node.
//!
//! Every node call goes through the same pipeline: input validation, cache
//! lookup (reads only), rate-limit admission, bounded retry, result
//! decoding. Each instance owns its cache and limiter; services for
//! different networks share nothing.

mod reads;
mod wallet;
mod writes;

pub use writes::Asset;
pub(crate) use writes::transfer_call;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::account::{Account, KeyManager};
use crate::cache::TtlCache;
use crate::error::NeoError;
use crate::network::Network;
use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, RetryPolicy};
use crate::rpc::{ContractCall, HttpRpcClient, NeoRpc};
use crate::types::{Balance, Block, BlockchainInfo, GasAmount, InvocationResult, UnsignedTransaction};
use crate::validation::{Address, Hash256};

/// Default cap on a single transfer, in whole tokens.
pub const DEFAULT_MAX_TRANSFER_AMOUNT: u64 = 100_000_000;

/// Blocks a built transaction stays valid for (about one day at 15 s blocks).
pub const DEFAULT_VALID_UNTIL_WINDOW: u32 = 5_760;

/// Multiplier applied to dry-run GAS consumption, in basis points (1.2x).
pub const DEFAULT_FEE_MARGIN_BPS: u32 = 12_000;

// ==============================================================================
// Configuration
// ==============================================================================

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub cache_ttl: Duration,
    /// `(max_requests, window)` per RPC method; `None` disables admission control.
    pub rate_limit: Option<(u32, Duration)>,
    pub retry: RetryPolicy,
    pub fee_margin_bps: u32,
    pub max_transfer_amount: u64,
    pub valid_until_window: u32,
    /// Outbound pacing for the HTTP client built by [`NeoService::connect`].
    pub requests_per_second: Option<u32>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(30),
            rate_limit: None,
            retry: RetryPolicy::default(),
            fee_margin_bps: DEFAULT_FEE_MARGIN_BPS,
            max_transfer_amount: DEFAULT_MAX_TRANSFER_AMOUNT,
            valid_until_window: DEFAULT_VALID_UNTIL_WINDOW,
            requests_per_second: None,
        }
    }
}

// ==============================================================================
// Service
// ==============================================================================

/// Read-through caches for the idempotent queries.
struct ReadCache {
    chain: TtlCache<(), BlockchainInfo>,
    blocks: TtlCache<u32, Block>,
    balances: TtlCache<Address, Balance>,
}

pub struct NeoService {
    network: Network,
    rpc: Arc<dyn NeoRpc>,
    rpc_url: Option<String>,
    config: ServiceConfig,
    cache: ReadCache,
    limiter: Option<RateLimiter>,
    key_manager: Option<Arc<dyn KeyManager>>,
}

impl NeoService {
    pub fn new(network: Network, rpc: Arc<dyn NeoRpc>, config: ServiceConfig) -> Self {
        let ttl = config.cache_ttl;
        let limiter = config
            .rate_limit
            .map(|(max_requests, window)| RateLimiter::new(max_requests, window));
        Self {
            network,
            rpc,
            rpc_url: None,
            cache: ReadCache {
                chain: TtlCache::new(ttl),
                blocks: TtlCache::new(ttl),
                balances: TtlCache::new(ttl),
            },
            limiter,
            key_manager: None,
            config,
        }
    }

    /// Build a service talking JSON-RPC to `rpc_url`.
    ///
    /// Fails immediately on an empty or malformed URL; nothing is retried
    /// lazily on first use.
    pub fn connect(network: Network, rpc_url: &str, config: ServiceConfig) -> Result<Self, NeoError> {
        let client = HttpRpcClient::new(rpc_url, config.requests_per_second)?;
        let url = client.url().to_owned();
        info!(%network, rpc_url = %url, "connected Neo RPC client");
        let mut service = Self::new(network, Arc::new(client), config);
        service.rpc_url = Some(url);
        Ok(service)
    }

    pub fn with_key_manager(mut self, key_manager: Arc<dyn KeyManager>) -> Self {
        self.key_manager = Some(key_manager);
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_url.as_deref()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub(crate) fn rpc(&self) -> &dyn NeoRpc {
        self.rpc.as_ref()
    }

    // ==========================================================================
    // Call Pipeline
    // ==========================================================================

    fn admit(&self, method: &str) -> Result<(), NeoError> {
        match &self.limiter {
            Some(limiter) => limiter.check_limit(&format!("{}:{method}", self.network)),
            None => Ok(()),
        }
    }

    /// Admit one logical call, then run `op` under the retry policy.
    pub(crate) async fn call<T, F, Fut>(&self, method: &str, op: F) -> Result<T, NeoError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, NeoError>>,
    {
        self.admit(method)?;
        debug!(network = %self.network, method, "node call");
        with_retry(&self.config.retry, NeoError::is_transient, op).await
    }

    /// Dry-run `call`; a FAULT becomes a contract error carrying the VM
    /// exception text.
    pub(crate) async fn dry_run(&self, call: &ContractCall) -> Result<InvocationResult, NeoError> {
        let rpc = self.rpc();
        let result = self
            .call("invokefunction", move || rpc.invoke_function(call))
            .await?;
        if result.is_fault() {
            debug!(
                network = %self.network,
                contract = %call.script_hash,
                operation = %call.operation,
                exception = result.exception.as_deref().unwrap_or(""),
                "dry run faulted"
            );
            return Err(NeoError::vm_fault(result.exception));
        }
        Ok(result)
    }

    /// Dry-run, sign and broadcast `call` on behalf of `account`.
    ///
    /// The broadcast itself is sent exactly once, never retried.
    pub(crate) async fn submit(
        &self,
        account: &dyn Account,
        call: &ContractCall,
    ) -> Result<(Hash256, GasAmount), NeoError> {
        self.submit_verified(account, call, |_| Ok(())).await
    }

    /// Like [`Self::submit`], with `verify` inspecting the dry-run result
    /// before anything is signed.
    pub(crate) async fn submit_verified<V>(
        &self,
        account: &dyn Account,
        call: &ContractCall,
        verify: V,
    ) -> Result<(Hash256, GasAmount), NeoError>
    where
        V: FnOnce(&InvocationResult) -> Result<(), NeoError>,
    {
        let built = self.dry_run(call).await?;
        verify(&built)?;
        let tip = self.get_block_count().await?;

        let unsigned = UnsignedTransaction {
            network: self.network,
            sender: account.script_hash(),
            script: built.script,
            system_fee: built.gas_consumed,
            valid_until_block: tip.saturating_add(self.config.valid_until_window),
        };
        let signed = account.sign(&unsigned).await?;

        self.admit("sendrawtransaction")?;
        let txid = self.rpc.send_raw_transaction(&signed.raw).await?;
        info!(
            network = %self.network,
            %txid,
            contract = %call.script_hash,
            operation = %call.operation,
            system_fee = %unsigned.system_fee,
            "transaction broadcast"
        );
        Ok((txid, unsigned.system_fee))
    }
}

/// Reject a missing account before anything touches the network.
pub(crate) fn require_account(account: Option<&dyn Account>) -> Result<&dyn Account, NeoError> {
    account.ok_or_else(|| NeoError::validation("an account is required to sign this operation"))
}
