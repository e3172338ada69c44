//! Neo N3 RPC abstraction layer.
//!
//! Defines the [`NeoRpc`] trait and provides an HTTP JSON-RPC
//! implementation ([`HttpRpcClient`]) plus a test mock (`mock::MockRpc`).

mod http_adapter;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use http_adapter::HttpRpcClient;
pub use types::ContractCall;

use async_trait::async_trait;

use crate::error::NeoError;
use crate::types::{
    Balance, Block, BlockHeader, GasAmount, InvocationResult, RawTransaction, Validator,
};
use crate::validation::{Address, BlockRef, Hash256};

/// The Neo node RPC methods this crate relies on.
///
/// Implementations own transport, request pacing and response decoding.
/// Retry, caching and per-caller limits are layered on top by the service.
#[async_trait]
pub trait NeoRpc: Send + Sync {
    /// `getblockcount`: number of blocks, i.e. tip index + 1.
    async fn get_block_count(&self) -> Result<u32, NeoError>;

    async fn get_next_block_validators(&self) -> Result<Vec<Validator>, NeoError>;

    async fn get_block(&self, block: &BlockRef) -> Result<Block, NeoError>;

    async fn get_block_header(&self, hash: &Hash256) -> Result<BlockHeader, NeoError>;

    /// Fetch a verbose transaction. `None` when the node does not know it.
    async fn get_raw_transaction(
        &self,
        hash: &Hash256,
    ) -> Result<Option<RawTransaction>, NeoError>;

    async fn get_nep17_balances(&self, address: &Address) -> Result<Balance, NeoError>;

    async fn get_unclaimed_gas(&self, address: &Address) -> Result<GasAmount, NeoError>;

    /// Dry-run a contract call. A FAULT is reported in the result, not as an error.
    async fn invoke_function(&self, call: &ContractCall) -> Result<InvocationResult, NeoError>;

    /// Broadcast a base64 serialized transaction, returning its hash.
    async fn send_raw_transaction(&self, raw: &str) -> Result<Hash256, NeoError>;
}
