//! Resilient access to Neo N3 nodes over JSON-RPC.
//!
//! [`NeoService`] wraps one network's node behind input validation, TTL
//! read caches, per-method admission control and bounded retry. Around it
//! sit the [`TransactionStatusChecker`], the [`FeeEstimator`] and the
//! named-contract layer in [`contracts`].

pub mod account;
pub mod cache;
pub mod contracts;
pub mod error;
pub mod fees;
pub mod network;
pub mod rate_limit;
pub mod retry;
pub mod rpc;
pub mod service;
pub mod status;
pub mod types;
pub mod validation;

#[cfg(test)]
mod test_util;

pub use account::{Account, KeyFormat, KeyManager, KeyMaterial};
pub use contracts::{ContractRegistry, ContractService};
pub use error::{ErrorBody, ErrorKind, NeoError, RpcError};
pub use fees::FeeEstimator;
pub use network::{Network, NetworkMode, NetworkRegistry};
pub use rpc::{HttpRpcClient, NeoRpc};
pub use service::{Asset, NeoService, ServiceConfig};
pub use status::TransactionStatusChecker;
