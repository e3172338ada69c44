//! Native JSON-RPC client for Neo N3 nodes.
//!
//! Implements [`NeoRpc`](super::NeoRpc) over JSON-RPC using `reqwest`, with
//! optional outbound request pacing and an LRU block-header cache.

mod client;
mod connection;
mod parsing;
mod protocol;

pub use client::HttpRpcClient;
