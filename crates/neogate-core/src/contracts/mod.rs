//! Well-known Neo N3 dApp contracts and typed access to them.
//!
//! The [`ContractRegistry`] maps human-readable names to per-network script
//! hashes and declared operations. [`ContractService`] resolves a name
//! against its service's network, marshals loosely typed JSON arguments by
//! the declared parameter types and dry-runs or submits the call.

mod catalog;
pub mod params;
pub mod registry;
mod service;

pub use params::{ContractParam, ParamType};
pub use registry::{ArgSpec, ContractDescriptor, ContractRegistry, OperationSpec};
pub use service::{ContractInfo, ContractService};
