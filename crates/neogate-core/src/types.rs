//! Domain types returned by the access layer.
//!
//! Node responses are parsed into these shapes by the RPC adapter; the
//! service layer never hands raw JSON to callers except for VM stack items.

use serde::{Deserialize, Serialize};

use crate::network::Network;
use crate::validation::{format_units, Address, Hash256, ScriptHash};

pub const GAS_DECIMALS: u8 = 8;
pub const NEO_DECIMALS: u8 = 0;

// ==============================================================================
// GAS Amounts
// ==============================================================================

/// An amount of GAS in datoshi (10^-8 GAS).
///
/// Serialized as a canonical decimal GAS string (`"0.0123"`), which is how
/// fees are presented to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GasAmount(pub u64);

impl GasAmount {
    pub fn datoshi(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GasAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_units(u128::from(self.0), GAS_DECIMALS))
    }
}

impl Serialize for GasAmount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ==============================================================================
// Chain
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub public_key: String,
    pub votes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainInfo {
    pub network: Network,
    /// Index of the current chain tip.
    pub height: u32,
    pub validators: Vec<Validator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: Hash256,
    pub index: u32,
    /// Block timestamp in milliseconds since the Unix epoch.
    pub time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub hash: Hash256,
    pub index: u32,
    pub time: u64,
    pub size: u64,
    pub version: u32,
    pub merkle_root: String,
    pub previous_block_hash: Option<Hash256>,
    pub next_block_hash: Option<Hash256>,
    pub next_consensus: String,
    pub confirmations: Option<u64>,
    pub transactions: Vec<Hash256>,
}

// ==============================================================================
// Transactions
// ==============================================================================

/// A transaction as returned by verbose `getrawtransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTransaction {
    pub hash: Hash256,
    pub size: u64,
    pub sender: String,
    pub system_fee: GasAmount,
    pub network_fee: GasAmount,
    pub valid_until_block: u32,
    pub script: String,
    /// Present only once the transaction is included in a block.
    pub block_hash: Option<Hash256>,
    pub block_time: Option<u64>,
}

/// Lifecycle classification of a transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionStatus {
    NotFound {
        message: String,
    },
    Pending {
        sender: String,
        system_fee: GasAmount,
        network_fee: GasAmount,
        valid_until_block: u32,
    },
    Confirmed {
        confirmations: u32,
        block_height: u32,
        block_hash: Hash256,
        block_time: Option<u64>,
    },
}

/// Transaction handed to an [`crate::account::Account`] for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub network: Network,
    pub sender: ScriptHash,
    /// Base64 invocation script produced by the dry run.
    pub script: String,
    pub system_fee: GasAmount,
    pub valid_until_block: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub hash: Hash256,
    /// Base64 serialized transaction including witnesses.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub txid: Hash256,
    pub network: Network,
    pub from: Address,
    pub to: Address,
    pub asset: ScriptHash,
    pub amount: String,
    pub system_fee: GasAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationReceipt {
    pub txid: Hash256,
    pub network: Network,
    pub script_hash: ScriptHash,
    pub operation: String,
    pub system_fee: GasAmount,
}

// ==============================================================================
// Balances
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub asset_hash: ScriptHash,
    /// Raw integer amount in the token's base units.
    pub amount: String,
    pub last_updated_block: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub address: Address,
    pub balances: Vec<TokenBalance>,
}

// ==============================================================================
// VM Results
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VmState {
    Halt,
    Fault,
}

/// Outcome of `invokefunction`/`invokescript` dry runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    pub state: VmState,
    pub gas_consumed: GasAmount,
    pub exception: Option<String>,
    /// Result stack items exactly as reported by the node.
    pub stack: Vec<serde_json::Value>,
    /// Base64 script the node executed.
    pub script: String,
}

impl InvocationResult {
    pub fn is_fault(&self) -> bool {
        self.state == VmState::Fault
    }
}

// ==============================================================================
// Fees & Wallets
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeEstimate {
    pub estimated_gas: GasAmount,
    pub min_required: GasAmount,
    pub network: Network,
}

/// Key material handed back to callers. Persisting it is someone else's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletRecord {
    pub address: Address,
    pub public_key: String,
    /// NEP-2 encrypted private key; set whenever a password was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_private_key: Option<String>,
    /// Plain WIF; only returned when no password was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wif: Option<String>,
}
