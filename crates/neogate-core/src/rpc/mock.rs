use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{NeoError, RpcError};
use crate::types::{
    Balance, Block, BlockHeader, GasAmount, InvocationResult, RawTransaction, Validator, VmState,
};
use crate::validation::{Address, BlockRef, Hash256};

use super::types::ContractCall;
use super::NeoRpc;

/// Hash returned for broadcasts unless overridden.
pub const BROADCAST_HASH: &str =
    "0xabababababababababababababababababababababababababababababababab";

/// A mock Neo RPC backend for testing. Serves canned chain data populated
/// via the builder pattern and records every call it receives.
pub struct MockRpc {
    block_count: u32,
    validators: Vec<Validator>,
    blocks: Vec<Block>,
    transactions: HashMap<Hash256, RawTransaction>,
    balances: HashMap<Address, Balance>,
    unclaimed: HashMap<Address, GasAmount>,
    invocations: HashMap<String, InvocationResult>,
    default_invocation: InvocationResult,
    broadcast_hash: Hash256,
    broadcast_rejection: Option<String>,
    transient_failures: AtomicU32,
    calls: Mutex<HashMap<&'static str, u32>>,
    invoked: Mutex<Vec<ContractCall>>,
    broadcasts: Mutex<Vec<String>>,
}

impl MockRpc {
    pub fn builder() -> MockRpcBuilder {
        MockRpcBuilder {
            block_count: 100,
            validators: Vec::new(),
            blocks: Vec::new(),
            transactions: HashMap::new(),
            balances: HashMap::new(),
            unclaimed: HashMap::new(),
            invocations: HashMap::new(),
            default_invocation: InvocationResult {
                state: VmState::Halt,
                gas_consumed: GasAmount(1_000_000),
                exception: None,
                stack: Vec::new(),
                script: "AA==".to_owned(),
            },
            broadcast_hash: Hash256::parse(BROADCAST_HASH).unwrap(),
            broadcast_rejection: None,
            transient_failures: 0,
        }
    }

    /// Number of times `method` reached the node (failed attempts included).
    pub fn calls(&self, method: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn invoked(&self) -> Vec<ContractCall> {
        self.invoked.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) -> Result<(), NeoError> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RpcError::Unavailable(format!("{method}: connection refused")).into());
        }
        Ok(())
    }

    fn find_block(&self, block: &BlockRef) -> Option<&Block> {
        self.blocks.iter().find(|b| match block {
            BlockRef::Height(h) => b.index == *h,
            BlockRef::Hash(hash) => &b.hash == hash,
        })
    }
}

fn invocation_key(call: &ContractCall) -> String {
    format!("{}:{}", call.script_hash, call.operation)
}

fn unknown(what: &str) -> NeoError {
    RpcError::ServerError {
        code: -100,
        message: format!("Unknown {what}"),
    }
    .into()
}

pub struct MockRpcBuilder {
    block_count: u32,
    validators: Vec<Validator>,
    blocks: Vec<Block>,
    transactions: HashMap<Hash256, RawTransaction>,
    balances: HashMap<Address, Balance>,
    unclaimed: HashMap<Address, GasAmount>,
    invocations: HashMap<String, InvocationResult>,
    default_invocation: InvocationResult,
    broadcast_hash: Hash256,
    broadcast_rejection: Option<String>,
    transient_failures: u32,
}

impl MockRpcBuilder {
    /// Set `getblockcount`; the tip index is `count - 1`.
    pub fn with_block_count(mut self, count: u32) -> Self {
        self.block_count = count;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn with_tx(mut self, tx: RawTransaction) -> Self {
        self.transactions.insert(tx.hash.clone(), tx);
        self
    }

    pub fn with_balance(mut self, balance: Balance) -> Self {
        self.balances.insert(balance.address.clone(), balance);
        self
    }

    pub fn with_unclaimed(mut self, address: Address, gas: GasAmount) -> Self {
        self.unclaimed.insert(address, gas);
        self
    }

    /// Canned dry-run result for `script_hash:operation`.
    pub fn with_invocation(mut self, call: &ContractCall, result: InvocationResult) -> Self {
        self.invocations.insert(invocation_key(call), result);
        self
    }

    /// Result for every dry run without a specific entry.
    pub fn with_default_invocation(mut self, result: InvocationResult) -> Self {
        self.default_invocation = result;
        self
    }

    pub fn with_broadcast_hash(mut self, hash: Hash256) -> Self {
        self.broadcast_hash = hash;
        self
    }

    pub fn rejecting_broadcasts(mut self, reason: &str) -> Self {
        self.broadcast_rejection = Some(reason.to_owned());
        self
    }

    /// Fail the next `count` calls (any method) with a transient error.
    pub fn failing_first(mut self, count: u32) -> Self {
        self.transient_failures = count;
        self
    }

    pub fn build(self) -> MockRpc {
        MockRpc {
            block_count: self.block_count,
            validators: self.validators,
            blocks: self.blocks,
            transactions: self.transactions,
            balances: self.balances,
            unclaimed: self.unclaimed,
            invocations: self.invocations,
            default_invocation: self.default_invocation,
            broadcast_hash: self.broadcast_hash,
            broadcast_rejection: self.broadcast_rejection,
            transient_failures: AtomicU32::new(self.transient_failures),
            calls: Mutex::new(HashMap::new()),
            invoked: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl NeoRpc for MockRpc {
    async fn get_block_count(&self) -> Result<u32, NeoError> {
        self.record("getblockcount")?;
        Ok(self.block_count)
    }

    async fn get_next_block_validators(&self) -> Result<Vec<Validator>, NeoError> {
        self.record("getnextblockvalidators")?;
        Ok(self.validators.clone())
    }

    async fn get_block(&self, block: &BlockRef) -> Result<Block, NeoError> {
        self.record("getblock")?;
        self.find_block(block).cloned().ok_or_else(|| unknown("block"))
    }

    async fn get_block_header(&self, hash: &Hash256) -> Result<BlockHeader, NeoError> {
        self.record("getblockheader")?;
        self.find_block(&BlockRef::Hash(hash.clone()))
            .map(|b| BlockHeader {
                hash: b.hash.clone(),
                index: b.index,
                time: b.time,
            })
            .ok_or_else(|| unknown("block"))
    }

    async fn get_raw_transaction(
        &self,
        hash: &Hash256,
    ) -> Result<Option<RawTransaction>, NeoError> {
        self.record("getrawtransaction")?;
        Ok(self.transactions.get(hash).cloned())
    }

    async fn get_nep17_balances(&self, address: &Address) -> Result<Balance, NeoError> {
        self.record("getnep17balances")?;
        Ok(self.balances.get(address).cloned().unwrap_or_else(|| Balance {
            address: address.clone(),
            balances: Vec::new(),
        }))
    }

    async fn get_unclaimed_gas(&self, address: &Address) -> Result<GasAmount, NeoError> {
        self.record("getunclaimedgas")?;
        Ok(self.unclaimed.get(address).copied().unwrap_or_default())
    }

    async fn invoke_function(&self, call: &ContractCall) -> Result<InvocationResult, NeoError> {
        self.record("invokefunction")?;
        self.invoked.lock().unwrap().push(call.clone());
        Ok(self
            .invocations
            .get(&invocation_key(call))
            .cloned()
            .unwrap_or_else(|| self.default_invocation.clone()))
    }

    async fn send_raw_transaction(&self, raw: &str) -> Result<Hash256, NeoError> {
        self.record("sendrawtransaction")?;
        if let Some(reason) = &self.broadcast_rejection {
            return Err(NeoError::Transaction(reason.clone()));
        }
        self.broadcasts.lock().unwrap().push(raw.to_owned());
        Ok(self.broadcast_hash.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[tokio::test]
    async fn failing_first_fails_then_recovers() {
        let rpc = MockRpc::builder()
            .with_block_count(42)
            .failing_first(2)
            .build();
        assert!(rpc.get_block_count().await.unwrap_err().is_transient());
        assert!(rpc.get_block_count().await.is_err());
        assert_eq!(rpc.get_block_count().await.unwrap(), 42);
        assert_eq!(rpc.calls("getblockcount"), 3);
    }

    #[tokio::test]
    async fn unknown_transactions_are_none() {
        let known = confirmed_tx(tx_hash(1), block_hash(1));
        let rpc = MockRpc::builder().with_tx(known.clone()).build();
        assert_eq!(rpc.get_raw_transaction(&known.hash).await.unwrap(), Some(known));
        assert_eq!(rpc.get_raw_transaction(&tx_hash(2)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn blocks_resolve_by_height_and_hash() {
        let block = make_block(7, block_hash(7));
        let rpc = MockRpc::builder().with_block(block.clone()).build();
        assert_eq!(rpc.get_block(&BlockRef::Height(7)).await.unwrap(), block);
        assert_eq!(rpc.get_block_header(&block.hash).await.unwrap().index, 7);
        assert!(rpc.get_block(&BlockRef::Height(8)).await.is_err());
    }
}
