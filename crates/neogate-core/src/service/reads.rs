use futures::future::try_join;
use tracing::debug;

use crate::error::{NeoError, RpcError};
use crate::types::{Balance, Block, BlockHeader, BlockchainInfo, GasAmount, RawTransaction};
use crate::validation::{validate_address, validate_tx_hash, BlockRef, BlockRefInput, Hash256};

use super::NeoService;

impl NeoService {
    /// `getblockcount`, uncached. A count of zero is reported as a failure.
    pub async fn get_block_count(&self) -> Result<u32, NeoError> {
        let rpc = self.rpc();
        let count = self
            .call("getblockcount", move || rpc.get_block_count())
            .await?;
        if count == 0 {
            return Err(RpcError::InvalidResponse("node reported a block count of 0".to_owned()).into());
        }
        Ok(count)
    }

    /// Chain tip and the next validator set.
    pub async fn get_blockchain_info(&self) -> Result<BlockchainInfo, NeoError> {
        if let Some(info) = self.cache.chain.get(&()).await {
            debug!(network = %self.network, "blockchain info cache hit");
            return Ok(info);
        }

        let rpc = self.rpc();
        let validators = self.call("getnextblockvalidators", move || {
            rpc.get_next_block_validators()
        });
        let (count, validators) = try_join(self.get_block_count(), validators).await?;

        let info = BlockchainInfo {
            network: self.network,
            height: count - 1,
            validators,
        };
        self.cache.chain.set((), info.clone()).await;
        Ok(info)
    }

    /// Fetch a block by height or hash. Height lookups are cached.
    pub async fn get_block(&self, block: impl Into<BlockRefInput>) -> Result<Block, NeoError> {
        let block = BlockRef::from_input(block.into())?;
        let height = match &block {
            BlockRef::Height(height) => Some(*height),
            BlockRef::Hash(_) => None,
        };

        if let Some(height) = height {
            if let Some(cached) = self.cache.blocks.get(&height).await {
                debug!(network = %self.network, height, "block cache hit");
                return Ok(cached);
            }
        }

        let rpc = self.rpc();
        let block_ref = &block;
        let fetched = self
            .call("getblock", move || rpc.get_block(block_ref))
            .await?;

        if let Some(height) = height {
            self.cache.blocks.set(height, fetched.clone()).await;
        }
        Ok(fetched)
    }

    /// Header of an on-chain block. The HTTP client keeps these in an LRU.
    pub async fn get_block_header(&self, hash: &Hash256) -> Result<BlockHeader, NeoError> {
        let rpc = self.rpc();
        self.call("getblockheader", move || rpc.get_block_header(hash))
            .await
    }

    /// Fetch a transaction; `None` when the node does not know the hash.
    pub async fn get_transaction(&self, txid: &str) -> Result<Option<RawTransaction>, NeoError> {
        let hash = validate_tx_hash(txid)?;
        let rpc = self.rpc();
        let hash = &hash;
        self.call("getrawtransaction", move || rpc.get_raw_transaction(hash))
            .await
    }

    /// NEP-17 balances of an address.
    pub async fn get_balance(&self, address: &str) -> Result<Balance, NeoError> {
        let address = validate_address(address)?;
        if let Some(cached) = self.cache.balances.get(&address).await {
            debug!(network = %self.network, %address, "balance cache hit");
            return Ok(cached);
        }

        let rpc = self.rpc();
        let addr = &address;
        let balance = self
            .call("getnep17balances", move || rpc.get_nep17_balances(addr))
            .await?;
        self.cache.balances.set(address, balance.clone()).await;
        Ok(balance)
    }

    /// GAS claimable by an address. Never cached.
    pub async fn get_unclaimed_gas(&self, address: &str) -> Result<GasAmount, NeoError> {
        let address = validate_address(address)?;
        let rpc = self.rpc();
        let address = &address;
        self.call("getunclaimedgas", move || rpc.get_unclaimed_gas(address))
            .await
    }
}
