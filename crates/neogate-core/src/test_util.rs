//! Shared test helpers for `neogate-core` unit tests.
//!
//! Deterministic hashes, addresses, blocks and transactions, plus in-memory
//! [`Account`] and [`KeyManager`] implementations, so that tests across
//! modules share a single source of truth for dummy data construction.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::account::{Account, KeyManager, KeyMaterial};
use crate::error::NeoError;
use crate::types::{
    Block, GasAmount, InvocationResult, RawTransaction, SignedTransaction, UnsignedTransaction,
    VmState,
};
use crate::validation::{Address, Hash256, ScriptHash};

// ==============================================================================
// Hash & Address Helpers
// ==============================================================================

/// A deterministic transaction hash distinguished by one byte.
pub fn tx_hash(b: u8) -> Hash256 {
    Hash256::parse(&format!("{b:02x}{}", "11".repeat(31))).unwrap()
}

pub fn block_hash(b: u8) -> Hash256 {
    Hash256::parse(&format!("{b:02x}{}", "bb".repeat(31))).unwrap()
}

pub fn script_hash(b: u8) -> ScriptHash {
    ScriptHash::parse(&format!("{b:02x}{}", "cc".repeat(19))).unwrap()
}

pub fn address(b: u8) -> Address {
    Address::from_script_hash(&script_hash(b))
}

// ==============================================================================
// Chain Builders
// ==============================================================================

pub fn make_block(index: u32, hash: Hash256) -> Block {
    Block {
        hash,
        index,
        time: 1_700_000_000_000 + u64::from(index) * 15_000,
        size: 697,
        version: 0,
        merkle_root: format!("0x{}", "00".repeat(32)),
        previous_block_hash: None,
        next_block_hash: None,
        next_consensus: address(0).to_string(),
        confirmations: None,
        transactions: Vec::new(),
    }
}

/// An in-block transaction.
pub fn confirmed_tx(hash: Hash256, block: Hash256) -> RawTransaction {
    RawTransaction {
        block_hash: Some(block),
        block_time: Some(1_700_000_000_000),
        ..pending_tx(hash, 5_000)
    }
}

/// A mempool transaction valid until `valid_until_block`.
pub fn pending_tx(hash: Hash256, valid_until_block: u32) -> RawTransaction {
    RawTransaction {
        hash,
        size: 252,
        sender: address(1).to_string(),
        system_fee: GasAmount(997_775),
        network_fee: GasAmount(1_235_610),
        valid_until_block,
        script: "CxEUwB8MBGJ1cm4=".to_owned(),
        block_hash: None,
        block_time: None,
    }
}

pub fn halt(gas_consumed: u64, stack: Vec<serde_json::Value>) -> InvocationResult {
    InvocationResult {
        state: VmState::Halt,
        gas_consumed: GasAmount(gas_consumed),
        exception: None,
        stack,
        script: "wh8MCGRlY2ltYWxz".to_owned(),
    }
}

pub fn fault(exception: &str) -> InvocationResult {
    InvocationResult {
        state: VmState::Fault,
        gas_consumed: GasAmount(2_007_570),
        exception: Some(exception.to_owned()),
        stack: Vec::new(),
        script: "wh8MCGRlY2ltYWxz".to_owned(),
    }
}

// ==============================================================================
// Accounts & Keys
// ==============================================================================

/// Signs by echoing the unsigned script; records what it was asked to sign.
pub struct TestAccount {
    address: Address,
    pub signed: Mutex<Vec<UnsignedTransaction>>,
}

impl TestAccount {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            signed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Account for TestAccount {
    fn address(&self) -> &Address {
        &self.address
    }

    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, NeoError> {
        self.signed.lock().unwrap().push(tx.clone());
        Ok(SignedTransaction {
            hash: tx_hash(0xee),
            raw: format!("signed:{}", tx.script),
        })
    }
}

/// Keys derived from the first bytes of their input; NEP-2 "encryption"
/// is a lookup table keyed by the ciphertext.
#[derive(Default)]
pub struct TestKeyManager {
    vault: Mutex<HashMap<String, (KeyMaterial, String)>>,
    generated: Mutex<u8>,
}

impl TestKeyManager {
    fn material(seed: &[u8]) -> KeyMaterial {
        let mut bytes = [0u8; 20];
        for (slot, b) in bytes.iter_mut().zip(seed) {
            *slot = *b;
        }
        let address = Address::from_script_hash(&ScriptHash::parse(&hex::encode(bytes)).unwrap());
        KeyMaterial {
            public_key: format!("02{}", hex::encode([bytes[0]; 32])),
            wif: format!("L{}", "1".repeat(51)),
            address,
        }
    }
}

impl KeyManager for TestKeyManager {
    fn generate(&self) -> Result<KeyMaterial, NeoError> {
        let mut counter = self.generated.lock().unwrap();
        *counter += 1;
        Ok(Self::material(&[*counter; 20]))
    }

    fn from_wif(&self, wif: &str) -> Result<KeyMaterial, NeoError> {
        let mut material = Self::material(wif.as_bytes());
        material.wif = wif.to_owned();
        Ok(material)
    }

    fn from_private_key_hex(&self, hex_key: &str) -> Result<KeyMaterial, NeoError> {
        let bytes = hex::decode(hex_key).map_err(|e| NeoError::Wallet(e.to_string()))?;
        Ok(Self::material(&bytes))
    }

    fn encrypt(&self, key: &KeyMaterial, password: &str) -> Result<String, NeoError> {
        let mut vault = self.vault.lock().unwrap();
        let nep2 = format!("6P{:056}", vault.len());
        vault.insert(nep2.clone(), (key.clone(), password.to_owned()));
        Ok(nep2)
    }

    fn decrypt(&self, nep2: &str, password: &str) -> Result<KeyMaterial, NeoError> {
        match self.vault.lock().unwrap().get(nep2) {
            Some((key, stored)) if stored == password => Ok(key.clone()),
            Some(_) => Err(NeoError::Wallet("wrong password".to_owned())),
            None => Err(NeoError::Wallet("unknown NEP-2 key".to_owned())),
        }
    }
}
