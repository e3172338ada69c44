//! Account abstraction consumed by the service layer.
//!
//! Key derivation, NEP-2 encryption and transaction signing live behind
//! these traits; this crate never touches private key bytes itself.

use async_trait::async_trait;

use crate::error::NeoError;
use crate::types::{SignedTransaction, UnsignedTransaction};
use crate::validation::{Address, ScriptHash};

/// Something that can authorize transactions for one address.
#[async_trait]
pub trait Account: Send + Sync {
    fn address(&self) -> &Address;

    fn script_hash(&self) -> ScriptHash {
        self.address().script_hash()
    }

    /// Attach the network fee and witnesses, returning the serialized
    /// transaction ready for broadcast.
    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, NeoError>;
}

/// Public half of a key pair plus its WIF export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub address: Address,
    pub public_key: String,
    pub wif: String,
}

/// Key generation and conversion between private key encodings.
pub trait KeyManager: Send + Sync {
    fn generate(&self) -> Result<KeyMaterial, NeoError>;

    fn from_wif(&self, wif: &str) -> Result<KeyMaterial, NeoError>;

    fn from_private_key_hex(&self, hex_key: &str) -> Result<KeyMaterial, NeoError>;

    /// NEP-2 encrypt the key behind `key`.
    fn encrypt(&self, key: &KeyMaterial, password: &str) -> Result<String, NeoError>;

    fn decrypt(&self, nep2: &str, password: &str) -> Result<KeyMaterial, NeoError>;
}

/// Recognized private key encodings for wallet import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    Wif,
    PrivateKeyHex,
    Nep2,
}

impl KeyFormat {
    pub fn detect(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let body = raw.strip_prefix("0x").unwrap_or(raw);
        if body.len() == 64 && body.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Some(Self::PrivateKeyHex);
        }
        if raw.len() == 58 && raw.starts_with("6P") {
            return Some(Self::Nep2);
        }
        if raw.len() == 52 && (raw.starts_with('K') || raw.starts_with('L')) {
            return Some(Self::Wif);
        }
        None
    }
}
