use tracing::info;

use crate::account::{KeyFormat, KeyManager, KeyMaterial};
use crate::error::NeoError;
use crate::types::WalletRecord;

use super::NeoService;

impl NeoService {
    fn key_manager(&self) -> Result<&dyn KeyManager, NeoError> {
        self.key_manager
            .as_deref()
            .ok_or_else(|| NeoError::Wallet("no key manager configured".to_owned()))
    }

    /// Generate a new key pair, returned NEP-2 encrypted under `password`.
    pub fn create_wallet(&self, password: &str) -> Result<WalletRecord, NeoError> {
        if password.is_empty() {
            return Err(NeoError::validation(
                "a password is required to encrypt a new wallet",
            ));
        }
        let keys = self.key_manager()?;
        let material = keys.generate()?;
        let encrypted = keys.encrypt(&material, password)?;
        info!(network = %self.network, address = %material.address, "created wallet");
        Ok(WalletRecord {
            address: material.address,
            public_key: material.public_key,
            encrypted_private_key: Some(encrypted),
            wif: None,
        })
    }

    /// Import a WIF, a 64-hex private key or a NEP-2 key.
    ///
    /// With a password the key comes back NEP-2 encrypted and the WIF is
    /// omitted; without one (WIF or hex input only) the WIF is returned.
    pub fn import_wallet(
        &self,
        key: &str,
        password: Option<&str>,
    ) -> Result<WalletRecord, NeoError> {
        let key = key.trim();
        let password = password.filter(|p| !p.is_empty());
        let format = KeyFormat::detect(key).ok_or_else(|| {
            NeoError::validation("unrecognized key format: expected WIF, hex private key or NEP-2")
        })?;
        let keys = self.key_manager()?;

        let (material, existing_nep2): (KeyMaterial, Option<String>) = match format {
            KeyFormat::Nep2 => {
                let password = password.ok_or_else(|| {
                    NeoError::validation("a password is required to import a NEP-2 key")
                })?;
                (keys.decrypt(key, password)?, Some(key.to_owned()))
            }
            KeyFormat::Wif => (keys.from_wif(key)?, None),
            KeyFormat::PrivateKeyHex => {
                let hex_key = key.strip_prefix("0x").unwrap_or(key);
                (keys.from_private_key_hex(hex_key)?, None)
            }
        };

        let record = match password {
            Some(password) => {
                let encrypted = match existing_nep2 {
                    Some(nep2) => nep2,
                    None => keys.encrypt(&material, password)?,
                };
                WalletRecord {
                    address: material.address,
                    public_key: material.public_key,
                    encrypted_private_key: Some(encrypted),
                    wif: None,
                }
            }
            None => WalletRecord {
                address: material.address,
                public_key: material.public_key,
                encrypted_private_key: None,
                wif: Some(material.wif),
            },
        };
        info!(network = %self.network, address = %record.address, ?format, "imported wallet");
        Ok(record)
    }
}
