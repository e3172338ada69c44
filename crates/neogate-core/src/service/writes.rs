use std::str::FromStr;

use crate::account::Account;
use crate::contracts::params::{marshal_args, ContractParam};
use crate::error::NeoError;
use crate::rpc::ContractCall;
use crate::types::{
    InvocationReceipt, InvocationResult, TransferReceipt, GAS_DECIMALS, NEO_DECIMALS,
};
use crate::validation::{
    format_units, validate_address, validate_amount, validate_operation, validate_script_hash,
    Address, Amount, AmountInput, ScriptHash,
};

use super::{require_account, NeoService};

pub const NEO_HASH: &str = "0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5";
pub const GAS_HASH: &str = "0xd2a4cff31913016155e38e474a2c06d08be276cf";

/// Largest token precision accepted for arbitrary NEP-17 assets.
const MAX_TOKEN_DECIMALS: u8 = 30;

// ==============================================================================
// Assets
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Neo,
    Gas,
    Nep17(ScriptHash),
}

impl Asset {
    pub fn script_hash(&self) -> ScriptHash {
        match self {
            Self::Neo => known_hash(NEO_HASH),
            Self::Gas => known_hash(GAS_HASH),
            Self::Nep17(hash) => hash.clone(),
        }
    }

    /// Precision of the native tokens; `None` for other NEP-17 tokens.
    pub fn native_decimals(&self) -> Option<u8> {
        match self {
            Self::Neo => Some(NEO_DECIMALS),
            Self::Gas => Some(GAS_DECIMALS),
            Self::Nep17(_) => None,
        }
    }
}

fn known_hash(raw: &str) -> ScriptHash {
    ScriptHash::parse(raw).expect("native contract hashes are well-formed")
}

impl FromStr for Asset {
    type Err = NeoError;

    /// `NEO`, `GAS` (any case) or a NEP-17 script hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("neo") {
            return Ok(Self::Neo);
        }
        if trimmed.eq_ignore_ascii_case("gas") {
            return Ok(Self::Gas);
        }
        let hash = validate_script_hash(trimmed).map_err(|_| {
            NeoError::validation(format!(
                "unknown asset `{trimmed}`: expected NEO, GAS or a NEP-17 script hash"
            ))
        })?;
        Ok(match hash.as_str() {
            NEO_HASH => Self::Neo,
            GAS_HASH => Self::Gas,
            _ => Self::Nep17(hash),
        })
    }
}

/// The NEP-17 `transfer(from, to, amount, data)` call.
pub(crate) fn transfer_call(from: &ScriptHash, to: &Address, asset: &Asset, units: u128) -> ContractCall {
    ContractCall::new(asset.script_hash(), "transfer")
        .with_params(vec![
            ContractParam::Hash160(from.clone()),
            ContractParam::Hash160(to.script_hash()),
            ContractParam::Integer(i128::try_from(units).unwrap_or(i128::MAX)),
            ContractParam::Any,
        ])
        .with_signer(from.clone())
}

/// A NEP-17 `transfer` that halts with `false` did not move anything.
fn ensure_transfer_succeeds(result: &InvocationResult) -> Result<(), NeoError> {
    let returned_false = result.stack.first().is_some_and(|item| {
        item.get("type").and_then(serde_json::Value::as_str) == Some("Boolean")
            && item.get("value").and_then(serde_json::Value::as_bool) == Some(false)
    });
    if returned_false {
        return Err(NeoError::Transaction(
            "transfer returned false; check the sender balance".to_owned(),
        ));
    }
    Ok(())
}

impl NeoService {
    /// Token precision: fixed for NEO/GAS, asked from the contract otherwise.
    pub async fn asset_decimals(&self, asset: &Asset) -> Result<u8, NeoError> {
        if let Some(decimals) = asset.native_decimals() {
            return Ok(decimals);
        }
        let result = self
            .dry_run(&ContractCall::new(asset.script_hash(), "decimals"))
            .await?;
        let decimals = result
            .stack
            .first()
            .and_then(|item| item.get("value"))
            .and_then(|value| match value {
                serde_json::Value::String(s) => s.parse::<u8>().ok(),
                serde_json::Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
                _ => None,
            })
            .filter(|d| *d <= MAX_TOKEN_DECIMALS)
            .ok_or_else(|| {
                NeoError::contract(format!(
                    "contract {} did not return a usable `decimals` value",
                    asset.script_hash()
                ))
            })?;
        Ok(decimals)
    }

    /// Validate a transfer request down to base units.
    pub(crate) async fn validate_transfer(
        &self,
        to: &str,
        asset: &str,
        amount: &AmountInput,
    ) -> Result<(Address, Asset, Amount), NeoError> {
        let to = validate_address(to)?;
        let asset: Asset = asset.parse()?;
        // Reject obviously bad amounts before asking a token for its precision.
        if let AmountInput::Number(n) = amount {
            if !n.is_finite() || *n <= 0.0 {
                return Err(NeoError::validation("amount must be a positive finite number"));
            }
        }
        let decimals = self.asset_decimals(&asset).await?;
        let amount = validate_amount(amount, decimals, self.config.max_transfer_amount)?;
        Ok((to, asset, amount))
    }

    /// Send `amount` of `asset` from `account` to `to`.
    pub async fn transfer_assets(
        &self,
        account: Option<&dyn Account>,
        to: &str,
        asset: &str,
        amount: &AmountInput,
    ) -> Result<TransferReceipt, NeoError> {
        let account = require_account(account)?;
        let (to, asset, amount) = self.validate_transfer(to, asset, amount).await?;

        let call = transfer_call(&account.script_hash(), &to, &asset, amount.units());
        let (txid, system_fee) = self
            .submit_verified(account, &call, ensure_transfer_succeeds)
            .await?;

        Ok(TransferReceipt {
            txid,
            network: self.network,
            from: account.address().clone(),
            to,
            asset: asset.script_hash(),
            amount: amount.to_string(),
            system_fee,
        })
    }

    /// Claim accrued GAS by sending zero NEO to oneself, which settles the
    /// account's pending reward.
    pub async fn claim_gas(&self, account: Option<&dyn Account>) -> Result<TransferReceipt, NeoError> {
        let account = require_account(account)?;
        let own = account.address().clone();
        let call = transfer_call(&account.script_hash(), &own, &Asset::Neo, 0);
        let (txid, system_fee) = self
            .submit_verified(account, &call, ensure_transfer_succeeds)
            .await?;

        Ok(TransferReceipt {
            txid,
            network: self.network,
            from: own.clone(),
            to: own,
            asset: Asset::Neo.script_hash(),
            amount: format_units(0, NEO_DECIMALS),
            system_fee,
        })
    }

    /// Invoke `operation` on the contract at `script_hash` with loosely typed
    /// JSON arguments.
    pub async fn invoke_contract(
        &self,
        account: Option<&dyn Account>,
        script_hash: &str,
        operation: &str,
        args: &[serde_json::Value],
    ) -> Result<InvocationReceipt, NeoError> {
        let account = require_account(account)?;
        let script_hash = validate_script_hash(script_hash)?;
        let operation = validate_operation(operation)?;
        let params = marshal_args(&[], args)?;
        self.invoke_with_params(account, script_hash, operation, params)
            .await
    }

    /// Invoke with parameters that are already typed.
    pub async fn invoke_with_params(
        &self,
        account: &dyn Account,
        script_hash: ScriptHash,
        operation: &str,
        params: Vec<ContractParam>,
    ) -> Result<InvocationReceipt, NeoError> {
        let call = ContractCall::new(script_hash, operation)
            .with_params(params)
            .with_signer(account.script_hash());
        let (txid, system_fee) = self.submit(account, &call).await?;
        Ok(InvocationReceipt {
            txid,
            network: self.network,
            script_hash: call.script_hash,
            operation: call.operation,
            system_fee,
        })
    }
}
