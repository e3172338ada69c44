use crate::error::RpcError;
use crate::types::{
    Balance, Block, BlockHeader, GasAmount, InvocationResult, RawTransaction, TokenBalance,
    Validator, VmState,
};
use crate::validation::{Address, Hash256, ScriptHash};

type Json = serde_json::Value;

fn invalid(message: impl Into<String>) -> RpcError {
    RpcError::InvalidResponse(message.into())
}

// ==============================================================================
// Scalars
// ==============================================================================

pub(super) fn parse_integer_required<T>(value: Option<&Json>, field: &str) -> Result<T, RpcError>
where
    T: TryFrom<u64>,
{
    parse_integer::<T>(value, field)?.ok_or_else(|| invalid(format!("missing {field}")))
}

pub(super) fn parse_integer_optional<T>(value: Option<&Json>) -> Option<T>
where
    T: TryFrom<u64>,
{
    parse_integer::<T>(value, "value").ok().flatten()
}

// Neo nodes mix JSON numbers and decimal strings for unsigned quantities
// (heights are numbers, fees are strings), so both are accepted.
fn parse_integer<T>(value: Option<&Json>, field: &str) -> Result<Option<T>, RpcError>
where
    T: TryFrom<u64>,
{
    let n = match value {
        None | Some(Json::Null) => return Ok(None),
        Some(Json::Number(n)) => n
            .as_u64()
            .ok_or_else(|| invalid(format!("{field} is not an unsigned integer: {n}")))?,
        Some(Json::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(format!("invalid {field} `{s}`: {e}")))?,
        Some(other) => return Err(invalid(format!("unexpected {field}: {other}"))),
    };
    T::try_from(n)
        .map(Some)
        .map_err(|_| invalid(format!("{field} out of range: {n}")))
}

fn parse_str<'a>(value: Option<&'a Json>, field: &str) -> Result<&'a str, RpcError> {
    value
        .and_then(Json::as_str)
        .ok_or_else(|| invalid(format!("missing {field}")))
}

fn parse_opt_string(value: Option<&Json>) -> Option<String> {
    value
        .and_then(Json::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

pub(super) fn parse_hash256(value: Option<&Json>, field: &str) -> Result<Hash256, RpcError> {
    let raw = parse_str(value, field)?;
    Hash256::parse(raw).map_err(|e| invalid(format!("invalid {field}: {e}")))
}

fn parse_opt_hash256(value: Option<&Json>, field: &str) -> Result<Option<Hash256>, RpcError> {
    match value.and_then(Json::as_str) {
        None => Ok(None),
        Some(raw) => Hash256::parse(raw)
            .map(Some)
            .map_err(|e| invalid(format!("invalid {field}: {e}"))),
    }
}

/// Fees and GAS quantities arrive as datoshi integers.
pub(super) fn parse_gas(value: Option<&Json>, field: &str) -> Result<GasAmount, RpcError> {
    parse_integer_required::<u64>(value, field).map(GasAmount)
}

// ==============================================================================
// Chain
// ==============================================================================

pub(super) fn parse_validators(raw: Json) -> Result<Vec<Validator>, RpcError> {
    let items = raw
        .as_array()
        .ok_or_else(|| invalid("getnextblockvalidators result is not an array"))?;
    items
        .iter()
        .map(|item| {
            let votes = match item.get("votes") {
                Some(Json::String(s)) => s.clone(),
                Some(Json::Number(n)) => n.to_string(),
                _ => "0".to_owned(),
            };
            Ok(Validator {
                public_key: parse_str(item.get("publickey"), "publickey")?.to_owned(),
                votes,
                active: item.get("active").and_then(Json::as_bool),
            })
        })
        .collect()
}

pub(super) fn parse_block_header(raw: &Json) -> Result<BlockHeader, RpcError> {
    Ok(BlockHeader {
        hash: parse_hash256(raw.get("hash"), "hash")?,
        index: parse_integer_required(raw.get("index"), "index")?,
        time: parse_integer_required(raw.get("time"), "time")?,
    })
}

pub(super) fn parse_block(raw: Json) -> Result<Block, RpcError> {
    let header = parse_block_header(&raw)?;
    let transactions = match raw.get("tx").and_then(Json::as_array) {
        None => Vec::new(),
        Some(txs) => txs
            .iter()
            .map(|tx| parse_hash256(tx.get("hash"), "tx.hash"))
            .collect::<Result<_, _>>()?,
    };

    Ok(Block {
        hash: header.hash,
        index: header.index,
        time: header.time,
        size: parse_integer_required(raw.get("size"), "size")?,
        version: parse_integer_optional(raw.get("version")).unwrap_or(0),
        merkle_root: parse_opt_string(raw.get("merkleroot")).unwrap_or_default(),
        previous_block_hash: parse_opt_hash256(raw.get("previousblockhash"), "previousblockhash")?,
        next_block_hash: parse_opt_hash256(raw.get("nextblockhash"), "nextblockhash")?,
        next_consensus: parse_opt_string(raw.get("nextconsensus")).unwrap_or_default(),
        confirmations: parse_integer_optional(raw.get("confirmations")),
        transactions,
    })
}

// ==============================================================================
// Transactions
// ==============================================================================

pub(super) fn parse_raw_transaction(raw: Json) -> Result<RawTransaction, RpcError> {
    Ok(RawTransaction {
        hash: parse_hash256(raw.get("hash"), "hash")?,
        size: parse_integer_optional(raw.get("size")).unwrap_or(0),
        sender: parse_opt_string(raw.get("sender")).unwrap_or_default(),
        system_fee: parse_gas(raw.get("sysfee"), "sysfee")?,
        network_fee: parse_gas(raw.get("netfee"), "netfee")?,
        valid_until_block: parse_integer_required(raw.get("validuntilblock"), "validuntilblock")?,
        script: parse_opt_string(raw.get("script")).unwrap_or_default(),
        block_hash: parse_opt_hash256(raw.get("blockhash"), "blockhash")?,
        block_time: parse_integer_optional(raw.get("blocktime")),
    })
}

pub(super) fn parse_send_result(raw: Json) -> Result<Hash256, RpcError> {
    parse_hash256(raw.get("hash"), "hash")
}

// ==============================================================================
// Balances
// ==============================================================================

pub(super) fn parse_nep17_balances(raw: Json, requested: &Address) -> Result<Balance, RpcError> {
    if !raw.is_object() {
        return Err(invalid("expected a balance object"));
    }
    let address = match raw.get("address").and_then(Json::as_str) {
        Some(reported) => Address::parse(reported)
            .map_err(|e| invalid(format!("invalid balance address: {e}")))?,
        None => requested.clone(),
    };
    let entries = match raw.get("balance") {
        None => Vec::new(),
        Some(Json::Array(entries)) => entries
            .iter()
            .map(parse_token_balance)
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(invalid("`balance` must be an array")),
    };
    Ok(Balance {
        address,
        balances: entries,
    })
}

fn parse_token_balance(raw: &Json) -> Result<TokenBalance, RpcError> {
    let asset = parse_str(raw.get("assethash"), "assethash")?;
    let amount = match raw.get("amount") {
        Some(Json::String(s)) => s.clone(),
        Some(Json::Number(n)) => n.to_string(),
        _ => return Err(invalid("missing amount")),
    };
    Ok(TokenBalance {
        asset_hash: ScriptHash::parse(asset)
            .map_err(|e| invalid(format!("invalid assethash: {e}")))?,
        amount,
        last_updated_block: parse_integer_optional(raw.get("lastupdatedblock")).unwrap_or(0),
        symbol: parse_opt_string(raw.get("symbol")),
        decimals: parse_integer_optional(raw.get("decimals")),
    })
}

pub(super) fn parse_unclaimed_gas(raw: Json) -> Result<GasAmount, RpcError> {
    parse_gas(raw.get("unclaimed"), "unclaimed")
}

// ==============================================================================
// Invocations
// ==============================================================================

pub(super) fn parse_invocation_result(raw: Json) -> Result<InvocationResult, RpcError> {
    let state = match parse_str(raw.get("state"), "state")? {
        s if s.starts_with("HALT") => VmState::Halt,
        s if s.starts_with("FAULT") => VmState::Fault,
        other => return Err(invalid(format!("unknown VM state `{other}`"))),
    };
    let stack = raw
        .get("stack")
        .and_then(Json::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(InvocationResult {
        state,
        gas_consumed: parse_gas(raw.get("gasconsumed"), "gasconsumed")?,
        exception: parse_opt_string(raw.get("exception")),
        stack,
        script: parse_opt_string(raw.get("script")).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const TX_HASH: &str = "0x7da6ae7ff9d0b7af3d32f3a2feb2aa96c2a27ef8b651f9a132cfaad6ef20a3f8";
    const BLOCK_HASH: &str = "0x2b06e0b8a1a5f5b4bd3e4ee2bc4b0c8d4a3d2e3f6a1b2c3d4e5f60718293a4b5";

    #[test]
    fn integers_accept_numbers_and_strings() {
        assert_eq!(parse_integer_required::<u32>(Some(&json!(12)), "n").unwrap(), 12);
        assert_eq!(parse_integer_required::<u64>(Some(&json!("997775")), "n").unwrap(), 997_775);
        assert!(parse_integer_required::<u32>(Some(&json!(-1)), "n").is_err());
        assert!(parse_integer_required::<u8>(Some(&json!(300)), "n").is_err());
        assert!(parse_integer_required::<u32>(None, "n").is_err());
        assert_eq!(parse_integer_optional::<u32>(Some(&json!(null))), None);
    }

    #[test]
    fn parses_verbose_transaction() {
        let tx = parse_raw_transaction(json!({
            "hash": TX_HASH,
            "size": 252,
            "sender": "NikhQp1aAD1YFCiwknhM5LQQebj4464bCJ",
            "sysfee": "997775",
            "netfee": "1235610",
            "validuntilblock": 5_900_000,
            "script": "CxEUwB8MBGJ1cm4=",
            "blockhash": BLOCK_HASH,
            "blocktime": 1_700_000_000_000_u64,
            "confirmations": 3
        }))
        .unwrap();
        assert_eq!(tx.hash.as_str(), TX_HASH);
        assert_eq!(tx.system_fee, GasAmount(997_775));
        assert_eq!(tx.network_fee, GasAmount(1_235_610));
        assert_eq!(tx.block_hash.unwrap().as_str(), BLOCK_HASH);
    }

    #[test]
    fn pending_transaction_has_no_block() {
        let tx = parse_raw_transaction(json!({
            "hash": TX_HASH,
            "sysfee": "0",
            "netfee": "0",
            "validuntilblock": 10
        }))
        .unwrap();
        assert!(tx.block_hash.is_none());
        assert!(tx.block_time.is_none());
    }

    #[test]
    fn parses_block_with_transactions() {
        let block = parse_block(json!({
            "hash": BLOCK_HASH,
            "size": 697,
            "version": 0,
            "merkleroot": "0x0000000000000000000000000000000000000000000000000000000000000000",
            "time": 1_700_000_000_000_u64,
            "index": 42,
            "nextconsensus": "NVg7LjGcUSrgxgjX3zEgqaksfMaiS8Z6e1",
            "tx": [{ "hash": TX_HASH }],
            "confirmations": 8
        }))
        .unwrap();
        assert_eq!(block.index, 42);
        assert_eq!(block.transactions.len(), 1);
        assert_eq!(block.confirmations, Some(8));
        assert!(block.previous_block_hash.is_none());
    }

    #[test]
    fn parses_fault_invocation() {
        let result = parse_invocation_result(json!({
            "script": "wh8MCGRlY2ltYWxz",
            "state": "FAULT",
            "gasconsumed": "2007570",
            "exception": "ABORT is executed",
            "stack": []
        }))
        .unwrap();
        assert!(result.is_fault());
        assert_eq!(result.exception.as_deref(), Some("ABORT is executed"));
        assert_eq!(result.gas_consumed, GasAmount(2_007_570));
    }

    #[test]
    fn parses_validators_with_numeric_votes() {
        let validators = parse_validators(json!([
            { "publickey": "02ab", "votes": "100", "active": true },
            { "publickey": "03cd", "votes": 7 }
        ]))
        .unwrap();
        assert_eq!(validators[0].votes, "100");
        assert_eq!(validators[1].votes, "7");
        assert_eq!(validators[1].active, None);
    }

    #[test]
    fn parses_unclaimed_gas() {
        let gas = parse_unclaimed_gas(json!({
            "unclaimed": "499999989",
            "address": "NikhQp1aAD1YFCiwknhM5LQQebj4464bCJ"
        }))
        .unwrap();
        assert_eq!(gas, GasAmount(499_999_989));
    }

    #[test]
    fn parses_nep17_balances() {
        let owner = crate::test_util::address(3);
        let balance = parse_nep17_balances(
            json!({
                "address": owner.as_str(),
                "balance": [{
                    "assethash": "0xd2a4cff31913016155e38e474a2c06d08be276cf",
                    "amount": "3000000000",
                    "lastupdatedblock": 12
                }]
            }),
            &owner,
        )
        .unwrap();
        assert_eq!(balance.address, owner);
        assert_eq!(balance.balances[0].amount, "3000000000");

        let empty = parse_nep17_balances(json!({ "balance": [] }), &owner).unwrap();
        assert!(empty.balances.is_empty());
    }

    #[test]
    fn malformed_balances_are_rejected() {
        let owner = crate::test_util::address(3);
        for raw in [
            json!(null),
            json!([]),
            json!({ "balance": "garbage" }),
            json!({ "balance": null }),
        ] {
            assert!(
                matches!(
                    parse_nep17_balances(raw.clone(), &owner),
                    Err(RpcError::InvalidResponse(_))
                ),
                "{raw} should be rejected"
            );
        }
    }
}
