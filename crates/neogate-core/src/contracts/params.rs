//! Typed contract parameters and the marshalling from loose JSON values.
//!
//! `marshal(declared_type, raw_value)` is a pure function: it depends on
//! nothing but its inputs and produces the node's `{type, value}` shape.

use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NeoError;
use crate::validation::{Address, Hash256, ScriptHash, ADDRESS_LEN};

// ==============================================================================
// Parameter Types
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Any,
    Boolean,
    Integer,
    String,
    Hash160,
    Hash256,
    ByteArray,
    PublicKey,
    Array,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::Hash160 => "Hash160",
            Self::Hash256 => "Hash256",
            Self::ByteArray => "ByteArray",
            Self::PublicKey => "PublicKey",
            Self::Array => "Array",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = NeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "boolean" | "bool" => Ok(Self::Boolean),
            "integer" | "int" | "number" => Ok(Self::Integer),
            "string" => Ok(Self::String),
            "hash160" | "address" => Ok(Self::Hash160),
            "hash256" => Ok(Self::Hash256),
            "bytearray" | "bytestring" | "bytes" => Ok(Self::ByteArray),
            "publickey" => Ok(Self::PublicKey),
            "array" => Ok(Self::Array),
            other => Err(NeoError::validation(format!(
                "unknown contract parameter type `{other}`"
            ))),
        }
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// Contract Parameters
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractParam {
    Any,
    Boolean(bool),
    Integer(i128),
    String(String),
    Hash160(ScriptHash),
    Hash256(Hash256),
    /// Base64-encoded bytes.
    ByteArray(String),
    /// Compressed public key, hex encoded.
    PublicKey(String),
    Array(Vec<ContractParam>),
}

impl ContractParam {
    pub fn param_type(&self) -> ParamType {
        match self {
            Self::Any => ParamType::Any,
            Self::Boolean(_) => ParamType::Boolean,
            Self::Integer(_) => ParamType::Integer,
            Self::String(_) => ParamType::String,
            Self::Hash160(_) => ParamType::Hash160,
            Self::Hash256(_) => ParamType::Hash256,
            Self::ByteArray(_) => ParamType::ByteArray,
            Self::PublicKey(_) => ParamType::PublicKey,
            Self::Array(_) => ParamType::Array,
        }
    }

    /// The node's JSON representation: `{"type": ..., "value": ...}`.
    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            Self::Any => serde_json::Value::Null,
            Self::Boolean(b) => serde_json::json!(b),
            Self::Integer(n) => serde_json::json!(n.to_string()),
            Self::String(s) | Self::ByteArray(s) | Self::PublicKey(s) => serde_json::json!(s),
            Self::Hash160(h) => serde_json::json!(h.as_str()),
            Self::Hash256(h) => serde_json::json!(h.as_str()),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
        };
        serde_json::json!({ "type": self.param_type().as_str(), "value": value })
    }
}

// ==============================================================================
// Marshalling
// ==============================================================================

/// Convert `raw` into a parameter of the declared type.
pub fn marshal(declared: ParamType, raw: &serde_json::Value) -> Result<ContractParam, NeoError> {
    use serde_json::Value;

    if declared == ParamType::Any {
        return infer(raw);
    }
    if raw.is_null() {
        return Err(NeoError::validation(format!(
            "missing value for {declared} parameter"
        )));
    }

    let mismatch = || NeoError::validation(format!("cannot use {raw} as a {declared} parameter"));

    match declared {
        ParamType::Any => infer(raw),
        ParamType::Boolean => match raw {
            Value::Bool(b) => Ok(ContractParam::Boolean(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(ContractParam::Boolean(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => {
                Ok(ContractParam::Boolean(false))
            }
            _ => Err(mismatch()),
        },
        ParamType::Integer => parse_integer(raw).ok_or_else(mismatch).map(ContractParam::Integer),
        ParamType::String => match raw {
            Value::String(s) => Ok(ContractParam::String(s.clone())),
            _ => Err(mismatch()),
        },
        ParamType::Hash160 => match raw {
            Value::String(s) => parse_hash160(s).map(ContractParam::Hash160),
            _ => Err(mismatch()),
        },
        ParamType::Hash256 => match raw {
            Value::String(s) => Hash256::parse(s).map(ContractParam::Hash256),
            _ => Err(mismatch()),
        },
        ParamType::ByteArray => match raw {
            Value::String(s) => parse_bytes(s).map(ContractParam::ByteArray),
            _ => Err(mismatch()),
        },
        ParamType::PublicKey => match raw {
            Value::String(s) => parse_public_key(s).map(ContractParam::PublicKey),
            _ => Err(mismatch()),
        },
        ParamType::Array => match raw {
            Value::Array(items) => items
                .iter()
                .map(infer)
                .collect::<Result<Vec<_>, _>>()
                .map(ContractParam::Array),
            _ => Err(mismatch()),
        },
    }
}

/// Pick a parameter type from the shape of an untyped value.
///
/// An object of the form `{"type": "...", "value": ...}` is treated as an
/// explicitly typed parameter.
pub fn infer(raw: &serde_json::Value) -> Result<ContractParam, NeoError> {
    use serde_json::Value;

    match raw {
        Value::Null => Ok(ContractParam::Any),
        Value::Bool(b) => Ok(ContractParam::Boolean(*b)),
        Value::Number(_) => parse_integer(raw)
            .map(ContractParam::Integer)
            .ok_or_else(|| NeoError::validation(format!("non-integer number {raw} is not a valid contract argument"))),
        Value::String(s) => {
            if s.len() == ADDRESS_LEN {
                if let Ok(address) = Address::parse(s) {
                    return Ok(ContractParam::Hash160(address.script_hash()));
                }
            }
            if s.starts_with("0x") {
                if let Ok(hash) = ScriptHash::parse(s) {
                    return Ok(ContractParam::Hash160(hash));
                }
                if let Ok(hash) = Hash256::parse(s) {
                    return Ok(ContractParam::Hash256(hash));
                }
            }
            Ok(ContractParam::String(s.clone()))
        }
        Value::Array(items) => items
            .iter()
            .map(infer)
            .collect::<Result<Vec<_>, _>>()
            .map(ContractParam::Array),
        Value::Object(map) => {
            let declared = map
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    NeoError::validation("object arguments must be {\"type\", \"value\"} pairs")
                })?
                .parse::<ParamType>()?;
            marshal(declared, map.get("value").unwrap_or(&Value::Null))
        }
    }
}

/// Marshal positional arguments, using declared types where known.
pub fn marshal_args(
    declared: &[ParamType],
    args: &[serde_json::Value],
) -> Result<Vec<ContractParam>, NeoError> {
    args.iter()
        .enumerate()
        .map(|(i, raw)| {
            let ty = declared.get(i).copied().unwrap_or(ParamType::Any);
            marshal(ty, raw).map_err(|e| match e {
                NeoError::Validation(msg) => NeoError::Validation(format!("argument {i}: {msg}")),
                other => other,
            })
        })
        .collect()
}

fn parse_integer(raw: &serde_json::Value) -> Option<i128> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            let digits = s.strip_prefix('-').unwrap_or(s);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok()
        }
        _ => None,
    }
}

fn parse_hash160(raw: &str) -> Result<ScriptHash, NeoError> {
    if raw.trim().len() == ADDRESS_LEN {
        return Address::parse(raw).map(|a| a.script_hash());
    }
    ScriptHash::parse(raw)
}

/// Accept `0x`-prefixed hex or base64, always producing base64.
fn parse_bytes(raw: &str) -> Result<String, NeoError> {
    if let Some(hex_body) = raw.strip_prefix("0x") {
        let bytes = hex::decode(hex_body)
            .map_err(|e| NeoError::validation(format!("invalid hex bytes `{raw}`: {e}")))?;
        return Ok(BASE64.encode(bytes));
    }
    BASE64
        .decode(raw)
        .map(|_| raw.to_owned())
        .map_err(|e| NeoError::validation(format!("invalid base64 bytes `{raw}`: {e}")))
}

fn parse_public_key(raw: &str) -> Result<String, NeoError> {
    let key = raw.trim().to_ascii_lowercase();
    let compressed = key.len() == 66
        && (key.starts_with("02") || key.starts_with("03"))
        && key.bytes().all(|b| b.is_ascii_hexdigit());
    if !compressed {
        return Err(NeoError::validation(format!(
            "invalid public key `{raw}`: expected 33-byte compressed key in hex"
        )));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const GAS_HASH: &str = "0xd2a4cff31913016155e38e474a2c06d08be276cf";

    #[test]
    fn marshals_declared_types() {
        assert_eq!(
            marshal(ParamType::Integer, &json!("100000000")).unwrap(),
            ContractParam::Integer(100_000_000)
        );
        assert_eq!(
            marshal(ParamType::Integer, &json!(-5)).unwrap(),
            ContractParam::Integer(-5)
        );
        assert_eq!(
            marshal(ParamType::Boolean, &json!("TRUE")).unwrap(),
            ContractParam::Boolean(true)
        );
        assert_eq!(
            marshal(ParamType::ByteArray, &json!("0x0102")).unwrap(),
            ContractParam::ByteArray("AQI=".into())
        );
        assert!(matches!(
            marshal(ParamType::Hash160, &json!(GAS_HASH.trim_start_matches("0x"))).unwrap(),
            ContractParam::Hash160(h) if h.as_str() == GAS_HASH
        ));
    }

    #[test]
    fn hash160_accepts_addresses() {
        let hash = ScriptHash::parse(GAS_HASH).unwrap();
        let address = Address::from_script_hash(&hash);
        assert_eq!(
            marshal(ParamType::Hash160, &json!(address.as_str())).unwrap(),
            ContractParam::Hash160(hash)
        );
    }

    #[test]
    fn rejects_type_mismatches() {
        assert!(marshal(ParamType::Integer, &json!(1.5)).is_err());
        assert!(marshal(ParamType::Integer, &json!("12a")).is_err());
        assert!(marshal(ParamType::String, &json!(12)).is_err());
        assert!(marshal(ParamType::Hash256, &json!(GAS_HASH)).is_err());
        assert!(marshal(ParamType::PublicKey, &json!("04abcd")).is_err());
        assert!(marshal(ParamType::Boolean, &serde_json::Value::Null).is_err());
    }

    #[test]
    fn infers_types_from_shape() {
        assert_eq!(infer(&json!(null)).unwrap(), ContractParam::Any);
        assert_eq!(infer(&json!(7)).unwrap(), ContractParam::Integer(7));
        assert_eq!(infer(&json!("hello")).unwrap(), ContractParam::String("hello".into()));
        assert!(matches!(infer(&json!(GAS_HASH)).unwrap(), ContractParam::Hash160(_)));
        assert_eq!(
            infer(&json!([1, true])).unwrap(),
            ContractParam::Array(vec![ContractParam::Integer(1), ContractParam::Boolean(true)])
        );
        assert_eq!(
            infer(&json!({ "type": "String", "value": "0x01" })).unwrap(),
            ContractParam::String("0x01".into())
        );
        assert!(infer(&json!({ "value": 1 })).is_err());
    }

    #[test]
    fn serializes_to_node_shape() {
        let param = ContractParam::Array(vec![
            ContractParam::Integer(10),
            ContractParam::Any,
        ]);
        assert_eq!(
            param.to_json(),
            json!({
                "type": "Array",
                "value": [
                    { "type": "Integer", "value": "10" },
                    { "type": "Any", "value": null }
                ]
            })
        );
    }

    #[test]
    fn argument_errors_name_the_position() {
        let err = marshal_args(&[ParamType::Hash160, ParamType::Integer], &[json!(GAS_HASH), json!("x")])
            .expect_err("second argument is not an integer");
        assert!(err.to_string().contains("argument 1"));
    }

    #[test]
    fn param_type_parses_aliases() {
        assert_eq!("bytestring".parse::<ParamType>().unwrap(), ParamType::ByteArray);
        assert_eq!("Address".parse::<ParamType>().unwrap(), ParamType::Hash160);
        assert!("Map".parse::<ParamType>().is_err());
    }
}
