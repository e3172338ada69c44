//! Input shapes accepted at the service boundary.
//!
//! Every accepted shape has a dedicated validating constructor that yields
//! one canonical type. Validation happens before any RPC call is issued.

use serde::{Deserialize, Serialize};

use crate::error::NeoError;

/// Address version byte for Neo N3 (`N...` addresses).
pub const ADDRESS_VERSION: u8 = 0x35;
pub const ADDRESS_LEN: usize = 34;

// ==============================================================================
// Hashes
// ==============================================================================

/// Strip an optional `0x`/`0X` prefix and check for exactly `len` hex digits.
fn hex_body<'a>(raw: &'a str, len: usize, what: &str) -> Result<&'a str, NeoError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if body.len() != len || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(NeoError::validation(format!(
            "invalid {what} `{raw}`: expected {len} hex characters with optional 0x prefix"
        )));
    }
    Ok(body)
}

/// A 32-byte transaction or block hash in lowercase `0x`-prefixed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash256(String);

impl Hash256 {
    pub fn parse(raw: &str) -> Result<Self, NeoError> {
        hex_body(raw, 64, "hash").map(|body| Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Hash256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 20-byte contract script hash in `0x`-prefixed, big-endian display form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptHash(String);

impl ScriptHash {
    pub fn parse(raw: &str) -> Result<Self, NeoError> {
        hex_body(raw, 40, "script hash")
            .map(|body| Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// Build from little-endian bytes as stored inside an address payload.
    fn from_le_bytes(bytes: &[u8]) -> Self {
        let mut be = bytes.to_vec();
        be.reverse();
        Self(format!("0x{}", hex::encode(be)))
    }

    fn to_le_bytes(&self) -> Vec<u8> {
        // The inner string is always 0x + 40 hex chars.
        let mut bytes = hex::decode(&self.0[2..]).unwrap_or_default();
        bytes.reverse();
        bytes
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn validate_tx_hash(raw: &str) -> Result<Hash256, NeoError> {
    Hash256::parse(raw)
}

pub fn validate_script_hash(raw: &str) -> Result<ScriptHash, NeoError> {
    ScriptHash::parse(raw)
}

// ==============================================================================
// Addresses
// ==============================================================================

/// A base58check Neo N3 address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, NeoError> {
        let raw = raw.trim();
        if raw.len() != ADDRESS_LEN {
            return Err(NeoError::validation(format!(
                "invalid address `{raw}`: expected {ADDRESS_LEN} characters"
            )));
        }
        let payload = bs58::decode(raw)
            .with_check(Some(ADDRESS_VERSION))
            .into_vec()
            .map_err(|e| NeoError::validation(format!("invalid address `{raw}`: {e}")))?;
        if payload.len() != 21 {
            return Err(NeoError::validation(format!(
                "invalid address `{raw}`: unexpected payload length {}",
                payload.len()
            )));
        }
        Ok(Self(raw.to_owned()))
    }

    pub fn from_script_hash(hash: &ScriptHash) -> Self {
        let mut payload = Vec::with_capacity(21);
        payload.push(ADDRESS_VERSION);
        payload.extend(hash.to_le_bytes());
        Self(bs58::encode(payload).with_check().into_string())
    }

    pub fn script_hash(&self) -> ScriptHash {
        let payload = bs58::decode(&self.0)
            .with_check(Some(ADDRESS_VERSION))
            .into_vec()
            .unwrap_or_default();
        ScriptHash::from_le_bytes(payload.get(1..).unwrap_or_default())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn validate_address(raw: &str) -> Result<Address, NeoError> {
    Address::parse(raw)
}

// ==============================================================================
// Block Reference (hash or height)
// ==============================================================================

/// Raw block selector as a caller may send it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BlockRefInput {
    Height(u64),
    Text(String),
}

impl From<u64> for BlockRefInput {
    fn from(height: u64) -> Self {
        Self::Height(height)
    }
}

impl From<&str> for BlockRefInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockRef {
    Height(u32),
    Hash(Hash256),
}

impl BlockRef {
    pub fn from_height(height: u64) -> Result<Self, NeoError> {
        u32::try_from(height)
            .map(Self::Height)
            .map_err(|_| NeoError::validation(format!("block height {height} out of range")))
    }

    /// A decimal height, or a 64-hex-char hash with or without `0x`.
    pub fn parse(raw: &str) -> Result<Self, NeoError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NeoError::validation("block hash or height is required"));
        }
        let is_hash_shaped = trimmed.len() == 64
            || trimmed.starts_with("0x")
            || trimmed.starts_with("0X");
        if !is_hash_shaped && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let height: u64 = trimmed
                .parse()
                .map_err(|_| NeoError::validation(format!("block height `{raw}` out of range")))?;
            return Self::from_height(height);
        }
        Hash256::parse(trimmed).map(Self::Hash).map_err(|_| {
            NeoError::validation(format!(
                "invalid block reference `{raw}`: expected a height or a 64-hex-char hash"
            ))
        })
    }

    pub fn from_input(input: BlockRefInput) -> Result<Self, NeoError> {
        match input {
            BlockRefInput::Height(height) => Self::from_height(height),
            BlockRefInput::Text(text) => Self::parse(&text),
        }
    }

    pub fn to_param(&self) -> serde_json::Value {
        match self {
            Self::Height(h) => serde_json::json!(h),
            Self::Hash(hash) => serde_json::json!(hash.as_str()),
        }
    }
}

impl std::fmt::Display for BlockRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Height(h) => write!(f, "{h}"),
            Self::Hash(hash) => hash.fmt(f),
        }
    }
}

// ==============================================================================
// Contract Operations
// ==============================================================================

const MAX_OPERATION_LEN: usize = 64;

/// A contract method name: ASCII letters, digits and `_`, not starting
/// with a digit.
pub fn validate_operation(raw: &str) -> Result<&str, NeoError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NeoError::validation("operation name is required"));
    }
    let well_formed = name.len() <= MAX_OPERATION_LEN
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if !well_formed {
        return Err(NeoError::validation(format!(
            "invalid operation name `{raw}`"
        )));
    }
    Ok(name)
}

// ==============================================================================
// Amounts
// ==============================================================================

/// Raw amount as a caller may send it: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<f64> for AmountInput {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// A validated, strictly positive token amount in the asset's base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    units: u128,
    decimals: u8,
}

impl Amount {
    pub fn units(&self) -> u128 {
        self.units
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_units(self.units, self.decimals))
    }
}

impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validate an amount for an asset with `decimals` precision, capped at
/// `max_whole` whole tokens.
pub fn validate_amount(
    input: &AmountInput,
    decimals: u8,
    max_whole: u64,
) -> Result<Amount, NeoError> {
    let text = match input {
        AmountInput::Number(n) => {
            if !n.is_finite() {
                return Err(NeoError::validation("amount must be a finite number"));
            }
            if *n <= 0.0 {
                return Err(NeoError::validation("amount must be greater than zero"));
            }
            n.to_string()
        }
        AmountInput::Text(s) => s.trim().to_owned(),
    };

    let units = parse_units(&text, decimals)?;
    if units == 0 {
        return Err(NeoError::validation("amount must be greater than zero"));
    }
    // A cap wider than u128 base units cannot be exceeded by a parsed amount.
    let max_units = u128::from(max_whole).checked_mul(pow10(decimals));
    if max_units.is_some_and(|max| units > max) {
        return Err(NeoError::validation(format!(
            "amount {} exceeds the configured maximum of {max_whole}",
            format_units(units, decimals)
        )));
    }
    Ok(Amount { units, decimals })
}

fn pow10(decimals: u8) -> u128 {
    10u128.pow(u32::from(decimals))
}

/// Parse a plain decimal string (`123`, `0.5`, `.5`, `1.`) into base units.
fn parse_units(text: &str, decimals: u8) -> Result<u128, NeoError> {
    let invalid = || NeoError::validation(format!("invalid amount `{text}`"));
    if text.is_empty() {
        return Err(invalid());
    }
    if text.starts_with('-') {
        return Err(NeoError::validation("amount must be greater than zero"));
    }

    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let significant_frac = frac.trim_end_matches('0');
    if significant_frac.len() > usize::from(decimals) {
        return Err(NeoError::validation(format!(
            "amount `{text}` has more than {decimals} decimal places"
        )));
    }

    let whole_units: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let mut frac_digits = significant_frac.to_owned();
    while frac_digits.len() < usize::from(decimals) {
        frac_digits.push('0');
    }
    let frac_units: u128 = if frac_digits.is_empty() {
        0
    } else {
        frac_digits.parse().map_err(|_| invalid())?
    };

    whole_units
        .checked_mul(pow10(decimals))
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| NeoError::validation(format!("amount `{text}` is too large")))
}

/// Render base units as a canonical decimal string without trailing zeros.
pub fn format_units(units: u128, decimals: u8) -> String {
    let scale = pow10(decimals);
    let whole = units / scale;
    let frac = units % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0width$}", width = usize::from(decimals));
    format!("{whole}.{}", frac.trim_end_matches('0'))
}
