//! Read-only catalog of known third-party contracts.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NeoError;
use crate::network::Network;
use crate::validation::ScriptHash;

use super::params::ParamType;

// ==============================================================================
// Descriptors
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
}

/// Documentation of one contract method. Argument types steer marshalling;
/// they are not enforced as a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
}

impl OperationSpec {
    pub fn arg_types(&self) -> Vec<ParamType> {
        self.args.iter().map(|arg| arg.param_type).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Script hash per network, in whatever form the catalog stores it.
    pub script_hash: BTreeMap<Network, String>,
    #[serde(default)]
    pub operations: BTreeMap<String, OperationSpec>,
}

impl ContractDescriptor {
    /// Canonical script hash on `network`, if the contract is deployed there.
    pub fn script_hash_on(&self, network: Network) -> Result<ScriptHash, NeoError> {
        let stored = self.script_hash.get(&network).ok_or_else(|| {
            NeoError::contract(format!(
                "contract `{}` is not deployed on {network}",
                self.name
            ))
        })?;
        ScriptHash::parse(stored).map_err(|e| {
            NeoError::Internal(format!(
                "catalog entry `{}` has a malformed {network} script hash: {e}",
                self.name
            ))
        })
    }

    /// Operation lookup by exact name, falling back to a case-insensitive match.
    pub fn operation(&self, name: &str) -> Option<&OperationSpec> {
        let name = name.trim();
        self.operations.get(name).or_else(|| {
            self.operations
                .values()
                .find(|op| op.name.eq_ignore_ascii_case(name))
        })
    }
}

// ==============================================================================
// Registry
// ==============================================================================

/// Name → descriptor table, built once and shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    by_key: HashMap<String, ContractDescriptor>,
}

fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ContractRegistry {
    /// The contracts shipped with the crate.
    pub fn builtin() -> Self {
        let mut by_key = HashMap::new();
        for descriptor in super::catalog::builtin_contracts() {
            by_key.insert(lookup_key(&descriptor.name), descriptor);
        }
        Self { by_key }
    }

    /// Build from explicit descriptors, rejecting names that collide once
    /// normalized and hashes that do not parse.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ContractDescriptor>,
    ) -> Result<Self, NeoError> {
        let mut by_key = HashMap::new();
        for mut descriptor in descriptors {
            let key = lookup_key(&descriptor.name);
            if key.is_empty() {
                return Err(NeoError::validation("contract name cannot be empty"));
            }
            for (network, hash) in &descriptor.script_hash {
                ScriptHash::parse(hash).map_err(|e| {
                    NeoError::validation(format!(
                        "contract `{}` on {network}: {e}",
                        descriptor.name
                    ))
                })?;
            }
            for (key, op) in descriptor.operations.iter_mut() {
                if op.name.is_empty() {
                    op.name = key.clone();
                }
            }
            if by_key.contains_key(&key) {
                return Err(NeoError::validation(format!(
                    "duplicate contract name `{}` in catalog",
                    descriptor.name
                )));
            }
            by_key.insert(key, descriptor);
        }
        Ok(Self { by_key })
    }

    pub fn from_json(raw: &str) -> Result<Self, NeoError> {
        let descriptors: Vec<ContractDescriptor> = serde_json::from_str(raw)
            .map_err(|e| NeoError::validation(format!("invalid contract catalog JSON: {e}")))?;
        Self::from_descriptors(descriptors)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, NeoError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            NeoError::validation(format!(
                "failed to read contract catalog {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Look up by name. Blank names are a validation failure; unknown names
    /// are a contract failure.
    pub fn get(&self, name: &str) -> Result<&ContractDescriptor, NeoError> {
        let key = lookup_key(name);
        if key.is_empty() {
            return Err(NeoError::validation("contract name is required"));
        }
        self.by_key
            .get(&key)
            .ok_or_else(|| NeoError::contract(format!("unknown contract `{}`", name.trim())))
    }

    /// Descriptors sorted by display name.
    pub fn list(&self) -> Vec<&ContractDescriptor> {
        let mut all: Vec<_> = self.by_key.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
