//! RPC-specific request shapes that do not belong to the shared domain model.

use serde_json::json;

use crate::contracts::params::ContractParam;
use crate::validation::ScriptHash;

// ==============================================================================
// Contract Calls
// ==============================================================================

/// A single `invokefunction` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub script_hash: ScriptHash,
    pub operation: String,
    pub params: Vec<ContractParam>,
    /// Accounts witnessing the call, all with `CalledByEntry` scope.
    pub signers: Vec<ScriptHash>,
}

impl ContractCall {
    pub fn new(script_hash: ScriptHash, operation: impl Into<String>) -> Self {
        Self {
            script_hash,
            operation: operation.into(),
            params: Vec::new(),
            signers: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<ContractParam>) -> Self {
        self.params = params;
        self
    }

    pub fn with_signer(mut self, signer: ScriptHash) -> Self {
        self.signers.push(signer);
        self
    }

    /// Positional params for the `invokefunction` method.
    pub fn to_params(&self) -> Vec<serde_json::Value> {
        let params: Vec<_> = self.params.iter().map(ContractParam::to_json).collect();
        let signers: Vec<_> = self
            .signers
            .iter()
            .map(|account| json!({ "account": account.as_str(), "scopes": "CalledByEntry" }))
            .collect();
        vec![
            json!(self.script_hash.as_str()),
            json!(self.operation),
            serde_json::Value::Array(params),
            serde_json::Value::Array(signers),
        ]
    }
}
