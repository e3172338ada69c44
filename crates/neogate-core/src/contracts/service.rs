use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::account::Account;
use crate::error::NeoError;
use crate::network::Network;
use crate::rpc::ContractCall;
use crate::service::{require_account, NeoService};
use crate::types::{InvocationReceipt, InvocationResult};
use crate::validation::ScriptHash;

use super::params::{marshal_args, ContractParam};
use super::registry::{ContractDescriptor, ContractRegistry, OperationSpec};

/// Catalog entry as seen from one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractInfo {
    pub name: String,
    pub description: String,
    /// `None` when the contract is not deployed on this network.
    pub script_hash: Option<ScriptHash>,
    pub operations: Vec<String>,
}

/// Named-contract access on top of a [`NeoService`].
#[derive(Clone)]
pub struct ContractService {
    service: Arc<NeoService>,
    registry: Arc<ContractRegistry>,
}

impl ContractService {
    pub fn new(service: Arc<NeoService>, registry: Arc<ContractRegistry>) -> Self {
        Self { service, registry }
    }

    pub fn network(&self) -> Network {
        self.service.network()
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn get_contract_script_hash(&self, name: &str) -> Result<ScriptHash, NeoError> {
        self.registry.get(name)?.script_hash_on(self.network())
    }

    /// Dry-run a declared read operation and return the VM result.
    pub async fn query_contract(
        &self,
        name: &str,
        operation: &str,
        args: &[serde_json::Value],
    ) -> Result<InvocationResult, NeoError> {
        let (script_hash, declared, params) = self.resolve(name, operation, args)?;
        debug!(
            network = %self.network(),
            contract = name,
            operation = %declared.name,
            "contract query"
        );
        let call = ContractCall::new(script_hash, &declared.name).with_params(params);
        self.service.dry_run(&call).await
    }

    /// Sign and broadcast a declared operation.
    pub async fn invoke_contract(
        &self,
        account: Option<&dyn Account>,
        name: &str,
        operation: &str,
        args: &[serde_json::Value],
    ) -> Result<InvocationReceipt, NeoError> {
        let account = require_account(account)?;
        let (script_hash, declared, params) = self.resolve(name, operation, args)?;
        self.service
            .invoke_with_params(account, script_hash, &declared.name, params)
            .await
    }

    pub fn list_supported_contracts(&self) -> Vec<ContractInfo> {
        let network = self.network();
        self.registry
            .list()
            .into_iter()
            .map(|descriptor| ContractInfo {
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                script_hash: descriptor.script_hash_on(network).ok(),
                operations: descriptor.operations.values().map(|op| op.name.clone()).collect(),
            })
            .collect()
    }

    pub fn get_contract_operations(&self, name: &str) -> Result<Vec<OperationSpec>, NeoError> {
        Ok(self.registry.get(name)?.operations.values().cloned().collect())
    }

    /// Whether `name` is known and deployed on this network. Never fails.
    pub fn is_contract_available(&self, name: &str) -> bool {
        self.get_contract_script_hash(name).is_ok()
    }

    fn resolve<'r>(
        &'r self,
        name: &str,
        operation: &str,
        args: &[serde_json::Value],
    ) -> Result<(ScriptHash, &'r OperationSpec, Vec<ContractParam>), NeoError> {
        let descriptor: &ContractDescriptor = self.registry.get(name)?;
        let script_hash = descriptor.script_hash_on(self.network())?;

        if operation.trim().is_empty() {
            return Err(NeoError::validation("operation must not be empty"));
        }
        let declared = descriptor.operation(operation).ok_or_else(|| {
            NeoError::contract(format!(
                "operation `{}` is not supported by {}",
                operation.trim(),
                descriptor.name
            ))
        })?;

        // Declared types steer marshalling; undeclared trailing args are inferred.
        let params = marshal_args(&declared.arg_types(), args)?;
        Ok((script_hash, declared, params))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::rpc::mock::MockRpc;
    use crate::service::ServiceConfig;
    use crate::test_util::*;

    const BURGER_MAINNET: &str = "0x48c40d4666f93408be1bef038b6722404d9a4c2a";

    fn contracts(network: Network, rpc: Arc<MockRpc>) -> ContractService {
        let service = NeoService::new(network, rpc, ServiceConfig::default());
        ContractService::new(Arc::new(service), Arc::new(ContractRegistry::builtin()))
    }

    #[test]
    fn script_hash_is_canonical_regardless_of_catalog_form() {
        let rpc = Arc::new(MockRpc::builder().build());
        let mainnet = contracts(Network::Mainnet, rpc.clone());
        assert_eq!(
            mainnet.get_contract_script_hash("  flamingo ").unwrap().as_str(),
            "0xf0151f528127558851b39c2cd8aa47da7418ab28"
        );
        assert_eq!(
            mainnet.get_contract_script_hash("NeoBurger").unwrap().as_str(),
            BURGER_MAINNET
        );
    }

    #[test]
    fn lookup_errors_are_classified() {
        let testnet = contracts(Network::Testnet, Arc::new(MockRpc::builder().build()));
        assert!(matches!(testnet.get_contract_script_hash(" "), Err(NeoError::Validation(_))));
        assert!(matches!(
            testnet.get_contract_script_hash("NoSuchDapp"),
            Err(NeoError::Contract { .. })
        ));
        // Mainnet-only.
        assert!(matches!(
            testnet.get_contract_script_hash("NeoCompound"),
            Err(NeoError::Contract { .. })
        ));
    }

    #[test]
    fn availability_never_errors() {
        let testnet = contracts(Network::Testnet, Arc::new(MockRpc::builder().build()));
        assert!(testnet.is_contract_available("neofs"));
        assert!(!testnet.is_contract_available("NeoCompound"));
        assert!(!testnet.is_contract_available(""));
        assert!(!testnet.is_contract_available("nope"));
    }

    #[test]
    fn listing_reflects_the_network() {
        let testnet = contracts(Network::Testnet, Arc::new(MockRpc::builder().build()));
        let listed = testnet.list_supported_contracts();
        assert_eq!(listed.len(), 6);
        let compound = listed.iter().find(|c| c.name == "NeoCompound").unwrap();
        assert!(compound.script_hash.is_none());

        let ops = testnet.get_contract_operations("NeoBurger").unwrap();
        assert!(ops.iter().any(|op| op.name == "balanceOf"));
    }

    #[tokio::test]
    async fn query_marshals_by_declared_types() {
        let rpc = Arc::new(
            MockRpc::builder()
                .with_default_invocation(halt(
                    12_345,
                    vec![json!({ "type": "Integer", "value": "700" })],
                ))
                .build(),
        );
        let mainnet = contracts(Network::Mainnet, rpc.clone());

        let result = mainnet
            .query_contract("neoburger", "BALANCEOF", &[json!(address(5).as_str())])
            .await
            .unwrap();
        assert_eq!(result.stack[0]["value"], "700");

        let invoked = rpc.invoked();
        assert_eq!(invoked[0].script_hash.as_str(), BURGER_MAINNET);
        assert_eq!(invoked[0].operation, "balanceOf");
        assert_eq!(invoked[0].params, vec![ContractParam::Hash160(address(5).script_hash())]);
        assert!(rpc.broadcasts().is_empty());
    }

    #[tokio::test]
    async fn bad_queries_never_reach_the_node() {
        let rpc = Arc::new(MockRpc::builder().build());
        let mainnet = contracts(Network::Mainnet, rpc.clone());

        assert!(matches!(
            mainnet.query_contract("NeoBurger", "selfDestruct", &[]).await,
            Err(NeoError::Contract { .. })
        ));
        assert!(matches!(
            mainnet.query_contract("NeoBurger", "balanceOf", &[json!(true)]).await,
            Err(NeoError::Validation(_))
        ));
        assert_eq!(rpc.total_calls(), 0);
    }

    #[tokio::test]
    async fn declared_args_describe_rather_than_constrain() {
        let rpc = Arc::new(MockRpc::builder().build());
        let mainnet = contracts(Network::Mainnet, rpc.clone());

        // NEP-17 transfer without the optional `data` argument.
        mainnet
            .query_contract("NeoBurger", "transfer", &[
                json!(address(1).as_str()),
                json!(address(2).as_str()),
                json!("1"),
            ])
            .await
            .unwrap();
        // Trailing args past the declared list are inferred.
        mainnet
            .query_contract("NeoBurger", "balanceOf", &[json!(address(5).as_str()), json!(7)])
            .await
            .unwrap();

        let invoked = rpc.invoked();
        assert_eq!(invoked.len(), 2);
        assert_eq!(invoked[0].params.len(), 3);
        assert_eq!(invoked[0].params[2], ContractParam::Integer(1));
        assert_eq!(invoked[1].params[1], ContractParam::Integer(7));
    }

    #[tokio::test]
    async fn query_fault_carries_the_exception() {
        let rpc = Arc::new(
            MockRpc::builder()
                .with_default_invocation(fault("value out of range"))
                .build(),
        );
        let mainnet = contracts(Network::Mainnet, rpc);
        let err = mainnet.query_contract("NeoBurger", "symbol", &[]).await.unwrap_err();
        assert!(
            matches!(err, NeoError::Contract { exception: Some(ref e), .. } if e == "value out of range")
        );
    }

    #[tokio::test]
    async fn invoke_requires_an_account_first() {
        let rpc = Arc::new(MockRpc::builder().build());
        let mainnet = contracts(Network::Mainnet, rpc.clone());
        // Even an unknown contract reports the missing account.
        let err = mainnet
            .invoke_contract(None, "NoSuchDapp", "x", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, NeoError::Validation(_)));
        assert_eq!(rpc.total_calls(), 0);
    }

    #[tokio::test]
    async fn invoke_broadcasts_once() {
        let rpc = Arc::new(MockRpc::builder().build());
        let mainnet = contracts(Network::Mainnet, rpc.clone());
        let account = TestAccount::new(address(1));

        let receipt = mainnet
            .invoke_contract(Some(&account), "NeoBurger", "transfer", &[
                json!(address(1).as_str()),
                json!(address(2).as_str()),
                json!("100"),
                json!(null),
            ])
            .await
            .unwrap();
        assert_eq!(receipt.script_hash.as_str(), BURGER_MAINNET);
        assert_eq!(receipt.operation, "transfer");
        assert_eq!(rpc.calls("sendrawtransaction"), 1);
        assert_eq!(rpc.invoked()[0].params[2], ContractParam::Integer(100));
    }
}
