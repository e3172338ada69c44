//! Contracts known out of the box.
//!
//! Hashes are stored as published by each project, so some carry the `0x`
//! prefix and some do not; lookups always go through `ScriptHash::parse`.

use std::collections::BTreeMap;

use crate::network::Network;

use super::params::ParamType;
use super::registry::{ArgSpec, ContractDescriptor, OperationSpec};

fn arg(name: &str, param_type: ParamType, description: &str) -> ArgSpec {
    ArgSpec {
        name: name.to_owned(),
        param_type,
        description: description.to_owned(),
    }
}

fn op(name: &str, description: &str, args: Vec<ArgSpec>) -> (String, OperationSpec) {
    (
        name.to_owned(),
        OperationSpec {
            name: name.to_owned(),
            description: description.to_owned(),
            args,
        },
    )
}

fn contract(
    name: &str,
    description: &str,
    hashes: &[(Network, &str)],
    operations: Vec<(String, OperationSpec)>,
) -> ContractDescriptor {
    ContractDescriptor {
        name: name.to_owned(),
        description: description.to_owned(),
        script_hash: hashes
            .iter()
            .map(|(network, hash)| (*network, (*hash).to_owned()))
            .collect(),
        operations: operations.into_iter().collect::<BTreeMap<_, _>>(),
    }
}

/// NEP-17 methods shared by the token contracts in the catalog.
fn nep17_operations() -> Vec<(String, OperationSpec)> {
    vec![
        op("symbol", "Token symbol", Vec::new()),
        op("decimals", "Token precision", Vec::new()),
        op("totalSupply", "Total supply in base units", Vec::new()),
        op(
            "balanceOf",
            "Balance of an account in base units",
            vec![arg("account", ParamType::Hash160, "Account script hash or address")],
        ),
        op(
            "transfer",
            "Move tokens between accounts",
            vec![
                arg("from", ParamType::Hash160, "Sender"),
                arg("to", ParamType::Hash160, "Recipient"),
                arg("amount", ParamType::Integer, "Amount in base units"),
                arg("data", ParamType::Any, "Optional data passed to onNEP17Payment"),
            ],
        ),
    ]
}

pub(super) fn builtin_contracts() -> Vec<ContractDescriptor> {
    vec![
        contract(
            "NeoFS",
            "Decentralized object storage: containers and their access rules",
            &[
                (Network::Mainnet, "0x50ac1c37690cc2cfc594472833cf57505d5f46de"),
                (Network::Testnet, "3c3f4b84773ef0141576e48c3ff60e5078235891"),
            ],
            vec![
                op(
                    "containersOf",
                    "List container IDs owned by an account",
                    vec![arg("owner", ParamType::ByteArray, "Owner ID")],
                ),
                op(
                    "get",
                    "Fetch a container by ID",
                    vec![arg("containerID", ParamType::ByteArray, "Container ID")],
                ),
                op(
                    "put",
                    "Create a container",
                    vec![
                        arg("container", ParamType::ByteArray, "Serialized container"),
                        arg("signature", ParamType::ByteArray, "Owner signature"),
                        arg("publicKey", ParamType::PublicKey, "Owner public key"),
                        arg("token", ParamType::ByteArray, "Session token"),
                    ],
                ),
                op(
                    "delete",
                    "Remove a container",
                    vec![
                        arg("containerID", ParamType::ByteArray, "Container ID"),
                        arg("signature", ParamType::ByteArray, "Owner signature"),
                        arg("token", ParamType::ByteArray, "Session token"),
                    ],
                ),
            ],
        ),
        contract(
            "NeoBurger",
            "Liquid NEO staking: deposit NEO, receive bNEO and accrue GAS",
            &[
                (Network::Mainnet, "0x48c40d4666f93408be1bef038b6722404d9a4c2a"),
                (Network::Testnet, "0x833b3d6854d5bc44cab40ab9b46560d25c72562c"),
            ],
            {
                let mut ops = nep17_operations();
                ops.push(op(
                    "reward",
                    "Unclaimed GAS reward of an account",
                    vec![arg("account", ParamType::Hash160, "Account")],
                ));
                ops
            },
        ),
        contract(
            "Flamingo",
            "Flamingo Finance FLM token",
            &[
                (Network::Mainnet, "f0151f528127558851b39c2cd8aa47da7418ab28"),
                (Network::Testnet, "0x5b53998b399d10cd25727269e865299f7d6c18a3"),
            ],
            nep17_operations(),
        ),
        contract(
            "NeoCompound",
            "Auto-compounding yield strategies",
            &[(Network::Mainnet, "0xcd10d9f697230b04d9ebb8594a1ffe18fa95d9ad")],
            vec![
                op("getAllStrategies", "List available strategies", Vec::new()),
                op(
                    "getUserBalance",
                    "Deposited balance of an account in a strategy",
                    vec![
                        arg("account", ParamType::Hash160, "Account"),
                        arg("strategy", ParamType::Hash160, "Strategy asset"),
                    ],
                ),
                op(
                    "deposit",
                    "Deposit into a strategy",
                    vec![
                        arg("from", ParamType::Hash160, "Depositor"),
                        arg("strategy", ParamType::Hash160, "Strategy asset"),
                        arg("amount", ParamType::Integer, "Amount in base units"),
                    ],
                ),
                op(
                    "withdraw",
                    "Withdraw from a strategy",
                    vec![
                        arg("to", ParamType::Hash160, "Recipient"),
                        arg("strategy", ParamType::Hash160, "Strategy asset"),
                        arg("amount", ParamType::Integer, "Amount in base units"),
                    ],
                ),
            ],
        ),
        contract(
            "GrandShare",
            "Crowdfunding projects funded in GAS",
            &[
                (Network::Mainnet, "0x74f2dc36a68fdc4682034178eb2220729231db76"),
                (Network::Testnet, "0xf8fa8f36dc3a1a14ae17ba6b4a0bf1c7fc9f1b1a"),
            ],
            vec![
                op(
                    "getProjectDetails",
                    "Details of a project",
                    vec![arg("projectId", ParamType::Integer, "Project ID")],
                ),
                op(
                    "createProject",
                    "Open a new project",
                    vec![
                        arg("creator", ParamType::Hash160, "Project owner"),
                        arg("title", ParamType::String, "Title"),
                        arg("description", ParamType::String, "Description"),
                        arg("goal", ParamType::Integer, "Funding goal in datoshi"),
                    ],
                ),
                op(
                    "fundProject",
                    "Contribute to a project",
                    vec![
                        arg("funder", ParamType::Hash160, "Contributor"),
                        arg("projectId", ParamType::Integer, "Project ID"),
                        arg("amount", ParamType::Integer, "Amount in datoshi"),
                    ],
                ),
            ],
        ),
        contract(
            "GhostMarket",
            "NFT marketplace",
            &[
                (Network::Mainnet, "0xcc638d55d99fc81295daccbaf722b84f179fb9c4"),
                (Network::Testnet, "a2abfe6f0cf3ea7e7ae37c4dcb2b1e0ad6ab06a6"),
            ],
            vec![
                op(
                    "getPrice",
                    "Listing price of a token",
                    vec![arg("tokenId", ParamType::ByteArray, "Token ID")],
                ),
                op(
                    "ownerOf",
                    "Current owner of a token",
                    vec![arg("tokenId", ParamType::ByteArray, "Token ID")],
                ),
                op(
                    "listNFT",
                    "List a token for sale",
                    vec![
                        arg("seller", ParamType::Hash160, "Seller"),
                        arg("tokenId", ParamType::ByteArray, "Token ID"),
                        arg("price", ParamType::Integer, "Price in datoshi"),
                    ],
                ),
                op(
                    "buyNFT",
                    "Buy a listed token",
                    vec![
                        arg("buyer", ParamType::Hash160, "Buyer"),
                        arg("tokenId", ParamType::ByteArray, "Token ID"),
                    ],
                ),
            ],
        ),
    ]
}
