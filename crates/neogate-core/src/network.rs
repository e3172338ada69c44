//! Network identifiers and endpoint selection.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NeoError;

pub const DEFAULT_MAINNET_RPC_URL: &str = "https://mainnet1.neo.coz.io:443";
pub const DEFAULT_TESTNET_RPC_URL: &str = "https://testnet1.neo.coz.io:443";

// ==============================================================================
// Network
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => DEFAULT_MAINNET_RPC_URL,
            Self::Testnet => DEFAULT_TESTNET_RPC_URL,
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = NeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "production" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            other => Err(NeoError::validation(format!(
                "unknown network `{other}`; expected mainnet or testnet"
            ))),
        }
    }
}

// ==============================================================================
// Network Mode
// ==============================================================================

/// Which networks a deployment serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    #[default]
    Both,
    MainnetOnly,
    TestnetOnly,
}

impl NetworkMode {
    pub fn allows(self, network: Network) -> bool {
        match self {
            Self::Both => true,
            Self::MainnetOnly => network == Network::Mainnet,
            Self::TestnetOnly => network == Network::Testnet,
        }
    }

    pub fn default_network(self) -> Network {
        match self {
            Self::TestnetOnly => Network::Testnet,
            Self::Both | Self::MainnetOnly => Network::Mainnet,
        }
    }
}

impl FromStr for NetworkMode {
    type Err = NeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "both" => Ok(Self::Both),
            "mainnet_only" => Ok(Self::MainnetOnly),
            "testnet_only" => Ok(Self::TestnetOnly),
            other => Err(NeoError::validation(format!(
                "unknown network mode `{other}`; expected both, mainnet_only or testnet_only"
            ))),
        }
    }
}

// ==============================================================================
// Network Registry
// ==============================================================================

/// Maps each enabled network to its RPC endpoint and resolves the network
/// a caller asked for (or the default when it asked for none).
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    mode: NetworkMode,
    endpoints: BTreeMap<Network, String>,
}

impl NetworkRegistry {
    pub fn new(mode: NetworkMode, mainnet_url: Option<&str>, testnet_url: Option<&str>) -> Self {
        let mut endpoints = BTreeMap::new();
        for network in Network::ALL {
            if !mode.allows(network) {
                continue;
            }
            let url = match network {
                Network::Mainnet => mainnet_url,
                Network::Testnet => testnet_url,
            }
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(network.default_rpc_url());
            endpoints.insert(network, url.to_owned());
        }
        Self { mode, endpoints }
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode
    }

    pub fn networks(&self) -> impl Iterator<Item = Network> + '_ {
        self.endpoints.keys().copied()
    }

    pub fn rpc_url(&self, network: Network) -> Option<&str> {
        self.endpoints.get(&network).map(String::as_str)
    }

    /// Resolve an optional caller-supplied network identifier.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Network, NeoError> {
        let network = match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse()?,
            None => self.mode.default_network(),
        };
        if !self.mode.allows(network) {
            return Err(NeoError::validation(format!(
                "network `{network}` is not enabled in this deployment"
            )));
        }
        Ok(network)
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new(NetworkMode::Both, None, None)
    }
}
