use std::path::PathBuf;

use clap::Parser;

/// neogate: resilient Neo N3 RPC gateway with a dApp contract catalog.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Mainnet JSON-RPC endpoint.
    #[arg(long, default_value = "https://mainnet1.neo.coz.io:443", env = "NEOGATE_MAINNET_RPC_URL")]
    pub mainnet_rpc_url: String,

    /// Testnet JSON-RPC endpoint.
    #[arg(long, default_value = "https://testnet1.neo.coz.io:443", env = "NEOGATE_TESTNET_RPC_URL")]
    pub testnet_rpc_url: String,

    /// Which networks to serve: both, mainnet_only or testnet_only.
    #[arg(long, default_value = "both", env = "NEOGATE_NETWORK_MODE")]
    pub network_mode: String,

    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1", env = "NEOGATE_BIND")]
    pub bind: String,

    /// Port to listen on.
    #[arg(long, default_value = "3090", env = "NEOGATE_PORT")]
    pub port: u16,

    /// Origin allowed by CORS. Defaults to the server's own origin.
    #[arg(long, env = "NEOGATE_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Read cache lifetime in seconds.
    #[arg(long, default_value = "30", env = "NEOGATE_CACHE_TTL_SECS")]
    pub cache_ttl_secs: u64,

    /// Node calls admitted per RPC method and window. 0 disables the limit.
    #[arg(long, default_value = "0", env = "NEOGATE_RATE_LIMIT_MAX")]
    pub rate_limit_max: u32,

    /// Rate-limit window in seconds.
    #[arg(long, default_value = "60", env = "NEOGATE_RATE_LIMIT_WINDOW_SECS")]
    pub rate_limit_window_secs: u64,

    /// HTTP requests admitted per client (`x-client-id`) and window. 0 disables.
    #[arg(long, default_value = "120", env = "NEOGATE_CLIENT_RATE_LIMIT_MAX")]
    pub client_rate_limit_max: u32,

    /// Outbound requests per second towards each node. 0 disables pacing.
    #[arg(long, default_value = "0", env = "NEOGATE_RPC_REQUESTS_PER_SECOND")]
    pub rpc_requests_per_second: u32,

    /// Attempts per idempotent node call, including the first.
    #[arg(long, default_value = "3", env = "NEOGATE_RETRY_ATTEMPTS")]
    pub retry_attempts: u32,

    /// Fee safety margin in basis points; must exceed 10000.
    #[arg(long, default_value = "12000", env = "NEOGATE_FEE_MARGIN_BPS")]
    pub fee_margin_bps: u32,

    /// Largest single transfer accepted, in whole tokens.
    #[arg(long, default_value = "100000000", env = "NEOGATE_MAX_TRANSFER_AMOUNT")]
    pub max_transfer_amount: u64,

    /// JSON file replacing the built-in contract catalog.
    #[arg(long, env = "NEOGATE_CONTRACTS_FILE")]
    pub contracts_file: Option<PathBuf>,
}
