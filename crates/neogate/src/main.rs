mod cli;
mod server;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};

use neogate_core::contracts::{ContractRegistry, ContractService};
use neogate_core::rate_limit::RateLimiter;
use neogate_core::retry::RetryPolicy;
use neogate_core::{NeoService, NetworkMode, NetworkRegistry, ServiceConfig};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let mode: NetworkMode = args
        .network_mode
        .parse()
        .wrap_err("parse --network-mode")?;
    let networks = NetworkRegistry::new(
        mode,
        Some(&args.mainnet_rpc_url),
        Some(&args.testnet_rpc_url),
    );

    if args.fee_margin_bps <= 10_000 {
        return Err(eyre!(
            "--fee-margin-bps must exceed 10000, got {}",
            args.fee_margin_bps
        ));
    }

    let config = ServiceConfig {
        cache_ttl: Duration::from_secs(args.cache_ttl_secs),
        rate_limit: (args.rate_limit_max > 0)
            .then(|| (args.rate_limit_max, Duration::from_secs(args.rate_limit_window_secs))),
        retry: RetryPolicy {
            max_attempts: args.retry_attempts.max(1),
            ..RetryPolicy::default()
        },
        fee_margin_bps: args.fee_margin_bps,
        max_transfer_amount: args.max_transfer_amount,
        requests_per_second: (args.rpc_requests_per_second > 0)
            .then_some(args.rpc_requests_per_second),
        ..ServiceConfig::default()
    };

    let registry = Arc::new(match &args.contracts_file {
        Some(path) => {
            let registry =
                ContractRegistry::from_json_file(path).wrap_err("load contracts file")?;
            tracing::info!(path = %path.display(), contracts = registry.len(), "loaded contract catalog");
            registry
        }
        None => ContractRegistry::builtin(),
    });

    // Every enabled network must answer before the server starts.
    let mut services = BTreeMap::new();
    let mut contracts = BTreeMap::new();
    for network in networks.networks() {
        let rpc_url = networks
            .rpc_url(network)
            .ok_or_else(|| eyre!("no RPC endpoint for {network}"))?;
        let service = NeoService::connect(network, rpc_url, config.clone())
            .wrap_err_with(|| format!("configure {network} RPC client"))?;

        let height = service.get_block_count().await.map_err(|err| {
            let message = format_rpc_connect_error(rpc_url, &err.to_string());
            eyre!(message).wrap_err(format!("while attempting to reach the {network} node"))
        })?;
        tracing::info!(%network, rpc_url, height, "connected to Neo node");

        let service = Arc::new(service);
        contracts.insert(network, ContractService::new(service.clone(), registry.clone()));
        services.insert(network, service);
    }

    let client_limiter = (args.client_rate_limit_max > 0).then(|| {
        RateLimiter::new(
            args.client_rate_limit_max,
            Duration::from_secs(args.rate_limit_window_secs),
        )
    });

    let state = server::AppState {
        networks,
        services,
        contracts,
        client_limiter,
    };

    let bind_addr = format!("{}:{}", args.bind, args.port);
    let origin = args
        .allowed_origin
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", args.bind, args.port));
    let router = server::build_router(state, &origin)?;

    if args.bind == "0.0.0.0" {
        tracing::warn!("server is bound to 0.0.0.0 and is reachable from the network");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("bind TCP listener")?;

    tracing::info!("listening on {bind_addr}");
    axum::serve(listener, router)
        .await
        .context("run HTTP server")?;

    Ok(())
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not reach RPC endpoint `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("resolve") {
        lines.push("hint: hostname resolution failed; check the endpoint hostname".into());
    } else if source_error.contains("tls") || source_error.contains("certificate") {
        lines.push("hint: TLS handshake failed; check that the endpoint speaks HTTPS".into());
    } else if source_error.contains("HTTP status 404") {
        lines.push("hint: endpoint path is invalid; Neo nodes usually serve RPC at `/`".into());
    } else if source_error.contains("block count of 0") {
        lines.push("hint: the node is still syncing from genesis".into());
    }

    lines.join("\n")
}
