// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use interchain_launchpad::{
    api::router,
    blockchain::AxelarGasEstimator,
    config::{LaunchpadConfig, LogFormat, DEFAULT_LOG_FILTER},
    feeds::{CoinGeckoClient, PricePoller},
    state::AppState,
    store::SessionSweeper,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() {
    init_tracing(LogFormat::from_env());
    let config = LaunchpadConfig::from_env();

    let shutdown = CancellationToken::new();

    let price_source = match CoinGeckoClient::new(config.price_api_url.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(kind = "configuration", error = %e, "Failed to build price client");
            return;
        }
    };
    let gas = match AxelarGasEstimator::new(config.gas_api_url.clone()) {
        Ok(estimator) => Arc::new(estimator),
        Err(e) => {
            error!(kind = "configuration", error = %e, "Failed to build gas estimator");
            return;
        }
    };

    let (poller, price) = PricePoller::new(price_source, config.price_refresh);
    tokio::spawn(poller.run(shutdown.clone()));

    let state = AppState::new(&config, price, gas);
    let sweeper = SessionSweeper::new(state.sessions.clone(), config.session_sweep_interval());
    tokio::spawn(sweeper.run(shutdown.clone()));
    let app = router(state.clone());

    let addr: SocketAddr = match config.bind_address().parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(
                kind = "configuration",
                address = %config.bind_address(),
                error = %e,
                "Invalid bind address"
            );
            return;
        }
    };
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "Failed to bind");
            return;
        }
    };

    info!(
        %addr,
        gas_api = %config.gas_api_url,
        "Interchain Launchpad listening (docs at /docs)"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
    {
        error!(error = %e, "Server error");
    }

    shutdown.cancel();
    state.close_sessions().await;
    info!("Interchain Launchpad stopped");
}
