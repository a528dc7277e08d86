use std::path::PathBuf;
use std::sync::Arc;

use shiprates_core::aggregator::QuoteAggregator;
use shiprates_core::config::Config;
use shiprates_core::http_client::HttpClient;
use shiprates_core::provider::RateProvider;
use shiprates_core::providers::shiphawk::ShipHawk;
use shiprates_core::providers::usps::{Usps, token::TokenProvider};
use shiprates_server::{AppState, build_router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiprates=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::load()?;
    let http = HttpClient::new_default()?;

    let shiphawk = Arc::new(ShipHawk::new(
        http.clone(),
        cfg.shiphawk_api_key.clone(),
        cfg.shiphawk_base_url.clone(),
    ));
    let tokens = TokenProvider::new(
        http.clone(),
        &cfg.usps_base_url,
        cfg.usps_consumer_key.clone(),
        cfg.usps_consumer_secret.clone(),
    );
    let usps = Arc::new(Usps::new(http, tokens, cfg.usps_base_url.clone()));

    // One-time snapshot; served read-only for the life of the process.
    let carriers = shiphawk.carriers().await?;
    info!(count = carriers.len(), "carrier snapshot loaded");

    let aggregator = Arc::new(QuoteAggregator::new(vec![
        shiphawk as Arc<dyn RateProvider>,
        usps as Arc<dyn RateProvider>,
    ]));
    let state = AppState::new(aggregator, &carriers)?;

    let app = build_router(state, Some(PathBuf::from(&cfg.static_dir)));
    let listener = TcpListener::bind(("0.0.0.0", cfg.port)).await?;
    info!(port = cfg.port, "server starting");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
}
