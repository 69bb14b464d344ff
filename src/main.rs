// Prediction Market Ledger - node entry point

use prediction_market_ledger::app_state::{AppState, SharedState};
use prediction_market_ledger::config::HostConfig;
use prediction_market_ledger::contract::CONTRACT_DESCRIPTION;
use prediction_market_ledger::router::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = HostConfig::from_env()?;
    let addr = config.bind_addr();

    tracing::info!("{}", CONTRACT_DESCRIPTION);
    let state: SharedState = AppState::new(config)?.shared();
    let shutdown_state = state.clone();

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "prediction market node listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down, flushing ledger store");
    match shutdown_state.lock() {
        Ok(app_state) => app_state.host.flush()?,
        Err(_) => tracing::error!("state lock poisoned, skipping flush"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install CTRL+C handler: {e}");
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
