// Router with all node endpoints

use crate::app_state::SharedState;
use crate::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // ===== CONTRACT CALLS =====
        .route("/invoke", post(invoke))
        .route("/query", post(query))
        // ===== MARKET READS =====
        .route("/markets/:id", get(get_market))
        .route("/markets/:id/winning-side", get(get_winning_side))
        .route("/markets/:id/predictions/:user", get(get_user_prediction))
        .route("/stats", get(get_stats))
        // ===== LEDGER =====
        .route("/balance/:token/:holder", get(get_balance))
        .route("/events", get(get_events))
        .route("/rpc/nonce/:address", get(get_nonce))
        // ===== DEV MODE =====
        .route("/dev/accounts", get(get_dev_accounts))
        .route("/dev/faucet", post(dev_faucet))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
