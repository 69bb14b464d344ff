// HTTP request handlers for the prediction market node

use crate::app_state::{AppState, NodeError, SharedState};
use crate::contract::{ContractError, PredictionMarket, CONTRACT_DESCRIPTION};
use crate::host::{Address, Authorization, Call, HostError};
use crate::models::*;
use crate::rpc::SignedInvocation;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::MutexGuard;
use tracing::error;

// ===== ERRORS =====

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("state lock poisoned")]
    LockPoisoned,
}

impl From<ContractError> for ApiError {
    fn from(e: ContractError) -> Self {
        ApiError::Node(NodeError::Contract(e))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    /// Contract error code when the contract rejected the call
    code: Option<u32>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Node(NodeError::Signature(_)) => StatusCode::UNAUTHORIZED,
            ApiError::Node(NodeError::StaleNonce { .. }) => StatusCode::CONFLICT,
            ApiError::Node(NodeError::NotReadOnly(_)) => StatusCode::BAD_REQUEST,
            ApiError::Node(NodeError::DevModeDisabled) => StatusCode::NOT_FOUND,
            ApiError::Node(NodeError::UnknownAccount(_)) => StatusCode::NOT_FOUND,
            ApiError::Node(NodeError::Contract(e)) => match e {
                ContractError::Unauthorized | ContractError::Host(HostError::MissingAuth(_)) => StatusCode::FORBIDDEN,
                ContractError::MarketNotFound(_) | ContractError::NoPrediction => StatusCode::NOT_FOUND,
                ContractError::Host(HostError::InsufficientBalance { .. })
                | ContractError::Host(HostError::NegativeAmount(_)) => StatusCode::BAD_REQUEST,
                ContractError::Host(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> Option<u32> {
        match self {
            ApiError::Node(NodeError::Contract(e)) => Some(e.code()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {self:?}");
        }

        (
            status,
            Json(ErrorBody {
                success: false,
                error: self.to_string(),
                code: self.code(),
            }),
        )
            .into_response()
    }
}

fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>, ApiError> {
    state.lock().map_err(|_| ApiError::LockPoisoned)
}

// ===== HEALTH =====

pub async fn health_check(State(state): State<SharedState>) -> Result<Json<HealthResponse>, ApiError> {
    let app_state = lock(&state)?;
    Ok(Json(HealthResponse {
        status: "ok",
        description: CONTRACT_DESCRIPTION,
        contract: app_state.host.contract_address().clone(),
        ledger: app_state.host.ledger(),
    }))
}

// ===== CONTRACT INVOCATION =====

/// Submit a signed state-changing (or read) call
pub async fn invoke(
    State(state): State<SharedState>,
    Json(invocation): Json<SignedInvocation>,
) -> Result<Json<InvokeResponse>, ApiError> {
    let mut app_state = lock(&state)?;
    let receipt = app_state.submit(invocation)?;
    Ok(Json(InvokeResponse { success: true, receipt }))
}

/// Run a read-only call, no signature needed
pub async fn query(
    State(state): State<SharedState>,
    Json(call): Json<Call>,
) -> Result<Json<QueryResponse>, ApiError> {
    let method = call.method();
    let mut app_state = lock(&state)?;
    let result = app_state.query(call)?;
    Ok(Json(QueryResponse { success: true, method, result }))
}

// ===== MARKETS =====

pub async fn get_market(
    State(state): State<SharedState>,
    Path(market_id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut app_state = lock(&state)?;
    Ok(Json(app_state.query(Call::GetMarket { market_id })?))
}

pub async fn get_winning_side(
    State(state): State<SharedState>,
    Path(market_id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut app_state = lock(&state)?;
    Ok(Json(app_state.query(Call::GetWinningSide { market_id })?))
}

pub async fn get_user_prediction(
    State(state): State<SharedState>,
    Path((market_id, user)): Path<(u64, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut app_state = lock(&state)?;
    Ok(Json(app_state.query(Call::GetUserPrediction {
        user: Address::new(user),
        market_id,
    })?))
}

pub async fn get_stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>, ApiError> {
    let mut app_state = lock(&state)?;
    app_state.sync_clock();
    let (admin, market_count, platform_fee_rate) =
        app_state.host.with_env(&Authorization::none(), |env| {
            let admin = match PredictionMarket::get_admin(env) {
                Ok(admin) => Some(admin),
                Err(ContractError::NotInitialized) => None,
                Err(e) => return Err(e),
            };
            Ok((
                admin,
                PredictionMarket::get_market_count(env)?,
                PredictionMarket::get_platform_fee_rate(env)?,
            ))
        })?;

    let host = &app_state.host;
    Ok(Json(StatsResponse {
        contract: host.contract_address().clone(),
        admin,
        market_count,
        platform_fee_rate,
        ledger: host.ledger(),
        event_head: host.events().head().to_string(),
        total_events: host.events().total(),
    }))
}

// ===== TOKENS =====

pub async fn get_balance(
    State(state): State<SharedState>,
    Path((token, holder)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let token = Address::new(token);
    let holder = Address::new(holder);
    let mut app_state = lock(&state)?;
    let balance = app_state.host.token_balance(&token, &holder)?;
    Ok(Json(BalanceResponse { token, holder, balance }))
}

// ===== EVENTS =====

pub async fn get_events(
    State(state): State<SharedState>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let app_state = lock(&state)?;
    let log = app_state.host.events();
    let limit = params.limit.unwrap_or(DEFAULT_EVENTS_LIMIT);
    Ok(Json(EventsResponse {
        head: log.head().to_string(),
        total: log.total(),
        events: log.recent(limit).into_iter().cloned().collect(),
    }))
}

// ===== RPC =====

pub async fn get_nonce(
    State(state): State<SharedState>,
    Path(address): Path<String>,
) -> Result<Json<NonceResponse>, ApiError> {
    let address = Address::new(address);
    let app_state = lock(&state)?;
    let last_nonce = app_state.last_nonce(&address);
    Ok(Json(NonceResponse {
        address,
        last_nonce,
        next_nonce: last_nonce.saturating_add(1),
    }))
}

// ===== DEV MODE =====

pub async fn get_dev_accounts(State(state): State<SharedState>) -> Result<Json<DevAccountsResponse>, ApiError> {
    let app_state = lock(&state)?;
    let accounts = app_state.dev_accounts.as_ref().ok_or(NodeError::DevModeDisabled)?;
    Ok(Json(DevAccountsResponse {
        token: app_state.dev_token.clone(),
        accounts: accounts.list(),
    }))
}

pub async fn dev_faucet(
    State(state): State<SharedState>,
    Json(request): Json<FaucetRequest>,
) -> Result<Json<FaucetResponse>, ApiError> {
    let mut app_state = lock(&state)?;
    let (address, amount) = app_state.faucet(&request.account)?;
    let token = app_state.dev_token.clone();
    let balance = app_state.host.token_balance(&token, &address)?;
    Ok(Json(FaucetResponse {
        success: true,
        token,
        address,
        amount,
        balance,
    }))
}
