// Request/Response structs for the HTTP node

use crate::app_state::InvocationReceipt;
use crate::dev_accounts::DevAccountInfo;
use crate::events::LedgerEvent;
use crate::host::{Address, LedgerInfo};
use serde::{Deserialize, Serialize};

/// Default page size for `GET /events`
pub const DEFAULT_EVENTS_LIMIT: usize = 50;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub description: &'static str,
    pub contract: Address,
    pub ledger: LedgerInfo,
}

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub receipt: InvocationReceipt,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub method: &'static str,
    pub result: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub contract: Address,
    /// `None` until the contract is initialized
    pub admin: Option<Address>,
    pub market_count: u64,
    pub platform_fee_rate: i128,
    pub ledger: LedgerInfo,
    pub event_head: String,
    pub total_events: u64,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub token: Address,
    pub holder: Address,
    pub balance: i128,
}

#[derive(Debug, Serialize)]
pub struct NonceResponse {
    pub address: Address,
    pub last_nonce: u64,
    pub next_nonce: u64,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub head: String,
    pub total: u64,
    pub events: Vec<LedgerEvent>,
}

#[derive(Debug, Serialize)]
pub struct DevAccountsResponse {
    pub token: Address,
    pub accounts: Vec<DevAccountInfo>,
}

#[derive(Debug, Deserialize)]
pub struct FaucetRequest {
    /// Dev account name (ALICE) or address
    pub account: String,
}

#[derive(Debug, Serialize)]
pub struct FaucetResponse {
    pub success: bool,
    pub token: Address,
    pub address: Address,
    pub amount: i128,
    pub balance: i128,
}
