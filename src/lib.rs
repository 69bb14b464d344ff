/// Prediction Market Ledger
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod config;
pub mod contract;
pub mod dev_accounts;
pub mod events;
pub mod handlers;
pub mod host;
pub mod models;
pub mod router;

#[path = "../rpc/mod.rs"]
pub mod rpc;

pub use app_state::{AppState, InvocationReceipt, NodeError, SharedState};
pub use config::HostConfig;
pub use contract::{ContractError, Market, Prediction, PredictionMarket, PredictionSide};
pub use events::{EventKind, EventLog, LedgerEvent};
pub use host::{Address, Authorization, Call, Env, Host, HostError, LedgerInfo};
pub use rpc::{SignedInvocation, SignedInvocationError, INVOCATION_EXPIRY_SECS};
