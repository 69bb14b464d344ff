// Node configuration, read from the environment (and `.env` if present)

use crate::host::DEFAULT_EVENT_CAPACITY;
use crate::rpc::INVOCATION_EXPIRY_SECS;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_CONTRACT_NAME: &str = "prediction_market";

/// 1000 tokens at 7 decimals
pub const DEFAULT_FAUCET_AMOUNT: i128 = 1_000_0000000;

#[derive(Debug, Clone)]
pub struct HostConfig {
    pub host: String,
    pub port: u16,
    /// sled directory; `None` keeps all state in memory
    pub data_dir: Option<PathBuf>,
    pub contract_name: String,
    /// Enables deterministic dev accounts and the faucet
    pub dev_mode: bool,
    pub faucet_amount: i128,
    pub event_log_capacity: usize,
    pub invocation_expiry_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 1234,
            data_dir: None,
            contract_name: DEFAULT_CONTRACT_NAME.into(),
            dev_mode: false,
            faucet_amount: DEFAULT_FAUCET_AMOUNT,
            event_log_capacity: DEFAULT_EVENT_CAPACITY,
            invocation_expiry_secs: INVOCATION_EXPIRY_SECS,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: match env::var("PORT") {
                Ok(port) => port.parse()?,
                Err(_) => defaults.port,
            },
            data_dir: env::var("LEDGER_DATA_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            contract_name: env::var("CONTRACT_NAME").unwrap_or(defaults.contract_name),
            dev_mode: env::var("DEV_MODE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.dev_mode),
            faucet_amount: match env::var("FAUCET_AMOUNT") {
                Ok(amount) => amount.parse()?,
                Err(_) => defaults.faucet_amount,
            },
            event_log_capacity: match env::var("EVENT_LOG_CAPACITY") {
                Ok(capacity) => capacity.parse()?,
                Err(_) => defaults.event_log_capacity,
            },
            invocation_expiry_secs: match env::var("INVOCATION_EXPIRY_SECS") {
                Ok(secs) => secs.parse()?,
                Err(_) => defaults.invocation_expiry_secs,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// In-memory dev configuration used by tests
    pub fn dev() -> Self {
        Self {
            dev_mode: true,
            ..Self::default()
        }
    }
}
