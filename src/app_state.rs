// Application state management

use crate::config::HostConfig;
use crate::contract::ContractError;
use crate::dev_accounts::{DevAccounts, ADMIN, ALICE, BOB, DEV_TOKEN_NAME};
use crate::host::{Address, Authorization, Call, Host, LedgerInfo, MemoryBackend};
use crate::rpc::{SignedInvocation, SignedInvocationError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub type SharedState = Arc<Mutex<AppState>>;

/// Failures surfaced by the node, on top of the contract's own errors
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Signature(#[from] SignedInvocationError),

    #[error("nonce {got} must be greater than last accepted nonce {last}")]
    StaleNonce { last: u64, got: u64 },

    #[error("{0} is not a read-only call")]
    NotReadOnly(&'static str),

    #[error("dev mode is disabled")]
    DevModeDisabled,

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

/// Result of a committed signed invocation
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReceipt {
    pub method: &'static str,
    pub signer: Address,
    pub nonce: u64,
    pub result: serde_json::Value,
    pub ledger: LedgerInfo,
}

pub struct AppState {
    pub host: Host,
    /// Last accepted nonce per signer
    pub nonces: HashMap<Address, u64>,
    pub config: HostConfig,
    pub dev_accounts: Option<DevAccounts>,
    pub dev_token: Address,
}

impl AppState {
    pub fn new(config: HostConfig) -> anyhow::Result<Self> {
        let host = match &config.data_dir {
            Some(dir) => {
                info!(path = %dir.display(), "opening sled ledger store");
                Host::open(dir, &config.contract_name, config.event_log_capacity)?
            }
            None => {
                info!("using in-memory ledger store");
                Host::new(
                    Box::new(MemoryBackend::new()),
                    &config.contract_name,
                    config.event_log_capacity,
                )?
            }
        };
        Self::with_host(config, host)
    }

    /// Build the node state around an existing host
    pub fn with_host(config: HostConfig, host: Host) -> anyhow::Result<Self> {
        let mut state = Self {
            host,
            nonces: HashMap::new(),
            dev_accounts: config.dev_mode.then(DevAccounts::new),
            dev_token: Address::contract(DEV_TOKEN_NAME),
            config,
        };
        state.sync_clock();

        if state.dev_accounts.is_some() {
            state.bootstrap_dev()?;
        }

        info!(
            contract = %state.host.contract_address(),
            dev_mode = state.config.dev_mode,
            "prediction market node state ready"
        );
        Ok(state)
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Initialize the contract with the dev admin and fund ALICE and BOB.
    /// Does nothing if the contract was already initialized.
    fn bootstrap_dev(&mut self) -> Result<(), NodeError> {
        let accounts = self.dev_accounts.clone().ok_or(NodeError::DevModeDisabled)?;
        let admin = accounts
            .get(ADMIN)
            .ok_or_else(|| NodeError::UnknownAccount(ADMIN.into()))?
            .address
            .clone();

        match self.host.invoke(&Authorization::signer(admin.clone()), Call::Initialize { admin }) {
            Ok(_) => {}
            Err(ContractError::AlreadyInitialized) => {
                info!("contract already initialized, skipping dev bootstrap");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        for name in [ALICE, BOB] {
            let account = accounts
                .get(name)
                .ok_or_else(|| NodeError::UnknownAccount(name.into()))?;
            self.host
                .mint(&self.dev_token, &account.address, self.config.faucet_amount)?;
            info!(account = name, address = %account.address, "funded dev account");
        }
        Ok(())
    }

    /// Stamp the ledger with wall-clock time
    pub fn sync_clock(&mut self) {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.host.set_timestamp(now);
    }

    pub fn last_nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    /// Verify and run a signed invocation. The nonce is consumed only when
    /// the call commits.
    pub fn submit(&mut self, invocation: SignedInvocation) -> Result<InvocationReceipt, NodeError> {
        self.sync_clock();
        let now = self.host.ledger().timestamp;

        let signer = invocation
            .validate_at(now, self.config.invocation_expiry_secs)
            .map_err(|e| {
                warn!(error = %e, pubkey = %invocation.signer_pubkey, "rejected signed invocation");
                e
            })?;

        let last = self.last_nonce(&signer);
        if invocation.nonce <= last {
            warn!(signer = %signer, nonce = invocation.nonce, last, "rejected stale nonce");
            return Err(NodeError::StaleNonce { last, got: invocation.nonce });
        }

        let method = invocation.call.method();
        let result = self
            .host
            .invoke(&Authorization::signer(signer.clone()), invocation.call)?;
        self.nonces.insert(signer.clone(), invocation.nonce);

        Ok(InvocationReceipt {
            method,
            signer,
            nonce: invocation.nonce,
            result,
            ledger: self.host.ledger(),
        })
    }

    /// Run a read-only call without authorization
    pub fn query(&mut self, call: Call) -> Result<serde_json::Value, NodeError> {
        if !call.is_read_only() {
            return Err(NodeError::NotReadOnly(call.method()));
        }
        self.sync_clock();
        Ok(self.host.invoke(&Authorization::none(), call)?)
    }

    /// Mint `faucet_amount` of the dev token to a dev account (dev mode only)
    pub fn faucet(&mut self, account: &str) -> Result<(Address, i128), NodeError> {
        let accounts = self.dev_accounts.as_ref().ok_or(NodeError::DevModeDisabled)?;
        let address = accounts
            .resolve(account)
            .ok_or_else(|| NodeError::UnknownAccount(account.to_string()))?;
        let amount = self.config.faucet_amount;

        let token = self.dev_token.clone();
        self.host.mint(&token, &address, amount)?;
        info!(address = %address, amount, "faucet mint");
        Ok((address, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::PredictionSide;

    fn dev_state() -> AppState {
        AppState::new(HostConfig::dev()).unwrap()
    }

    #[test]
    fn test_dev_bootstrap_funds_accounts() {
        let mut state = dev_state();
        let accounts = state.dev_accounts.clone().unwrap();
        let token = state.dev_token.clone();
        let alice = accounts.get(ALICE).unwrap().address.clone();
        let admin = accounts.get(ADMIN).unwrap().address.clone();

        assert_eq!(state.host.token_balance(&token, &alice).unwrap(), state.config.faucet_amount);
        let stored = state.query(Call::GetAdmin).unwrap();
        assert_eq!(stored, serde_json::json!(admin.as_str()));
    }

    #[test]
    fn test_submit_consumes_nonce_only_on_success() {
        let mut state = dev_state();
        let accounts = state.dev_accounts.clone().unwrap();
        let alice = accounts.get(ALICE).unwrap();
        let now = state.host.ledger().timestamp;

        // market 0 does not exist yet
        let bad = alice
            .sign_invocation(
                1,
                now,
                Call::Predict {
                    user: alice.address.clone(),
                    market_id: 0,
                    side: PredictionSide::Yes,
                    amount: 10,
                },
            )
            .unwrap();
        assert!(matches!(state.submit(bad), Err(NodeError::Contract(ContractError::MarketNotFound(0)))));
        assert_eq!(state.last_nonce(&alice.address), 0);

        let create = alice
            .sign_invocation(
                1,
                now,
                Call::CreateMarket {
                    creator: alice.address.clone(),
                    question: "Will it rain?".into(),
                    description: "Tomorrow".into(),
                    token: state.dev_token.clone(),
                    end_time: now + 3_600,
                },
            )
            .unwrap();
        let receipt = state.submit(create.clone()).unwrap();
        assert_eq!(receipt.result, serde_json::json!(0));
        assert_eq!(state.last_nonce(&alice.address), 1);

        assert!(matches!(state.submit(create), Err(NodeError::StaleNonce { last: 1, got: 1 })));
    }

    #[test]
    fn test_signer_cannot_act_for_another_address() {
        let mut state = dev_state();
        let accounts = state.dev_accounts.clone().unwrap();
        let alice = accounts.get(ALICE).unwrap();
        let bob = accounts.get(BOB).unwrap();
        let now = state.host.ledger().timestamp;

        let forged = alice
            .sign_invocation(
                1,
                now,
                Call::CreateMarket {
                    creator: bob.address.clone(),
                    question: "Q".into(),
                    description: "D".into(),
                    token: state.dev_token.clone(),
                    end_time: now + 60,
                },
            )
            .unwrap();
        assert!(matches!(
            state.submit(forged),
            Err(NodeError::Contract(ContractError::Host(crate::host::HostError::MissingAuth(_))))
        ));
    }

    #[test]
    fn test_query_rejects_mutating_calls() {
        let mut state = dev_state();
        let result = state.query(Call::WithdrawFees {
            admin: Address::new("X"),
            token: Address::new("T"),
            to: Address::new("X"),
        });
        assert!(matches!(result, Err(NodeError::NotReadOnly("withdraw_fees"))));
    }

    #[test]
    fn test_faucet_requires_dev_mode() {
        let mut state = AppState::new(HostConfig::default()).unwrap();
        assert!(matches!(state.faucet(ALICE), Err(NodeError::DevModeDisabled)));
    }
}
