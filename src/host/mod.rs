// ============================================================================
// Host Runtime - executes contract entry points atomically
// ============================================================================
//
// The host owns the storage backend, the ledger clock and the event log.
// Each invocation gets a fresh `Env` over a write overlay:
//
//   Ok(..)  -> overlay committed to the backend as one batch, events chained
//              into the log, ledger sequence bumped
//   Err(..) -> overlay and events dropped, nothing observable changes
//
// The ledger clock, sequence and event chain head are written into the same
// batch under the `host/` namespace, so a reopened store resumes where it
// left off.
//
// Callers must serialize invocations (the node holds the host behind a
// mutex), which gives every call an implicit whole-contract lock.
//
// ============================================================================

pub mod address;
pub mod env;
pub mod error;
pub mod invoke;
pub mod storage;
pub mod token;

pub use address::Address;
pub use env::{Authorization, Env, LedgerInfo};
pub use error::HostError;
pub use invoke::Call;
pub use storage::{Backend, MemoryBackend, SledBackend};

use crate::contract::ContractError;
use crate::events::{EventLog, LedgerEvent};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storage::Namespace;
use tracing::{debug, info, warn};

/// Default number of events kept in memory
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

const LEDGER_META_KEY: &str = "ledger_meta";

/// Host bookkeeping saved alongside every commit
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HostMeta {
    ledger: LedgerInfo,
    event_head: String,
    event_total: u64,
}

fn read_meta(backend: &dyn Backend) -> Result<Option<HostMeta>, HostError> {
    let key = Namespace::Host.encode_key(&LEDGER_META_KEY)?;
    match backend.get(&key)? {
        Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
        None => Ok(None),
    }
}

pub struct Host {
    backend: Box<dyn Backend + Send>,
    ledger: LedgerInfo,
    contract: Address,
    events: EventLog,
}

impl Host {
    /// Host over `backend`, resuming the ledger clock and event chain if the
    /// backend already holds committed state
    pub fn new(backend: Box<dyn Backend + Send>, contract_name: &str, event_capacity: usize) -> Result<Self, HostError> {
        let (ledger, events) = match read_meta(backend.as_ref())? {
            Some(meta) => {
                info!(
                    sequence = meta.ledger.sequence,
                    timestamp = meta.ledger.timestamp,
                    events = meta.event_total,
                    "resuming ledger"
                );
                (meta.ledger, EventLog::resume(event_capacity, meta.event_head, meta.event_total))
            }
            None => (LedgerInfo::default(), EventLog::new(event_capacity)),
        };

        Ok(Self {
            backend,
            ledger,
            contract: Address::contract(contract_name),
            events,
        })
    }

    pub fn in_memory(contract_name: &str) -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            ledger: LedgerInfo::default(),
            contract: Address::contract(contract_name),
            events: EventLog::new(DEFAULT_EVENT_CAPACITY),
        }
    }

    /// Host backed by a sled database at `path`
    pub fn open(path: impl AsRef<Path>, contract_name: &str, event_capacity: usize) -> Result<Self, HostError> {
        let backend = SledBackend::open(path)?;
        Self::new(Box::new(backend), contract_name, event_capacity)
    }

    pub fn contract_address(&self) -> &Address {
        &self.contract
    }

    pub fn ledger(&self) -> LedgerInfo {
        self.ledger
    }

    /// Advance the ledger clock. Time never goes backwards; a smaller value
    /// is ignored.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        if timestamp < self.ledger.timestamp {
            warn!(
                current = self.ledger.timestamp,
                requested = timestamp,
                "ignoring ledger clock regression"
            );
            return;
        }
        self.ledger.timestamp = timestamp;
    }

    /// Run `f` inside a fresh environment and commit its effects only if it
    /// succeeds.
    pub fn with_env<T, F>(&mut self, auth: &Authorization, f: F) -> Result<T, ContractError>
    where
        F: FnOnce(&Env) -> Result<T, ContractError>,
    {
        let env = Env::new(self.backend.as_ref(), self.ledger, self.contract.clone(), auth.clone());

        let value = match f(&env) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, code = e.code(), "invocation rejected, discarding writes");
                return Err(e);
            }
        };

        let (mut writes, mut events) = env.into_parts();
        if writes.is_empty() && events.is_empty() {
            return Ok(value);
        }

        let ledger = LedgerInfo {
            sequence: self.ledger.sequence.wrapping_add(1),
            ..self.ledger
        };
        for event in events.iter_mut() {
            event.sequence = ledger.sequence;
        }
        let meta = HostMeta {
            ledger,
            event_head: self.events.seal(&mut events),
            event_total: self.events.total() + events.len() as u64,
        };
        writes.insert(
            Namespace::Host.encode_key(&LEDGER_META_KEY)?,
            Some(bincode::serialize(&meta).map_err(HostError::from)?),
        );

        self.backend.commit(writes)?;
        self.ledger = ledger;
        self.events.extend_sealed(events);
        Ok(value)
    }

    /// Dispatch a contract call and return its JSON-encoded result
    pub fn invoke(&mut self, auth: &Authorization, call: Call) -> Result<serde_json::Value, ContractError> {
        let method = call.method();
        debug!(method, "invoking contract");
        self.with_env(auth, |env| call.dispatch(env))
    }

    /// Create token supply outside of any contract call (faucet, tests)
    pub fn mint(&mut self, token: &Address, to: &Address, amount: i128) -> Result<(), ContractError> {
        self.with_env(&Authorization::none(), |env| {
            env.token(token).mint(to, amount)?;
            env.publish(LedgerEvent::tokens_minted(token, to, amount));
            Ok(())
        })
    }

    pub fn token_balance(&mut self, token: &Address, holder: &Address) -> Result<i128, ContractError> {
        self.with_env(&Authorization::none(), |env| Ok(env.token(token).balance(holder)?))
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn flush(&self) -> Result<(), HostError> {
        self.backend.flush()
    }
}
