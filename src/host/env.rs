use super::storage::{Backend, Namespace, Overlay, Storage, WriteSet};
use super::token::TokenClient;
use super::{Address, HostError};
use crate::events::LedgerEvent;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Ledger clock as seen by an invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfo {
    /// Unix seconds, never decreasing across invocations
    pub timestamp: u64,
    /// Number of committed invocations that wrote state
    pub sequence: u32,
}

/// Which addresses have authorized the current invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// Every `require_auth` succeeds. Tests and local tooling only.
    MockAll,
    /// Only these addresses signed the invocation
    Signers(BTreeSet<Address>),
}

impl Authorization {
    pub fn signer(address: Address) -> Self {
        Authorization::Signers(BTreeSet::from([address]))
    }

    pub fn none() -> Self {
        Authorization::Signers(BTreeSet::new())
    }

    pub fn permits(&self, address: &Address) -> bool {
        match self {
            Authorization::MockAll => true,
            Authorization::Signers(signers) => signers.contains(address),
        }
    }
}

/// Execution environment for a single contract invocation.
///
/// All writes go to a private overlay; the host commits them (and the
/// buffered events) only if the invocation returns `Ok`.
pub struct Env<'a> {
    overlay: Overlay<'a>,
    ledger: LedgerInfo,
    contract: Address,
    auth: Authorization,
    events: RefCell<Vec<LedgerEvent>>,
}

impl<'a> Env<'a> {
    pub fn new(backend: &'a dyn Backend, ledger: LedgerInfo, contract: Address, auth: Authorization) -> Self {
        Self {
            overlay: Overlay::new(backend),
            ledger,
            contract,
            auth,
            events: RefCell::new(Vec::new()),
        }
    }

    /// Contract data namespace
    pub fn storage(&self) -> Storage<'_, 'a> {
        self.overlay.scope(Namespace::Contract)
    }

    pub fn token(&self, token: &Address) -> TokenClient<'_, 'a> {
        TokenClient::new(self.overlay.scope(Namespace::Token), token)
    }

    pub fn ledger(&self) -> LedgerInfo {
        self.ledger
    }

    pub fn timestamp(&self) -> u64 {
        self.ledger.timestamp
    }

    pub fn current_contract_address(&self) -> &Address {
        &self.contract
    }

    /// Fail unless `address` authorized this invocation. The contract's own
    /// outgoing transfers never go through here.
    pub fn require_auth(&self, address: &Address) -> Result<(), HostError> {
        if self.auth.permits(address) {
            Ok(())
        } else {
            Err(HostError::MissingAuth(address.clone()))
        }
    }

    /// Buffer an event; it is stamped and published on commit
    pub fn publish(&self, mut event: LedgerEvent) {
        event.timestamp = self.ledger.timestamp;
        self.events.borrow_mut().push(event);
    }

    pub(crate) fn into_parts(self) -> (WriteSet, Vec<LedgerEvent>) {
        (self.overlay.into_writes(), self.events.into_inner())
    }
}
