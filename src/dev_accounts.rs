//! Deterministic development accounts.
//!
//! Every account derives its Ed25519 key from a fixed seed, so addresses
//! are stable across node restarts. Only enabled with `DEV_MODE`.

use crate::host::{Address, Call};
use crate::rpc::{SignedInvocation, SignedInvocationError};
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::Serialize;
use sha2::{Digest, Sha256};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Master seed for dev keys (NEVER use in production!)
pub const DEV_SEED: &[u8; 32] = b"PREDICTION_MARKET_DEV_SEED_00001";

pub const ADMIN: &str = "ADMIN";
pub const ALICE: &str = "ALICE";
pub const BOB: &str = "BOB";

pub const DEV_ACCOUNT_NAMES: [&str; 3] = [ADMIN, ALICE, BOB];

/// Name of the dev token contract minted to the dev accounts
pub const DEV_TOKEN_NAME: &str = "dev_token";

// ============================================================================
// DEV ACCOUNT
// ============================================================================

#[derive(Clone)]
pub struct DevAccount {
    pub name: String,
    pub signing_key: SigningKey,
    pub address: Address,
}

impl DevAccount {
    /// Derive an account from `seed` and `name`: key = SHA256(seed || name)
    pub fn from_seed(seed: &[u8; 32], name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(name.as_bytes());
        let derived: [u8; 32] = hasher.finalize().into();

        let signing_key = SigningKey::from_bytes(&derived);
        let address = Address::from_public_key(&signing_key.verifying_key());
        DevAccount {
            name: name.to_string(),
            signing_key,
            address,
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn sign_invocation(&self, nonce: u64, timestamp: u64, call: Call) -> Result<SignedInvocation, SignedInvocationError> {
        SignedInvocation::sign(&self.signing_key, nonce, timestamp, call)
    }
}

// Never print the private key
impl std::fmt::Debug for DevAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevAccount")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish()
    }
}

/// Public view of a dev account
#[derive(Debug, Clone, Serialize)]
pub struct DevAccountInfo {
    pub name: String,
    pub address: Address,
    pub public_key: String,
}

impl From<&DevAccount> for DevAccountInfo {
    fn from(account: &DevAccount) -> Self {
        DevAccountInfo {
            name: account.name.clone(),
            address: account.address.clone(),
            public_key: hex::encode(account.verifying_key().as_bytes()),
        }
    }
}

// ============================================================================
// ACCOUNT SET
// ============================================================================

#[derive(Debug, Clone)]
pub struct DevAccounts {
    accounts: Vec<DevAccount>,
}

impl DevAccounts {
    pub fn new() -> Self {
        Self {
            accounts: DEV_ACCOUNT_NAMES
                .iter()
                .map(|name| DevAccount::from_seed(DEV_SEED, name))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DevAccount> {
        let name = name.to_uppercase();
        self.accounts.iter().find(|a| a.name == name)
    }

    pub fn by_address(&self, address: &Address) -> Option<&DevAccount> {
        self.accounts.iter().find(|a| &a.address == address)
    }

    /// Accept either an account name or an address
    pub fn resolve(&self, identifier: &str) -> Option<Address> {
        self.get(identifier)
            .map(|a| a.address.clone())
            .or_else(|| self.by_address(&Address::new(identifier)).map(|a| a.address.clone()))
    }

    pub fn list(&self) -> Vec<DevAccountInfo> {
        self.accounts.iter().map(DevAccountInfo::from).collect()
    }
}

impl Default for DevAccounts {
    fn default() -> Self {
        Self::new()
    }
}
