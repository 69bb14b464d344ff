use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix for addresses derived from an Ed25519 public key
pub const ACCOUNT_PREFIX: &str = "ACCT_";

/// Prefix for contract addresses
pub const CONTRACT_PREFIX: &str = "CONTRACT_";

/// An account or contract address on the ledger
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Address(value.into())
    }

    /// Address owned by a deployed contract (escrow holder)
    pub fn contract(name: &str) -> Self {
        Address(format!("{}{}", CONTRACT_PREFIX, name.to_uppercase()))
    }

    /// Address controlled by an Ed25519 key: ACCT_<uppercase hex pubkey>
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        Address(format!("{}{}", ACCOUNT_PREFIX, hex::encode(key.as_bytes()).to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Address::new(value)
    }
}
