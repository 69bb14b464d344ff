// Fungible token balances held by the host.
//
// Balances live in their own namespace keyed by (token, holder). The
// contract's escrow is simply the balance of its own address.

use super::storage::Storage;
use super::{Address, HostError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKey {
    Balance(Address, Address),
}

/// Token operations scoped to one token address within an invocation
pub struct TokenClient<'o, 'a> {
    storage: Storage<'o, 'a>,
    token: Address,
}

impl<'o, 'a> TokenClient<'o, 'a> {
    pub(crate) fn new(storage: Storage<'o, 'a>, token: &Address) -> Self {
        Self {
            storage,
            token: token.clone(),
        }
    }

    pub fn balance(&self, holder: &Address) -> Result<i128, HostError> {
        let key = TokenKey::Balance(self.token.clone(), holder.clone());
        Ok(self.storage.get(&key)?.unwrap_or(0))
    }

    fn write_balance(&self, holder: &Address, amount: i128) -> Result<(), HostError> {
        let key = TokenKey::Balance(self.token.clone(), holder.clone());
        self.storage.set(&key, &amount)
    }

    /// Move `amount` from `from` to `to`. Authorization of `from` is the
    /// calling contract's responsibility.
    pub fn transfer(&self, from: &Address, to: &Address, amount: i128) -> Result<(), HostError> {
        if amount < 0 {
            return Err(HostError::NegativeAmount(amount));
        }
        if amount == 0 || from == to {
            return Ok(());
        }

        let available = self.balance(from)?;
        if available < amount {
            return Err(HostError::InsufficientBalance { available, requested: amount });
        }
        let credited = self
            .balance(to)?
            .checked_add(amount)
            .ok_or_else(|| HostError::BalanceOverflow(to.clone()))?;

        self.write_balance(from, available - amount)?;
        self.write_balance(to, credited)
    }

    /// Create new supply. Only reachable through the host (faucet, tests).
    pub fn mint(&self, to: &Address, amount: i128) -> Result<(), HostError> {
        if amount < 0 {
            return Err(HostError::NegativeAmount(amount));
        }
        let credited = self
            .balance(to)?
            .checked_add(amount)
            .ok_or_else(|| HostError::BalanceOverflow(to.clone()))?;
        self.write_balance(to, credited)
    }
}
