use crate::host::Address;
use serde::{Deserialize, Serialize};

/// Fee rates are basis points: 10_000 = 100%
pub const FEE_RATE_DENOMINATOR: i128 = 10_000;

/// Highest accepted platform fee rate
pub const MAX_FEE_RATE: i128 = 10_000;

/// Fee rate set by `initialize` (2%)
pub const DEFAULT_FEE_RATE: i128 = 200;

pub const CONTRACT_DESCRIPTION: &str =
    "Decentralized Prediction Market - Bet on future events with decentralized resolution";

/// Storage keys. One key per entity so every access is a point lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKey {
    Admin,
    Markets(u64),
    MarketCount,
    UserPredictions(Address, u64),
    PlatformFeeRate,
    WinningSide(u64),
    /// Platform fees retained in escrow, per token
    CollectedFees(Address),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionSide {
    Yes,
    No,
}

impl PredictionSide {
    pub fn opposite(&self) -> Self {
        match self {
            PredictionSide::Yes => PredictionSide::No,
            PredictionSide::No => PredictionSide::Yes,
        }
    }
}

/// A user's stake in one market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub side: PredictionSide,
    pub amount: i128,
    /// Set once the payout (possibly zero) has been claimed
    #[serde(default)]
    pub claimed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub creator: Address,
    pub question: String,
    pub description: String,
    /// Token used for staking and payouts
    pub token: Address,
    /// Unix timestamp; staking closes at this instant
    pub end_time: u64,
    pub created_at: u64,
    pub total_yes: i128,
    pub total_no: i128,
    pub resolved: bool,
}

impl Market {
    /// Aggregate stake on one side
    pub fn pool(&self, side: PredictionSide) -> i128 {
        match side {
            PredictionSide::Yes => self.total_yes,
            PredictionSide::No => self.total_no,
        }
    }

    pub fn pool_mut(&mut self, side: PredictionSide) -> &mut i128 {
        match side {
            PredictionSide::Yes => &mut self.total_yes,
            PredictionSide::No => &mut self.total_no,
        }
    }
}
