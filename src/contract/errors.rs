use crate::host::HostError;

/// Every way a ledger entry point can fail. Any error aborts the call and
/// discards its writes.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("contract already initialized")]
    AlreadyInitialized,

    #[error("contract not initialized")]
    NotInitialized,

    #[error("not authorized")]
    Unauthorized,

    #[error("market {0} not found")]
    MarketNotFound(u64),

    #[error("market {0} already resolved")]
    MarketResolved(u64),

    #[error("market {0} has ended")]
    MarketClosed(u64),

    #[error("market {0} not yet ended")]
    MarketNotEnded(u64),

    #[error("market {0} already resolved")]
    AlreadyResolved(u64),

    #[error("amount must be positive, got {0}")]
    InvalidAmount(i128),

    #[error("end_time {end_time} must be after current ledger time {now}")]
    InvalidEndTime { end_time: u64, now: u64 },

    #[error("fee rate {0} must be between 0 and 10000")]
    InvalidFeeRate(i128),

    #[error("existing prediction is on the other side")]
    SideMismatch,

    #[error("market {0} not resolved")]
    NotResolved(u64),

    #[error("no prediction found")]
    NoPrediction,

    #[error("winnings already claimed")]
    AlreadyClaimed,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error(transparent)]
    Host(#[from] HostError),
}

impl ContractError {
    /// Stable numeric code, 0 for host failures
    pub fn code(&self) -> u32 {
        match self {
            ContractError::Host(_) => 0,
            ContractError::AlreadyInitialized => 1,
            ContractError::NotInitialized => 2,
            ContractError::Unauthorized => 3,
            ContractError::MarketNotFound(_) => 4,
            ContractError::MarketResolved(_) => 5,
            ContractError::MarketClosed(_) => 6,
            ContractError::MarketNotEnded(_) => 7,
            ContractError::AlreadyResolved(_) => 8,
            ContractError::InvalidAmount(_) => 9,
            ContractError::InvalidEndTime { .. } => 10,
            ContractError::InvalidFeeRate(_) => 11,
            ContractError::SideMismatch => 12,
            ContractError::NotResolved(_) => 13,
            ContractError::NoPrediction => 14,
            ContractError::AlreadyClaimed => 15,
            ContractError::ArithmeticOverflow => 16,
        }
    }
}
