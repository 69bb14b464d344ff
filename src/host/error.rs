use super::Address;

/// Failures raised by the host runtime rather than by contract logic
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("missing authorization for {0}")]
    MissingAuth(Address),

    #[error("insufficient balance: have {available}, need {requested}")]
    InsufficientBalance { available: i128, requested: i128 },

    #[error("negative token amount: {0}")]
    NegativeAmount(i128),

    #[error("balance overflow for {0}")]
    BalanceOverflow(Address),

    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
