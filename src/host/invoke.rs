use super::{Address, Env, HostError};
use crate::contract::{ContractError, PredictionMarket, PredictionSide};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A contract entry point together with its arguments.
///
/// JSON form: `{"predict": {"user": "...", "market_id": 0, ...}}`.
/// Argument-less methods are bare strings: `"get_market_count"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Call {
    Initialize {
        admin: Address,
    },
    CreateMarket {
        creator: Address,
        question: String,
        description: String,
        token: Address,
        end_time: u64,
    },
    Predict {
        user: Address,
        market_id: u64,
        side: PredictionSide,
        amount: i128,
    },
    ResolveMarket {
        admin: Address,
        market_id: u64,
        winning_side: PredictionSide,
    },
    ClaimWinnings {
        user: Address,
        market_id: u64,
    },
    GetMarket {
        market_id: u64,
    },
    GetUserPrediction {
        user: Address,
        market_id: u64,
    },
    GetMarketCount,
    GetPlatformFeeRate,
    SetPlatformFeeRate {
        admin: Address,
        fee_rate: i128,
    },
    UpdateAdmin {
        admin: Address,
        new_admin: Address,
    },
    GetAdmin,
    GetWinningSide {
        market_id: u64,
    },
    GetCollectedFees {
        token: Address,
    },
    WithdrawFees {
        admin: Address,
        token: Address,
        to: Address,
    },
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Call::Initialize { .. } => "initialize",
            Call::CreateMarket { .. } => "create_market",
            Call::Predict { .. } => "predict",
            Call::ResolveMarket { .. } => "resolve_market",
            Call::ClaimWinnings { .. } => "claim_winnings",
            Call::GetMarket { .. } => "get_market",
            Call::GetUserPrediction { .. } => "get_user_prediction",
            Call::GetMarketCount => "get_market_count",
            Call::GetPlatformFeeRate => "get_platform_fee_rate",
            Call::SetPlatformFeeRate { .. } => "set_platform_fee_rate",
            Call::UpdateAdmin { .. } => "update_admin",
            Call::GetAdmin => "get_admin",
            Call::GetWinningSide { .. } => "get_winning_side",
            Call::GetCollectedFees { .. } => "get_collected_fees",
            Call::WithdrawFees { .. } => "withdraw_fees",
        }
    }

    /// Pure accessors that never write state
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Call::GetMarket { .. }
                | Call::GetUserPrediction { .. }
                | Call::GetMarketCount
                | Call::GetPlatformFeeRate
                | Call::GetAdmin
                | Call::GetWinningSide { .. }
                | Call::GetCollectedFees { .. }
        )
    }

    pub(crate) fn dispatch(self, env: &Env) -> Result<Value, ContractError> {
        match self {
            Call::Initialize { admin } => encode(PredictionMarket::initialize(env, admin)?),
            Call::CreateMarket { creator, question, description, token, end_time } => encode(
                PredictionMarket::create_market(env, creator, question, description, token, end_time)?,
            ),
            Call::Predict { user, market_id, side, amount } => {
                encode(PredictionMarket::predict(env, user, market_id, side, amount)?)
            }
            Call::ResolveMarket { admin, market_id, winning_side } => {
                encode(PredictionMarket::resolve_market(env, admin, market_id, winning_side)?)
            }
            Call::ClaimWinnings { user, market_id } => encode(PredictionMarket::claim_winnings(env, user, market_id)?),
            Call::GetMarket { market_id } => encode(PredictionMarket::get_market(env, market_id)?),
            Call::GetUserPrediction { user, market_id } => {
                encode(PredictionMarket::get_user_prediction(env, user, market_id)?)
            }
            Call::GetMarketCount => encode(PredictionMarket::get_market_count(env)?),
            Call::GetPlatformFeeRate => encode(PredictionMarket::get_platform_fee_rate(env)?),
            Call::SetPlatformFeeRate { admin, fee_rate } => {
                encode(PredictionMarket::set_platform_fee_rate(env, admin, fee_rate)?)
            }
            Call::UpdateAdmin { admin, new_admin } => encode(PredictionMarket::update_admin(env, admin, new_admin)?),
            Call::GetAdmin => encode(PredictionMarket::get_admin(env)?),
            Call::GetWinningSide { market_id } => encode(PredictionMarket::get_winning_side(env, market_id)?),
            Call::GetCollectedFees { token } => encode(PredictionMarket::get_collected_fees(env, token)?),
            Call::WithdrawFees { admin, token, to } => encode(PredictionMarket::withdraw_fees(env, admin, token, to)?),
        }
    }
}

fn encode<T: Serialize>(value: T) -> Result<Value, ContractError> {
    Ok(serde_json::to_value(value).map_err(HostError::from)?)
}
