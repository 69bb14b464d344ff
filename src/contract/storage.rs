// Typed accessors over the contract namespace.

use super::errors::ContractError;
use super::types::{DataKey, Market, Prediction, PredictionSide, DEFAULT_FEE_RATE};
use crate::host::{Address, Env};

pub fn has_admin(env: &Env) -> Result<bool, ContractError> {
    Ok(env.storage().has(&DataKey::Admin)?)
}

pub fn read_admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .get(&DataKey::Admin)?
        .ok_or(ContractError::NotInitialized)
}

pub fn write_admin(env: &Env, admin: &Address) -> Result<(), ContractError> {
    Ok(env.storage().set(&DataKey::Admin, admin)?)
}

/// Fails `Unauthorized` unless `caller` is the stored admin
pub fn check_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
    if read_admin(env)? != *caller {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub fn read_market_count(env: &Env) -> Result<u64, ContractError> {
    Ok(env.storage().get(&DataKey::MarketCount)?.unwrap_or(0))
}

pub fn write_market_count(env: &Env, count: u64) -> Result<(), ContractError> {
    Ok(env.storage().set(&DataKey::MarketCount, &count)?)
}

pub fn read_market(env: &Env, market_id: u64) -> Result<Market, ContractError> {
    env.storage()
        .get(&DataKey::Markets(market_id))?
        .ok_or(ContractError::MarketNotFound(market_id))
}

pub fn write_market(env: &Env, market_id: u64, market: &Market) -> Result<(), ContractError> {
    Ok(env.storage().set(&DataKey::Markets(market_id), market)?)
}

pub fn read_prediction(env: &Env, user: &Address, market_id: u64) -> Result<Option<Prediction>, ContractError> {
    Ok(env
        .storage()
        .get(&DataKey::UserPredictions(user.clone(), market_id))?)
}

pub fn write_prediction(
    env: &Env,
    user: &Address,
    market_id: u64,
    prediction: &Prediction,
) -> Result<(), ContractError> {
    Ok(env
        .storage()
        .set(&DataKey::UserPredictions(user.clone(), market_id), prediction)?)
}

pub fn read_fee_rate(env: &Env) -> Result<i128, ContractError> {
    Ok(env
        .storage()
        .get(&DataKey::PlatformFeeRate)?
        .unwrap_or(DEFAULT_FEE_RATE))
}

pub fn write_fee_rate(env: &Env, rate: i128) -> Result<(), ContractError> {
    Ok(env.storage().set(&DataKey::PlatformFeeRate, &rate)?)
}

pub fn read_winning_side(env: &Env, market_id: u64) -> Result<Option<PredictionSide>, ContractError> {
    Ok(env.storage().get(&DataKey::WinningSide(market_id))?)
}

pub fn write_winning_side(env: &Env, market_id: u64, side: PredictionSide) -> Result<(), ContractError> {
    Ok(env.storage().set(&DataKey::WinningSide(market_id), &side)?)
}

pub fn read_collected_fees(env: &Env, token: &Address) -> Result<i128, ContractError> {
    Ok(env
        .storage()
        .get(&DataKey::CollectedFees(token.clone()))?
        .unwrap_or(0))
}

pub fn write_collected_fees(env: &Env, token: &Address, amount: i128) -> Result<(), ContractError> {
    Ok(env
        .storage()
        .set(&DataKey::CollectedFees(token.clone()), &amount)?)
}
