// ============================================================================
// Payout Arithmetic - parimutuel settlement of a resolved market
// ============================================================================
//
// Winner payout:
//   gross = stake + floor(stake * losing_pool / winning_pool)
//   fee   = floor(gross * fee_rate / FEE_RATE_DENOMINATOR)
//   net   = gross - fee
//
// Rounding always goes down, so the sum of all payouts never exceeds the
// escrowed pot. Leftover dust stays in the contract. Products are taken in
// 256 bits so that realistic 18-decimal amounts cannot overflow before the
// division brings them back into range.
//
// When nobody staked on the winning side the pot cannot be distributed and
// every (necessarily losing) staker gets their principal back, fee free.
//
// ============================================================================

use super::errors::ContractError;
use super::types::{Market, Prediction, PredictionSide, FEE_RATE_DENOMINATOR};
use ethnum::U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Backed the winning side
    Won { gross: i128, fee: i128, net: i128 },
    /// Backed the losing side while the winning side has stake
    Lost,
    /// Winning pool is empty; principal is returned
    Refund { amount: i128 },
}

impl Settlement {
    /// Amount leaving escrow for the user
    pub fn payout(&self) -> i128 {
        match self {
            Settlement::Won { net, .. } => *net,
            Settlement::Lost => 0,
            Settlement::Refund { amount } => *amount,
        }
    }

    /// Amount retained as platform fee
    pub fn fee(&self) -> i128 {
        match self {
            Settlement::Won { fee, .. } => *fee,
            Settlement::Lost | Settlement::Refund { .. } => 0,
        }
    }
}

/// Settle one prediction against a resolved market
pub fn settle(
    market: &Market,
    prediction: &Prediction,
    winning_side: PredictionSide,
    fee_rate: i128,
) -> Result<Settlement, ContractError> {
    let winner_pool = market.pool(winning_side);
    let loser_pool = market.pool(winning_side.opposite());

    if winner_pool == 0 {
        return Ok(Settlement::Refund { amount: prediction.amount });
    }
    if prediction.side != winning_side {
        return Ok(Settlement::Lost);
    }

    let stake = prediction.amount;
    let share = mul_div(stake, loser_pool, winner_pool)?;
    let gross = stake.checked_add(share).ok_or(ContractError::ArithmeticOverflow)?;
    let fee = mul_div(gross, fee_rate, FEE_RATE_DENOMINATOR)?;

    Ok(Settlement::Won { gross, fee, net: gross - fee })
}

/// floor(a * b / d) for non-negative operands, with a 256-bit intermediate
pub fn mul_div(a: i128, b: i128, d: i128) -> Result<i128, ContractError> {
    let widen = |v: i128| u128::try_from(v).map(U256::from).map_err(|_| ContractError::ArithmeticOverflow);
    let (a, b, d) = (widen(a)?, widen(b)?, widen(d)?);
    if d == U256::ZERO {
        return Err(ContractError::ArithmeticOverflow);
    }

    let quotient = a * b / d;
    if quotient > U256::from(i128::MAX as u128) {
        return Err(ContractError::ArithmeticOverflow);
    }
    Ok(quotient.as_u128() as i128)
}
