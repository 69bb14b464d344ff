// ============================================================================
// Prediction Market Contract - market lifecycle, staking, resolution, payout
// ============================================================================
//
// Entry points run inside a host `Env`. Each one either returns `Ok` and has
// all of its writes committed, or returns an error and leaves no trace.
//
//   - types:   storage keys, markets, predictions, fee constants
//   - errors:  ContractError taxonomy
//   - storage: typed reads and writes of contract state
//   - payout:  settlement arithmetic
//
// ============================================================================

pub mod errors;
pub mod payout;
pub mod storage;
pub mod types;

pub use errors::ContractError;
pub use payout::{settle, Settlement};
pub use types::*;

use crate::events::LedgerEvent;
use crate::host::{Address, Env};
use storage::*;
use tracing::info;

pub struct PredictionMarket;

impl PredictionMarket {
    /// Initialize the contract with an admin address
    pub fn initialize(env: &Env, admin: Address) -> Result<(), ContractError> {
        if has_admin(env)? {
            return Err(ContractError::AlreadyInitialized);
        }
        write_admin(env, &admin)?;
        write_market_count(env, 0)?;
        write_fee_rate(env, DEFAULT_FEE_RATE)?;

        env.publish(LedgerEvent::initialized(&admin));
        info!(admin = %admin, fee_rate = DEFAULT_FEE_RATE, "contract initialized");
        Ok(())
    }

    /// Create a new prediction market. Open to any authenticated creator.
    pub fn create_market(
        env: &Env,
        creator: Address,
        question: String,
        description: String,
        token: Address,
        end_time: u64,
    ) -> Result<u64, ContractError> {
        env.require_auth(&creator)?;
        reject_contract_principal(env, &creator)?;

        let now = env.timestamp();
        if end_time <= now {
            return Err(ContractError::InvalidEndTime { end_time, now });
        }

        let market_id = read_market_count(env)?;
        let next = market_id.checked_add(1).ok_or(ContractError::ArithmeticOverflow)?;

        let market = Market {
            creator: creator.clone(),
            question,
            description,
            token,
            end_time,
            created_at: now,
            total_yes: 0,
            total_no: 0,
            resolved: false,
        };

        write_market(env, market_id, &market)?;
        write_market_count(env, next)?;

        env.publish(LedgerEvent::market_created(market_id, &creator, &market.question));
        info!(market_id, creator = %creator, end_time, "market created");
        Ok(market_id)
    }

    /// Stake `amount` of the market token on `side`.
    ///
    /// A repeat stake on the same side accumulates; switching sides fails
    /// with `SideMismatch`.
    pub fn predict(
        env: &Env,
        user: Address,
        market_id: u64,
        side: PredictionSide,
        amount: i128,
    ) -> Result<(), ContractError> {
        env.require_auth(&user)?;
        reject_contract_principal(env, &user)?;

        let mut market = read_market(env, market_id)?;
        if market.resolved {
            return Err(ContractError::MarketResolved(market_id));
        }
        if env.timestamp() >= market.end_time {
            return Err(ContractError::MarketClosed(market_id));
        }
        if amount <= 0 {
            return Err(ContractError::InvalidAmount(amount));
        }

        let prediction = match read_prediction(env, &user, market_id)? {
            Some(existing) if existing.side != side => return Err(ContractError::SideMismatch),
            Some(existing) => Prediction {
                side,
                amount: existing
                    .amount
                    .checked_add(amount)
                    .ok_or(ContractError::ArithmeticOverflow)?,
                claimed: false,
            },
            None => Prediction { side, amount, claimed: false },
        };

        let pool = market.pool_mut(side);
        *pool = pool.checked_add(amount).ok_or(ContractError::ArithmeticOverflow)?;

        env.token(&market.token)
            .transfer(&user, env.current_contract_address(), amount)?;

        write_prediction(env, &user, market_id, &prediction)?;
        write_market(env, market_id, &market)?;

        env.publish(LedgerEvent::prediction_placed(market_id, &user, side, amount));
        info!(market_id, user = %user, ?side, amount, "prediction placed");
        Ok(())
    }

    /// Resolve a market (admin only). Funds move lazily on claim.
    pub fn resolve_market(
        env: &Env,
        admin: Address,
        market_id: u64,
        winning_side: PredictionSide,
    ) -> Result<(), ContractError> {
        env.require_auth(&admin)?;
        check_admin(env, &admin)?;

        let mut market = read_market(env, market_id)?;
        if market.resolved {
            return Err(ContractError::AlreadyResolved(market_id));
        }
        if env.timestamp() < market.end_time {
            return Err(ContractError::MarketNotEnded(market_id));
        }

        market.resolved = true;
        write_winning_side(env, market_id, winning_side)?;
        write_market(env, market_id, &market)?;

        env.publish(LedgerEvent::market_resolved(market_id, &admin, winning_side));
        info!(market_id, ?winning_side, "market resolved");
        Ok(())
    }

    /// Claim the payout of a resolved market. Losing predictions return 0
    /// and are still marked claimed.
    pub fn claim_winnings(env: &Env, user: Address, market_id: u64) -> Result<i128, ContractError> {
        env.require_auth(&user)?;
        reject_contract_principal(env, &user)?;

        let market = read_market(env, market_id)?;
        if !market.resolved {
            return Err(ContractError::NotResolved(market_id));
        }
        let mut prediction = read_prediction(env, &user, market_id)?.ok_or(ContractError::NoPrediction)?;
        if prediction.claimed {
            return Err(ContractError::AlreadyClaimed);
        }
        let winning_side = read_winning_side(env, market_id)?.ok_or(ContractError::NotResolved(market_id))?;

        let fee_rate = read_fee_rate(env)?;
        let settlement = settle(&market, &prediction, winning_side, fee_rate)?;
        let payout = settlement.payout();

        env.token(&market.token)
            .transfer(env.current_contract_address(), &user, payout)?;

        if settlement.fee() > 0 {
            let collected = read_collected_fees(env, &market.token)?
                .checked_add(settlement.fee())
                .ok_or(ContractError::ArithmeticOverflow)?;
            write_collected_fees(env, &market.token, collected)?;
        }

        prediction.claimed = true;
        write_prediction(env, &user, market_id, &prediction)?;

        match settlement {
            Settlement::Refund { amount } => env.publish(LedgerEvent::stake_refunded(market_id, &user, amount)),
            _ => env.publish(LedgerEvent::winnings_claimed(market_id, &user, payout, settlement.fee())),
        }
        info!(market_id, user = %user, payout, fee = settlement.fee(), "winnings claimed");
        Ok(payout)
    }

    /// Get market details
    pub fn get_market(env: &Env, market_id: u64) -> Result<Market, ContractError> {
        read_market(env, market_id)
    }

    /// Get user's prediction for a specific market
    pub fn get_user_prediction(env: &Env, user: Address, market_id: u64) -> Result<Option<Prediction>, ContractError> {
        read_prediction(env, &user, market_id)
    }

    pub fn get_market_count(env: &Env) -> Result<u64, ContractError> {
        read_market_count(env)
    }

    pub fn get_platform_fee_rate(env: &Env) -> Result<i128, ContractError> {
        read_fee_rate(env)
    }

    /// Set platform fee rate in basis points (admin only)
    pub fn set_platform_fee_rate(env: &Env, admin: Address, fee_rate: i128) -> Result<(), ContractError> {
        env.require_auth(&admin)?;
        check_admin(env, &admin)?;

        if !(0..=MAX_FEE_RATE).contains(&fee_rate) {
            return Err(ContractError::InvalidFeeRate(fee_rate));
        }
        write_fee_rate(env, fee_rate)?;

        env.publish(LedgerEvent::fee_rate_updated(&admin, fee_rate));
        info!(fee_rate, "platform fee rate updated");
        Ok(())
    }

    /// Single-step admin transfer (admin only). No acceptance handshake.
    pub fn update_admin(env: &Env, admin: Address, new_admin: Address) -> Result<(), ContractError> {
        env.require_auth(&admin)?;
        check_admin(env, &admin)?;

        write_admin(env, &new_admin)?;

        env.publish(LedgerEvent::admin_updated(&admin, &new_admin));
        info!(previous = %admin, new_admin = %new_admin, "admin updated");
        Ok(())
    }

    pub fn get_admin(env: &Env) -> Result<Address, ContractError> {
        read_admin(env)
    }

    pub fn get_winning_side(env: &Env, market_id: u64) -> Result<Option<PredictionSide>, ContractError> {
        read_winning_side(env, market_id)
    }

    /// Platform fees accrued in escrow for `token`
    pub fn get_collected_fees(env: &Env, token: Address) -> Result<i128, ContractError> {
        read_collected_fees(env, &token)
    }

    /// Send all accrued fees for `token` to `to` (admin only)
    pub fn withdraw_fees(env: &Env, admin: Address, token: Address, to: Address) -> Result<i128, ContractError> {
        env.require_auth(&admin)?;
        check_admin(env, &admin)?;

        let amount = read_collected_fees(env, &token)?;
        if amount == 0 {
            return Ok(0);
        }

        env.token(&token)
            .transfer(env.current_contract_address(), &to, amount)?;
        write_collected_fees(env, &token, 0)?;

        env.publish(LedgerEvent::fees_withdrawn(&token, &to, amount));
        info!(token = %token, to = %to, amount, "fees withdrawn");
        Ok(amount)
    }
}

/// The escrow account can never act as a market participant
fn reject_contract_principal(env: &Env, address: &Address) -> Result<(), ContractError> {
    if address == env.current_contract_address() {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}
