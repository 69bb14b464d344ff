/// Ledger Event Log
///
/// Append-only record of every committed state change:
/// - Contract events (markets, predictions, resolutions, payouts)
/// - Admin events (fee rate, admin transfer, fee withdrawal)
/// - Host events (token minting)
///
/// Each event carries the ledger time and sequence of the invocation that
/// produced it, and a SHA-256 hash chained over the previous head.

use crate::contract::PredictionSide;
use crate::host::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;

/// Head of an empty chain
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// ============================================================================
// EVENT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventKind {
    Initialized,
    MarketCreated,
    PredictionPlaced,
    MarketResolved,
    WinningsClaimed,
    StakeRefunded,
    FeeRateUpdated,
    AdminUpdated,
    FeesWithdrawn,
    TokensMinted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub id: String,
    pub kind: EventKind,
    /// Principal the event concerns (user, creator, admin, recipient)
    pub account: Address,
    pub market_id: Option<u64>,
    pub side: Option<PredictionSide>,
    pub amount: Option<i128>,
    /// Ledger timestamp of the committing invocation
    #[serde(default)]
    pub timestamp: u64,
    /// Ledger sequence of the committing invocation
    #[serde(default)]
    pub sequence: u32,
    #[serde(default)]
    pub description: Option<String>,
    /// Chained hash, assigned on commit
    #[serde(default)]
    pub hash: String,
}

impl LedgerEvent {
    pub fn new(kind: EventKind, account: &Address) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            account: account.clone(),
            market_id: None,
            side: None,
            amount: None,
            timestamp: 0,
            sequence: 0,
            description: None,
            hash: String::new(),
        }
    }

    pub fn initialized(admin: &Address) -> Self {
        let mut event = Self::new(EventKind::Initialized, admin);
        event.description = Some(format!("Contract initialized with admin {}", admin));
        event
    }

    pub fn market_created(market_id: u64, creator: &Address, question: &str) -> Self {
        let mut event = Self::new(EventKind::MarketCreated, creator);
        event.market_id = Some(market_id);
        event.description = Some(format!("Market created: {}", question));
        event
    }

    pub fn prediction_placed(market_id: u64, user: &Address, side: PredictionSide, amount: i128) -> Self {
        let mut event = Self::new(EventKind::PredictionPlaced, user);
        event.market_id = Some(market_id);
        event.side = Some(side);
        event.amount = Some(amount);
        event.description = Some(format!("Staked {} on {:?}", amount, side));
        event
    }

    pub fn market_resolved(market_id: u64, admin: &Address, winning_side: PredictionSide) -> Self {
        let mut event = Self::new(EventKind::MarketResolved, admin);
        event.market_id = Some(market_id);
        event.side = Some(winning_side);
        event.description = Some(format!("Market resolved: {:?} wins", winning_side));
        event
    }

    pub fn winnings_claimed(market_id: u64, user: &Address, net: i128, fee: i128) -> Self {
        let mut event = Self::new(EventKind::WinningsClaimed, user);
        event.market_id = Some(market_id);
        event.amount = Some(net);
        event.description = Some(format!("Claimed {} (fee {})", net, fee));
        event
    }

    pub fn stake_refunded(market_id: u64, user: &Address, amount: i128) -> Self {
        let mut event = Self::new(EventKind::StakeRefunded, user);
        event.market_id = Some(market_id);
        event.amount = Some(amount);
        event.description = Some(format!("Refunded {}: no stake on the winning side", amount));
        event
    }

    pub fn fee_rate_updated(admin: &Address, fee_rate: i128) -> Self {
        let mut event = Self::new(EventKind::FeeRateUpdated, admin);
        event.amount = Some(fee_rate);
        event.description = Some(format!("Platform fee rate set to {} bps", fee_rate));
        event
    }

    pub fn admin_updated(previous: &Address, new_admin: &Address) -> Self {
        let mut event = Self::new(EventKind::AdminUpdated, new_admin);
        event.description = Some(format!("Admin transferred from {}", previous));
        event
    }

    pub fn fees_withdrawn(token: &Address, to: &Address, amount: i128) -> Self {
        let mut event = Self::new(EventKind::FeesWithdrawn, to);
        event.amount = Some(amount);
        event.description = Some(format!("Withdrew {} of {} in fees", amount, token));
        event
    }

    pub fn tokens_minted(token: &Address, to: &Address, amount: i128) -> Self {
        let mut event = Self::new(EventKind::TokensMinted, to);
        event.amount = Some(amount);
        event.description = Some(format!("Minted {} of {}", amount, token));
        event
    }

    /// Bytes covered by the chain hash (everything except the hash itself)
    fn digest_input(&self, previous: &str) -> String {
        format!(
            "{}|{}|{:?}|{}|{:?}|{:?}|{:?}|{}|{}",
            previous,
            self.id,
            self.kind,
            self.account,
            self.market_id,
            self.side,
            self.amount,
            self.timestamp,
            self.sequence,
        )
    }
}

// ============================================================================
// EVENT LOG
// ============================================================================

/// Bounded, hash-chained log of committed events
#[derive(Debug)]
pub struct EventLog {
    events: VecDeque<LedgerEvent>,
    head: String,
    capacity: usize,
    total: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            head: GENESIS_HASH.to_string(),
            capacity: capacity.max(1),
            total: 0,
        }
    }

    /// Continue an existing chain after a restart. Earlier events are not
    /// retained, only the head and the running total.
    pub fn resume(capacity: usize, head: String, total: u64) -> Self {
        Self {
            head,
            total,
            ..Self::new(capacity)
        }
    }

    /// Chain and store an event, returning its hash
    pub fn append(&mut self, event: LedgerEvent) -> String {
        let mut batch = [event];
        self.seal(&mut batch);
        self.extend_sealed(batch);
        self.head.clone()
    }

    /// Assign chained hashes on top of the current head without storing the
    /// events. Returns the head the log will have once they are stored.
    pub fn seal(&self, events: &mut [LedgerEvent]) -> String {
        let mut head = self.head.clone();
        for event in events.iter_mut() {
            event.hash = hash(&event.digest_input(&head));
            head = event.hash.clone();
        }
        head
    }

    /// Store events previously passed through `seal`, in order
    pub fn extend_sealed(&mut self, events: impl IntoIterator<Item = LedgerEvent>) {
        for event in events {
            self.head = event.hash.clone();
            self.total += 1;

            if self.events.len() == self.capacity {
                self.events.pop_front();
            }
            self.events.push_back(event);
        }
    }

    /// Most recent events, newest first
    pub fn recent(&self, limit: usize) -> Vec<&LedgerEvent> {
        self.events.iter().rev().take(limit).collect()
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    /// Events ever appended, including those evicted
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Check that retained events chain onto each other
    pub fn verify_chain(&self) -> bool {
        let mut iter = self.events.iter();
        let Some(first) = iter.next() else {
            return true;
        };
        let mut previous = first.hash.clone();
        for event in iter {
            if hash(&event.digest_input(&previous)) != event.hash {
                return false;
            }
            previous = event.hash.clone();
        }
        previous == self.head
    }
}

/// Compute SHA256 hash
pub fn hash(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_chains_hashes() {
        let mut log = EventLog::new(10);
        let admin = Address::new("ADMIN");

        let first = log.append(LedgerEvent::initialized(&admin));
        let second = log.append(LedgerEvent::fee_rate_updated(&admin, 300));

        assert_ne!(first, second);
        assert_eq!(log.head(), second);
        assert!(log.verify_chain());
    }

    #[test]
    fn test_tampering_breaks_chain() {
        let mut log = EventLog::new(10);
        let user = Address::new("ALICE");
        log.append(LedgerEvent::prediction_placed(0, &user, PredictionSide::Yes, 100));
        log.append(LedgerEvent::prediction_placed(0, &user, PredictionSide::Yes, 50));

        log.events[1].amount = Some(5_000);
        assert!(!log.verify_chain());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = EventLog::new(2);
        let admin = Address::new("ADMIN");
        for rate in [100, 200, 300] {
            log.append(LedgerEvent::fee_rate_updated(&admin, rate));
        }

        assert_eq!(log.len(), 2);
        assert_eq!(log.total(), 3);
        let recent = log.recent(10);
        assert_eq!(recent[0].amount, Some(300));
        assert_eq!(recent[1].amount, Some(200));
        assert!(log.verify_chain());
    }

    #[test]
    fn test_seal_matches_append() {
        let admin = Address::new("ADMIN");
        let events = vec![
            LedgerEvent::initialized(&admin),
            LedgerEvent::fee_rate_updated(&admin, 150),
        ];

        let mut appended = EventLog::new(10);
        for event in events.clone() {
            appended.append(event);
        }

        let mut sealed = EventLog::new(10);
        let mut batch = events;
        let head = sealed.seal(&mut batch);
        assert_eq!(sealed.head(), GENESIS_HASH);
        sealed.extend_sealed(batch);

        assert_eq!(head, appended.head());
        assert_eq!(sealed.head(), appended.head());
        assert!(sealed.verify_chain());
    }

    #[test]
    fn test_resumed_log_chains_onto_saved_head() {
        let admin = Address::new("ADMIN");
        let mut original = EventLog::new(10);
        original.append(LedgerEvent::initialized(&admin));
        let saved_head = original.head().to_string();

        let mut resumed = EventLog::resume(10, saved_head.clone(), original.total());
        assert!(resumed.is_empty());
        assert_eq!(resumed.total(), 1);

        let event = LedgerEvent::fee_rate_updated(&admin, 300);
        let expected = hash(&event.digest_input(&saved_head));
        assert_eq!(resumed.append(event), expected);
        assert_eq!(resumed.total(), 2);
    }
}
