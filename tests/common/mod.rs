// Shared fixtures for integration tests
//
// A fresh in-memory host at ledger time 1_000, initialized with an admin
// and with ALICE, BOB and CAROL each holding 1_000 test tokens.

#![allow(dead_code)]

use prediction_market_ledger::{
    Address, Authorization, Call, ContractError, Host, Market, Prediction, PredictionMarket, PredictionSide,
};

pub const START_TIME: u64 = 1_000;
pub const END_TIME: u64 = 2_000;
pub const STARTING_BALANCE: i128 = 1_000;

pub struct Fixture {
    pub host: Host,
    pub admin: Address,
    pub token: Address,
    pub alice: Address,
    pub bob: Address,
    pub carol: Address,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_host(Host::in_memory("prediction_market"))
    }

    pub fn with_host(mut host: Host) -> Self {
        host.set_timestamp(START_TIME);
        let admin = Address::new("ACCT_ADMIN");
        let token = Address::contract("test_token");
        let alice = Address::new("ACCT_ALICE");
        let bob = Address::new("ACCT_BOB");
        let carol = Address::new("ACCT_CAROL");

        host.invoke(&Authorization::signer(admin.clone()), Call::Initialize { admin: admin.clone() })
            .expect("initialize");
        for user in [&alice, &bob, &carol] {
            host.mint(&token, user, STARTING_BALANCE).expect("mint");
        }

        Fixture { host, admin, token, alice, bob, carol }
    }

    pub fn create_market(&mut self) -> u64 {
        self.create_market_ending(END_TIME).expect("create market")
    }

    pub fn create_market_ending(&mut self, end_time: u64) -> Result<u64, ContractError> {
        let creator = self.alice.clone();
        let token = self.token.clone();
        self.host.with_env(&Authorization::signer(creator.clone()), |env| {
            PredictionMarket::create_market(
                env,
                creator,
                "Will it rain tomorrow?".into(),
                "Resolves YES on measurable rainfall".into(),
                token,
                end_time,
            )
        })
    }

    pub fn predict(&mut self, user: &Address, market_id: u64, side: PredictionSide, amount: i128) -> Result<(), ContractError> {
        self.host.with_env(&Authorization::signer(user.clone()), |env| {
            PredictionMarket::predict(env, user.clone(), market_id, side, amount)
        })
    }

    pub fn end_market(&mut self) {
        self.host.set_timestamp(END_TIME);
    }

    pub fn resolve(&mut self, market_id: u64, side: PredictionSide) -> Result<(), ContractError> {
        let admin = self.admin.clone();
        self.resolve_as(&admin, market_id, side)
    }

    pub fn resolve_as(&mut self, admin: &Address, market_id: u64, side: PredictionSide) -> Result<(), ContractError> {
        self.host.with_env(&Authorization::signer(admin.clone()), |env| {
            PredictionMarket::resolve_market(env, admin.clone(), market_id, side)
        })
    }

    pub fn claim(&mut self, user: &Address, market_id: u64) -> Result<i128, ContractError> {
        self.host.with_env(&Authorization::signer(user.clone()), |env| {
            PredictionMarket::claim_winnings(env, user.clone(), market_id)
        })
    }

    pub fn market(&mut self, market_id: u64) -> Market {
        self.host
            .with_env(&Authorization::none(), |env| PredictionMarket::get_market(env, market_id))
            .expect("market exists")
    }

    pub fn prediction(&mut self, user: &Address, market_id: u64) -> Option<Prediction> {
        self.host
            .with_env(&Authorization::none(), |env| {
                PredictionMarket::get_user_prediction(env, user.clone(), market_id)
            })
            .expect("read prediction")
    }

    pub fn collected_fees(&mut self) -> i128 {
        let token = self.token.clone();
        self.host
            .with_env(&Authorization::none(), |env| PredictionMarket::get_collected_fees(env, token))
            .expect("read fees")
    }

    pub fn balance(&mut self, holder: &Address) -> i128 {
        let token = self.token.clone();
        self.host.token_balance(&token, holder).expect("balance")
    }

    pub fn escrow(&mut self) -> i128 {
        let contract = self.host.contract_address().clone();
        self.balance(&contract)
    }
}
