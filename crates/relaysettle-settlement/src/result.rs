//! Per-claim settlement ledger.
//!
//! A [`SettlementResult`] is an append-only record of the operations queued
//! for exactly one claim. Operations stay in the order modules queued them;
//! nothing is ever removed or rewritten.

use serde::{Deserialize, Serialize};

use relaysettle_types::{
    Claim, Coin, MintBurnOp, ModToAcctTransfer, ModToModTransfer, Result, SettlementError,
    SettlementEvent,
};

/// Everything one claim settled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub claim: Claim,
    pub settlement_coin: Coin,
    pub mints: Vec<MintBurnOp>,
    pub burns: Vec<MintBurnOp>,
    pub mod_to_mod_transfers: Vec<ModToModTransfer>,
    pub mod_to_acct_transfers: Vec<ModToAcctTransfer>,
    pub events: Vec<SettlementEvent>,
    /// Consumer's escrowed stake after every debit of this claim.
    pub consumer_stake_after: u128,
}

impl SettlementResult {
    /// Empty ledger for `claim`; the consumer's stake is untouched so far.
    #[must_use]
    pub fn new(claim: Claim, settlement_coin: Coin, consumer_stake: u128) -> Self {
        Self {
            claim,
            settlement_coin,
            mints: Vec::new(),
            burns: Vec::new(),
            mod_to_mod_transfers: Vec::new(),
            mod_to_acct_transfers: Vec::new(),
            events: Vec::new(),
            consumer_stake_after: consumer_stake,
        }
    }

    pub fn append_mint(&mut self, op: MintBurnOp) {
        self.mints.push(op);
    }

    pub fn append_burn(&mut self, op: MintBurnOp) {
        self.burns.push(op);
    }

    pub fn append_mod_to_mod_transfer(&mut self, op: ModToModTransfer) {
        self.mod_to_mod_transfers.push(op);
    }

    pub fn append_mod_to_acct_transfer(&mut self, op: ModToAcctTransfer) {
        self.mod_to_acct_transfers.push(op);
    }

    pub fn append_event(&mut self, event: SettlementEvent) {
        self.events.push(event);
    }

    /// Total number of queued operations.
    #[must_use]
    pub fn num_operations(&self) -> usize {
        self.mints.len()
            + self.burns.len()
            + self.mod_to_mod_transfers.len()
            + self.mod_to_acct_transfers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_operations() == 0 && self.events.is_empty()
    }

    pub fn total_minted(&self) -> Result<u128> {
        sum_coins(self.mints.iter().map(|op| &op.coin), "total minted")
    }

    pub fn total_burned(&self) -> Result<u128> {
        sum_coins(self.burns.iter().map(|op| &op.coin), "total burned")
    }

    /// Sum of everything paid out to ordinary accounts.
    pub fn total_paid_to_accounts(&self) -> Result<u128> {
        sum_coins(
            self.mod_to_acct_transfers.iter().map(|op| &op.coin),
            "total paid to accounts",
        )
    }
}

fn sum_coins<'a>(coins: impl Iterator<Item = &'a Coin>, context: &str) -> Result<u128> {
    coins
        .map(|c| c.amount)
        .try_fold(0u128, u128::checked_add)
        .ok_or_else(|| SettlementError::overflow(context))
}
