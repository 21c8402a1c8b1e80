//! Token logic modules.
//!
//! A module reads one immutable [`TlmContext`] and returns a [`TlmOutput`]
//! describing what it wants queued. Modules never see each other's output
//! and never mutate shared state; the engine merges outputs in configured
//! order. Because every module reads the same pre-settlement snapshot, the
//! merged per-recipient totals do not depend on module order.

pub mod global_mint;
pub mod pool;
pub mod reimbursement;
pub mod relay_burn_equals_mint;

use relaysettle_types::{
    Claim, Coin, EconomicParams, GlobalMintConfig, MintBurnOp, ModToAcctTransfer,
    ModToModTransfer, Result, RevenueShare, Service, SettlementEvent, StakeQuery, TlmId,
};

pub use global_mint::GlobalMint;
pub use reimbursement::GlobalMintReimbursementRequest;
pub use relay_burn_equals_mint::RelayBurnEqualsMint;

/// Read-only inputs for one module invocation.
#[derive(Clone, Copy)]
pub struct TlmContext<'a> {
    pub claim: &'a Claim,
    pub settlement_coin: &'a Coin,
    /// Consumer's escrowed stake before this claim settled.
    pub consumer_stake: u128,
    pub revenue_shares: &'a [RevenueShare],
    pub service: &'a Service,
    pub params: &'a EconomicParams,
    pub stake_query: &'a dyn StakeQuery,
}

impl TlmContext<'_> {
    /// Coin in the settlement denomination.
    #[must_use]
    pub fn coin(&self, amount: u128) -> Coin {
        self.settlement_coin.with_amount(amount)
    }
}

/// What one module asks the engine to record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlmOutput {
    pub mints: Vec<MintBurnOp>,
    pub burns: Vec<MintBurnOp>,
    pub mod_to_mod_transfers: Vec<ModToModTransfer>,
    pub mod_to_acct_transfers: Vec<ModToAcctTransfer>,
    pub events: Vec<SettlementEvent>,
    /// Amount to take from the consumer's escrowed stake.
    pub consumer_stake_debit: u128,
}

impl TlmOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mints.is_empty()
            && self.burns.is_empty()
            && self.mod_to_mod_transfers.is_empty()
            && self.mod_to_acct_transfers.is_empty()
            && self.events.is_empty()
            && self.consumer_stake_debit == 0
    }
}

/// A pluggable settlement rule.
pub trait TokenLogicModule {
    fn id(&self) -> TlmId;

    fn process(&self, ctx: &TlmContext<'_>) -> Result<TlmOutput>;
}

/// Build a module by id.
#[must_use]
pub fn module_for(id: TlmId) -> Box<dyn TokenLogicModule> {
    match id {
        TlmId::RelayBurnEqualsMint => Box::new(RelayBurnEqualsMint),
        TlmId::GlobalMint => Box::new(GlobalMint),
        TlmId::GlobalMintReimbursementRequest => Box::new(GlobalMintReimbursementRequest),
    }
}

/// Modules implied by a global-mint configuration.
#[must_use]
pub fn default_module_ids(global_mint: &GlobalMintConfig) -> Vec<TlmId> {
    match global_mint {
        GlobalMintConfig::Disabled => vec![TlmId::RelayBurnEqualsMint],
        GlobalMintConfig::Enabled { .. } => vec![
            TlmId::RelayBurnEqualsMint,
            TlmId::GlobalMint,
            TlmId::GlobalMintReimbursementRequest,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaysettle_types::AllocationTable;
    use rust_decimal::Decimal;

    #[test]
    fn default_modules_follow_global_mint() {
        assert_eq!(
            default_module_ids(&GlobalMintConfig::Disabled),
            vec![TlmId::RelayBurnEqualsMint]
        );
        let enabled = GlobalMintConfig::Enabled {
            inflation_rate: Decimal::new(1, 1),
            mint_allocation: AllocationTable::default(),
        };
        assert_eq!(default_module_ids(&enabled).len(), 3);
    }

    #[test]
    fn module_for_reports_its_id() {
        for id in [
            TlmId::RelayBurnEqualsMint,
            TlmId::GlobalMint,
            TlmId::GlobalMintReimbursementRequest,
        ] {
            assert_eq!(module_for(id).id(), id);
        }
    }

    #[test]
    fn empty_output() {
        assert!(TlmOutput::new().is_empty());
        let out = TlmOutput {
            consumer_stake_debit: 1,
            ..TlmOutput::default()
        };
        assert!(!out.is_empty());
    }
}
