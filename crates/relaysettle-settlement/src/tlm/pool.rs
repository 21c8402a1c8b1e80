//! Distribution of a freshly minted pool held by the tokenomics module.
//!
//! Shared by relay-burn-equals-mint and global mint. Given a pool amount and
//! an allocation table, each recipient class receives the floor of its
//! fraction and the treasury receives the rest:
//!
//! ```text
//! supplier     = floor(pool * supplier)      -> supplier module -> shareholders
//! proposer     = floor(pool * proposer)      -> validators and delegators (LRM)
//! source_owner = floor(pool * source_owner)  -> service owner
//! consumer     = floor(pool * consumer)      -> application
//! treasury     = pool - all of the above     -> treasury address
//! ```
//!
//! If nobody can receive the proposer share it is added to the treasury's.

use tracing::{debug, info, warn};

use relaysettle_distribution::arith::{checked_sum, floor_mul_decimal};
use relaysettle_distribution::{compute_rewards, compute_share_amounts, discover_stakeholders};
use relaysettle_types::{
    Address, AllocationTable, ModToAcctTransfer, ModToModTransfer, ModuleAccount, Result,
    SettlementError, SettlementOpReason, TlmId,
};

use super::{TlmContext, TlmOutput};

/// Reason tags a pool distribution stamps on its operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReasons {
    pub supplier_module_transfer: SettlementOpReason,
    pub supplier_shareholder: SettlementOpReason,
    pub validator: SettlementOpReason,
    pub delegator: SettlementOpReason,
    pub source_owner: SettlementOpReason,
    pub application: SettlementOpReason,
    pub treasury: SettlementOpReason,
}

impl PoolReasons {
    pub const RELAY_BURN_EQUALS_MINT: Self = Self {
        supplier_module_transfer: SettlementOpReason::RelayBurnEqualsMintSupplierRewardModuleTransfer,
        supplier_shareholder: SettlementOpReason::RelayBurnEqualsMintSupplierShareholderRewardDistribution,
        validator: SettlementOpReason::RelayBurnEqualsMintValidatorRewardDistribution,
        delegator: SettlementOpReason::RelayBurnEqualsMintDelegatorRewardDistribution,
        source_owner: SettlementOpReason::RelayBurnEqualsMintSourceOwnerRewardDistribution,
        application: SettlementOpReason::RelayBurnEqualsMintApplicationRewardDistribution,
        treasury: SettlementOpReason::RelayBurnEqualsMintTreasuryRewardDistribution,
    };

    pub const GLOBAL_MINT: Self = Self {
        supplier_module_transfer: SettlementOpReason::GlobalMintSupplierRewardModuleTransfer,
        supplier_shareholder: SettlementOpReason::GlobalMintSupplierShareholderRewardDistribution,
        validator: SettlementOpReason::GlobalMintValidatorRewardDistribution,
        delegator: SettlementOpReason::GlobalMintDelegatorRewardDistribution,
        source_owner: SettlementOpReason::GlobalMintSourceOwnerRewardDistribution,
        application: SettlementOpReason::GlobalMintApplicationRewardDistribution,
        treasury: SettlementOpReason::GlobalMintTreasuryRewardDistribution,
    };
}

/// Leaf amounts actually routed to each recipient class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolAllocation {
    pub supplier: u128,
    /// Paid to validators and delegators (zero when re-routed to treasury).
    pub proposer: u128,
    pub source_owner: u128,
    pub consumer: u128,
    pub treasury: u128,
}

impl PoolAllocation {
    pub fn total(&self) -> Result<u128> {
        checked_sum(
            &[
                self.supplier,
                self.proposer,
                self.source_owner,
                self.consumer,
                self.treasury,
            ],
            "pool allocation total",
        )
    }

    /// Fails with `ConservationViolation` unless the leaves sum to `pool`.
    pub fn verify(&self, pool: u128, context: &str) -> Result<()> {
        let actual = self.total()?;
        if actual != pool {
            return Err(SettlementError::ConservationViolation {
                context: context.to_string(),
                expected: pool,
                actual,
            });
        }
        Ok(())
    }
}

/// Queue the distribution of `pool` (held by the tokenomics module) into `out`.
pub fn distribute_pool(
    ctx: &TlmContext<'_>,
    tlm: TlmId,
    pool: u128,
    table: &AllocationTable,
    reasons: &PoolReasons,
    out: &mut TlmOutput,
) -> Result<PoolAllocation> {
    let supplier = floor_mul_decimal(pool, table.supplier, "supplier allocation")?;
    let proposer = floor_mul_decimal(pool, table.proposer, "proposer allocation")?;
    let source_owner = floor_mul_decimal(pool, table.source_owner, "source owner allocation")?;
    let consumer = floor_mul_decimal(pool, table.consumer, "consumer allocation")?;
    let allocated = checked_sum(&[supplier, proposer, source_owner, consumer], "pool allocation")?;
    let mut treasury = pool
        .checked_sub(allocated)
        .ok_or_else(|| SettlementError::ConservationViolation {
            context: format!("{tlm} pool allocation"),
            expected: pool,
            actual: allocated,
        })?;

    debug!(
        tlm = %tlm,
        session_id = %ctx.claim.session_id,
        pool,
        supplier,
        proposer,
        source_owner,
        consumer,
        treasury,
        "pool allocation"
    );

    if supplier > 0 {
        distribute_to_supplier(ctx, tlm, supplier, reasons, out)?;
    }

    let mut proposer_paid = 0;
    if proposer > 0 {
        if distribute_to_stakeholders(ctx, tlm, proposer, reasons, out)? {
            proposer_paid = proposer;
        } else {
            treasury = treasury
                .checked_add(proposer)
                .ok_or_else(|| SettlementError::overflow("treasury allocation"))?;
        }
    }

    if source_owner > 0 {
        queue_account_transfer(
            ctx,
            tlm,
            out,
            reasons.source_owner,
            &ctx.service.owner_address,
            source_owner,
            "service source owner",
        );
    }

    if consumer > 0 {
        queue_account_transfer(
            ctx,
            tlm,
            out,
            reasons.application,
            &ctx.claim.application,
            consumer,
            "application",
        );
    }

    if treasury > 0 {
        queue_account_transfer(
            ctx,
            tlm,
            out,
            reasons.treasury,
            &ctx.params.treasury_address,
            treasury,
            "treasury",
        );
    }

    Ok(PoolAllocation {
        supplier,
        proposer: proposer_paid,
        source_owner,
        consumer,
        treasury,
    })
}

/// Tokenomics -> supplier module, then supplier module -> each shareholder.
fn distribute_to_supplier(
    ctx: &TlmContext<'_>,
    tlm: TlmId,
    amount: u128,
    reasons: &PoolReasons,
    out: &mut TlmOutput,
) -> Result<()> {
    let operator = &ctx.claim.supplier_operator;
    let shares = compute_share_amounts(operator, ctx.revenue_shares, amount)?;

    out.mod_to_mod_transfers.push(ModToModTransfer {
        reason: reasons.supplier_module_transfer,
        sender: ModuleAccount::Tokenomics,
        recipient: ModuleAccount::Supplier,
        coin: ctx.coin(amount),
    });

    for share in shares {
        if share.amount == 0 {
            continue;
        }
        out.mod_to_acct_transfers.push(ModToAcctTransfer {
            reason: reasons.supplier_shareholder,
            sender: ModuleAccount::Supplier,
            recipient: share.address.clone(),
            coin: ctx.coin(share.amount),
        });
        info!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            operator = %operator,
            recipient = %share.address,
            amount = share.amount,
            "operation queued: supplier shareholder reward"
        );
    }
    Ok(())
}

/// Pay `amount` to every bonded stakeholder in proportion to stake.
///
/// Returns `false` if there was nobody to pay, leaving the caller to
/// re-route the amount.
fn distribute_to_stakeholders(
    ctx: &TlmContext<'_>,
    tlm: TlmId,
    amount: u128,
    reasons: &PoolReasons,
    out: &mut TlmOutput,
) -> Result<bool> {
    let validators = ctx.stake_query.bonded_validators()?;
    if validators.is_empty() {
        warn!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            amount,
            "SHOULD NEVER HAPPEN: no bonded validators, proposer share goes to treasury"
        );
        return Ok(false);
    }

    let stakeholders = discover_stakeholders(ctx.stake_query, &validators)?;
    if stakeholders.is_empty() || stakeholders.total_stake()? == 0 {
        warn!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            amount,
            num_validators = validators.len(),
            "SHOULD NEVER HAPPEN: no stakeholders found, proposer share goes to treasury"
        );
        return Ok(false);
    }

    let rewards = compute_rewards(&stakeholders.stakes, amount)?;
    for (address, stake) in &stakeholders.sorted_desc {
        let reward = rewards.get(address).copied().unwrap_or(0);
        if reward == 0 {
            debug!(
                tlm = %tlm,
                recipient = %address,
                stake,
                "SHOULD RARELY HAPPEN: stakeholder reward is zero, skipping"
            );
            continue;
        }
        let (reason, kind) = if stakeholders.is_validator(address) {
            (reasons.validator, "validator")
        } else {
            (reasons.delegator, "delegator")
        };
        out.mod_to_acct_transfers.push(ModToAcctTransfer {
            reason,
            sender: ModuleAccount::Tokenomics,
            recipient: address.clone(),
            coin: ctx.coin(reward),
        });
        info!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            recipient = %address,
            kind,
            stake,
            amount = reward,
            "operation queued: stakeholder reward"
        );
    }
    Ok(true)
}

fn queue_account_transfer(
    ctx: &TlmContext<'_>,
    tlm: TlmId,
    out: &mut TlmOutput,
    reason: SettlementOpReason,
    recipient: &Address,
    amount: u128,
    label: &str,
) {
    out.mod_to_acct_transfers.push(ModToAcctTransfer {
        reason,
        sender: ModuleAccount::Tokenomics,
        recipient: recipient.clone(),
        coin: ctx.coin(amount),
    });
    info!(
        tlm = %tlm,
        session_id = %ctx.claim.session_id,
        recipient = %recipient,
        amount,
        "operation queued: {label} reward"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaysettle_types::testutil::{addr, claim, service, sole_owner, MockStakeQuery};
    use relaysettle_types::{Claim, Coin, EconomicParams, RevenueShare, Service};
    use rust_decimal::Decimal;

    struct Fixture {
        claim: Claim,
        coin: Coin,
        shares: Vec<RevenueShare>,
        service: Service,
        params: EconomicParams,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                claim: claim("s1", "svc1", "app1", "sup1", 10),
                coin: Coin::new("upokt", 0),
                shares: sole_owner("owner1"),
                service: service("svc1", "srcowner"),
                params: EconomicParams::default(),
            }
        }

        fn ctx<'a>(&'a self, query: &'a MockStakeQuery) -> TlmContext<'a> {
            TlmContext {
                claim: &self.claim,
                settlement_coin: &self.coin,
                consumer_stake: 1_000_000,
                revenue_shares: &self.shares,
                service: &self.service,
                params: &self.params,
                stake_query: query,
            }
        }
    }

    fn paid_to(out: &TlmOutput, who: &str) -> u128 {
        out.mod_to_acct_transfers
            .iter()
            .filter(|t| t.recipient == addr(who))
            .map(|t| t.coin.amount)
            .sum()
    }

    #[test]
    fn default_table_split() {
        let f = Fixture::new();
        let q = MockStakeQuery::new().with_validator("val1", 100);
        let mut out = TlmOutput::new();
        let alloc = distribute_pool(
            &f.ctx(&q),
            TlmId::RelayBurnEqualsMint,
            1_000,
            &AllocationTable::default(),
            &PoolReasons::RELAY_BURN_EQUALS_MINT,
            &mut out,
        )
        .unwrap();
        assert_eq!(alloc.supplier, 700);
        assert_eq!(alloc.proposer, 50);
        assert_eq!(alloc.source_owner, 150);
        assert_eq!(alloc.treasury, 100);
        alloc.verify(1_000, "test").unwrap();

        assert_eq!(paid_to(&out, "owner1"), 700);
        assert_eq!(paid_to(&out, "val1"), 50);
        assert_eq!(paid_to(&out, "srcowner"), 150);
        assert_eq!(paid_to(&out, "pokt1dao_treasury"), 100);
        assert_eq!(out.mod_to_mod_transfers.len(), 1);
        assert_eq!(out.mod_to_mod_transfers[0].recipient, ModuleAccount::Supplier);
    }

    #[test]
    fn flooring_dust_goes_to_treasury() {
        let f = Fixture::new();
        let q = MockStakeQuery::new().with_validator("val1", 100);
        let mut out = TlmOutput::new();
        // 101: supplier 70, proposer 5, source owner 15, treasury 11
        let alloc = distribute_pool(
            &f.ctx(&q),
            TlmId::RelayBurnEqualsMint,
            101,
            &AllocationTable::default(),
            &PoolReasons::RELAY_BURN_EQUALS_MINT,
            &mut out,
        )
        .unwrap();
        assert_eq!(alloc.supplier, 70);
        assert_eq!(alloc.proposer, 5);
        assert_eq!(alloc.source_owner, 15);
        assert_eq!(alloc.treasury, 11);
        alloc.verify(101, "test").unwrap();
    }

    #[test]
    fn no_validators_reroutes_proposer_to_treasury() {
        let f = Fixture::new();
        let q = MockStakeQuery::new();
        let mut out = TlmOutput::new();
        let alloc = distribute_pool(
            &f.ctx(&q),
            TlmId::GlobalMint,
            1_000,
            &AllocationTable::default(),
            &PoolReasons::GLOBAL_MINT,
            &mut out,
        )
        .unwrap();
        assert_eq!(alloc.proposer, 0);
        assert_eq!(alloc.treasury, 150);
        alloc.verify(1_000, "test").unwrap();
        assert!(out
            .mod_to_acct_transfers
            .iter()
            .all(|t| t.reason != SettlementOpReason::GlobalMintValidatorRewardDistribution));
    }

    #[test]
    fn failed_validator_query_is_fatal() {
        let f = Fixture::new();
        let q = MockStakeQuery::new().failing_validators();
        let mut out = TlmOutput::new();
        let err = distribute_pool(
            &f.ctx(&q),
            TlmId::GlobalMint,
            1_000,
            &AllocationTable::default(),
            &PoolReasons::GLOBAL_MINT,
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, SettlementError::StakeQuery(_)));
    }

    #[test]
    fn validator_and_delegator_reasons_differ() {
        let f = Fixture::new();
        let q = MockStakeQuery::new()
            .with_validator("val1", 1_000)
            .with_delegation("val1", "val1", Decimal::from(500))
            .with_delegation("val1", "del1", Decimal::from(500));
        let mut out = TlmOutput::new();
        distribute_pool(
            &f.ctx(&q),
            TlmId::RelayBurnEqualsMint,
            1_000,
            &AllocationTable::default(),
            &PoolReasons::RELAY_BURN_EQUALS_MINT,
            &mut out,
        )
        .unwrap();
        let reason_for = |who: &str| {
            out.mod_to_acct_transfers
                .iter()
                .find(|t| t.recipient == addr(who))
                .map(|t| t.reason)
        };
        assert_eq!(
            reason_for("val1"),
            Some(SettlementOpReason::RelayBurnEqualsMintValidatorRewardDistribution)
        );
        assert_eq!(
            reason_for("del1"),
            Some(SettlementOpReason::RelayBurnEqualsMintDelegatorRewardDistribution)
        );
        assert_eq!(paid_to(&out, "val1") + paid_to(&out, "del1"), 50);
    }

    #[test]
    fn zero_allocations_are_not_queued() {
        let f = Fixture::new();
        let q = MockStakeQuery::new();
        let mut out = TlmOutput::new();
        distribute_pool(
            &f.ctx(&q),
            TlmId::RelayBurnEqualsMint,
            1_000,
            &AllocationTable::supplier_only(),
            &PoolReasons::RELAY_BURN_EQUALS_MINT,
            &mut out,
        )
        .unwrap();
        assert_eq!(out.mod_to_acct_transfers.len(), 1);
        assert_eq!(paid_to(&out, "owner1"), 1_000);
    }

    #[test]
    fn missing_revenue_share_is_fatal() {
        let mut f = Fixture::new();
        f.shares.clear();
        let q = MockStakeQuery::new();
        let mut out = TlmOutput::new();
        let err = distribute_pool(
            &f.ctx(&q),
            TlmId::RelayBurnEqualsMint,
            1_000,
            &AllocationTable::default(),
            &PoolReasons::RELAY_BURN_EQUALS_MINT,
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, SettlementError::MissingRevenueShare { .. }));
    }
}
