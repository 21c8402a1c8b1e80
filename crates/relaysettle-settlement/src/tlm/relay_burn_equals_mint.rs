//! Relay-Burn-Equals-Mint.
//!
//! The consumer pays exactly what the claim is worth: the settlement amount
//! is burned from the application escrow and the same amount is minted, so
//! total supply does not change. Where the minted amount goes depends on
//! global mint:
//!
//! - disabled: minted into the tokenomics pool and split per
//!   `claim_settlement_distribution`;
//! - enabled: minted into the supplier module and paid in full to the
//!   operator's shareholders. Proposer, source owner and treasury are paid
//!   out of the inflation instead.

use tracing::info;

use relaysettle_distribution::compute_share_amounts;
use relaysettle_types::{
    MintBurnOp, ModToAcctTransfer, ModuleAccount, Result, SettlementError, SettlementOpReason,
    TlmId,
};

use super::pool::{distribute_pool, PoolReasons};
use super::{TlmContext, TlmOutput, TokenLogicModule};

#[derive(Debug, Clone, Copy, Default)]
pub struct RelayBurnEqualsMint;

impl TokenLogicModule for RelayBurnEqualsMint {
    fn id(&self) -> TlmId {
        TlmId::RelayBurnEqualsMint
    }

    fn process(&self, ctx: &TlmContext<'_>) -> Result<TlmOutput> {
        let tlm = self.id();
        let amount = ctx.settlement_coin.amount;
        let mut out = TlmOutput::new();
        if amount == 0 {
            return Ok(out);
        }

        out.burns.push(MintBurnOp {
            reason: SettlementOpReason::RelayBurnEqualsMintApplicationStakeBurn,
            module: ModuleAccount::Application,
            coin: ctx.coin(amount),
        });
        out.consumer_stake_debit = amount;
        info!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            application = %ctx.claim.application,
            amount,
            "operation queued: burn from application stake"
        );

        if ctx.params.global_mint.is_enabled() {
            mint_to_supplier_shareholders(ctx, tlm, amount, &mut out)?;
        } else {
            mint_and_distribute(ctx, tlm, amount, &mut out)?;
        }

        let burned: u128 = out.burns.iter().map(|op| op.coin.amount).sum();
        let minted: u128 = out.mints.iter().map(|op| op.coin.amount).sum();
        if burned != minted {
            return Err(SettlementError::ConservationViolation {
                context: "relay burn equals mint".to_string(),
                expected: burned,
                actual: minted,
            });
        }

        Ok(out)
    }
}

/// Mint into the tokenomics pool and split it per the claim settlement table.
fn mint_and_distribute(
    ctx: &TlmContext<'_>,
    tlm: TlmId,
    amount: u128,
    out: &mut TlmOutput,
) -> Result<()> {
    out.mints.push(MintBurnOp {
        reason: SettlementOpReason::RelayBurnEqualsMintSupplierStakeMint,
        module: ModuleAccount::Tokenomics,
        coin: ctx.coin(amount),
    });
    info!(
        tlm = %tlm,
        session_id = %ctx.claim.session_id,
        amount,
        "operation queued: mint to tokenomics module"
    );

    let allocation = distribute_pool(
        ctx,
        tlm,
        amount,
        &ctx.params.claim_settlement_distribution,
        &PoolReasons::RELAY_BURN_EQUALS_MINT,
        out,
    )?;
    allocation.verify(amount, "relay burn equals mint distribution")
}

/// Mint into the supplier module and pay all of it to the operator's shareholders.
fn mint_to_supplier_shareholders(
    ctx: &TlmContext<'_>,
    tlm: TlmId,
    amount: u128,
    out: &mut TlmOutput,
) -> Result<()> {
    let operator = &ctx.claim.supplier_operator;
    let shares = compute_share_amounts(operator, ctx.revenue_shares, amount)?;

    out.mints.push(MintBurnOp {
        reason: SettlementOpReason::RelayBurnEqualsMintSupplierStakeMint,
        module: ModuleAccount::Supplier,
        coin: ctx.coin(amount),
    });
    info!(
        tlm = %tlm,
        session_id = %ctx.claim.session_id,
        amount,
        "operation queued: mint to supplier module"
    );

    for share in shares {
        if share.amount == 0 {
            continue;
        }
        info!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            operator = %operator,
            recipient = %share.address,
            amount = share.amount,
            "operation queued: supplier shareholder reward"
        );
        out.mod_to_acct_transfers.push(ModToAcctTransfer {
            reason: SettlementOpReason::RelayBurnEqualsMintSupplierShareholderRewardDistribution,
            sender: ModuleAccount::Supplier,
            coin: ctx.coin(share.amount),
            recipient: share.address,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaysettle_types::testutil::{addr, claim, service, sole_owner, MockStakeQuery};
    use relaysettle_types::{AllocationTable, Coin, EconomicParams, GlobalMintConfig, RevenueShare};
    use rust_decimal::Decimal;

    fn run(amount: u128, params: &EconomicParams, query: &MockStakeQuery) -> Result<TlmOutput> {
        run_with_shares(amount, params, query, &sole_owner("owner1"))
    }

    fn run_with_shares(
        amount: u128,
        params: &EconomicParams,
        query: &MockStakeQuery,
        shares: &[RevenueShare],
    ) -> Result<TlmOutput> {
        let claim = claim("s1", "svc1", "app1", "sup1", 10);
        let coin = Coin::new("upokt", amount);
        let service = service("svc1", "srcowner");
        let ctx = TlmContext {
            claim: &claim,
            settlement_coin: &coin,
            consumer_stake: 1_000_000,
            revenue_shares: shares,
            service: &service,
            params,
            stake_query: query,
        };
        RelayBurnEqualsMint.process(&ctx)
    }

    #[test]
    fn burn_equals_mint_equals_payout() {
        let q = MockStakeQuery::new().with_validator("val1", 10);
        let out = run(10_000, &EconomicParams::default(), &q).unwrap();
        assert_eq!(out.burns.len(), 1);
        assert_eq!(out.burns[0].module, ModuleAccount::Application);
        assert_eq!(out.burns[0].coin.amount, 10_000);
        assert_eq!(out.mints[0].coin.amount, 10_000);
        assert_eq!(out.consumer_stake_debit, 10_000);
        let paid: u128 = out.mod_to_acct_transfers.iter().map(|t| t.coin.amount).sum();
        assert_eq!(paid, 10_000);
    }

    #[test]
    fn supplier_only_table_pays_operator_shareholders() {
        let params = EconomicParams {
            claim_settlement_distribution: AllocationTable::supplier_only(),
            ..EconomicParams::default()
        };
        let out = run(777, &params, &MockStakeQuery::new()).unwrap();
        assert_eq!(out.mod_to_acct_transfers.len(), 1);
        assert_eq!(out.mod_to_acct_transfers[0].recipient, addr("owner1"));
        assert_eq!(out.mod_to_acct_transfers[0].sender, ModuleAccount::Supplier);
        assert_eq!(out.mod_to_acct_transfers[0].coin.amount, 777);
    }

    #[test]
    fn zero_settlement_is_noop() {
        let out = run(0, &EconomicParams::default(), &MockStakeQuery::new()).unwrap();
        assert!(out.is_empty());
    }

    fn global_mint_params() -> EconomicParams {
        EconomicParams {
            global_mint: GlobalMintConfig::Enabled {
                inflation_rate: Decimal::new(1, 1),
                mint_allocation: AllocationTable::default(),
            },
            ..EconomicParams::default()
        }
    }

    #[test]
    fn global_mint_enabled_pays_shareholders_in_full() {
        let q = MockStakeQuery::new().with_validator("val1", 10);
        let shares = vec![
            RevenueShare::new(addr("owner"), 60),
            RevenueShare::new(addr("partner"), 40),
        ];
        let out = run_with_shares(1_000, &global_mint_params(), &q, &shares).unwrap();

        assert_eq!(out.mints.len(), 1);
        assert_eq!(out.mints[0].module, ModuleAccount::Supplier);
        assert_eq!(out.mints[0].coin.amount, 1_000);
        assert!(out.mod_to_mod_transfers.is_empty());

        let payouts: Vec<(&str, u128)> = out
            .mod_to_acct_transfers
            .iter()
            .map(|t| (t.recipient.as_str(), t.coin.amount))
            .collect();
        assert_eq!(payouts, [("owner", 600), ("partner", 400)]);
        assert!(out.mod_to_acct_transfers.iter().all(|t| {
            t.sender == ModuleAccount::Supplier
                && t.reason
                    == SettlementOpReason::RelayBurnEqualsMintSupplierShareholderRewardDistribution
        }));
        assert_eq!(out.consumer_stake_debit, 1_000);
    }

    #[test]
    fn global_mint_enabled_ignores_validators() {
        // validator query failures cannot matter when nothing goes to proposers
        let q = MockStakeQuery::new().failing_validators();
        let out = run(1_000, &global_mint_params(), &q).unwrap();
        assert_eq!(out.mod_to_acct_transfers.len(), 1);
        assert_eq!(out.mod_to_acct_transfers[0].coin.amount, 1_000);
    }

    #[test]
    fn global_mint_enabled_still_requires_revenue_shares() {
        let err = run_with_shares(1_000, &global_mint_params(), &MockStakeQuery::new(), &[])
            .unwrap_err();
        assert!(matches!(err, SettlementError::MissingRevenueShare { .. }));
    }
}
