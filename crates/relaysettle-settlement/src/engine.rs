//! Settlement orchestrator.
//!
//! Runs the configured token logic modules over each claim, merges their
//! outputs into one [`SettlementResult`], applies consumer stake debits, and
//! checks that every pass-through module account ends the claim empty.
//!
//! ```text
//! ClaimSettlement ──► TlmContext ──► [RBEM, GM, GMRR] ──► merge ──► debit ──► conservation ──► SettlementResult
//! ```
//!
//! Any error aborts the claim without a partial result. In a batch, the
//! first error aborts the batch.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use relaysettle_types::{
    Claim, Coin, EconomicParams, Result, RevenueShare, Service, SettlementError,
    SettlementEvent, StakeQuery, TlmId,
};

use crate::aggregation::SettlementResults;
use crate::conservation::PoolConservation;
use crate::module_set::validate_module_set;
use crate::result::SettlementResult;
use crate::tlm::{default_module_ids, module_for, TlmContext, TlmOutput, TokenLogicModule};

/// One claim plus everything needed to settle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSettlement {
    pub claim: Claim,
    /// Pre-computed value of the claim in the settlement denomination.
    pub settlement_coin: Coin,
    /// Consumer's escrowed stake before settlement.
    pub consumer_stake: u128,
    /// Operator's revenue-share table for the claimed service.
    pub revenue_shares: Vec<RevenueShare>,
    pub service: Service,
}

/// Settles claims through an ordered list of token logic modules.
pub struct SettlementEngine {
    params: EconomicParams,
    modules: Vec<Box<dyn TokenLogicModule>>,
}

impl SettlementEngine {
    /// Validate `params` and `modules` together and build the engine.
    pub fn new(params: EconomicParams, modules: Vec<Box<dyn TokenLogicModule>>) -> Result<Self> {
        params.validate()?;
        let ids: Vec<TlmId> = modules.iter().map(|m| m.id()).collect();
        validate_module_set(&ids, &params.global_mint)?;
        info!(
            modules = ?ids,
            denom = %params.denom,
            global_mint = params.global_mint.is_enabled(),
            "settlement engine configured"
        );
        Ok(Self { params, modules })
    }

    /// Engine with the modules implied by `params.global_mint`.
    pub fn with_default_modules(params: EconomicParams) -> Result<Self> {
        let modules = default_module_ids(&params.global_mint)
            .into_iter()
            .map(module_for)
            .collect();
        Self::new(params, modules)
    }

    /// Engine running exactly `ids`, in that order.
    pub fn with_module_ids(params: EconomicParams, ids: &[TlmId]) -> Result<Self> {
        let modules = ids.iter().copied().map(module_for).collect();
        Self::new(params, modules)
    }

    #[must_use]
    pub fn params(&self) -> &EconomicParams {
        &self.params
    }

    #[must_use]
    pub fn module_ids(&self) -> Vec<TlmId> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    /// Settle one claim.
    pub fn settle_claim(
        &self,
        input: ClaimSettlement,
        stake_query: &dyn StakeQuery,
    ) -> Result<SettlementResult> {
        let ClaimSettlement {
            claim,
            settlement_coin,
            consumer_stake,
            revenue_shares,
            service,
        } = input;

        if settlement_coin.denom != self.params.denom {
            return Err(SettlementError::DenomMismatch {
                expected: self.params.denom.clone(),
                actual: settlement_coin.denom,
            });
        }
        if service.id != claim.service_id {
            return Err(SettlementError::InvalidParameter {
                name: "service".to_string(),
                reason: format!(
                    "service {} does not match claimed service {}",
                    service.id, claim.service_id
                ),
            });
        }

        let (settlement_coin, overserviced) = cap_to_stake(&claim, settlement_coin, consumer_stake);

        if settlement_coin.is_zero() {
            debug!(
                session_id = %claim.session_id,
                supplier = %claim.supplier_operator,
                "zero settlement amount, nothing to settle"
            );
            let mut result = SettlementResult::new(claim, settlement_coin, consumer_stake);
            if let Some(event) = overserviced {
                result.append_event(event);
            }
            return Ok(result);
        }

        let ctx = TlmContext {
            claim: &claim,
            settlement_coin: &settlement_coin,
            consumer_stake,
            revenue_shares: &revenue_shares,
            service: &service,
            params: &self.params,
            stake_query,
        };

        let mut outputs = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            let output = module.process(&ctx)?;
            debug!(
                tlm = %module.id(),
                session_id = %claim.session_id,
                debit = output.consumer_stake_debit,
                "module processed"
            );
            outputs.push(output);
        }

        let mut result = SettlementResult::new(claim, settlement_coin, consumer_stake);
        if let Some(event) = overserviced {
            result.append_event(event);
        }
        for output in outputs {
            merge_output(&mut result, output)?;
        }

        PoolConservation::verify(&result)?;

        info!(
            session_id = %result.claim.session_id,
            service_id = %result.claim.service_id,
            application = %result.claim.application,
            supplier = %result.claim.supplier_operator,
            settlement = %result.settlement_coin,
            operations = result.num_operations(),
            consumer_stake_after = result.consumer_stake_after,
            "claim settled"
        );
        Ok(result)
    }

    /// Settle claims in order. The first error aborts the whole batch.
    pub fn settle_batch(
        &self,
        claims: impl IntoIterator<Item = ClaimSettlement>,
        stake_query: &dyn StakeQuery,
    ) -> Result<SettlementResults> {
        let mut results = SettlementResults::new();
        for claim in claims {
            results.push(self.settle_claim(claim, stake_query)?);
        }
        info!(
            num_claims = results.num_claims(),
            "settlement batch complete"
        );
        Ok(results)
    }
}

/// Limit the settlement to what the consumer has staked.
///
/// An operator that served more than the consumer can pay did that work for
/// free: only the stake is settled and an `ApplicationOverserviced` event
/// records the difference.
fn cap_to_stake(
    claim: &Claim,
    settlement_coin: Coin,
    consumer_stake: u128,
) -> (Coin, Option<SettlementEvent>) {
    if consumer_stake >= settlement_coin.amount {
        return (settlement_coin, None);
    }
    let effective = settlement_coin.with_amount(consumer_stake);
    warn!(
        session_id = %claim.session_id,
        application = %claim.application,
        expected_burn = %settlement_coin,
        effective_burn = %effective,
        "application was over-serviced, settling its remaining stake instead of the claimed amount"
    );
    let event = SettlementEvent::ApplicationOverserviced {
        application: claim.application.clone(),
        expected_burn: settlement_coin,
        effective_burn: effective.clone(),
    };
    (effective, Some(event))
}

/// Append a module's output and apply its consumer stake debit.
fn merge_output(result: &mut SettlementResult, output: TlmOutput) -> Result<()> {
    let TlmOutput {
        mints,
        burns,
        mod_to_mod_transfers,
        mod_to_acct_transfers,
        events,
        consumer_stake_debit,
    } = output;

    for op in mints {
        result.append_mint(op);
    }
    for op in burns {
        result.append_burn(op);
    }
    for op in mod_to_mod_transfers {
        result.append_mod_to_mod_transfer(op);
    }
    for op in mod_to_acct_transfers {
        result.append_mod_to_acct_transfer(op);
    }
    for event in events {
        result.append_event(event);
    }

    if consumer_stake_debit > 0 {
        let previous = result.consumer_stake_after;
        let remaining = previous.checked_sub(consumer_stake_debit).ok_or_else(|| {
            SettlementError::NegativeStake {
                address: result.claim.application.clone(),
                stake: previous,
                debit: consumer_stake_debit,
            }
        })?;
        result.consumer_stake_after = remaining;
        result.append_event(SettlementEvent::ConsumerStakeDebited {
            consumer: result.claim.application.clone(),
            previous,
            debit: consumer_stake_debit,
            remaining,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaysettle_types::testutil::{claim, service, sole_owner, MockStakeQuery};
    use relaysettle_types::{AllocationTable, GlobalMintConfig};
    use rust_decimal::Decimal;

    fn input(amount: u128, stake: u128) -> ClaimSettlement {
        ClaimSettlement {
            claim: claim("s1", "svc1", "app1", "sup1", 10),
            settlement_coin: Coin::new("upokt", amount),
            consumer_stake: stake,
            revenue_shares: sole_owner("owner1"),
            service: service("svc1", "srcowner"),
        }
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
    fn default_modules() {
        let e = SettlementEngine::with_default_modules(EconomicParams::default()).unwrap();
        assert_eq!(e.module_ids(), vec![TlmId::RelayBurnEqualsMint]);
        let e = SettlementEngine::with_default_modules(global_mint_params()).unwrap();
        assert_eq!(e.module_ids().len(), 3);
    }

    #[test]
    fn rejects_inconsistent_modules() {
        let err = SettlementEngine::with_module_ids(
            EconomicParams::default(),
            &[TlmId::RelayBurnEqualsMint, TlmId::GlobalMint],
        )
        .err()
        .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn rejects_invalid_params() {
        let mut params = EconomicParams::default();
        params.claim_settlement_distribution.supplier = Decimal::ONE;
        assert!(SettlementEngine::with_default_modules(params).is_err());
    }

    #[test]
    fn zero_settlement_yields_empty_result() {
        let e = SettlementEngine::with_default_modules(global_mint_params()).unwrap();
        let r = e.settle_claim(input(0, 10), &MockStakeQuery::new()).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.consumer_stake_after, 10);
    }

    #[test]
    fn debits_consumer_stake() {
        let e = SettlementEngine::with_default_modules(global_mint_params()).unwrap();
        let q = MockStakeQuery::new().with_validator("val1", 10);
        let r = e.settle_claim(input(1_000, 5_000), &q).unwrap();
        // burn 1000 + reimbursement 100
        assert_eq!(r.consumer_stake_after, 3_900);
        let debits = r
            .events
            .iter()
            .filter(|ev| matches!(ev, SettlementEvent::ConsumerStakeDebited { .. }))
            .count();
        assert_eq!(debits, 2);
    }

    #[test]
    fn insufficient_stake_is_negative_stake() {
        let e = SettlementEngine::with_default_modules(global_mint_params()).unwrap();
        let q = MockStakeQuery::new().with_validator("val1", 10);
        let err = e.settle_claim(input(1_000, 1_050), &q).unwrap_err();
        assert!(matches!(
            err,
            SettlementError::NegativeStake {
                stake: 50,
                debit: 100,
                ..
            }
        ));
    }

    #[test]
    fn wrong_denom_rejected() {
        let e = SettlementEngine::with_default_modules(EconomicParams::default()).unwrap();
        let mut i = input(100, 1_000);
        i.settlement_coin = Coin::new("uother", 100);
        let err = e.settle_claim(i, &MockStakeQuery::new()).unwrap_err();
        assert!(matches!(err, SettlementError::DenomMismatch { .. }));
    }

    #[test]
    fn mismatched_service_rejected() {
        let e = SettlementEngine::with_default_modules(EconomicParams::default()).unwrap();
        let mut i = input(100, 1_000);
        i.service = service("svc2", "srcowner");
        assert!(e.settle_claim(i, &MockStakeQuery::new()).is_err());
    }

    #[test]
    fn batch_aborts_on_first_error() {
        let e = SettlementEngine::with_default_modules(EconomicParams::default()).unwrap();
        let q = MockStakeQuery::new().with_validator("val1", 10);
        let mut bad = input(100, 1_000);
        bad.revenue_shares.clear();
        let err = e
            .settle_batch(vec![input(100, 1_000), bad, input(100, 1_000)], &q)
            .unwrap_err();
        assert!(matches!(err, SettlementError::MissingRevenueShare { .. }));
    }

    #[test]
    fn overserviced_application_settles_remaining_stake() {
        let e = SettlementEngine::with_default_modules(EconomicParams::default()).unwrap();
        let q = MockStakeQuery::new().with_validator("val1", 10);
        let r = e.settle_claim(input(1_000, 600), &q).unwrap();

        assert_eq!(r.settlement_coin.amount, 600);
        assert_eq!(r.total_burned().unwrap(), 600);
        assert_eq!(r.total_paid_to_accounts().unwrap(), 600);
        assert_eq!(r.consumer_stake_after, 0);
        assert_eq!(
            r.events[0],
            SettlementEvent::ApplicationOverserviced {
                application: r.claim.application.clone(),
                expected_burn: Coin::new("upokt", 1_000),
                effective_burn: Coin::new("upokt", 600),
            }
        );
    }

    #[test]
    fn fully_staked_application_is_not_overserviced() {
        let e = SettlementEngine::with_default_modules(EconomicParams::default()).unwrap();
        let q = MockStakeQuery::new().with_validator("val1", 10);
        let r = e.settle_claim(input(1_000, 1_000), &q).unwrap();
        assert!(!r
            .events
            .iter()
            .any(|ev| matches!(ev, SettlementEvent::ApplicationOverserviced { .. })));
    }

    #[test]
    fn overserviced_with_no_stake_left_is_empty_but_reported() {
        let e = SettlementEngine::with_default_modules(EconomicParams::default()).unwrap();
        let r = e.settle_claim(input(1_000, 0), &MockStakeQuery::new()).unwrap();
        assert_eq!(r.num_operations(), 0);
        assert_eq!(r.events.len(), 1);
        assert!(matches!(
            r.events[0],
            SettlementEvent::ApplicationOverserviced { .. }
        ));
    }
}
