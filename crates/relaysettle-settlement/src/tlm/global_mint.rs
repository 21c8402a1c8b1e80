//! Global mint.
//!
//! Mints new tokens in proportion to each claim's settlement amount and
//! distributes them per `mint_allocation`. The matching reimbursement
//! module charges the consumer for the same amount.

use rust_decimal::Decimal;
use tracing::{debug, info};

use relaysettle_distribution::arith::ceil_mul_decimal;
use relaysettle_types::{
    AllocationTable, GlobalMintConfig, MintBurnOp, ModuleAccount, Result, SettlementError,
    SettlementOpReason, TlmId,
};

use super::pool::{distribute_pool, PoolReasons};
use super::{TlmContext, TlmOutput, TokenLogicModule};

/// Inflation minted for a claim: `ceil(settlement * inflation_rate)`.
///
/// Rounding up means any non-zero settlement mints at least one unit.
pub fn global_inflation_amount(settlement: u128, inflation_rate: Decimal) -> Result<u128> {
    ceil_mul_decimal(settlement, inflation_rate, "global inflation amount")
}

/// Inflation rate and table, or an error if global mint is disabled.
pub(crate) fn enabled_params(
    tlm: TlmId,
    config: &GlobalMintConfig,
) -> Result<(Decimal, &AllocationTable)> {
    match config {
        GlobalMintConfig::Enabled {
            inflation_rate,
            mint_allocation,
        } => Ok((*inflation_rate, mint_allocation)),
        GlobalMintConfig::Disabled => Err(SettlementError::ModuleParamsMismatch {
            reason: format!("{tlm} is configured but global mint is disabled"),
        }),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalMint;

impl TokenLogicModule for GlobalMint {
    fn id(&self) -> TlmId {
        TlmId::GlobalMint
    }

    fn process(&self, ctx: &TlmContext<'_>) -> Result<TlmOutput> {
        let tlm = self.id();
        let (inflation_rate, mint_allocation) = enabled_params(tlm, &ctx.params.global_mint)?;
        let mut out = TlmOutput::new();

        let minted = global_inflation_amount(ctx.settlement_coin.amount, inflation_rate)?;
        if minted == 0 {
            debug!(
                tlm = %tlm,
                session_id = %ctx.claim.session_id,
                "nothing to mint, skipping global mint"
            );
            return Ok(out);
        }

        out.mints.push(MintBurnOp {
            reason: SettlementOpReason::GlobalMintInflation,
            module: ModuleAccount::Tokenomics,
            coin: ctx.coin(minted),
        });
        info!(
            tlm = %tlm,
            session_id = %ctx.claim.session_id,
            settlement = ctx.settlement_coin.amount,
            inflation_rate = %inflation_rate,
            amount = minted,
            "operation queued: mint inflation to tokenomics module"
        );

        let allocation = distribute_pool(
            ctx,
            tlm,
            minted,
            mint_allocation,
            &PoolReasons::GLOBAL_MINT,
            &mut out,
        )?;
        allocation.verify(minted, "global mint distribution")?;

        Ok(out)
    }
}
