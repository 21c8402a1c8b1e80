//! Module-account conservation check.
//!
//! Invariant enforced after every claim:
//! ```text
//! for every module account m other than the application escrow:
//!     mints(m) + transfers_in(m) == burns(m) + transfers_out(m)
//! ```
//!
//! Pools only pass value through; anything left behind in the supplier or
//! tokenomics module means a distribution dropped or invented tokens. The
//! application escrow is exempt because its outflow is the consumer's
//! payment. Every operation must also be in the settlement denomination.

use std::collections::BTreeMap;

use relaysettle_types::{Coin, ModuleAccount, Result, SettlementError};

use crate::result::SettlementResult;

/// Inflow and outflow per module account for one claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolConservation {
    inflow: BTreeMap<ModuleAccount, u128>,
    outflow: BTreeMap<ModuleAccount, u128>,
}

impl PoolConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every operation in `result`.
    pub fn from_result(result: &SettlementResult) -> Result<Self> {
        let denom = &result.settlement_coin;
        let mut tracker = Self::new();
        for op in &result.mints {
            denom.ensure_same_denom(&op.coin)?;
            tracker.record_inflow(op.module, &op.coin)?;
        }
        for op in &result.burns {
            denom.ensure_same_denom(&op.coin)?;
            tracker.record_outflow(op.module, &op.coin)?;
        }
        for op in &result.mod_to_mod_transfers {
            denom.ensure_same_denom(&op.coin)?;
            tracker.record_outflow(op.sender, &op.coin)?;
            tracker.record_inflow(op.recipient, &op.coin)?;
        }
        for op in &result.mod_to_acct_transfers {
            denom.ensure_same_denom(&op.coin)?;
            tracker.record_outflow(op.sender, &op.coin)?;
        }
        Ok(tracker)
    }

    pub fn record_inflow(&mut self, module: ModuleAccount, coin: &Coin) -> Result<()> {
        add(&mut self.inflow, module, coin.amount)
    }

    pub fn record_outflow(&mut self, module: ModuleAccount, coin: &Coin) -> Result<()> {
        add(&mut self.outflow, module, coin.amount)
    }

    #[must_use]
    pub fn inflow(&self, module: ModuleAccount) -> u128 {
        self.inflow.get(&module).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn outflow(&self, module: ModuleAccount) -> u128 {
        self.outflow.get(&module).copied().unwrap_or(0)
    }

    /// Inflow minus outflow.
    pub fn net(&self, module: ModuleAccount) -> Result<i128> {
        let inflow = i128::try_from(self.inflow(module))
            .map_err(|_| SettlementError::overflow("module inflow"))?;
        let outflow = i128::try_from(self.outflow(module))
            .map_err(|_| SettlementError::overflow("module outflow"))?;
        inflow
            .checked_sub(outflow)
            .ok_or_else(|| SettlementError::overflow("module net flow"))
    }

    /// Fails with `PoolNotDrained` for the first pass-through module whose
    /// net flow is not zero.
    pub fn check(&self) -> Result<()> {
        for module in ModuleAccount::ALL {
            if module == ModuleAccount::Application {
                continue;
            }
            let net = self.net(module)?;
            if net != 0 {
                return Err(SettlementError::PoolNotDrained { module, net });
            }
        }
        Ok(())
    }

    /// Tally `result` and check it.
    pub fn verify(result: &SettlementResult) -> Result<()> {
        Self::from_result(result)?.check()
    }
}

fn add(map: &mut BTreeMap<ModuleAccount, u128>, module: ModuleAccount, amount: u128) -> Result<()> {
    let entry = map.entry(module).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| SettlementError::overflow(format!("{module} flow")))?;
    Ok(())
}
