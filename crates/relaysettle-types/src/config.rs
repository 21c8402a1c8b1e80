//! Economic parameters for settlement.
//!
//! All fractions are `rust_decimal::Decimal` and serialize as strings, so a
//! configured `0.05` is exactly five hundredths. Nothing here touches `f64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, SettlementError};
use crate::Address;

// ---------------------------------------------------------------------------
// AllocationTable
// ---------------------------------------------------------------------------

/// Fractions of a pool routed to each class of recipient.
///
/// Every entry lies in `[0, 1]` and the entries sum to exactly 1. The
/// treasury receives whatever the floored shares of the others leave behind,
/// so its fraction is a floor, not a cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTable {
    pub supplier: Decimal,
    pub proposer: Decimal,
    pub source_owner: Decimal,
    /// Rebate to the consumer (application) that paid for the work.
    pub consumer: Decimal,
    pub treasury: Decimal,
}

impl AllocationTable {
    /// Check bounds and the sum-to-one rule. `name` labels the error.
    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: String| SettlementError::InvalidAllocation {
            table: name.to_string(),
            reason,
        };

        for (label, value) in self.entries() {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(invalid(format!("{label} = {value} is outside [0, 1]")));
            }
        }

        let sum = self
            .entries()
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, v)| acc.checked_add(*v))
            .ok_or_else(|| invalid("sum overflows".to_string()))?;
        if sum != Decimal::ONE {
            return Err(invalid(format!("entries sum to {sum}, expected 1")));
        }
        Ok(())
    }

    /// Labelled entries in a fixed order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, Decimal); 5] {
        [
            ("supplier", self.supplier),
            ("proposer", self.proposer),
            ("source_owner", self.source_owner),
            ("consumer", self.consumer),
            ("treasury", self.treasury),
        ]
    }

    /// Everything to the supplier's shareholders.
    #[must_use]
    pub fn supplier_only() -> Self {
        Self {
            supplier: Decimal::ONE,
            proposer: Decimal::ZERO,
            source_owner: Decimal::ZERO,
            consumer: Decimal::ZERO,
            treasury: Decimal::ZERO,
        }
    }
}

impl Default for AllocationTable {
    fn default() -> Self {
        Self {
            supplier: Decimal::new(7, 1),     // 0.7
            proposer: Decimal::new(5, 2),     // 0.05
            source_owner: Decimal::new(15, 2), // 0.15
            consumer: Decimal::ZERO,
            treasury: Decimal::new(1, 1),     // 0.1
        }
    }
}

// ---------------------------------------------------------------------------
// GlobalMintConfig
// ---------------------------------------------------------------------------

/// Whether claims also mint inflation on top of the settlement amount.
///
/// The inflation rate and its allocation table only exist when enabled, so a
/// disabled configuration cannot carry stale mint parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GlobalMintConfig {
    Disabled,
    Enabled {
        /// Minted per claim as a fraction of the settlement amount.
        inflation_rate: Decimal,
        mint_allocation: AllocationTable,
    },
}

impl GlobalMintConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Disabled => Ok(()),
            Self::Enabled {
                inflation_rate,
                mint_allocation,
            } => {
                let max = Decimal::from(constants::MAX_INFLATION_RATE);
                if *inflation_rate <= Decimal::ZERO || *inflation_rate > max {
                    return Err(SettlementError::InvalidParameter {
                        name: "inflation_rate".to_string(),
                        reason: format!("{inflation_rate} must be in (0, {max}]"),
                    });
                }
                mint_allocation.validate("mint_allocation")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// EconomicParams
// ---------------------------------------------------------------------------

/// Immutable economic parameters shared by every claim in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicParams {
    /// Only coins of this denomination are settled.
    pub denom: String,
    /// Receives residual allocations and reimbursement escrow.
    pub treasury_address: Address,
    /// How the settlement amount itself is split after burn-equals-mint.
    pub claim_settlement_distribution: AllocationTable,
    pub global_mint: GlobalMintConfig,
}

impl EconomicParams {
    pub fn validate(&self) -> Result<()> {
        if self.denom.is_empty() {
            return Err(SettlementError::InvalidParameter {
                name: "denom".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        self.claim_settlement_distribution
            .validate("claim_settlement_distribution")?;
        self.global_mint.validate()
    }

    /// Parse from JSON and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }
}

impl Default for EconomicParams {
    fn default() -> Self {
        Self {
            denom: constants::DEFAULT_DENOM.to_string(),
            treasury_address: Address::from_static(constants::DEFAULT_TREASURY_ADDRESS),
            claim_settlement_distribution: AllocationTable::default(),
            global_mint: GlobalMintConfig::Disabled,
        }
    }
}
