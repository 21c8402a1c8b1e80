//! Claims, services, and operator revenue-share tables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::PERCENT_DENOMINATOR;
use crate::error::{Result, SettlementError};
use crate::{Address, ServiceId, SessionId};

/// A verified unit of completed service work, submitted by an operator.
///
/// Claims are immutable once built; the engine only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub session_id: SessionId,
    pub service_id: ServiceId,
    /// Consumer whose escrowed stake pays for the work.
    pub application: Address,
    /// Operator (supplier) that performed the work.
    pub supplier_operator: Address,
    pub num_relays: u64,
    pub num_claimed_compute_units: u64,
}

/// Service metadata needed to pay the service's source owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub owner_address: Address,
    pub compute_units_per_relay: u64,
}

/// One entry in an operator's revenue-share table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueShare {
    pub address: Address,
    /// Whole percent, `0..=100`.
    pub percentage: u64,
}

impl RevenueShare {
    #[must_use]
    pub fn new(address: Address, percentage: u64) -> Self {
        Self {
            address,
            percentage,
        }
    }
}

/// Validate a revenue-share table.
///
/// An empty table is a `MissingRevenueShare` constraint violation for the
/// operator. Otherwise addresses must be unique and percentages must sum to
/// exactly [`PERCENT_DENOMINATOR`].
pub fn validate_revenue_shares(operator: &Address, shares: &[RevenueShare]) -> Result<()> {
    if shares.is_empty() {
        return Err(SettlementError::MissingRevenueShare {
            operator: operator.clone(),
        });
    }

    let mut seen = BTreeSet::new();
    let mut total: u64 = 0;
    for share in shares {
        if !seen.insert(&share.address) {
            return Err(SettlementError::InvalidRevenueShare {
                reason: format!("duplicate shareholder {}", share.address),
            });
        }
        total = total
            .checked_add(share.percentage)
            .ok_or_else(|| SettlementError::InvalidRevenueShare {
                reason: "percentage sum overflows".to_string(),
            })?;
    }

    if total != PERCENT_DENOMINATOR {
        return Err(SettlementError::InvalidRevenueShare {
            reason: format!(
                "percentages for operator {operator} sum to {total}, expected {PERCENT_DENOMINATOR}"
            ),
        });
    }
    Ok(())
}
