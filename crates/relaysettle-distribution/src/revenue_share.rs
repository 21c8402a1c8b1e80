//! Single-level revenue-share split of an operator's award.

use tracing::{debug, warn};

use relaysettle_types::constants::PERCENT_DENOMINATOR;
use relaysettle_types::{validate_revenue_shares, Address, Result, RevenueShare, SettlementError};

use crate::arith::{checked_sum, floor_mul, ratio};

/// Amount owed to one shareholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAmount {
    pub address: Address,
    pub amount: u128,
}

/// Split `total` across `operator`'s revenue-share table.
///
/// Each entry receives `floor(total * percentage / 100)`. Whatever flooring
/// leaves over goes entirely to the first entry in list order. The result
/// keeps the input order. Entries that come out as zero are kept here and
/// skipped by whoever queues the transfers.
pub fn compute_share_amounts(
    operator: &Address,
    shares: &[RevenueShare],
    total: u128,
) -> Result<Vec<ShareAmount>> {
    validate_revenue_shares(operator, shares)?;

    let mut amounts = Vec::with_capacity(shares.len());
    for share in shares {
        let fraction = ratio(u128::from(share.percentage), u128::from(PERCENT_DENOMINATOR))?;
        let amount = floor_mul(total, &fraction, "revenue share amount")?;
        if amount == 0 {
            warn!(
                shareholder = %share.address,
                percentage = share.percentage,
                total,
                "zero share amount for revenue share address"
            );
        }
        amounts.push(ShareAmount {
            address: share.address.clone(),
            amount,
        });
    }

    let distributed = checked_sum(amounts.iter().map(|s| &s.amount), "revenue share sum")?;
    let remainder = total
        .checked_sub(distributed)
        .ok_or_else(|| SettlementError::ConservationViolation {
            context: "revenue share".to_string(),
            expected: total,
            actual: distributed,
        })?;
    if remainder > 0 {
        if let Some(first) = amounts.first_mut() {
            debug!(
                shareholder = %first.address,
                remainder,
                "revenue share remainder to first shareholder"
            );
            first.amount += remainder;
        }
    }

    Ok(amounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaysettle_types::testutil::addr;

    fn table(entries: &[(&str, u64)]) -> Vec<RevenueShare> {
        entries
            .iter()
            .map(|(a, p)| RevenueShare::new(addr(a), *p))
            .collect()
    }

    #[test]
    fn dust_goes_to_first_listed() {
        let shares = table(&[("zeta", 50), ("alpha", 50)]);
        let out = compute_share_amounts(&addr("op"), &shares, 101).unwrap();
        assert_eq!(out[0].address, addr("zeta"));
        assert_eq!(out[0].amount, 51);
        assert_eq!(out[1].address, addr("alpha"));
        assert_eq!(out[1].amount, 50);
    }

    #[test]
    fn keeps_input_order() {
        let shares = table(&[("c", 20), ("a", 30), ("b", 50)]);
        let out = compute_share_amounts(&addr("op"), &shares, 1_000).unwrap();
        let order: Vec<&str> = out.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
        assert_eq!(out.iter().map(|s| s.amount).collect::<Vec<_>>(), [200, 300, 500]);
    }

    #[test]
    fn small_totals_can_zero_out_entries() {
        let shares = table(&[("a", 90), ("b", 10)]);
        let out = compute_share_amounts(&addr("op"), &shares, 5).unwrap();
        // floor(4.5) = 4, floor(0.5) = 0, remainder 1 -> a
        assert_eq!(out[0].amount, 5);
        assert_eq!(out[1].amount, 0);
    }

    #[test]
    fn sole_owner_gets_all() {
        let shares = table(&[("owner", 100)]);
        let out = compute_share_amounts(&addr("op"), &shares, 12_345).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].amount, 12_345);
    }

    #[test]
    fn empty_table_is_missing_revenue_share() {
        let err = compute_share_amounts(&addr("op"), &[], 10).unwrap_err();
        assert!(matches!(err, SettlementError::MissingRevenueShare { .. }));
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn invalid_table_rejected() {
        let shares = table(&[("a", 60), ("b", 60)]);
        let err = compute_share_amounts(&addr("op"), &shares, 10).unwrap_err();
        assert!(matches!(err, SettlementError::InvalidRevenueShare { .. }));
    }
}
