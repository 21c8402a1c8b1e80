//! Proportional reward calculation with the Largest Remainder Method.
//!
//! Given integer stake weights and an integer total, each recipient first
//! receives `floor(weight * total / sum(weights))`. The units lost to
//! flooring (always fewer than the number of recipients with a non-zero
//! fractional part) go one each to the recipients with the largest
//! fractional parts, ties broken by ascending address. The result always
//! sums to `total` and no recipient is more than one unit away from its
//! exact share.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use tracing::debug;

use relaysettle_types::{Address, Result, SettlementError};

use crate::arith::{checked_sum, ratio, split_floor, to_amount};
use crate::ordering::sort_by_fraction_desc;

/// Stake weight per stakeholder. Rebuilt for every distribution call.
pub type StakeWeightMap = BTreeMap<Address, u128>;

/// Distribute `total` across `weights` exactly.
///
/// `total == 0` maps every weight to zero. An empty or all-zero weight set
/// fails with `ZeroStakeWeight`; callers check for that before calling.
pub fn compute_rewards(weights: &StakeWeightMap, total: u128) -> Result<BTreeMap<Address, u128>> {
    if total == 0 {
        return Ok(weights.keys().map(|a| (a.clone(), 0)).collect());
    }

    let total_weight = checked_sum(weights.values(), "stake weight sum")?;
    if total_weight == 0 {
        return Err(SettlementError::ZeroStakeWeight);
    }

    let total_ratio = BigRational::from_integer(BigInt::from(total));
    let mut rewards = BTreeMap::new();
    let mut fractions = Vec::new();
    let mut distributed: u128 = 0;

    for (address, &weight) in weights {
        let exact = ratio(weight, total_weight)? * &total_ratio;
        let (whole, fraction) = split_floor(&exact);
        let base = to_amount(&whole, "base reward")?;
        distributed = distributed
            .checked_add(base)
            .ok_or_else(|| SettlementError::overflow("base reward sum"))?;
        if !fraction.is_zero() {
            fractions.push((address.clone(), fraction));
        }
        debug!(
            recipient = %address,
            weight,
            base,
            "base proportional reward"
        );
        rewards.insert(address.clone(), base);
    }

    let remainder = total
        .checked_sub(distributed)
        .ok_or_else(|| SettlementError::ConservationViolation {
            context: "proportional base rewards".to_string(),
            expected: total,
            actual: distributed,
        })?;

    // Flooring loses strictly less than one unit per fractional recipient.
    let remainder_units = usize::try_from(remainder)
        .ok()
        .filter(|&r| r <= fractions.len())
        .ok_or_else(|| {
            SettlementError::Internal(format!(
                "remainder {remainder} exceeds {} fractional recipients",
                fractions.len()
            ))
        })?;

    sort_by_fraction_desc(&mut fractions);
    for (address, _) in fractions.iter().take(remainder_units) {
        if let Some(reward) = rewards.get_mut(address) {
            *reward += 1;
            debug!(recipient = %address, "largest remainder unit");
        }
    }

    let actual = checked_sum(rewards.values(), "reward sum")?;
    if actual != total {
        return Err(SettlementError::ConservationViolation {
            context: "proportional rewards".to_string(),
            expected: total,
            actual,
        });
    }

    Ok(rewards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use relaysettle_types::testutil::addr;

    fn weights(entries: &[(&str, u128)]) -> StakeWeightMap {
        entries.iter().map(|(a, w)| (addr(a), *w)).collect()
    }

    #[test]
    fn equal_stakes_remainder_to_smallest_addresses() {
        let w = weights(&[("val3", 200_000), ("val1", 200_000), ("val2", 200_000)]);
        let r = compute_rewards(&w, 110_000).unwrap();
        assert_eq!(r[&addr("val1")], 36_667);
        assert_eq!(r[&addr("val2")], 36_667);
        assert_eq!(r[&addr("val3")], 36_666);
    }

    #[test]
    fn clean_ratio_is_exact() {
        let w = weights(&[("a", 500_000), ("b", 400_000), ("c", 200_000)]);
        let r = compute_rewards(&w, 110_000).unwrap();
        assert_eq!(r[&addr("a")], 50_000);
        assert_eq!(r[&addr("b")], 40_000);
        assert_eq!(r[&addr("c")], 20_000);
    }

    #[test]
    fn largest_fraction_wins_before_address() {
        // exact shares: a = 1.4, b = 1.6, total 3 -> b gets the extra unit
        let w = weights(&[("a", 7), ("b", 8)]);
        let r = compute_rewards(&w, 3).unwrap();
        assert_eq!(r[&addr("a")], 1);
        assert_eq!(r[&addr("b")], 2);
    }

    #[test]
    fn zero_total_maps_to_zero() {
        let w = weights(&[("a", 1), ("b", 2)]);
        let r = compute_rewards(&w, 0).unwrap();
        assert!(r.values().all(|v| *v == 0));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn zero_weight_is_error() {
        let w = weights(&[("a", 0), ("b", 0)]);
        assert!(matches!(
            compute_rewards(&w, 10),
            Err(SettlementError::ZeroStakeWeight)
        ));
        assert!(matches!(
            compute_rewards(&StakeWeightMap::new(), 10),
            Err(SettlementError::ZeroStakeWeight)
        ));
    }

    #[test]
    fn zero_weight_member_gets_nothing() {
        let w = weights(&[("a", 0), ("b", 3)]);
        let r = compute_rewards(&w, 10).unwrap();
        assert_eq!(r[&addr("a")], 0);
        assert_eq!(r[&addr("b")], 10);
    }

    #[test]
    fn huge_weights_stay_exact() {
        let w = weights(&[("a", u128::MAX / 3), ("b", u128::MAX / 3)]);
        let r = compute_rewards(&w, u128::MAX / 2).unwrap();
        assert_eq!(r.values().sum::<u128>(), u128::MAX / 2);
    }

    #[test]
    fn randomized_conservation_and_fairness() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let n = rng.gen_range(1..12);
            let mut w = StakeWeightMap::new();
            for i in 0..n {
                w.insert(addr(&format!("s{i}")), rng.gen_range(1..1_000_000u128));
            }
            let total = rng.gen_range(0..10_000_000u128);
            let r = compute_rewards(&w, total).unwrap();
            assert_eq!(r.values().sum::<u128>(), total);

            let total_weight: u128 = w.values().sum();
            for (a, weight) in &w {
                // |reward * W - weight * total| < W
                let lhs = r[a] * total_weight;
                let rhs = weight * total;
                assert!(lhs.abs_diff(rhs) < total_weight, "unfair share for {a}");
            }
        }
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut forward = StakeWeightMap::new();
        let mut backward = StakeWeightMap::new();
        let entries = [("x", 3u128), ("y", 3), ("z", 3), ("w", 1)];
        for (a, v) in entries {
            forward.insert(addr(a), v);
        }
        for (a, v) in entries.iter().rev() {
            backward.insert(addr(a), *v);
        }
        assert_eq!(
            compute_rewards(&forward, 1_001).unwrap(),
            compute_rewards(&backward, 1_001).unwrap()
        );
    }
}
