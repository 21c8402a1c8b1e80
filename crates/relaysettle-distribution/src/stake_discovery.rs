//! Discovery of reward-eligible stakeholders.
//!
//! Walks the bonded validator set and each validator's delegations and
//! produces integer stake weights for validators and delegators. Broken
//! records are skipped and a failed delegation lookup falls back to paying
//! the validator on its whole bonded amount, so a single bad record never
//! halts settlement.

use std::collections::BTreeSet;

use num_bigint::BigInt;
use num_rational::BigRational;
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use relaysettle_types::{Address, Delegation, Result, SettlementError, StakeQuery, Validator};

use crate::arith::{decimal_to_ratio, to_amount};
use crate::ordering::sort_by_amount_desc;
use crate::proportional::StakeWeightMap;

/// Stakeholders found for one distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakeholderSet {
    /// Stake weight per stakeholder address.
    pub stakes: StakeWeightMap,
    /// Stake descending, address ascending. Transfers are queued in this order.
    pub sorted_desc: Vec<(Address, u128)>,
    /// Addresses that are validator accounts (the rest are delegators).
    pub validator_accounts: BTreeSet<Address>,
}

impl StakeholderSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    #[must_use]
    pub fn is_validator(&self, address: &Address) -> bool {
        self.validator_accounts.contains(address)
    }

    pub fn total_stake(&self) -> Result<u128> {
        crate::arith::checked_sum(self.stakes.values(), "total stakeholder stake")
    }
}

/// Collect stake weights for every stakeholder of `validators`.
pub fn discover_stakeholders(
    query: &dyn StakeQuery,
    validators: &[Validator],
) -> Result<StakeholderSet> {
    let mut stakes = StakeWeightMap::new();
    let mut validator_accounts = BTreeSet::new();

    for validator in validators {
        let Ok(account) = Address::parse(&validator.operator_address) else {
            error!(
                operator = %validator.operator_address,
                "failed to parse validator operator address, skipping"
            );
            continue;
        };

        if validator.bonded_tokens == 0 {
            warn!(
                operator = %validator.operator_address,
                "validator has zero bonded tokens, skipping"
            );
            continue;
        }
        validator_accounts.insert(account.clone());

        let delegations = match query.validator_delegations(&validator.operator_address) {
            Ok(delegations) => delegations,
            Err(err) => {
                warn!(
                    operator = %validator.operator_address,
                    error = %err,
                    bonded_tokens = validator.bonded_tokens,
                    "failed to get delegations, validator receives rewards on all bonded tokens"
                );
                accumulate(&mut stakes, account, validator.bonded_tokens)?;
                continue;
            }
        };

        if delegations.is_empty() {
            debug!(
                operator = %validator.operator_address,
                bonded_tokens = validator.bonded_tokens,
                "validator has no delegations, using bonded tokens as its stake"
            );
            accumulate(&mut stakes, account, validator.bonded_tokens)?;
            continue;
        }

        if validator.delegator_shares <= Decimal::ZERO {
            warn!(
                operator = %validator.operator_address,
                delegator_shares = %validator.delegator_shares,
                "validator has delegations but no share supply, using bonded tokens as its stake"
            );
            accumulate(&mut stakes, account, validator.bonded_tokens)?;
            continue;
        }

        collect_delegation_stakes(validator, &delegations, &mut stakes)?;
    }

    let mut sorted_desc: Vec<(Address, u128)> =
        stakes.iter().map(|(a, s)| (a.clone(), *s)).collect();
    sort_by_amount_desc(&mut sorted_desc);

    Ok(StakeholderSet {
        stakes,
        sorted_desc,
        validator_accounts,
    })
}

/// Convert each delegation's shares to tokens at the validator's exchange
/// rate (`shares * bonded_tokens / delegator_shares`, truncated).
fn collect_delegation_stakes(
    validator: &Validator,
    delegations: &[Delegation],
    stakes: &mut StakeWeightMap,
) -> Result<()> {
    let exchange_rate = BigRational::from_integer(BigInt::from(validator.bonded_tokens))
        / decimal_to_ratio(validator.delegator_shares);

    for delegation in delegations {
        let Ok(delegator) = Address::parse(&delegation.delegator_address) else {
            error!(
                delegator = %delegation.delegator_address,
                operator = %validator.operator_address,
                "failed to parse delegator address, skipping"
            );
            continue;
        };

        if delegation.shares <= Decimal::ZERO {
            warn!(
                delegator = %delegator,
                operator = %validator.operator_address,
                shares = %delegation.shares,
                "delegation has no positive shares, skipping"
            );
            continue;
        }

        let tokens = (decimal_to_ratio(delegation.shares) * &exchange_rate).trunc();
        let tokens = to_amount(&tokens.to_integer(), "delegated tokens")?;
        if tokens == 0 {
            warn!(
                delegator = %delegator,
                operator = %validator.operator_address,
                shares = %delegation.shares,
                "delegator has shares but zero delegated tokens, skipping"
            );
            continue;
        }

        debug!(
            delegator = %delegator,
            operator = %validator.operator_address,
            tokens,
            "delegation stake"
        );
        accumulate(stakes, delegator, tokens)?;
    }
    Ok(())
}

fn accumulate(stakes: &mut StakeWeightMap, address: Address, amount: u128) -> Result<()> {
    let entry = stakes.entry(address).or_insert(0);
    *entry = entry
        .checked_add(amount)
        .ok_or_else(|| SettlementError::overflow("stakeholder stake"))?;
    Ok(())
}
