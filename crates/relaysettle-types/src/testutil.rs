//! Fixtures shared by unit and integration tests.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::error::StakeQueryError;
use crate::{
    Address, Claim, Delegation, RevenueShare, Service, ServiceId, SessionId, StakeQuery, Validator,
};

/// Parse an address, panicking on invalid input.
pub fn addr(raw: &str) -> Address {
    Address::parse(raw).unwrap_or_else(|e| panic!("bad test address {raw:?}: {e}"))
}

pub fn service(id: &str, owner: &str) -> Service {
    Service {
        id: ServiceId::new(id).unwrap_or_else(|e| panic!("bad service id: {e}")),
        owner_address: addr(owner),
        compute_units_per_relay: 1,
    }
}

pub fn claim(
    session: &str,
    service_id: &str,
    application: &str,
    supplier: &str,
    relays: u64,
) -> Claim {
    Claim {
        session_id: SessionId::new(session).unwrap_or_else(|e| panic!("bad session id: {e}")),
        service_id: ServiceId::new(service_id).unwrap_or_else(|e| panic!("bad service id: {e}")),
        application: addr(application),
        supplier_operator: addr(supplier),
        num_relays: relays,
        num_claimed_compute_units: relays,
    }
}

/// A single shareholder owning the whole operator reward.
pub fn sole_owner(owner: &str) -> Vec<RevenueShare> {
    vec![RevenueShare::new(addr(owner), 100)]
}

// ---------------------------------------------------------------------------
// MockStakeQuery
// ---------------------------------------------------------------------------

/// In-memory staking state with switchable failures.
#[derive(Debug, Clone, Default)]
pub struct MockStakeQuery {
    validators: Vec<Validator>,
    delegations: BTreeMap<String, Vec<Delegation>>,
    failing_delegations: BTreeSet<String>,
    fail_validators: bool,
}

impl MockStakeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator whose shares equal its bonded tokens (1:1 exchange rate).
    #[must_use]
    pub fn with_validator(mut self, operator: &str, bonded: u64) -> Self {
        self.validators.push(Validator {
            operator_address: operator.to_string(),
            bonded_tokens: u128::from(bonded),
            delegator_shares: Decimal::from(bonded),
        });
        self
    }

    /// Add a validator with an explicit share supply.
    #[must_use]
    pub fn with_validator_shares(mut self, operator: &str, bonded: u64, shares: Decimal) -> Self {
        self.validators.push(Validator {
            operator_address: operator.to_string(),
            bonded_tokens: u128::from(bonded),
            delegator_shares: shares,
        });
        self
    }

    #[must_use]
    pub fn with_delegation(mut self, operator: &str, delegator: &str, shares: Decimal) -> Self {
        self.delegations
            .entry(operator.to_string())
            .or_default()
            .push(Delegation {
                delegator_address: delegator.to_string(),
                shares,
            });
        self
    }

    /// Make `validator_delegations` fail for one operator.
    #[must_use]
    pub fn failing_delegations_for(mut self, operator: &str) -> Self {
        self.failing_delegations.insert(operator.to_string());
        self
    }

    /// Make `bonded_validators` fail.
    #[must_use]
    pub fn failing_validators(mut self) -> Self {
        self.fail_validators = true;
        self
    }
}

impl StakeQuery for MockStakeQuery {
    fn bonded_validators(&self) -> Result<Vec<Validator>, StakeQueryError> {
        if self.fail_validators {
            return Err(StakeQueryError::new("bonded validator store unavailable"));
        }
        Ok(self.validators.clone())
    }

    fn validator_delegations(
        &self,
        operator_address: &str,
    ) -> Result<Vec<Delegation>, StakeQueryError> {
        if self.failing_delegations.contains(operator_address) {
            return Err(StakeQueryError::new(format!(
                "delegations for {operator_address} unavailable"
            )));
        }
        Ok(self
            .delegations
            .get(operator_address)
            .cloned()
            .unwrap_or_default())
    }
}
