//! Read-only view of the staking subsystem.
//!
//! Records carry raw address strings as stored by the staking collaborator;
//! stake discovery parses them and skips the ones that do not validate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StakeQueryError;

/// A bonded validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator address; doubles as the validator's reward account.
    pub operator_address: String,
    /// Tokens bonded to the validator, including delegations.
    pub bonded_tokens: u128,
    /// Total delegation shares issued by the validator.
    pub delegator_shares: Decimal,
}

/// A delegation to one validator, in shares of that validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator_address: String,
    pub shares: Decimal,
}

/// Stake lookups needed to pay validators and delegators.
///
/// A failed `bonded_validators` call aborts settlement of the claim. A
/// failed `validator_delegations` call is recovered by treating the whole
/// bonded amount as the validator's own stake.
pub trait StakeQuery {
    fn bonded_validators(&self) -> Result<Vec<Validator>, StakeQueryError>;

    fn validator_delegations(
        &self,
        operator_address: &str,
    ) -> Result<Vec<Delegation>, StakeQueryError>;
}
