//! Token amounts.
//!
//! A [`Coin`] is an unsigned integer amount in a named denomination. Amounts
//! are never negative and coins of different denominations never combine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettlementError};

/// An amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

/// The coin a claim settles for (already priced by the caller).
pub type SettlementCoin = Coin;

impl Coin {
    #[must_use]
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Same denomination, different amount.
    #[must_use]
    pub fn with_amount(&self, amount: u128) -> Self {
        Self::new(self.denom.clone(), amount)
    }

    /// Fails with `DenomMismatch` unless `other` shares this coin's denomination.
    pub fn ensure_same_denom(&self, other: &Self) -> Result<()> {
        if self.denom == other.denom {
            Ok(())
        } else {
            Err(SettlementError::DenomMismatch {
                expected: self.denom.clone(),
                actual: other.denom.clone(),
            })
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
