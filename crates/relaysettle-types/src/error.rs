//! Error types for the relaysettle settlement engine.
//!
//! All errors use the `STL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by class:
//! - 1xx: Configuration errors (fatal at startup)
//! - 2xx: Constraint violations (fatal for the affected claim or batch)
//! - 3xx: Collaborator errors
//! - 9xx: General / internal errors
//!
//! Recoverable anomalies (a failed delegation query, a zero-stake validator,
//! an allocation that rounds to zero) are never errors: they are logged and
//! a documented fallback applies.

use thiserror::Error;

use crate::{Address, ModuleAccount, TlmId};

/// Failure reported by the external stake-query collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stake query failed: {reason}")]
pub struct StakeQueryError {
    pub reason: String,
}

impl StakeQueryError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Central error enum for all settlement operations.
#[derive(Debug, Error)]
pub enum SettlementError {
    // =================================================================
    // Configuration Errors (1xx)
    // =================================================================
    /// Global-Mint and its reimbursement counterpart must be enabled together.
    #[error("STL_ERR_100: Module {present} is enabled without its counterpart {missing}")]
    MismatchedModulePair { present: TlmId, missing: TlmId },

    /// The same module appears twice in the configured module list.
    #[error("STL_ERR_101: Module {0} is configured more than once")]
    DuplicateModule(TlmId),

    /// The module list disagrees with the economic parameters.
    #[error("STL_ERR_102: Module set inconsistent with parameters: {reason}")]
    ModuleParamsMismatch { reason: String },

    /// An allocation table is malformed (entries outside [0, 1] or sum != 1).
    #[error("STL_ERR_103: Invalid allocation table `{table}`: {reason}")]
    InvalidAllocation { table: String, reason: String },

    /// A revenue-share table is malformed.
    #[error("STL_ERR_104: Invalid revenue share: {reason}")]
    InvalidRevenueShare { reason: String },

    /// An address failed validation.
    #[error("STL_ERR_105: Invalid address {value:?}: {reason}")]
    InvalidAddress { value: String, reason: String },

    /// A scalar parameter is out of range.
    #[error("STL_ERR_106: Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    // =================================================================
    // Constraint Violations (2xx)
    // =================================================================
    /// A distribution did not conserve its input total.
    #[error("STL_ERR_200: Conservation violated in {context}: expected {expected}, got {actual}")]
    ConservationViolation {
        context: String,
        expected: u128,
        actual: u128,
    },

    /// A stake subtraction would produce a negative value.
    #[error("STL_ERR_201: Stake of {address} cannot be reduced below zero: stake {stake}, debit {debit}")]
    NegativeStake {
        address: Address,
        stake: u128,
        debit: u128,
    },

    /// An integer operation overflowed its representation.
    #[error("STL_ERR_202: Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    /// Proportional distribution was requested over an all-zero weight set.
    #[error("STL_ERR_203: Total stake weight is zero; proportional distribution undefined")]
    ZeroStakeWeight,

    /// The operator has no revenue-share table for the claimed service.
    #[error("STL_ERR_204: No revenue share configured for operator {operator}")]
    MissingRevenueShare { operator: Address },

    /// Two coins of different denominations were combined.
    #[error("STL_ERR_205: Denomination mismatch: expected {expected}, got {actual}")]
    DenomMismatch { expected: String, actual: String },

    /// A module account finished a claim with a non-zero net balance.
    #[error("STL_ERR_206: Module account {module} not drained: net flow {net}")]
    PoolNotDrained { module: ModuleAccount, net: i128 },

    // =================================================================
    // Collaborator Errors (3xx)
    // =================================================================
    /// The bonded validator set could not be read.
    #[error("STL_ERR_300: {0}")]
    StakeQuery(#[from] StakeQueryError),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("STL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("STL_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

impl SettlementError {
    /// Whether this error belongs to the fatal startup configuration class.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MismatchedModulePair { .. }
                | Self::DuplicateModule(_)
                | Self::ModuleParamsMismatch { .. }
                | Self::InvalidAllocation { .. }
                | Self::InvalidRevenueShare { .. }
                | Self::InvalidAddress { .. }
                | Self::InvalidParameter { .. }
        )
    }

    /// Whether this error is a per-claim accounting constraint violation.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::ConservationViolation { .. }
                | Self::NegativeStake { .. }
                | Self::ArithmeticOverflow { .. }
                | Self::ZeroStakeWeight
                | Self::MissingRevenueShare { .. }
                | Self::DenomMismatch { .. }
                | Self::PoolNotDrained { .. }
        )
    }

    /// Shorthand for an overflow in the named computation.
    #[must_use]
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            context: context.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SettlementError>;

impl From<serde_json::Error> for SettlementError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
