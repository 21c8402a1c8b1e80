//! # relaysettle-types
//!
//! Shared types, errors, and configuration for the **relaysettle** claim
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`SessionId`], [`ServiceId`], [`ModuleAccount`], [`TlmId`]
//! - **Value**: [`Coin`], [`SettlementCoin`]
//! - **Work model**: [`Claim`], [`Service`], [`RevenueShare`]
//! - **Operations**: [`MintBurnOp`], [`ModToModTransfer`], [`ModToAcctTransfer`], [`SettlementOpReason`], [`SettlementEvent`]
//! - **Staking view**: [`StakeQuery`], [`Validator`], [`Delegation`]
//! - **Configuration**: [`EconomicParams`], [`AllocationTable`], [`GlobalMintConfig`]
//! - **Errors**: [`SettlementError`] with `STL_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod claim;
pub mod coin;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod ops;
pub mod stake;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testutil;

// Re-export all primary types at crate root for ergonomic imports:
//   use relaysettle_types::{Address, Claim, Coin, SettlementError, ...};

pub use claim::*;
pub use coin::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use ops::*;
pub use stake::*;

// Constants are accessed via `relaysettle_types::constants::FOO`
// (not re-exported to avoid name collisions).
