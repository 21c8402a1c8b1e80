//! # relaysettle-distribution
//!
//! Exact integer distribution primitives for the **relaysettle** settlement
//! engine. No floating point is used anywhere in this crate.
//!
//! - [`arith`]: rational arithmetic helpers (`Decimal` to `BigRational`, floor / ceil products)
//! - [`ordering`]: deterministic total orders over recipients
//! - [`proportional`]: stake-weighted distribution with the Largest Remainder Method
//! - [`revenue_share`]: percentage split of an operator's award among its shareholders
//! - [`stake_discovery`]: validators and delegators eligible for proposer rewards

pub mod arith;
pub mod ordering;
pub mod proportional;
pub mod revenue_share;
pub mod stake_discovery;

pub use proportional::{compute_rewards, StakeWeightMap};
pub use revenue_share::{compute_share_amounts, ShareAmount};
pub use stake_discovery::{discover_stakeholders, StakeholderSet};
