//! # relaysettle-settlement
//!
//! **Settlement plane**: token logic modules, claim orchestration, and
//! batch ledger aggregation.
//!
//! ## Architecture
//!
//! The [`SettlementEngine`] receives claims with pre-computed settlement
//! coins and, per claim:
//! 1. Builds one immutable [`TlmContext`]
//! 2. Runs each configured token logic module against it
//! 3. Merges module outputs in configured order
//! 4. Applies consumer stake debits (never below zero)
//! 5. Checks that pass-through module accounts end the claim empty
//!
//! The engine only queues operations. It never moves balances.
//!
//! ## Token Logic Modules
//!
//! - **Relay-Burn-Equals-Mint**: burn the settlement from the consumer, mint it to the pool, distribute
//! - **Global-Mint**: mint inflation on top of the settlement, distribute
//! - **Global-Mint-Reimbursement-Request**: charge the consumer for that inflation, escrow to treasury

pub mod aggregation;
pub mod conservation;
pub mod engine;
pub mod module_set;
pub mod result;
pub mod tlm;

pub use aggregation::{AggregateEntry, AggregatedLedger, SettlementResults};
pub use conservation::PoolConservation;
pub use engine::{ClaimSettlement, SettlementEngine};
pub use module_set::validate_module_set;
pub use result::SettlementResult;
pub use tlm::{TlmContext, TlmOutput, TokenLogicModule};
