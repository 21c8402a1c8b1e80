//! Pending settlement operations and events.
//!
//! The engine never moves tokens. It emits these records and a downstream
//! executor applies them to balances.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Address, Coin, ModuleAccount, ServiceId, SessionId};

// ---------------------------------------------------------------------------
// SettlementOpReason
// ---------------------------------------------------------------------------

/// Why an operation was queued. Every operation carries exactly one reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum SettlementOpReason {
    // Relay-Burn-Equals-Mint
    RelayBurnEqualsMintApplicationStakeBurn,
    RelayBurnEqualsMintSupplierStakeMint,
    RelayBurnEqualsMintSupplierShareholderRewardDistribution,
    RelayBurnEqualsMintSupplierRewardModuleTransfer,
    RelayBurnEqualsMintValidatorRewardDistribution,
    RelayBurnEqualsMintDelegatorRewardDistribution,
    RelayBurnEqualsMintSourceOwnerRewardDistribution,
    RelayBurnEqualsMintApplicationRewardDistribution,
    RelayBurnEqualsMintTreasuryRewardDistribution,

    // Global-Mint
    GlobalMintInflation,
    GlobalMintSupplierShareholderRewardDistribution,
    GlobalMintSupplierRewardModuleTransfer,
    GlobalMintValidatorRewardDistribution,
    GlobalMintDelegatorRewardDistribution,
    GlobalMintSourceOwnerRewardDistribution,
    GlobalMintApplicationRewardDistribution,
    GlobalMintTreasuryRewardDistribution,

    // Global-Mint-Reimbursement-Request
    GlobalMintReimbursementRequestEscrowModuleTransfer,
    GlobalMintReimbursementRequestEscrowTreasuryTransfer,
}

impl SettlementOpReason {
    /// Stable name for logs and digests.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RelayBurnEqualsMintApplicationStakeBurn => {
                "TLM_RELAY_BURN_EQUALS_MINT_APPLICATION_STAKE_BURN"
            }
            Self::RelayBurnEqualsMintSupplierStakeMint => {
                "TLM_RELAY_BURN_EQUALS_MINT_SUPPLIER_STAKE_MINT"
            }
            Self::RelayBurnEqualsMintSupplierShareholderRewardDistribution => {
                "TLM_RELAY_BURN_EQUALS_MINT_SUPPLIER_SHAREHOLDER_REWARD_DISTRIBUTION"
            }
            Self::RelayBurnEqualsMintSupplierRewardModuleTransfer => {
                "TLM_RELAY_BURN_EQUALS_MINT_SUPPLIER_REWARD_MODULE_TRANSFER"
            }
            Self::RelayBurnEqualsMintValidatorRewardDistribution => {
                "TLM_RELAY_BURN_EQUALS_MINT_VALIDATOR_REWARD_DISTRIBUTION"
            }
            Self::RelayBurnEqualsMintDelegatorRewardDistribution => {
                "TLM_RELAY_BURN_EQUALS_MINT_DELEGATOR_REWARD_DISTRIBUTION"
            }
            Self::RelayBurnEqualsMintSourceOwnerRewardDistribution => {
                "TLM_RELAY_BURN_EQUALS_MINT_SOURCE_OWNER_REWARD_DISTRIBUTION"
            }
            Self::RelayBurnEqualsMintApplicationRewardDistribution => {
                "TLM_RELAY_BURN_EQUALS_MINT_APPLICATION_REWARD_DISTRIBUTION"
            }
            Self::RelayBurnEqualsMintTreasuryRewardDistribution => {
                "TLM_RELAY_BURN_EQUALS_MINT_TREASURY_REWARD_DISTRIBUTION"
            }
            Self::GlobalMintInflation => "TLM_GLOBAL_MINT_INFLATION",
            Self::GlobalMintSupplierShareholderRewardDistribution => {
                "TLM_GLOBAL_MINT_SUPPLIER_SHAREHOLDER_REWARD_DISTRIBUTION"
            }
            Self::GlobalMintSupplierRewardModuleTransfer => {
                "TLM_GLOBAL_MINT_SUPPLIER_REWARD_MODULE_TRANSFER"
            }
            Self::GlobalMintValidatorRewardDistribution => {
                "TLM_GLOBAL_MINT_VALIDATOR_REWARD_DISTRIBUTION"
            }
            Self::GlobalMintDelegatorRewardDistribution => {
                "TLM_GLOBAL_MINT_DELEGATOR_REWARD_DISTRIBUTION"
            }
            Self::GlobalMintSourceOwnerRewardDistribution => {
                "TLM_GLOBAL_MINT_SOURCE_OWNER_REWARD_DISTRIBUTION"
            }
            Self::GlobalMintApplicationRewardDistribution => {
                "TLM_GLOBAL_MINT_APPLICATION_REWARD_DISTRIBUTION"
            }
            Self::GlobalMintTreasuryRewardDistribution => {
                "TLM_GLOBAL_MINT_TREASURY_REWARD_DISTRIBUTION"
            }
            Self::GlobalMintReimbursementRequestEscrowModuleTransfer => {
                "TLM_GLOBAL_MINT_REIMBURSEMENT_REQUEST_ESCROW_MODULE_TRANSFER"
            }
            Self::GlobalMintReimbursementRequestEscrowTreasuryTransfer => {
                "TLM_GLOBAL_MINT_REIMBURSEMENT_REQUEST_ESCROW_TREASURY_TRANSFER"
            }
        }
    }
}

impl fmt::Display for SettlementOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Operation records
// ---------------------------------------------------------------------------

/// Mint into, or burn from, a module account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintBurnOp {
    pub reason: SettlementOpReason,
    pub module: ModuleAccount,
    pub coin: Coin,
}

/// Transfer between two module accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModToModTransfer {
    pub reason: SettlementOpReason,
    pub sender: ModuleAccount,
    pub recipient: ModuleAccount,
    pub coin: Coin,
}

/// Transfer from a module account to an ordinary account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModToAcctTransfer {
    pub reason: SettlementOpReason,
    pub sender: ModuleAccount,
    pub recipient: Address,
    pub coin: Coin,
}

// ---------------------------------------------------------------------------
// SettlementEvent
// ---------------------------------------------------------------------------

/// Side-channel notifications produced while settling a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementEvent {
    /// The consumer's stake paid for inflation that the foundation should
    /// reimburse out of band.
    ReimbursementRequested {
        consumer: Address,
        operator: Address,
        service_id: ServiceId,
        session_id: SessionId,
        amount: Coin,
    },
    /// The consumer owed more than it had staked; only the stake was settled.
    ApplicationOverserviced {
        application: Address,
        expected_burn: Coin,
        effective_burn: Coin,
    },
    /// The consumer's escrowed stake was reduced.
    ConsumerStakeDebited {
        consumer: Address,
        previous: u128,
        debit: u128,
        remaining: u128,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_names_are_unique_and_prefixed() {
        use std::collections::BTreeSet;
        let all = [
            SettlementOpReason::RelayBurnEqualsMintApplicationStakeBurn,
            SettlementOpReason::RelayBurnEqualsMintSupplierStakeMint,
            SettlementOpReason::RelayBurnEqualsMintSupplierShareholderRewardDistribution,
            SettlementOpReason::RelayBurnEqualsMintSupplierRewardModuleTransfer,
            SettlementOpReason::RelayBurnEqualsMintValidatorRewardDistribution,
            SettlementOpReason::RelayBurnEqualsMintDelegatorRewardDistribution,
            SettlementOpReason::RelayBurnEqualsMintSourceOwnerRewardDistribution,
            SettlementOpReason::RelayBurnEqualsMintApplicationRewardDistribution,
            SettlementOpReason::RelayBurnEqualsMintTreasuryRewardDistribution,
            SettlementOpReason::GlobalMintInflation,
            SettlementOpReason::GlobalMintSupplierShareholderRewardDistribution,
            SettlementOpReason::GlobalMintSupplierRewardModuleTransfer,
            SettlementOpReason::GlobalMintValidatorRewardDistribution,
            SettlementOpReason::GlobalMintDelegatorRewardDistribution,
            SettlementOpReason::GlobalMintSourceOwnerRewardDistribution,
            SettlementOpReason::GlobalMintApplicationRewardDistribution,
            SettlementOpReason::GlobalMintTreasuryRewardDistribution,
            SettlementOpReason::GlobalMintReimbursementRequestEscrowModuleTransfer,
            SettlementOpReason::GlobalMintReimbursementRequestEscrowTreasuryTransfer,
        ];
        let names: BTreeSet<&str> = all.iter().map(|r| r.as_str()).collect();
        assert_eq!(names.len(), all.len());
        assert!(names.iter().all(|n| n.starts_with("TLM_")));
    }

    #[test]
    fn reason_display() {
        assert_eq!(
            SettlementOpReason::GlobalMintInflation.to_string(),
            "TLM_GLOBAL_MINT_INFLATION"
        );
    }
}
