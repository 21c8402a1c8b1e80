//! Startup validation of the configured module list.

use std::collections::BTreeSet;

use relaysettle_types::{GlobalMintConfig, Result, SettlementError, TlmId};

/// Reject module lists that cannot settle consistently.
///
/// - no module may appear twice;
/// - global mint and its reimbursement request are enabled together or not at all;
/// - they are present exactly when `global_mint` is enabled.
pub fn validate_module_set(modules: &[TlmId], global_mint: &GlobalMintConfig) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in modules {
        if !seen.insert(*id) {
            return Err(SettlementError::DuplicateModule(*id));
        }
    }

    let has_mint = seen.contains(&TlmId::GlobalMint);
    let has_reimbursement = seen.contains(&TlmId::GlobalMintReimbursementRequest);
    match (has_mint, has_reimbursement) {
        (true, false) => {
            return Err(SettlementError::MismatchedModulePair {
                present: TlmId::GlobalMint,
                missing: TlmId::GlobalMintReimbursementRequest,
            });
        }
        (false, true) => {
            return Err(SettlementError::MismatchedModulePair {
                present: TlmId::GlobalMintReimbursementRequest,
                missing: TlmId::GlobalMint,
            });
        }
        _ => {}
    }

    match (has_mint, global_mint.is_enabled()) {
        (true, false) => Err(SettlementError::ModuleParamsMismatch {
            reason: "global mint modules configured but global mint is disabled".to_string(),
        }),
        (false, true) => Err(SettlementError::ModuleParamsMismatch {
            reason: "global mint is enabled but its modules are not configured".to_string(),
        }),
        _ => Ok(()),
    }
}
