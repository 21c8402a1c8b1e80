//! Identifiers used throughout relaysettle.
//!
//! Every identifier is totally ordered. `Address` ordering is plain
//! byte-lexicographic and is the tie-break used by every distribution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ADDRESS_LEN, MAX_ID_LEN};
use crate::error::{Result, SettlementError};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Validated account address.
///
/// Non-empty, at most [`MAX_ADDRESS_LEN`] bytes, lowercase ASCII
/// alphanumerics plus `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| SettlementError::InvalidAddress {
            value: raw.to_string(),
            reason: reason.to_string(),
        };
        if raw.is_empty() {
            return Err(invalid("empty"));
        }
        if raw.len() > MAX_ADDRESS_LEN {
            return Err(invalid("too long"));
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        {
            return Err(invalid("must be lowercase alphanumeric, '_' or '-'"));
        }
        Ok(Self(raw.to_string()))
    }

    /// Build from a compile-time constant already known to be valid.
    pub(crate) fn from_static(raw: &'static str) -> Self {
        debug_assert!(Self::parse(raw).is_ok(), "invalid static address {raw}");
        Self(raw.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = SettlementError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionId / ServiceId
// ---------------------------------------------------------------------------

fn validate_id(kind: &str, raw: &str) -> Result<()> {
    if raw.is_empty() || raw.len() > MAX_ID_LEN {
        return Err(SettlementError::InvalidParameter {
            name: kind.to_string(),
            reason: format!("length must be in 1..={MAX_ID_LEN}, got {}", raw.len()),
        });
    }
    Ok(())
}

/// Identifier of the session a claim was produced in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: &str) -> Result<Self> {
        validate_id("session_id", raw)?;
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = SettlementError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a service offered on the network (e.g. a chain RPC).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(raw: &str) -> Result<Self> {
        validate_id("service_id", raw)?;
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServiceId {
    type Error = SettlementError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<ServiceId> for String {
    fn from(id: ServiceId) -> Self {
        id.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ModuleAccount
// ---------------------------------------------------------------------------

/// Module-owned accounts that tokens flow through during settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ModuleAccount {
    /// Holds consumer (application) stake in escrow.
    Application,
    /// Operator reward pool, drained to shareholders.
    Supplier,
    /// Distribution pool for freshly minted tokens.
    Tokenomics,
}

impl ModuleAccount {
    pub const ALL: [Self; 3] = [Self::Application, Self::Supplier, Self::Tokenomics];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Supplier => "supplier",
            Self::Tokenomics => "tokenomics",
        }
    }
}

impl fmt::Display for ModuleAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// TlmId
// ---------------------------------------------------------------------------

/// Identity of a token logic module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TlmId {
    RelayBurnEqualsMint,
    GlobalMint,
    GlobalMintReimbursementRequest,
}

impl TlmId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RelayBurnEqualsMint => "TLM_RELAY_BURN_EQUALS_MINT",
            Self::GlobalMint => "TLM_GLOBAL_MINT",
            Self::GlobalMintReimbursementRequest => "TLM_GLOBAL_MINT_REIMBURSEMENT_REQUEST",
        }
    }
}

impl fmt::Display for TlmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_accepts_valid() {
        let addr = Address::parse("pokt1supplier_a-01").unwrap();
        assert_eq!(addr.as_str(), "pokt1supplier_a-01");
        assert_eq!(addr.to_string(), "pokt1supplier_a-01");
    }

    #[test]
    fn address_rejects_invalid() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("Upper").is_err());
        assert!(Address::parse("has space").is_err());
        assert!(Address::parse(&"a".repeat(MAX_ADDRESS_LEN + 1)).is_err());
        assert!(Address::parse(&"a".repeat(MAX_ADDRESS_LEN)).is_ok());
    }

    #[test]
    fn address_ordering_is_bytewise() {
        let a = Address::parse("alice").unwrap();
        let b = Address::parse("bob").unwrap();
        let a2 = Address::parse("alice2").unwrap();
        assert!(a < b);
        assert!(a < a2);
        assert!(a2 < b);
    }

    #[test]
    fn address_serde_validates() {
        let addr: Address = serde_json::from_str("\"carol\"").unwrap();
        assert_eq!(addr.as_str(), "carol");
        assert!(serde_json::from_str::<Address>("\"NOT VALID\"").is_err());
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"carol\"");
    }

    #[test]
    fn ids_reject_empty() {
        assert!(SessionId::new("").is_err());
        assert!(ServiceId::new("").is_err());
        assert_eq!(ServiceId::new("svc1").unwrap().as_str(), "svc1");
    }

    #[test]
    fn module_account_display() {
        assert_eq!(ModuleAccount::Tokenomics.to_string(), "tokenomics");
        assert_eq!(ModuleAccount::ALL.len(), 3);
    }

    #[test]
    fn tlm_id_display() {
        assert_eq!(TlmId::GlobalMint.to_string(), "TLM_GLOBAL_MINT");
        assert_eq!(
            TlmId::RelayBurnEqualsMint.to_string(),
            "TLM_RELAY_BURN_EQUALS_MINT"
        );
    }
}
